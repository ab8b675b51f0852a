use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use sonarlog_core::pipeline::config::{AnonymizeConfig, OutputConfig, OutputFormat, PipelineConfig};
use sonarlog_core::pipeline::run_pipeline_reported;
use sonarlog_core::transform::{parse_channels, FrameFilter, GenerateParams};

use crate::progress::SpinnerReporter;
use crate::summary::{print_pipeline_report, print_pipeline_summary};

#[derive(Args)]
pub struct ConvertArgs {
    /// Input log file (sl2 or sl3)
    pub file: PathBuf,

    /// Pipeline config file (TOML); other options are ignored when given
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Second log whose depths are adjusted to the input and merged into it
    #[arg(short, long)]
    pub depth_adjust: Option<PathBuf>,

    /// Output formats separated by colons, e.g. sl2:sl3:csv
    #[arg(short, long, value_delimiter = ':')]
    pub output: Vec<String>,

    /// Channels to keep, separated by colons. Primary = 0, Secondary = 1,
    /// DownScan = 2, SidescanLeft = 3, SidescanRight = 4,
    /// SidescanComposite = 5, ThreeD = 9
    #[arg(short, long, value_delimiter = ':')]
    pub channel: Vec<String>,

    /// First frame index to keep
    #[arg(short, long, default_value_t = 0)]
    pub from: u32,

    /// Last frame index to keep
    #[arg(short, long, default_value_t = u32::MAX)]
    pub to: u32,

    /// Move the track to a random place, keeping its shape
    #[arg(short, long)]
    pub anonymous: bool,

    /// Seed for --anonymous, for a reproducible offset
    #[arg(long, requires = "anonymous")]
    pub seed: Option<u64>,

    /// Flip sounded data on the SidescanComposite channel
    #[arg(short = 'l', long)]
    pub flip: bool,

    /// Generate frames for a channel from other channels: destination,
    /// source(s), then `f` to erase the destination first and `d` to build
    /// sounded data from depth, e.g. 1:2:5:f
    #[arg(short, long, value_delimiter = ':')]
    pub generate: Vec<String>,

    /// Depth shift in meters: m1.15 subtracts, p1.15 adds
    #[arg(short = 's', long)]
    pub shift: Option<String>,

    /// Directory for output files
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// File name (without extension) for output files
    #[arg(long, default_value = "out")]
    pub stem: String,
}

pub fn run(args: &ConvertArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)?
    };

    print_pipeline_summary(&config);

    let reporter = Arc::new(SpinnerReporter::new()?);
    let result = run_pipeline_reported(&config, reporter.clone());
    reporter.finish();
    let report = result
        .with_context(|| format!("Can't read frames from {}", config.input.display()))?;

    print_pipeline_report(&report);
    Ok(())
}

fn build_config_from_args(args: &ConvertArgs) -> Result<PipelineConfig> {
    let formats = args
        .output
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<OutputFormat>())
        .collect::<Result<Vec<_>, _>>()?;

    let generate = if args.generate.is_empty() {
        None
    } else {
        Some(GenerateParams::from_tokens(&args.generate)?)
    };

    Ok(PipelineConfig {
        input: args.file.clone(),
        depth_adjust: args.depth_adjust.clone(),
        depth_shift: args.shift.clone(),
        generate,
        flip_sidescan: args.flip,
        filter: FrameFilter {
            from: args.from,
            to: args.to,
            channels: parse_channels(&args.channel)?,
        },
        anonymize: args.anonymous.then(|| AnonymizeConfig { seed: args.seed }),
        output: OutputConfig {
            formats,
            directory: args.output_dir.clone(),
            stem: args.stem.clone(),
        },
    })
}
