use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sonarlog_core::frame::Channel;
use sonarlog_core::pipeline::config::{AnonymizeConfig, OutputConfig, OutputFormat, PipelineConfig};
use sonarlog_core::transform::{FrameFilter, GenerateParams};

#[derive(Args)]
pub struct ConfigArgs {
    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save an example PipelineConfig with every section filled in.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = PipelineConfig {
        input: PathBuf::from("input.sl2"),
        depth_adjust: None,
        depth_shift: Some("m0.0".into()),
        generate: Some(GenerateParams {
            destination: Channel::Primary,
            sources: vec![Channel::DownScan],
            force_overwrite: false,
            from_depth: false,
        }),
        flip_sidescan: false,
        filter: FrameFilter::default(),
        anonymize: Some(AnonymizeConfig::default()),
        output: OutputConfig {
            formats: vec![OutputFormat::Sl2, OutputFormat::Csv],
            ..Default::default()
        },
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
