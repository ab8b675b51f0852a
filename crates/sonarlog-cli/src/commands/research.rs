use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use console::Style;
use sonarlog_core::research::research_file;
use sonarlog_core::transform::{parse_channels, FrameFilter};

#[derive(Args)]
pub struct ResearchArgs {
    /// Input log file (sl2 or sl3)
    pub file: PathBuf,

    /// Byte offset inside each frame record
    #[arg(short, long)]
    pub offset: usize,

    /// Channels to show, separated by colons
    #[arg(short, long, value_delimiter = ':')]
    pub channel: Vec<String>,

    /// First frame index to show
    #[arg(short, long, default_value_t = 0)]
    pub from: u32,

    /// Last frame index to show
    #[arg(short, long, default_value_t = u32::MAX)]
    pub to: u32,
}

pub fn run(args: &ResearchArgs) -> Result<()> {
    let filter = FrameFilter {
        from: args.from,
        to: args.to,
        channels: parse_channels(&args.channel)?,
    };

    println!("Researching values at byte offset {}...\n", args.offset);
    let outcome = research_file(&args.file, args.offset)
        .with_context(|| format!("Can't research {}", args.file.display()))?;

    let header = Style::new().cyan().bold();
    println!(
        "{}",
        header.apply_to(format!(
            "|{:>12}|{:>8}|{:>16}|{:>8}|{:>8}|{:>12}|{:>15}|{:>11}|{:>17}|",
            "Offset", "String", "Bytes", "Short #1", "Short #2", "Integer", "Float", "Frame Index", "Channel"
        ))
    );
    println!("{}", "-".repeat(118));

    let mut shown = 0;
    for entry in &outcome.entries {
        let v = &entry.value;
        if !filter.accepts(v.channel, v.frame_index) {
            continue;
        }
        println!(
            "|{:>12}|{:>8}|{:>16}|{:>8}|{:>8}|{:>12}|{:>15}|{:>11}|{:>17}|",
            entry.record_offset,
            v.as_string,
            v.decimal(),
            v.short_a,
            v.short_b,
            v.as_i32,
            v.as_f32,
            v.frame_index,
            format!("{}({})", v.channel, v.channel.id()),
        );
        shown += 1;
    }

    println!(
        "\n{} of {} frame records shown.",
        shown,
        outcome.entries.len()
    );
    if let Some(ref e) = outcome.truncated {
        println!("{}", Style::new().yellow().apply_to(format!("Stopped early: {e}")));
    }
    Ok(())
}
