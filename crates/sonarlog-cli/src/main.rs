mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sonarlog", about = "Lowrance sonar log converter")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show log header and per-channel frame statistics
    Info(commands::info::InfoArgs),
    /// Transform a log and write it as sl2, sl3 and/or csv
    Convert(commands::convert::ConvertArgs),
    /// Show the bytes at an offset in every frame as several value types
    Research(commands::research::ResearchArgs),
    /// Print or save a default pipeline config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Convert(args) => commands::convert::run(args),
        Commands::Research(args) => commands::research::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
