use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use sonarlog_core::io::lowrance::read_log;

use crate::summary::print_log_info;

#[derive(Args)]
pub struct InfoArgs {
    /// Input log file (sl2 or sl3)
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let data = read_log(&args.file)
        .with_context(|| format!("Can't read frames from {}", args.file.display()))?;
    print_log_info(&args.file, &data);
    Ok(())
}
