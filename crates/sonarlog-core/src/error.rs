use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonarError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid log file: {0}")]
    InvalidLog(String),

    #[error("Unsupported log format version: {0}")]
    UnsupportedVersion(u16),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Source truncated at byte {offset}: needed {needed} bytes, {available} available")]
    TruncatedSource {
        offset: u64,
        needed: usize,
        available: usize,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, SonarError>;
