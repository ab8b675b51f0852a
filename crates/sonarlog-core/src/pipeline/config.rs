use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SonarError;
use crate::io::lowrance::FileVersion;
use crate::transform::{FrameFilter, GenerateParams};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    /// Second capture whose depths are aligned to `input` and merged into it.
    pub depth_adjust: Option<PathBuf>,
    /// Uniform depth shift, e.g. `m1.15` or `p0.4` (meters).
    pub depth_shift: Option<String>,
    pub generate: Option<GenerateParams>,
    /// Reverse sounded data on the SidescanComposite channel.
    #[serde(default)]
    pub flip_sidescan: bool,
    #[serde(default)]
    pub filter: FrameFilter,
    pub anonymize: Option<AnonymizeConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineConfig {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            depth_adjust: None,
            depth_shift: None,
            generate: None,
            flip_sidescan: false,
            filter: FrameFilter::default(),
            anonymize: None,
            output: OutputConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizeConfig {
    /// Fixed seed for a reproducible offset; random when absent.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub formats: Vec<OutputFormat>,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_stem")]
    pub stem: String,
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_stem() -> String {
    "out".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            directory: default_directory(),
            stem: default_stem(),
        }
    }
}

impl OutputConfig {
    pub fn path_for(&self, format: OutputFormat) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.stem, format.extension()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Sl2,
    Sl3,
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Sl2 => "sl2",
            Self::Sl3 => "sl3",
            Self::Csv => "csv",
        }
    }

    /// Log container version, for the binary formats.
    pub fn log_version(self) -> Option<FileVersion> {
        match self {
            Self::Sl2 => Some(FileVersion::Sl2),
            Self::Sl3 => Some(FileVersion::Sl3),
            Self::Csv => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = SonarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sl2" => Ok(Self::Sl2),
            "sl3" => Ok(Self::Sl3),
            "csv" => Ok(Self::Csv),
            other => Err(SonarError::InvalidInput(format!(
                "unknown output format '{other}'"
            ))),
        }
    }
}
