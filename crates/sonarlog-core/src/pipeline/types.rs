use std::fmt;
use std::path::PathBuf;

use crate::error::SonarError;
use crate::frame::{Frame, Length};
use crate::transform::{GenerationReport, NearestMatch, TrackOffset};

use super::config::OutputFormat;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Reading,
    DepthAdjust,
    DepthShift,
    Generation,
    Flip,
    Filtering,
    Anonymization,
    Writing,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading log"),
            Self::DepthAdjust => write!(f, "Adjusting depth"),
            Self::DepthShift => write!(f, "Shifting depth"),
            Self::Generation => write!(f, "Generating frames"),
            Self::Flip => write!(f, "Flipping sounded data"),
            Self::Filtering => write!(f, "Filtering frames"),
            Self::Anonymization => write!(f, "Anonymizing"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started.
    fn begin_stage(&self, _stage: PipelineStage) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}

    /// The depth adjuster picked its anchor pair; called before the
    /// correction is applied.
    fn nearest_points_found(&self, _nearest: &NearestMatch) {}

    /// A stage failed in a way that does not stop the run.
    fn warn(&self, _message: &str) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// What each stage did.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub input_frames: usize,
    pub depth_adjustment: Option<(NearestMatch, Length)>,
    pub adjusted_frames: usize,
    pub depth_shift: Option<Length>,
    pub generation: Option<GenerationReport>,
    pub flipped: usize,
    pub output_frames: usize,
    pub anonymized: Option<TrackOffset>,
    /// Non-fatal failures, in the order they happened.
    pub warnings: Vec<String>,
    /// One entry per requested output format.
    pub exports: Vec<ExportOutcome>,
}

/// Frames ready for export plus the report of how they were produced.
#[derive(Debug)]
pub struct TransformOutput {
    pub frames: Vec<Frame>,
    pub report: PipelineReport,
}

/// Result of writing one requested output format.
#[derive(Debug)]
pub struct ExportOutcome {
    pub format: OutputFormat,
    pub path: PathBuf,
    pub error: Option<SonarError>,
}

impl ExportOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}
