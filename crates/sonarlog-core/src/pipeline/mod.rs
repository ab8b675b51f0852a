pub mod config;
mod orchestrator;
mod types;

pub use orchestrator::{export_frames, run_pipeline, run_pipeline_reported, transform_frames};
pub use types::{ExportOutcome, PipelineReport, PipelineStage, ProgressReporter, TransformOutput};
