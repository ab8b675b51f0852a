use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::error::Result;
use crate::frame::{Channel, Frame};
use crate::io::csv_export::{unique_depth_points, write_csv};
use crate::io::lowrance::{read_log, LogHeader};
use crate::io::lowrance_writer::write_log;
use crate::transform::{
    anonymize, flip_sounded_data, generate_channel_frames, parse_depth_shift, shift_depth,
    DepthAdjuster,
};

use super::config::{OutputConfig, PipelineConfig};
use super::types::{
    ExportOutcome, NoOpReporter, PipelineReport, PipelineStage, ProgressReporter, TransformOutput,
};

fn record_warning(report: &mut PipelineReport, reporter: &dyn ProgressReporter, message: String) {
    warn!("{}", message);
    reporter.warn(&message);
    report.warnings.push(message);
}

/// Run every in-memory stage over `frames`.
///
/// Stage order: depth adjust merge, depth shift, channel generation,
/// sidescan flip, filter, anonymization. A stage that cannot run is
/// recorded as a warning and the remaining stages still run.
pub fn transform_frames<R: Rng + ?Sized>(
    config: &PipelineConfig,
    mut frames: Vec<Frame>,
    adjust: Option<&[Frame]>,
    rng: &mut R,
    reporter: &dyn ProgressReporter,
) -> TransformOutput {
    let mut report = PipelineReport {
        input_frames: frames.len(),
        ..Default::default()
    };

    if let Some(to_adjust) = adjust {
        reporter.begin_stage(PipelineStage::DepthAdjust);
        let adjuster = DepthAdjuster::new(&frames, to_adjust);
        match adjuster.adjust_depth_observed(|nearest| reporter.nearest_points_found(nearest)) {
            Ok(adjustment) => {
                report.depth_adjustment = Some((adjustment.nearest, adjustment.difference));
                report.adjusted_frames = adjustment.frames.len();
                frames.extend(adjustment.frames);
            }
            Err(e) => record_warning(&mut report, reporter, format!("Depth adjust skipped: {e}")),
        }
        reporter.finish_stage();
    }

    if let Some(ref shift) = config.depth_shift {
        reporter.begin_stage(PipelineStage::DepthShift);
        match parse_depth_shift(shift) {
            Ok(value) => {
                shift_depth(&mut frames, value);
                info!(shift_m = value.meters(), "Depth shift applied");
                report.depth_shift = Some(value);
            }
            Err(e) => record_warning(&mut report, reporter, format!("Depth shift skipped: {e}")),
        }
        reporter.finish_stage();
    }

    if let Some(ref params) = config.generate {
        reporter.begin_stage(PipelineStage::Generation);
        match params.validate() {
            Ok(()) => report.generation = Some(generate_channel_frames(&mut frames, params)),
            Err(e) => record_warning(&mut report, reporter, format!("Generation skipped: {e}")),
        }
        reporter.finish_stage();
    }

    if config.flip_sidescan {
        reporter.begin_stage(PipelineStage::Flip);
        report.flipped = flip_sounded_data(&mut frames, Channel::SidescanComposite);
        reporter.finish_stage();
    }

    reporter.begin_stage(PipelineStage::Filtering);
    let mut frames = config.filter.apply(frames);
    info!(
        kept = frames.len(),
        from = config.filter.from,
        to = config.filter.to,
        "Frames filtered"
    );
    reporter.finish_stage();

    if config.anonymize.is_some() {
        reporter.begin_stage(PipelineStage::Anonymization);
        report.anonymized = Some(anonymize(&mut frames, rng));
        reporter.finish_stage();
    }

    report.output_frames = frames.len();
    TransformOutput { frames, report }
}

/// Write `frames` in every requested format.
///
/// Formats are independent: a failure is recorded in its outcome and the
/// next format is still attempted.
pub fn export_frames(
    header: &LogHeader,
    frames: &[Frame],
    output: &OutputConfig,
    reporter: &dyn ProgressReporter,
) -> Vec<ExportOutcome> {
    if output.formats.is_empty() {
        return Vec::new();
    }

    reporter.begin_stage(PipelineStage::Writing);
    let outcomes = output
        .formats
        .iter()
        .map(|&format| {
            let path = output.path_for(format);
            let result = match format.log_version() {
                Some(version) => write_log(&path, &header.for_output(version), frames),
                None => write_csv(&path, &unique_depth_points(frames)),
            };
            match result {
                Ok(()) => {
                    info!(%format, path = %path.display(), "Output written");
                    ExportOutcome {
                        format,
                        path,
                        error: None,
                    }
                }
                Err(e) => {
                    let message = format!("Writing {} failed: {e}", path.display());
                    warn!("{}", message);
                    reporter.warn(&message);
                    ExportOutcome {
                        format,
                        path,
                        error: Some(e),
                    }
                }
            }
        })
        .collect();
    reporter.finish_stage();
    outcomes
}

/// Run the full pipeline with a thread-safe progress reporter.
///
/// Fails only when the input log cannot be read; every later problem is
/// recorded in the returned report.
pub fn run_pipeline_reported(
    config: &PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<PipelineReport> {
    reporter.begin_stage(PipelineStage::Reading);
    let data = read_log(&config.input)?;
    info!(
        path = %config.input.display(),
        version = %data.header.version,
        frames = data.frames.len(),
        "Input log read"
    );

    let mut warnings = Vec::new();
    let adjust = match config.depth_adjust {
        Some(ref path) => match read_log(path) {
            Ok(adjust) => Some(adjust),
            Err(e) => {
                let message = format!("Cannot read depth adjust log {}: {e}", path.display());
                warn!("{}", message);
                reporter.warn(&message);
                warnings.push(message);
                None
            }
        },
        None => None,
    };
    reporter.finish_stage();

    let mut rng = match config.anonymize.as_ref().and_then(|a| a.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let TransformOutput { frames, mut report } = transform_frames(
        config,
        data.frames,
        adjust.as_ref().map(|a| a.frames.as_slice()),
        &mut rng,
        reporter.as_ref(),
    );
    warnings.append(&mut report.warnings);
    report.warnings = warnings;

    report.exports = export_frames(&data.header, &frames, &config.output, reporter.as_ref());
    Ok(report)
}

/// Run the full pipeline without progress reporting.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    run_pipeline_reported(config, Arc::new(NoOpReporter))
}

