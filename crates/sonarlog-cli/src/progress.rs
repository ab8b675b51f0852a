use std::time::Duration;

use anyhow::Result;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use sonarlog_core::pipeline::{PipelineStage, ProgressReporter};
use sonarlog_core::transform::NearestMatch;

/// Spinner showing the current pipeline stage.
pub struct SpinnerReporter {
    bar: ProgressBar,
}

impl SpinnerReporter {
    pub fn new() -> Result<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
        bar.enable_steady_tick(Duration::from_millis(100));
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for SpinnerReporter {
    fn begin_stage(&self, stage: PipelineStage) {
        self.bar.set_message(stage.to_string());
    }

    fn nearest_points_found(&self, nearest: &NearestMatch) {
        self.bar.println(format!(
            "  Nearest points: base {} at {:.2} m, adjust {} at {:.2} m, distance {:.2} m",
            nearest.base.point,
            nearest.base.depth.meters(),
            nearest.adjust.point,
            nearest.adjust.depth.meters(),
            nearest.distance_m
        ));
    }

    fn warn(&self, message: &str) {
        self.bar
            .println(format!("  {}", Style::new().yellow().apply_to(message)));
    }
}
