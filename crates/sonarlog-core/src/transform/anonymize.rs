use rand::Rng;
use tracing::info;

use crate::frame::{CoordinatePoint, Frame};

/// Whole-degree translation applied to a track by [`anonymize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackOffset {
    pub latitude: f64,
    pub longitude: f64,
}

impl TrackOffset {
    /// Random whole degrees, latitude in [-90, 90) and longitude in [-180, 180).
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            latitude: rng.gen_range(-90..90) as f64,
            longitude: rng.gen_range(-180..180) as f64,
        }
    }

    /// Keep the sub-degree part of `point` and move its whole degrees to the offset.
    pub fn apply(&self, point: &CoordinatePoint) -> CoordinatePoint {
        CoordinatePoint::new(
            point.latitude.fract() + self.latitude,
            point.longitude.fract() + self.longitude,
        )
    }
}

/// Move the whole track to a random place while keeping its shape.
///
/// One offset is drawn per call, so every frame is translated the same way.
pub fn anonymize<R: Rng + ?Sized>(frames: &mut [Frame], rng: &mut R) -> TrackOffset {
    let offset = TrackOffset::random(rng);
    for frame in frames.iter_mut() {
        frame.point = offset.apply(&frame.point);
    }
    info!(frames = frames.len(), "Coordinates anonymized");
    offset
}
