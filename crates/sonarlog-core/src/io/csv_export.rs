use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SonarError};
use crate::frame::{DepthPoint, Frame, Length, PointKey};

/// One point per distinct coordinate, with the mean depth of every frame there.
///
/// Points keep the order in which their coordinate first appears.
pub fn unique_depth_points(frames: &[Frame]) -> Vec<DepthPoint> {
    let mut slots: HashMap<PointKey, usize> = HashMap::new();
    let mut sums: Vec<(DepthPoint, f64, usize)> = Vec::new();

    for frame in frames {
        let slot = *slots.entry(frame.point.key()).or_insert_with(|| {
            sums.push((frame.depth_point(), 0.0, 0));
            sums.len() - 1
        });
        let (_, sum, count) = &mut sums[slot];
        *sum += frame.depth.meters();
        *count += 1;
    }

    sums.into_iter()
        .map(|(point, sum, count)| DepthPoint {
            point: point.point,
            depth: Length::from_meters(sum / count as f64),
        })
        .collect()
}

/// Write depth points as `Latitude,Longitude,Depth` rows (degrees, meters).
pub fn write_csv_to<W: Write>(writer: W, points: &[DepthPoint]) -> Result<W> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["Latitude", "Longitude", "Depth"])?;
    for p in points {
        csv_writer.write_record(&[
            format!("{:.8}", p.point.latitude),
            format!("{:.8}", p.point.longitude),
            format!("{:.3}", p.depth.meters()),
        ])?;
    }
    csv_writer.flush()?;
    csv_writer
        .into_inner()
        .map_err(|e| SonarError::Io(e.into_error()))
}

pub fn write_csv(path: &Path, points: &[DepthPoint]) -> Result<()> {
    let file = File::create(path)?;
    write_csv_to(BufWriter::new(file), points)?;
    debug!(path = %path.display(), points = points.len(), "CSV written");
    Ok(())
}
