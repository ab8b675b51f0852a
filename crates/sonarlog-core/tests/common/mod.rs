#![allow(dead_code)]

use sonarlog_core::frame::{Channel, CoordinatePoint, Frame, Frequency, Length};
use sonarlog_core::io::lowrance::{FileVersion, LogHeader};
use sonarlog_core::io::lowrance_writer::encode_log;

/// Frame at `(lat, lon)` with a depth in meters and no sounded data.
pub fn frame_at(channel: Channel, index: u32, lat: f64, lon: f64, depth_m: f64) -> Frame {
    Frame::new(
        channel,
        index,
        CoordinatePoint::new(lat, lon),
        Length::from_meters(depth_m),
    )
}

/// Frame with a recognisable sounded-data payload and range limits.
pub fn sounded_frame(channel: Channel, index: u32, lat: f64, lon: f64, payload: Vec<u8>) -> Frame {
    let mut frame = frame_at(channel, index, lat, lon, 4.0);
    frame.frequency = Some(Frequency::Khz200);
    frame.upper_limit = Length::from_meters(0.0);
    frame.lower_limit = Length::from_meters(10.0);
    frame.sounded_data = payload.into();
    frame
}

/// A short track along a meridian, one frame per channel per ping.
pub fn track(channels: &[Channel], pings: u32) -> Vec<Frame> {
    let mut frames = Vec::new();
    for i in 0..pings {
        for &channel in channels {
            let lat = 55.0 + i as f64 * 0.0001;
            let mut frame = sounded_frame(channel, i, lat, 37.5, vec![i as u8; 16]);
            frame.depth = Length::from_meters(3.0 + i as f64 * 0.1);
            frames.push(frame);
        }
    }
    frames
}

/// Encode frames as an in-memory log of the given version.
pub fn build_log(version: FileVersion, frames: &[Frame]) -> Vec<u8> {
    encode_log(&LogHeader::canonical(version), frames).expect("encode log")
}

/// Write a log buffer to a temporary file and return the temp file handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_log(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write log data");
    f.flush().expect("flush");
    f
}
