use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::consts::{
    BOTTOM_ECHO_AMPLITUDE, BOTTOM_ECHO_FRACTION, DEFAULT_SOUNDED_DATA_LEN, SUB_BOTTOM_AMPLITUDE,
    WATER_AMPLITUDE,
};
use crate::error::{Result, SonarError};
use crate::frame::{Channel, Frame, Length, PointKey, SoundedData};

/// Which channel to fill, from which channels, and how.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerateParams {
    pub destination: Channel,
    pub sources: Vec<Channel>,
    /// Erase every destination frame before generating.
    #[serde(default)]
    pub force_overwrite: bool,
    /// Synthesize sounded data from depth instead of copying it.
    #[serde(default)]
    pub from_depth: bool,
}

impl GenerateParams {
    /// Parse colon-separated command-line tokens such as `1:2:5:f:d`.
    ///
    /// The first channel id is the destination, later ones are sources;
    /// `f` forces overwrite and `d` generates from depth.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut destination = None;
        let mut sources: Vec<Channel> = Vec::new();
        let mut force_overwrite = false;
        let mut from_depth = false;

        for token in tokens.iter().map(|t| t.as_ref().trim()) {
            if token.is_empty() {
                continue;
            }
            if token.eq_ignore_ascii_case("f") {
                force_overwrite = true;
            } else if token.eq_ignore_ascii_case("d") {
                from_depth = true;
            } else if let Ok(id) = token.parse::<u16>() {
                let channel = Channel::from(id);
                match destination {
                    None => destination = Some(channel),
                    Some(_) if !sources.contains(&channel) => sources.push(channel),
                    Some(_) => {}
                }
            } else {
                return Err(SonarError::InvalidInput(format!(
                    "unknown generation parameter '{token}'"
                )));
            }
        }

        let destination = destination.ok_or_else(|| {
            SonarError::InvalidInput("generation parameters name no destination channel".into())
        })?;
        let params = Self {
            destination,
            sources,
            force_overwrite,
            from_depth,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.contains(&self.destination) {
            return Err(SonarError::InvalidInput(format!(
                "destination channel {} is also listed as a source",
                self.destination
            )));
        }
        Ok(())
    }
}

impl fmt::Display for GenerateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<String> = self.sources.iter().map(ToString::to_string).collect();
        write!(f, "{} <- [{}]", self.destination, sources.join(", "))?;
        if self.force_overwrite {
            write!(f, " force")?;
        }
        if self.from_depth {
            write!(f, " from-depth")?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// No source channels were given, so nothing ran.
    pub skipped: bool,
    /// Source frames left after de-duplicating by frame index.
    pub unique_sources: usize,
    pub erased: usize,
    pub added: usize,
}

/// Populate `params.destination` with frames derived from the source channels.
///
/// Source frames are de-duplicated by frame index, keeping the first one in
/// sequence order. A frame is generated only for a coordinate that the
/// destination channel does not already hold, counting frames generated
/// earlier in the same pass: two source frames with different indices at
/// one coordinate produce a single destination frame, not one per index.
pub fn generate_channel_frames(frames: &mut Vec<Frame>, params: &GenerateParams) -> GenerationReport {
    if params.sources.is_empty() {
        warn!(destination = %params.destination, "No source channels for frame generation, skipping");
        return GenerationReport {
            skipped: true,
            ..Default::default()
        };
    }

    let mut seen_indices: HashSet<u32> = HashSet::new();
    let unique_sources: Vec<Frame> = frames
        .iter()
        .filter(|f| params.sources.contains(&f.channel))
        .filter(|f| seen_indices.insert(f.index))
        .cloned()
        .collect();

    let erased = if params.force_overwrite {
        let before = frames.len();
        frames.retain(|f| f.channel != params.destination);
        before - frames.len()
    } else {
        0
    };

    let mut occupied: HashSet<PointKey> = frames
        .iter()
        .filter(|f| f.channel == params.destination)
        .map(|f| f.point.key())
        .collect();

    let mut added = 0;
    for source in &unique_sources {
        if occupied.insert(source.point.key()) {
            frames.push(frame_from_channel(source, params.destination, params.from_depth));
            added += 1;
        }
    }

    info!(
        destination = %params.destination,
        unique_sources = unique_sources.len(),
        erased,
        added,
        "Channel frames generated"
    );

    GenerationReport {
        skipped: false,
        unique_sources: unique_sources.len(),
        erased,
        added,
    }
}

/// Build a `destination` frame from a frame recorded on another channel.
pub fn frame_from_channel(source: &Frame, destination: Channel, from_depth: bool) -> Frame {
    let mut frame = source.clone();
    frame.channel = destination;
    if from_depth {
        let len = if source.sounded_data.is_empty() {
            DEFAULT_SOUNDED_DATA_LEN
        } else {
            source.sounded_data.len()
        };
        frame.sounded_data =
            sounded_data_from_depth(len, source.depth, source.upper_limit, source.lower_limit);
    }
    frame
}

/// Synthetic trace with a bottom echo at `depth`.
///
/// Sample `i` shows range `upper + (lower - upper) * i / len`. When the
/// limits do not describe a positive range, `[0, 1.5 * depth]` is used.
pub fn sounded_data_from_depth(
    len: usize,
    depth: Length,
    upper_limit: Length,
    lower_limit: Length,
) -> SoundedData {
    let depth = depth.meters();
    let (upper, lower) = if lower_limit.meters() > upper_limit.meters() {
        (upper_limit.meters(), lower_limit.meters())
    } else {
        (0.0, depth * 1.5)
    };
    let span = lower - upper;
    if len == 0 || !(span > 0.0) || !depth.is_finite() {
        return SoundedData::new(vec![WATER_AMPLITUDE; len]);
    }

    let sample_span = span / len as f64;
    let echo = (span * BOTTOM_ECHO_FRACTION).max(sample_span);
    let data = (0..len)
        .map(|i| {
            let range = upper + sample_span * i as f64;
            if range < depth {
                WATER_AMPLITUDE
            } else if range < depth + echo {
                BOTTOM_ECHO_AMPLITUDE
            } else {
                SUB_BOTTOM_AMPLITUDE
            }
        })
        .collect();
    SoundedData::new(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_parse_destination_sources_and_flags() {
        let p = GenerateParams::from_tokens(&["1", "2", "5", "F", "d"]).unwrap();
        assert_eq!(p.destination, Channel::Secondary);
        assert_eq!(p.sources, vec![Channel::DownScan, Channel::SidescanComposite]);
        assert!(p.force_overwrite);
        assert!(p.from_depth);
    }

    #[test]
    fn tokens_reject_unknown_and_self_source() {
        assert!(GenerateParams::from_tokens(&["0", "x"]).is_err());
        assert!(GenerateParams::from_tokens(&["0", "0"]).is_err());
        assert!(GenerateParams::from_tokens(&["f"]).is_err());
    }

    #[test]
    fn trailing_empty_token_is_ignored() {
        let p = GenerateParams::from_tokens(&["0", "2", ""]).unwrap();
        assert_eq!(p.sources, vec![Channel::DownScan]);
    }

    #[test]
    fn depth_trace_has_bottom_echo_at_depth() {
        let data = sounded_data_from_depth(
            100,
            Length::from_meters(5.0),
            Length::from_meters(0.0),
            Length::from_meters(10.0),
        );
        let bytes = data.as_bytes();
        assert_eq!(bytes[0], WATER_AMPLITUDE);
        assert_eq!(bytes[49], WATER_AMPLITUDE);
        assert_eq!(bytes[50], BOTTOM_ECHO_AMPLITUDE);
        assert_eq!(bytes[99], SUB_BOTTOM_AMPLITUDE);
    }
}
