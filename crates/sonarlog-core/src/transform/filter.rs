use serde::{Deserialize, Serialize};

use crate::error::{Result, SonarError};
use crate::frame::{Channel, Frame};

/// Selects frames by index range and channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameFilter {
    /// First frame index kept (inclusive).
    #[serde(default)]
    pub from: u32,
    /// Last frame index kept (inclusive).
    #[serde(default = "default_to")]
    pub to: u32,
    /// Channels kept; empty keeps every channel.
    #[serde(default)]
    pub channels: Vec<Channel>,
}

fn default_to() -> u32 {
    u32::MAX
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self {
            from: 0,
            to: default_to(),
            channels: Vec::new(),
        }
    }
}

impl FrameFilter {
    pub fn accepts(&self, channel: Channel, index: u32) -> bool {
        (self.from..=self.to).contains(&index)
            && (self.channels.is_empty() || self.channels.contains(&channel))
    }

    pub fn matches(&self, frame: &Frame) -> bool {
        self.accepts(frame.channel, frame.index)
    }

    pub fn apply(&self, frames: Vec<Frame>) -> Vec<Frame> {
        frames.into_iter().filter(|f| self.matches(f)).collect()
    }
}

/// Parse numeric channel ids, e.g. the parts of `0:2:5`.
pub fn parse_channels<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<Channel>> {
    let mut channels = Vec::new();
    for token in tokens.iter().map(|t| t.as_ref().trim()).filter(|t| !t.is_empty()) {
        let id: u16 = token
            .parse()
            .map_err(|_| SonarError::InvalidInput(format!("invalid channel '{token}'")))?;
        let channel = Channel::from(id);
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    Ok(channels)
}
