pub mod anonymize;
pub mod depth_adjust;
pub mod filter;
pub mod flip;
pub mod generate;
pub mod shift;

pub use anonymize::{anonymize, TrackOffset};
pub use depth_adjust::{DepthAdjuster, DepthAdjustment, NearestMatch};
pub use filter::{parse_channels, FrameFilter};
pub use flip::flip_sounded_data;
pub use generate::{generate_channel_frames, GenerateParams, GenerationReport};
pub use shift::{parse_depth_shift, shift_depth};
