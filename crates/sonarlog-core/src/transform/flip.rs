use tracing::debug;

use crate::frame::{Channel, Frame};

/// Reverse the sounded data of every frame on `channel`.
///
/// Fixes sidescan images recorded with the transducer mounted backwards.
/// Applying it twice restores the original data. Returns the number of
/// frames flipped.
pub fn flip_sounded_data(frames: &mut [Frame], channel: Channel) -> usize {
    let mut flipped = 0;
    for frame in frames.iter_mut().filter(|f| f.channel == channel) {
        frame.sounded_data.flip();
        flipped += 1;
    }
    debug!(%channel, flipped, "Sounded data flipped");
    flipped
}
