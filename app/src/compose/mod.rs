//! Blocking image work. Everything here is meant to run on the blocking
//! thread pool and returns encoded bytes, leaving file placement to the
//! output store.

mod sequence;
mod still;

pub use sequence::{collect_frames, frame_duration, render_sequence};
pub use still::render_still;

/// Meme text height as a fraction of the frame width.
pub const MEME_TEXT_FRACTION: f32 = 0.06;
/// Gif caption height as a fraction of the (resized) frame width.
pub const GIF_CAPTION_FRACTION: f32 = 0.05;
