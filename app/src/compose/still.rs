use std::path::Path;

use image::{codecs::jpeg::JpegEncoder, ColorType, Rgb};

use super::MEME_TEXT_FRACTION;
use crate::{
    render::{caption_layout, draw_outlined_text, Face},
    MediaError,
};

const JPEG_QUALITY: u8 = 95;

/// Draw `text` over a single frame and encode the result as a JPEG.
pub fn render_still(
    frame: &Path,
    text: &str,
    face: &Face,
    fill: Rgb<u8>,
    outline: Rgb<u8>,
) -> Result<Vec<u8>, MediaError> {
    if !frame.exists() {
        return Err(MediaError::FrameNotFound(frame.to_path_buf()));
    }
    let mut img = image::open(frame)?.to_rgb8();
    let layout = caption_layout(img.width(), img.height(), MEME_TEXT_FRACTION);
    log::debug!(
        "meme {}x{} font size {} outline {}",
        img.width(),
        img.height(),
        layout.font_size,
        layout.outline
    );

    let mask = face.mask(text, layout.font_size, img.width())?;
    draw_outlined_text(&mut img, &mask, layout.anchor, fill, outline, layout.outline);

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode(
        img.as_raw(),
        img.width(),
        img.height(),
        ColorType::Rgb8,
    )?;
    Ok(buf)
}
