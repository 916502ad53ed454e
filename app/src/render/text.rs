use std::fmt;

use image::{Rgb, RgbImage};

use super::TextMask;

/// Where and how big a caption is drawn on a `width` x `height` image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionLayout {
    pub font_size: u32,
    pub outline: i32,
    /// Horizontal center and baseline of the text.
    pub anchor: (f32, f32),
}

/// Font size is `fraction` of the width (at least 1px), the outline radius 5%
/// of the font size (at least 1px), and the baseline sits one and a half font
/// sizes above the bottom edge.
pub fn caption_layout(width: u32, height: u32, fraction: f32) -> CaptionLayout {
    let font_size = ((width as f32 * fraction) as u32).max(1);
    let outline = ((font_size as f32 * 0.05) as i32).max(1);
    CaptionLayout {
        font_size,
        outline,
        anchor: (
            width as f32 / 2.0,
            height as f32 - 1.5 * font_size as f32,
        ),
    }
}

fn blend(dst: &mut Rgb<u8>, color: Rgb<u8>, alpha: u8) {
    let a = alpha as u32;
    for (d, c) in dst.0.iter_mut().zip(color.0.iter()) {
        *d = ((*d as u32 * (255 - a) + *c as u32 * a + 127) / 255) as u8;
    }
}

fn draw_mask(img: &mut RgbImage, mask: &TextMask, left: i64, top: i64, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for my in 0..mask.height {
        let y = top + my as i64;
        if y < 0 || y >= h {
            continue;
        }
        for mx in 0..mask.width {
            let x = left + mx as i64;
            if x < 0 || x >= w {
                continue;
            }
            let alpha = mask.get(mx, my);
            if alpha == 0 {
                continue;
            }
            blend(img.get_pixel_mut(x as u32, y as u32), color, alpha);
        }
    }
}

/// Stamp the mask in `outline` at every offset in `[-radius, radius]^2`, then
/// once in `fill`, all centered on the same anchor.
pub fn draw_outlined_text(
    img: &mut RgbImage,
    mask: &TextMask,
    anchor: (f32, f32),
    fill: Rgb<u8>,
    outline: Rgb<u8>,
    radius: i32,
) {
    let left = (anchor.0 - mask.width as f32 / 2.0).round() as i64;
    let top = anchor.1.round() as i64 - mask.baseline as i64;
    let r = radius as i64;
    for dx in -r..=r {
        for dy in -r..=r {
            draw_mask(img, mask, left + dx, top + dy, outline);
        }
    }
    draw_mask(img, mask, left, top, fill);
}

/// Dialogue flattened onto a single line, dropping the leading dashes that
/// mark a change of speaker.
pub struct CleanDialogue<'a>(pub &'a str);

/// `"- Out."` is a speaker marker, `"-5 degrees"` is not.
fn strip_speaker_dash(line: &str) -> &str {
    match line.strip_prefix('-') {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => line,
    }
}

impl<'a> fmt::Display for CleanDialogue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for line in self.0.lines() {
            let text = strip_speaker_dash(line.trim()).trim();
            if text.is_empty() {
                continue;
            }
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(text)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Face;

    #[test]
    fn layout_for_meme_and_gif() {
        let meme = caption_layout(640, 480, 0.06);
        assert_eq!(meme.font_size, 38);
        assert_eq!(meme.outline, 1);
        assert_eq!(meme.anchor, (320.0, 423.0));

        let big = caption_layout(1920, 1080, 0.06);
        assert_eq!(big.font_size, 115);
        assert_eq!(big.outline, 5);

        let tiny = caption_layout(10, 10, 0.05);
        assert_eq!(tiny.font_size, 1);
        assert_eq!(tiny.outline, 1);
    }

    #[test]
    fn outline_surrounds_fill() {
        let mut img = RgbImage::from_pixel(64, 32, Rgb([0, 0, 255]));
        let mask = Face::Builtin.mask("I", 8, 64).unwrap();
        draw_outlined_text(
            &mut img,
            &mask,
            (32.0, 20.0),
            Rgb([255, 255, 255]),
            Rgb([0, 0, 0]),
            1,
        );
        let pixels = img.pixels().collect::<Vec<_>>();
        assert!(pixels.iter().any(|p| p.0 == [255, 255, 255]));
        assert!(pixels.iter().any(|p| p.0 == [0, 0, 0]));
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn text_off_the_edge_is_clipped() {
        let mut img = RgbImage::new(4, 4);
        let mask = Face::Builtin.mask("WIDE TEXT", 32, 1000).unwrap();
        draw_outlined_text(
            &mut img,
            &mask,
            (2.0, 2.0),
            Rgb([255, 255, 255]),
            Rgb([10, 10, 10]),
            2,
        );
    }

    #[test]
    fn dialogue_is_flattened() {
        let s = CleanDialogue("- Where are you going?\n-  Out.\n").to_string();
        assert_eq!(s, "Where are you going? Out.");
        assert_eq!(CleanDialogue("single").to_string(), "single");
    }

    #[test]
    fn dashes_that_are_not_speakers_stay() {
        assert_eq!(
            CleanDialogue("-5 degrees out there.\n- -10 tomorrow.").to_string(),
            "-5 degrees out there. -10 tomorrow."
        );
        assert_eq!(CleanDialogue("-\n--Hey").to_string(), "--Hey");
    }
}
