use std::{path::PathBuf, time::Duration};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    imageops::{self, FilterType},
    Delay, DynamicImage, Frame, Rgb,
};
use veepiac_core::EpisodeRef;

use super::GIF_CAPTION_FRACTION;
use crate::{
    frames::FrameLocator,
    quality::GifPreset,
    render::{caption_layout, draw_outlined_text, Face, TextMask},
    MediaError,
};

const GIF_ENCODER_SPEED: i32 = 10;
const CAPTION_FILL: Rgb<u8> = Rgb([255, 255, 255]);
const CAPTION_OUTLINE: Rgb<u8> = Rgb([0, 0, 0]);

/// `1 / (fps * speed)`, rejecting speeds that are not a positive number.
pub fn frame_duration(preset: GifPreset, speed: f64) -> Result<Duration, MediaError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(MediaError::invalid(format!(
            "speed must be a positive number, got {}",
            speed
        )));
    }
    let secs = 1.0 / (preset.fps as f64 * speed);
    Duration::try_from_secs_f64(secs)
        .map_err(|_| MediaError::invalid(format!("speed {} is out of range", speed)))
}

/// Paths of every frame in `start..=end` that exists on disk.
pub fn collect_frames(
    locator: &FrameLocator,
    episode: &EpisodeRef,
    start: u64,
    end: u64,
) -> Vec<PathBuf> {
    (start..=end)
        .map(|n| locator.locate(episode, n))
        .filter(|p| {
            let found = p.exists();
            if !found {
                log::debug!("skipping missing frame {:?}", p);
            }
            found
        })
        .collect()
}

fn scaled(dim: u32, scale: f32) -> u32 {
    ((dim as f32 * scale) as u32).max(1)
}

/// Load, shrink and caption each frame, then encode a looping gif.
pub fn render_sequence(
    frames: &[PathBuf],
    preset: GifPreset,
    caption: Option<(&str, &Face)>,
    delay: Duration,
) -> Result<Vec<u8>, MediaError> {
    let delay = Delay::from_saturating_duration(delay);
    let mut mask_cache: Option<((u32, u32), TextMask)> = None;
    let mut encoded = Vec::with_capacity(frames.len());

    for path in frames {
        let mut img = image::open(path)?.to_rgb8();
        if preset.scale < 1.0 {
            let w = scaled(img.width(), preset.scale);
            let h = scaled(img.height(), preset.scale);
            img = imageops::resize(&img, w, h, FilterType::Lanczos3);
        }

        if let Some((text, face)) = caption {
            let dims = img.dimensions();
            let layout = caption_layout(dims.0, dims.1, GIF_CAPTION_FRACTION);
            // frames of one episode share a size, rasterize once
            let stale = !matches!(&mask_cache, Some((d, _)) if *d == dims);
            if stale {
                mask_cache = Some((dims, face.mask(text, layout.font_size, dims.0)?));
            }
            if let Some((_, mask)) = &mask_cache {
                draw_outlined_text(
                    &mut img,
                    mask,
                    layout.anchor,
                    CAPTION_FILL,
                    CAPTION_OUTLINE,
                    layout.outline,
                );
            }
        }

        let rgba = DynamicImage::ImageRgb8(img).into_rgba8();
        encoded.push(Frame::from_parts(rgba, 0, 0, delay));
    }
    log::debug!("encoding {} gif frames", encoded.len());

    let mut buf = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut buf, GIF_ENCODER_SPEED);
        encoder.set_repeat(Repeat::Infinite)?;
        encoder.encode_frames(encoded)?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::Quality;
    use image::{codecs::gif::GifDecoder, AnimationDecoder, RgbImage};

    #[test]
    fn speed_changes_frame_duration() {
        let high = Quality::High.gif();
        assert_eq!(frame_duration(high, 2.0).unwrap(), Duration::from_millis(25));
        assert_eq!(frame_duration(high, 1.0).unwrap(), Duration::from_millis(50));
        let low = Quality::Low.gif();
        assert_eq!(frame_duration(low, 1.0).unwrap(), Duration::from_millis(125));
    }

    #[test]
    fn bad_speeds() {
        let preset = Quality::Medium.gif();
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e-320] {
            let err = frame_duration(preset, speed).unwrap_err();
            assert_eq!(err.kind(), "InvalidParameter", "{}", speed);
        }
    }

    #[test]
    fn collect_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        let locator = FrameLocator::new(dir.path());
        let ep = EpisodeRef::new(1, 2).unwrap();
        for n in [3, 5] {
            let p = locator.locate(&ep, n);
            std::fs::create_dir_all(p.parent().unwrap()).unwrap();
            std::fs::write(&p, b"").unwrap();
        }
        let found = collect_frames(&locator, &ep, 2, 6);
        assert_eq!(found, vec![locator.locate(&ep, 3), locator.locate(&ep, 5)]);
        assert!(collect_frames(&locator, &ep, 6, 2).is_empty());
    }

    #[test]
    fn resized_captioned_gif() {
        let dir = tempfile::tempdir().unwrap();
        let frames = (0..3)
            .map(|i| {
                let p = dir.path().join(format!("{}.jpg", i));
                RgbImage::from_pixel(100, 60, Rgb([i * 40, 80, 120]))
                    .save(&p)
                    .unwrap();
                p
            })
            .collect::<Vec<_>>();

        let preset = Quality::Low.gif();
        let bytes = render_sequence(
            &frames,
            preset,
            Some(("Hi", &Face::Builtin)),
            frame_duration(preset, 1.0).unwrap(),
        )
        .unwrap();

        let decoded = GifDecoder::new(std::io::Cursor::new(bytes))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0].buffer().dimensions(), (50, 30));
    }
}
