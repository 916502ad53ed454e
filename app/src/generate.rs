use std::{io::Write, path::PathBuf, sync::Arc, time::Duration};

use serde::Deserialize;
use veepiac_core::{ArtifactId, MediaKind, SrtTimestamp, SubtitleContext, SubtitleId};

use crate::{
    app::VeepiacConfig,
    compose,
    ffmpeg::{build_clip_cmd, ClipCut, FFMpegBinary, SystemRunner, TranscodeError, TranscodeRunner},
    frames::FrameLocator,
    output::{MediaArtifact, OutputStore},
    quality::{ClipFormat, Quality},
    render::{parse_color, CleanDialogue, FontChain},
    source::SubtitleSource,
    MediaError,
};

const MEME_EXT: &str = "jpg";
const GIF_EXT: &str = "gif";

fn default_font() -> String {
    "impact".to_owned()
}

fn default_text_color() -> String {
    "#ffffff".to_owned()
}

fn default_outline_color() -> String {
    "#000000".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_speed() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemeRequest {
    pub subtitle_id: SubtitleId,
    pub text: String,
    #[serde(default)]
    pub meme_id: Option<String>,
    #[serde(default)]
    pub frame_id: Option<u64>,
    #[serde(default = "default_font")]
    pub font: String,
    #[serde(default = "default_text_color")]
    pub text_color: String,
    #[serde(default = "default_outline_color")]
    pub outline_color: String,
}

impl MemeRequest {
    pub fn new<S: Into<String>>(subtitle_id: SubtitleId, text: S) -> MemeRequest {
        MemeRequest {
            subtitle_id,
            text: text.into(),
            meme_id: None,
            frame_id: None,
            font: default_font(),
            text_color: default_text_color(),
            outline_color: default_outline_color(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GifRequest {
    pub subtitle_id: SubtitleId,
    pub start_frame: u64,
    pub end_frame: u64,
    #[serde(default)]
    pub gif_id: Option<String>,
    #[serde(default = "default_true")]
    pub caption: bool,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub quality: Option<String>,
}

impl GifRequest {
    pub fn new(subtitle_id: SubtitleId, start_frame: u64, end_frame: u64) -> GifRequest {
        GifRequest {
            subtitle_id,
            start_frame,
            end_frame,
            gif_id: None,
            caption: true,
            speed: default_speed(),
            quality: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClipRequest {
    pub subtitle_id: SubtitleId,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub clip_id: Option<String>,
    #[serde(default = "default_true")]
    pub caption: bool,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

impl ClipRequest {
    pub fn new<S: Into<String>>(subtitle_id: SubtitleId, start_time: S, end_time: S) -> ClipRequest {
        ClipRequest {
            subtitle_id,
            start_time: start_time.into(),
            end_time: end_time.into(),
            clip_id: None,
            caption: true,
            format: None,
            quality: None,
        }
    }
}

fn artifact_id(requested: Option<&str>) -> Result<ArtifactId, MediaError> {
    match requested {
        Some(s) => s
            .parse()
            .map_err(|e: veepiac_core::identifiers::ArtifactIdError| MediaError::invalid(e.to_string())),
        None => Ok(ArtifactId::generate()),
    }
}

fn timestamp(s: &str) -> Result<SrtTimestamp, MediaError> {
    s.parse::<SrtTimestamp>()
        .map_err(|e| MediaError::invalid(e.to_string()))
}

fn write_bytes(bytes: &[u8]) -> impl FnOnce(&mut std::fs::File) -> Result<(), MediaError> + '_ {
    move |f| {
        f.write_all(bytes)
            .and_then(|_| f.flush())
            .map_err(|e| MediaError::io("could not write output", e))
    }
}

/// Turns subtitle ids into memes, gifs and clips.
///
/// Holds only immutable settings and shared handles, so one generator can
/// serve any number of concurrent requests.
#[derive(Debug)]
pub struct MediaGenerator {
    source: Arc<dyn SubtitleSource>,
    runner: Arc<dyn TranscodeRunner>,
    locator: FrameLocator,
    store: OutputStore,
    fonts: FontChain,
    ffmpeg: FFMpegBinary,
    transcode_timeout: Duration,
    max_gif_frames: u64,
    retention: chrono::Duration,
}

impl MediaGenerator {
    pub fn new(config: &VeepiacConfig, source: Arc<dyn SubtitleSource>) -> MediaGenerator {
        MediaGenerator {
            source,
            runner: Arc::new(SystemRunner),
            locator: FrameLocator::new(config.static_root()),
            store: OutputStore::new(config.output_root(), config.base_url()),
            fonts: FontChain::new(config.font_dir(), config.default_font()),
            ffmpeg: config.ffmpeg(),
            transcode_timeout: config.transcode_timeout(),
            max_gif_frames: config.max_gif_frames(),
            retention: config.retention(),
        }
    }

    /// Replace the process runner used for clips.
    pub fn with_runner(mut self, runner: Arc<dyn TranscodeRunner>) -> MediaGenerator {
        self.runner = runner;
        self
    }

    pub fn with_transcode_timeout(mut self, timeout: Duration) -> MediaGenerator {
        self.transcode_timeout = timeout;
        self
    }

    pub fn locator(&self) -> &FrameLocator {
        &self.locator
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    async fn context(&self, id: SubtitleId) -> Result<SubtitleContext, MediaError> {
        let ctx = self
            .source
            .subtitle_context(id)
            .await?
            .ok_or(MediaError::SubtitleNotFound(id))?;
        log::debug!("subtitle {} is {} {:?}", id, ctx.episode, ctx.dialogue);
        Ok(ctx)
    }

    fn artifact(&self, kind: MediaKind, id: ArtifactId, ext: &str, path: PathBuf) -> MediaArtifact {
        MediaArtifact::new(&self.store, kind, id, ext, path, self.retention)
    }

    pub async fn create_meme(&self, req: &MemeRequest) -> Result<MediaArtifact, MediaError> {
        let id = artifact_id(req.meme_id.as_deref())?;
        let ctx = self.context(req.subtitle_id).await?;
        let path = self
            .compose_still(
                &ctx,
                req.frame_id,
                &req.text,
                &req.font,
                &req.text_color,
                &req.outline_color,
                &id,
            )
            .await?;
        Ok(self.artifact(MediaKind::Meme, id, MEME_EXT, path))
    }

    pub async fn create_gif(&self, req: &GifRequest) -> Result<MediaArtifact, MediaError> {
        let id = artifact_id(req.gif_id.as_deref())?;
        let ctx = self.context(req.subtitle_id).await?;
        let path = self
            .compose_sequence(
                &ctx,
                req.start_frame,
                req.end_frame,
                req.caption,
                req.speed,
                req.quality.as_deref(),
                &id,
            )
            .await?;
        Ok(self.artifact(MediaKind::Gif, id, GIF_EXT, path))
    }

    pub async fn create_clip(&self, req: &ClipRequest) -> Result<MediaArtifact, MediaError> {
        let id = artifact_id(req.clip_id.as_deref())?;
        let ctx = self.context(req.subtitle_id).await?;
        let (path, format) = self
            .transcode_clip(
                &ctx,
                &req.start_time,
                &req.end_time,
                req.caption,
                req.format.as_deref(),
                req.quality.as_deref(),
                &id,
            )
            .await?;
        Ok(self.artifact(MediaKind::Clip, id, format.extension(), path))
    }

    /// Draw `text` over one frame, the subtitle's first frame unless
    /// `frame_override` is given.
    #[allow(clippy::too_many_arguments)]
    pub async fn compose_still(
        &self,
        ctx: &SubtitleContext,
        frame_override: Option<u64>,
        text: &str,
        font: &str,
        text_color: &str,
        outline_color: &str,
        id: &ArtifactId,
    ) -> Result<PathBuf, MediaError> {
        let fill = parse_color(text_color)?;
        let outline = parse_color(outline_color)?;
        let frame = frame_override.unwrap_or(ctx.start_frame);
        let frame_path = self.locator.locate(&ctx.episode, frame);
        log::debug!("meme {} from {:?}", id.as_str(), frame_path);

        let store = self.store.clone();
        let fonts = self.fonts.clone();
        let (text, font, id) = (text.to_owned(), font.to_owned(), id.clone());
        tokio::task::spawn_blocking(move || {
            let face = fonts.resolve(&font);
            let bytes = compose::render_still(&frame_path, &text, &face, fill, outline)?;
            store.write_atomic(MediaKind::Meme, &id, MEME_EXT, write_bytes(&bytes))
        })
        .await?
    }

    /// Animate `start..=end`, skipping frames that are not on disk.
    #[allow(clippy::too_many_arguments)]
    pub async fn compose_sequence(
        &self,
        ctx: &SubtitleContext,
        start: u64,
        end: u64,
        caption: bool,
        speed: f64,
        quality: Option<&str>,
        id: &ArtifactId,
    ) -> Result<PathBuf, MediaError> {
        let quality = Quality::resolve(quality);
        let preset = quality.gif();
        let delay = compose::frame_duration(preset, speed)?;
        if start > end {
            return Err(MediaError::NoFramesAvailable { start, end });
        }
        if end - start >= self.max_gif_frames {
            return Err(MediaError::invalid(format!(
                "frame range {}..={} is longer than {} frames (raise `max_gif_frames` in the config to allow it)",
                start, end, self.max_gif_frames
            )));
        }
        log::debug!(
            "gif {} from {} frames {}..={} at {} ({:?} per frame)",
            id.as_str(),
            ctx.episode,
            start,
            end,
            quality,
            delay
        );

        let locator = self.locator.clone();
        let store = self.store.clone();
        let fonts = self.fonts.clone();
        let episode = ctx.episode;
        let dialogue = caption.then(|| CleanDialogue(&ctx.dialogue).to_string());
        let id = id.clone();
        tokio::task::spawn_blocking(move || {
            let frames = compose::collect_frames(&locator, &episode, start, end);
            if frames.is_empty() {
                return Err(MediaError::NoFramesAvailable { start, end });
            }
            let face = dialogue
                .as_ref()
                .map(|_| fonts.resolve(fonts.default_font()));
            let caption = dialogue.as_deref().zip(face.as_ref());
            let bytes = compose::render_sequence(&frames, preset, caption, delay)?;
            store.write_atomic(MediaKind::Gif, &id, GIF_EXT, write_bytes(&bytes))
        })
        .await?
    }

    /// Cut `start_time..end_time` out of the episode video with ffmpeg.
    #[allow(clippy::too_many_arguments)]
    pub async fn transcode_clip(
        &self,
        ctx: &SubtitleContext,
        start_time: &str,
        end_time: &str,
        caption: bool,
        format: Option<&str>,
        quality: Option<&str>,
        id: &ArtifactId,
    ) -> Result<(PathBuf, ClipFormat), MediaError> {
        let start = timestamp(start_time)?;
        let end = timestamp(end_time)?;
        let format = ClipFormat::resolve(format)?;
        let preset = Quality::resolve(quality).clip();

        let video = self.locator.video(&ctx.episode);
        if tokio::fs::metadata(&video).await.is_err() {
            return Err(MediaError::VideoNotFound(video));
        }

        let tmp = self.store.temp_path(MediaKind::Clip, format.extension())?;
        let cmd = build_clip_cmd(
            self.ffmpeg.clone(),
            &ClipCut {
                start: &start,
                end: &end,
                input: &video,
                output: &tmp,
                caption,
                preset,
            },
        );
        log::info!("{}", cmd);

        let output = tokio::time::timeout(self.transcode_timeout, self.runner.run(cmd))
            .await
            .map_err(|_| TranscodeError::Timeout(self.transcode_timeout))?
            .map_err(|e| MediaError::io("could not run ffmpeg", e))?;
        if !output.success() {
            log::debug!("ffmpeg stderr: {}", output.stderr);
            return Err(TranscodeError::Exit {
                code: output.code,
                stderr: output.stderr,
            }
            .into());
        }

        let path = self
            .store
            .persist(tmp, MediaKind::Clip, id, format.extension())?;
        Ok((path, format))
    }
}
