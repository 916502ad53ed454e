use anyhow::Context;
use app::{
    generate::{ClipRequest, GifRequest, MemeRequest},
    output::MediaArtifact,
    MediaError,
};
use clap::Parser;
use veepiac_core::SubtitleId;

use super::{argparse::AppConfig, helpers};

#[derive(Parser, Debug)]
pub struct MemeOpts {
    /// Subtitle to take the frame from
    pub subtitle_id: i64,

    /// Text drawn over the frame
    pub text: String,

    /// Name for the output, a random id if not provided
    #[arg(long)]
    pub id: Option<String>,

    /// Use this frame instead of the subtitle's first frame
    #[arg(long)]
    pub frame: Option<u64>,

    #[arg(long, default_value = "impact")]
    pub font: String,

    #[arg(long, default_value = "#ffffff")]
    pub text_color: String,

    #[arg(long, default_value = "#000000")]
    pub outline_color: String,

    #[command(flatten)]
    pub app: AppConfig,
}

impl MemeOpts {
    pub(crate) fn request(&self) -> MemeRequest {
        MemeRequest {
            subtitle_id: SubtitleId::new(self.subtitle_id),
            text: self.text.clone(),
            meme_id: self.id.clone(),
            frame_id: self.frame,
            font: self.font.clone(),
            text_color: self.text_color.clone(),
            outline_color: self.outline_color.clone(),
        }
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let app = helpers::get_app(&self.app).await?;
        let artifact = app.generator.create_meme(&self.request()).await;
        report("meme", artifact)
    }
}

#[derive(Parser, Debug)]
pub struct GifOpts {
    /// Subtitle the frames belong to
    pub subtitle_id: i64,

    /// First frame, inclusive
    pub start_frame: u64,

    /// Last frame, inclusive
    pub end_frame: u64,

    /// Name for the output, a random id if not provided
    #[arg(long)]
    pub id: Option<String>,

    /// Do not draw the dialogue on each frame
    #[arg(long)]
    pub no_caption: bool,

    /// Playback speed multiplier
    #[arg(long, default_value_t = 1.0)]
    pub speed: f64,

    /// low, medium or high
    #[arg(long)]
    pub quality: Option<String>,

    #[command(flatten)]
    pub app: AppConfig,
}

impl GifOpts {
    pub(crate) fn request(&self) -> GifRequest {
        GifRequest {
            subtitle_id: SubtitleId::new(self.subtitle_id),
            start_frame: self.start_frame,
            end_frame: self.end_frame,
            gif_id: self.id.clone(),
            caption: !self.no_caption,
            speed: self.speed,
            quality: self.quality.clone(),
        }
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let app = helpers::get_app(&self.app).await?;
        let artifact = app.generator.create_gif(&self.request()).await;
        report("gif", artifact)
    }
}

#[derive(Parser, Debug)]
pub struct ClipOpts {
    /// Subtitle the clip belongs to
    pub subtitle_id: i64,

    /// Start timestamp, `HH:MM:SS,mmm`
    pub start_time: String,

    /// End timestamp, `HH:MM:SS,mmm`
    pub end_time: String,

    /// Name for the output, a random id if not provided
    #[arg(long)]
    pub id: Option<String>,

    /// Do not copy subtitle streams into the clip
    #[arg(long)]
    pub no_caption: bool,

    /// mp4, mkv or mov
    #[arg(long)]
    pub format: Option<String>,

    /// low, medium or high
    #[arg(long)]
    pub quality: Option<String>,

    #[command(flatten)]
    pub app: AppConfig,
}

impl ClipOpts {
    pub(crate) fn request(&self) -> ClipRequest {
        ClipRequest {
            subtitle_id: SubtitleId::new(self.subtitle_id),
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            clip_id: self.id.clone(),
            caption: !self.no_caption,
            format: self.format.clone(),
            quality: self.quality.clone(),
        }
    }

    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        let app = helpers::get_app(&self.app).await?;
        let artifact = app.generator.create_clip(&self.request()).await;
        report("clip", artifact)
    }
}

fn report(what: &str, artifact: Result<MediaArtifact, MediaError>) -> anyhow::Result<()> {
    let artifact = artifact.map_err(|e| {
        let kind = e.kind();
        anyhow::Error::new(e).context(format!("{}: could not create {}", kind, what))
    })?;
    log::info!("created {} at {:?}", what, artifact.path);
    let out = serde_json::to_string_pretty(&artifact.response())
        .context("could not serialize response")?;
    println!("{}", out);
    Ok(())
}
