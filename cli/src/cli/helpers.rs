use anyhow::Context;
use app::app::{VeepiacApp, VeepiacBuilder};

use super::argparse::AppConfig;

pub(crate) fn builder(args: &AppConfig) -> anyhow::Result<VeepiacBuilder> {
    VeepiacBuilder::new()
        .context("could not create app builder")?
        .update(|c| {
            c.config_file(args.config.as_deref())?
                .database_path(args.database_path.as_deref())?
                .static_root(args.static_root.as_deref())?
                .output_root(args.output_root.as_deref())?
                .font_dir(args.font_dir.as_deref())?
                .ffmpeg_override(args.ffmpeg.as_deref())?
                .base_url(args.base_url.as_deref())
        })
        .context("could not apply command line settings")
}

pub(crate) async fn get_app(args: &AppConfig) -> anyhow::Result<VeepiacApp> {
    builder(args)?
        .build()
        .await
        .context("could not build app config")
}
