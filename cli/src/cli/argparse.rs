use std::path::PathBuf;

use clap::Parser;

use super::{
    debug_utils::ShowConfig,
    generate::{ClipOpts, GifOpts, MemeOpts},
};

pub fn get_args() -> CliOpts {
    CliOpts::parse()
}

#[derive(Parser, Debug)]
#[command(version = clap::crate_version!())]
pub struct CliOpts {
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

impl CliOpts {
    pub(crate) async fn run(&self) -> anyhow::Result<()> {
        match &self.subcmd {
            SubCommand::Meme(cmd) => cmd.run().await,
            SubCommand::Gif(cmd) => cmd.run().await,
            SubCommand::Clip(cmd) => cmd.run().await,
            SubCommand::ShowConfig(cmd) => cmd.run().await,
        }
    }
}

#[derive(Parser, Debug)]
pub enum SubCommand {
    /// Draw text over a single frame
    Meme(MemeOpts),

    /// Animate a range of frames
    Gif(GifOpts),

    /// Cut a clip out of an episode
    Clip(ClipOpts),

    /// Show the launch configuration/directories for the given settings.
    ShowConfig(ShowConfig),
}

/// Settings shared by every command that needs the app.
#[derive(Parser, Debug)]
pub struct AppConfig {
    /// Config file to read instead of `veepiac.toml` in the user config dir
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to sqlite database file, or a `sqlite:` url
    #[arg(long)]
    pub database_path: Option<PathBuf>,

    /// Root of the frame and video archive
    #[arg(long)]
    pub static_root: Option<PathBuf>,

    /// Where generated media is written
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Directory holding `<name>.ttf` fonts
    #[arg(long)]
    pub font_dir: Option<PathBuf>,

    /// Public base url of the output root
    #[arg(long)]
    pub base_url: Option<String>,

    /// Path to the `ffmpeg` binary, if not on the PATH
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        CliOpts::command().debug_assert();
    }

    #[test]
    fn parse_gif() {
        let args = CliOpts::try_parse_from([
            "veepiac", "-vv", "gif", "42", "10", "20", "--speed", "2", "--no-caption",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        match args.subcmd {
            SubCommand::Gif(opts) => {
                let req = opts.request();
                assert_eq!(req.subtitle_id.get(), 42);
                assert_eq!((req.start_frame, req.end_frame), (10, 20));
                assert_eq!(req.speed, 2.0);
                assert!(!req.caption);
            }
            other => panic!("unexpected subcommand {:?}", other),
        }
    }

    #[test]
    fn parse_meme_defaults() {
        let args = CliOpts::try_parse_from(["veepiac", "meme", "7", "hello world"]).unwrap();
        match args.subcmd {
            SubCommand::Meme(opts) => {
                let req = opts.request();
                assert_eq!(req.text, "hello world");
                assert_eq!(req.font, "impact");
                assert_eq!(req.text_color, "#ffffff");
                assert_eq!(req.frame_id, None);
            }
            other => panic!("unexpected subcommand {:?}", other),
        }
    }
}
