use std::time::Duration;

mod clip;
mod cmd;

pub use clip::{build_clip_cmd, ClipCut};
pub use cmd::{FFMpegBinary, FFmpegCommand};

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("ffmpeg exited with {}: {stderr}", DisplayCode(*code))]
    Exit { code: Option<i32>, stderr: String },
    #[error("ffmpeg did not finish within {0:?}")]
    Timeout(Duration),
}

struct DisplayCode(Option<i32>);

impl std::fmt::Display for DisplayCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(c) => write!(f, "exit {}", c),
            None => f.write_str("signal"),
        }
    }
}

/// What we keep from a finished transcoder process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub code: Option<i32>,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes a prepared ffmpeg command.
///
/// The only seam between clip generation and the outside world, so tests can
/// stand in for ffmpeg.
#[async_trait::async_trait]
pub trait TranscodeRunner: std::fmt::Debug + Send + Sync {
    async fn run(&self, cmd: FFmpegCommand) -> Result<ProcessOutput, std::io::Error>;
}

/// Runs the command as a real child process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait::async_trait]
impl TranscodeRunner for SystemRunner {
    async fn run(&self, cmd: FFmpegCommand) -> Result<ProcessOutput, std::io::Error> {
        cmd.output().await
    }
}
