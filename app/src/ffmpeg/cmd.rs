use std::{
    ffi::{OsStr, OsString},
    fmt,
    path::PathBuf,
    process::Stdio,
};

use tokio::process::Command;

use super::ProcessOutput;

#[cfg(test)]
struct TestArgFormat<'a>(&'a FFmpegArg);

#[cfg(test)]
impl<'a> fmt::Debug for TestArgFormat<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_test())
    }
}

/// A single argument. `Replaced` carries a stable stand-in used when
/// rendering the command in tests, in place of a value like a temp path.
#[derive(Debug)]
pub(crate) enum FFmpegArg {
    Plain(OsString),
    Replaced(OsString, OsString),
}

impl FFmpegArg {
    pub(crate) fn plain<S: Into<OsString>>(s: S) -> FFmpegArg {
        FFmpegArg::Plain(s.into())
    }
    pub(crate) fn replaced<U: Into<OsString>, S: Into<OsString>>(u: U, s: S) -> FFmpegArg {
        FFmpegArg::Replaced(u.into(), s.into())
    }
    fn as_exec(&self) -> &OsStr {
        match self {
            FFmpegArg::Plain(s) => s.as_os_str(),
            FFmpegArg::Replaced(_, s) => s.as_os_str(),
        }
    }
    #[cfg(test)]
    fn as_test(&self) -> &OsStr {
        match self {
            FFmpegArg::Plain(s) => s.as_os_str(),
            FFmpegArg::Replaced(s, _) => s.as_os_str(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FFMpegBinary {
    path: Option<PathBuf>,
}

impl From<Option<PathBuf>> for FFMpegBinary {
    fn from(path: Option<PathBuf>) -> Self {
        FFMpegBinary { path }
    }
}

impl FFMpegBinary {
    pub fn new<P: Into<PathBuf>>(p: P) -> FFMpegBinary {
        FFMpegBinary {
            path: Some(p.into()),
        }
    }
    fn executable_path(&self) -> &std::path::Path {
        if let Some(p) = &self.path {
            p.as_path()
        } else {
            std::path::Path::new("ffmpeg")
        }
    }
    pub(crate) fn build_command(self) -> FFmpegCommand {
        FFmpegCommand {
            bin: self,
            ..Default::default()
        }
    }
}

/// Low level interface over calling ffmpeg
#[derive(Debug, Default)]
pub struct FFmpegCommand {
    pub(crate) bin: FFMpegBinary,
    pub(crate) args: Vec<FFmpegArg>,
}

#[cfg(test)]
pub(crate) struct TestFormat<'a>(&'a FFmpegCommand);

#[cfg(test)]
impl<'a> fmt::Debug for TestFormat<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.0.args.iter().map(TestArgFormat).collect::<Vec<_>>();
        f.debug_struct("FFMpegTestFormat")
            .field("bin", &self.0.bin.executable_path())
            .field("args", &args)
            .finish()
    }
}

/// Renders the command line as it will be executed, for logs.
impl fmt::Display for FFmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bin.executable_path().display())?;
        for arg in &self.args {
            write!(f, " {}", arg.as_exec().to_string_lossy())?;
        }
        Ok(())
    }
}

impl FFmpegCommand {
    #[cfg(test)]
    pub(crate) fn test_display(&self) -> TestFormat<'_> {
        TestFormat(self)
    }

    pub fn program(&self) -> &std::path::Path {
        self.bin.executable_path()
    }

    /// The arguments exactly as they will be passed to the process.
    pub fn exec_args(&self) -> Vec<&OsStr> {
        self.args.iter().map(FFmpegArg::as_exec).collect()
    }

    fn into_exec(self) -> Command {
        let mut st = Command::new(self.bin.executable_path());
        for arg in &self.args {
            st.arg(arg.as_exec());
        }

        st.stdin(Stdio::null());
        st.stdout(Stdio::null());
        st.stderr(Stdio::piped());

        // dropping the future (e.g. on timeout) must take the process with it
        st.kill_on_drop(true);
        st
    }

    /// Run to completion, collecting the exit code and stderr.
    pub(crate) async fn output(self) -> Result<ProcessOutput, std::io::Error> {
        log::trace!("spawn {:?}", &self);
        let output = self.into_exec().output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if cfg!(feature = "ffmpeg-debug") {
            forward_stderr(&stderr);
        }
        Ok(ProcessOutput {
            code: output.status.code(),
            stderr,
        })
    }
}

/// With `ffmpeg-debug`, the captured stderr is also echoed to the log.
fn forward_stderr(stderr: &str) {
    for line in stderr.lines() {
        log::debug!(target: "ffmpeg", "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FFmpegCommand {
        let mut cmd = FFMpegBinary::new("/opt/ffmpeg").build_command();
        cmd.args.push(FFmpegArg::plain("-i"));
        cmd.args.push(FFmpegArg::plain("in put.mkv"));
        cmd.args
            .push(FFmpegArg::replaced("output.mp4", "/tmp/.tmpXyZ.mp4"));
        cmd
    }

    #[test]
    fn test_display_uses_stand_ins() {
        assert_eq!(
            format!("{:?}", sample().test_display()),
            r#"FFMpegTestFormat { bin: "/opt/ffmpeg", args: ["-i", "in put.mkv", "output.mp4"] }"#
        );
    }

    #[test]
    fn exec_args_use_real_values() {
        let cmd = sample();
        assert_eq!(
            cmd.exec_args(),
            vec![
                OsStr::new("-i"),
                OsStr::new("in put.mkv"),
                OsStr::new("/tmp/.tmpXyZ.mp4")
            ]
        );
        assert_eq!(cmd.to_string(), "/opt/ffmpeg -i in put.mkv /tmp/.tmpXyZ.mp4");
    }

    #[test]
    fn default_binary_is_on_path() {
        let cmd = FFMpegBinary::default().build_command();
        assert_eq!(cmd.program(), std::path::Path::new("ffmpeg"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn stderr_is_captured() {
        let mut cmd = FFMpegBinary::new("/bin/sh").build_command();
        cmd.args.push(FFmpegArg::plain("-c"));
        cmd.args
            .push(FFmpegArg::plain("echo 'Invalid data found' >&2; exit 3"));
        let out = cmd.output().await.unwrap();
        assert_eq!(out.code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stderr.trim(), "Invalid data found");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_binary_is_an_io_error() {
        let cmd = FFMpegBinary::new("/definitely/not/ffmpeg").build_command();
        let err = cmd.output().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
