use std::path::Path;

use veepiac_core::SrtTimestamp;

use super::cmd::{FFMpegBinary, FFmpegArg, FFmpegCommand};
use crate::quality::ClipPreset;

/// Everything needed to cut one clip out of an episode.
#[derive(Debug)]
pub struct ClipCut<'a> {
    pub start: &'a SrtTimestamp,
    pub end: &'a SrtTimestamp,
    pub input: &'a Path,
    pub output: &'a Path,
    pub caption: bool,
    pub preset: ClipPreset,
}

/// `ffmpeg -y -ss <start> -to <end> -i <video> -vf scale=<w>:-1 ...`
///
/// The output path is usually a temp file, so it renders as `output` in tests.
pub fn build_clip_cmd(bin: FFMpegBinary, cut: &ClipCut<'_>) -> FFmpegCommand {
    let mut cmd = bin.build_command();

    cmd.args.push(FFmpegArg::plain("-y"));
    cmd.args.push(FFmpegArg::plain("-ss"));
    cmd.args.push(FFmpegArg::plain(cut.start.ffmpeg()));
    cmd.args.push(FFmpegArg::plain("-to"));
    cmd.args.push(FFmpegArg::plain(cut.end.ffmpeg()));
    cmd.args.push(FFmpegArg::plain("-i"));
    cmd.args.push(FFmpegArg::plain(cut.input));
    cmd.args.push(FFmpegArg::plain("-vf"));
    cmd.args
        .push(FFmpegArg::plain(format!("scale={}:-1", cut.preset.width)));
    cmd.args.push(FFmpegArg::plain("-c:v"));
    cmd.args.push(FFmpegArg::plain("libx264"));
    cmd.args.push(FFmpegArg::plain("-crf"));
    cmd.args.push(FFmpegArg::plain(cut.preset.crf.to_string()));
    cmd.args.push(FFmpegArg::plain("-preset"));
    cmd.args.push(FFmpegArg::plain(cut.preset.preset));
    cmd.args.push(FFmpegArg::plain("-c:a"));
    cmd.args.push(FFmpegArg::plain("aac"));
    cmd.args.push(FFmpegArg::plain("-b:a"));
    cmd.args.push(FFmpegArg::plain("128k"));
    if cut.caption {
        cmd.args.push(FFmpegArg::plain("-c:s"));
        cmd.args.push(FFmpegArg::plain("copy"));
    }
    cmd.args.push(FFmpegArg::replaced("output", cut.output));

    cmd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::Quality;

    fn ts(s: &str) -> SrtTimestamp {
        s.parse().unwrap()
    }

    #[test]
    fn clip_command_with_caption() {
        let (start, end) = (ts("00:00:01,000"), ts("00:00:03,000"));
        let cut = ClipCut {
            start: &start,
            end: &end,
            input: Path::new("/static/Season 1/S01E02/video.mkv"),
            output: Path::new("/out/clips/.tmpA1b2C3.mp4"),
            caption: true,
            preset: Quality::Medium.clip(),
        };
        let cmd = build_clip_cmd(FFMpegBinary::default(), &cut);
        assert_eq!(
            format!("{:?}", cmd.test_display()),
            r##"FFMpegTestFormat { bin: "ffmpeg", args: ["-y", "-ss", "00:00:01.000", "-to", "00:00:03.000", "-i", "/static/Season 1/S01E02/video.mkv", "-vf", "scale=720:-1", "-c:v", "libx264", "-crf", "23", "-preset", "medium", "-c:a", "aac", "-b:a", "128k", "-c:s", "copy", "output"] }"##,
        );
        assert_eq!(
            cmd.exec_args().last().copied(),
            Some(std::ffi::OsStr::new("/out/clips/.tmpA1b2C3.mp4"))
        );
    }

    #[test]
    fn clip_command_without_caption() {
        let (start, end) = (ts("00:01:00.500"), ts("00:01:02.250"));
        let cut = ClipCut {
            start: &start,
            end: &end,
            input: Path::new("video.mkv"),
            output: Path::new("out.mkv"),
            caption: false,
            preset: Quality::Low.clip(),
        };
        let cmd = build_clip_cmd(FFMpegBinary::new("/usr/bin/ffmpeg"), &cut);
        assert_eq!(
            format!("{:?}", cmd.test_display()),
            r##"FFMpegTestFormat { bin: "/usr/bin/ffmpeg", args: ["-y", "-ss", "00:01:00.500", "-to", "00:01:02.250", "-i", "video.mkv", "-vf", "scale=480:-1", "-c:v", "libx264", "-crf", "28", "-preset", "veryfast", "-c:a", "aac", "-b:a", "128k", "output"] }"##,
        );
    }
}
