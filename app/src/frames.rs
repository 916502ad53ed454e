use std::path::{Path, PathBuf};

use veepiac_core::EpisodeRef;

const FRAMES_DIR: &str = "frames";
const VIDEO_FILE: &str = "video.mkv";

/// Maps episodes and frame numbers onto the static archive.
///
/// Pure path arithmetic, nothing here touches the filesystem.
#[derive(Debug, Clone)]
pub struct FrameLocator {
    static_root: PathBuf,
}

impl FrameLocator {
    pub fn new<P: Into<PathBuf>>(static_root: P) -> FrameLocator {
        FrameLocator {
            static_root: static_root.into(),
        }
    }

    pub fn static_root(&self) -> &Path {
        &self.static_root
    }

    fn episode_dir(&self, episode: &EpisodeRef) -> PathBuf {
        self.static_root
            .join(format!("Season {}", episode.season()))
            .join(episode.code())
    }

    /// `<root>/Season <n>/SxxEyy/frames/frame_0000000042.jpg`
    pub fn locate(&self, episode: &EpisodeRef, frame: u64) -> PathBuf {
        self.episode_dir(episode)
            .join(FRAMES_DIR)
            .join(format!("frame_{:010}.jpg", frame))
    }

    /// `<root>/Season <n>/SxxEyy/video.mkv`
    pub fn video(&self, episode: &EpisodeRef) -> PathBuf {
        self.episode_dir(episode).join(VIDEO_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_paths() {
        let locator = FrameLocator::new("/static");
        let ep: EpisodeRef = "S03E07".parse().unwrap();
        assert_eq!(
            locator.locate(&ep, 42),
            Path::new("/static/Season 3/S03E07/frames/frame_0000000042.jpg")
        );
        assert_eq!(
            locator.locate(&ep, 0),
            Path::new("/static/Season 3/S03E07/frames/frame_0000000000.jpg")
        );
    }

    #[test]
    fn season_folder_is_not_padded() {
        let locator = FrameLocator::new("/static");
        let ep = EpisodeRef::new(12, 1).unwrap();
        assert_eq!(
            locator.video(&ep),
            Path::new("/static/Season 12/S12E01/video.mkv")
        );
    }
}
