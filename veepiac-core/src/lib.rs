use serde::{Deserialize, Serialize};

pub use self::{
    episode::EpisodeRef,
    identifiers::{ArtifactId, SubtitleId},
    timestamp::SrtTimestamp,
};

pub mod episode;
pub mod identifiers;
pub mod timestamp;

/// The three families of generated media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Meme,
    Gif,
    Clip,
}

impl MediaKind {
    pub fn name(&self) -> &'static str {
        match self {
            MediaKind::Meme => "meme",
            MediaKind::Gif => "gif",
            MediaKind::Clip => "clip",
        }
    }

    /// The directory (and url path segment) this kind of artifact lives under.
    pub fn directory(&self) -> &'static str {
        match self {
            MediaKind::Meme => "memes",
            MediaKind::Gif => "gifs",
            MediaKind::Clip => "clips",
        }
    }

    pub fn all() -> [MediaKind; 3] {
        [MediaKind::Meme, MediaKind::Gif, MediaKind::Clip]
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything the media generators need to know about a single subtitle line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleContext {
    pub subtitle_id: SubtitleId,
    pub episode: EpisodeRef,
    pub episode_title: Option<String>,
    pub dialogue: String,
    pub start_frame: u64,
    pub end_frame: u64,
    pub timestamp_start: Option<String>,
    pub timestamp_end: Option<String>,
}

impl SubtitleContext {
    pub fn new<S: Into<String>>(
        subtitle_id: SubtitleId,
        episode: EpisodeRef,
        dialogue: S,
        start_frame: u64,
        end_frame: u64,
    ) -> SubtitleContext {
        SubtitleContext {
            subtitle_id,
            episode,
            episode_title: None,
            dialogue: dialogue.into(),
            start_frame,
            end_frame,
            timestamp_start: None,
            timestamp_end: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_directories() {
        let dirs = MediaKind::all()
            .iter()
            .map(|k| k.directory())
            .collect::<Vec<_>>();
        assert_eq!(dirs, vec!["memes", "gifs", "clips"]);
    }

    #[test]
    fn context_serializes_episode_as_code() {
        let ctx = SubtitleContext::new(
            SubtitleId::new(42),
            EpisodeRef::new(3, 7).unwrap(),
            "I'm a real boy",
            100,
            140,
        );
        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["episode"], "S03E07");
        assert_eq!(json["subtitle_id"], 42);
        let back: SubtitleContext = serde_json::from_value(json).unwrap();
        assert_eq!(back, ctx);
    }
}
