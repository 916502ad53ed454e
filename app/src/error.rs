use std::{io, path::PathBuf};

use veepiac_core::SubtitleId;

use crate::{ffmpeg::TranscodeError, render::FontError, source::SourceError};

/// Every way a generation request can fail.
///
/// `kind()` gives the stable name a caller can switch on, `Display` gives the
/// human readable detail.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("subtitle with id {0} not found")]
    SubtitleNotFound(SubtitleId),
    #[error("frame not found: {0:?}")]
    FrameNotFound(PathBuf),
    #[error("video file not found: {0:?}")]
    VideoNotFound(PathBuf),
    #[error("no frames found between {start} and {end}")]
    NoFramesAvailable { start: u64, end: u64 },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("error creating clip: {0}")]
    TranscodeFailed(#[from] TranscodeError),
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("image processing failed")]
    Image(#[from] image::ImageError),
    #[error("background task failed")]
    Join(#[from] tokio::task::JoinError),
    #[error("subtitle lookup failed")]
    Source(#[from] SourceError),
}

/// Font errors that reach a request come from text the caller asked for.
impl From<FontError> for MediaError {
    fn from(e: FontError) -> MediaError {
        MediaError::invalid(e.to_string())
    }
}

impl MediaError {
    pub(crate) fn io<S: Into<String>>(context: S, source: io::Error) -> MediaError {
        MediaError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid<S: Into<String>>(detail: S) -> MediaError {
        MediaError::InvalidParameter(detail.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::SubtitleNotFound(_) => "SubtitleNotFound",
            MediaError::FrameNotFound(_) => "FrameNotFound",
            MediaError::VideoNotFound(_) => "VideoNotFound",
            MediaError::NoFramesAvailable { .. } => "NoFramesAvailable",
            MediaError::InvalidParameter(_) => "InvalidParameter",
            MediaError::TranscodeFailed(_) => "TranscodeFailed",
            MediaError::Io { .. } | MediaError::Image(_) | MediaError::Join(_) => "IOFailure",
            MediaError::Source(_) => "SourceFailure",
        }
    }
}
