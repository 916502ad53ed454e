use std::fmt;

use crate::MediaError;

/// Output quality bundle shared by gifs and clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GifPreset {
    pub scale: f32,
    pub fps: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipPreset {
    pub width: u32,
    pub crf: u32,
    pub preset: &'static str,
}

impl Quality {
    /// Unknown or missing names are not an error, they mean `medium`.
    pub fn resolve(name: Option<&str>) -> Quality {
        let name = match name {
            Some(n) => n,
            None => return Quality::Medium,
        };
        match name.to_ascii_lowercase().as_str() {
            "low" => Quality::Low,
            "medium" => Quality::Medium,
            "high" => Quality::High,
            _ => {
                log::debug!("unknown quality {:?}, using medium", name);
                Quality::Medium
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
        }
    }

    pub fn gif(self) -> GifPreset {
        match self {
            Quality::Low => GifPreset { scale: 0.5, fps: 8 },
            Quality::Medium => GifPreset {
                scale: 0.75,
                fps: 12,
            },
            Quality::High => GifPreset { scale: 1.0, fps: 20 },
        }
    }

    pub fn clip(self) -> ClipPreset {
        match self {
            Quality::Low => ClipPreset {
                width: 480,
                crf: 28,
                preset: "veryfast",
            },
            Quality::Medium => ClipPreset {
                width: 720,
                crf: 23,
                preset: "medium",
            },
            Quality::High => ClipPreset {
                width: 1080,
                crf: 18,
                preset: "slow",
            },
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Containers that accept the libx264/aac pair we always encode with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClipFormat {
    #[default]
    Mp4,
    Mkv,
    Mov,
}

impl ClipFormat {
    pub fn resolve(name: Option<&str>) -> Result<ClipFormat, MediaError> {
        let name = match name {
            Some(n) => n,
            None => return Ok(ClipFormat::Mp4),
        };
        match name.to_ascii_lowercase().as_str() {
            "mp4" => Ok(ClipFormat::Mp4),
            "mkv" => Ok(ClipFormat::Mkv),
            "mov" => Ok(ClipFormat::Mov),
            _ => Err(MediaError::invalid(format!(
                "unsupported clip format {:?}, expected one of mp4, mkv, mov",
                name
            ))),
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ClipFormat::Mp4 => "mp4",
            ClipFormat::Mkv => "mkv",
            ClipFormat::Mov => "mov",
        }
    }
}
