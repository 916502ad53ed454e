use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid timestamp {0:?}, expected HH:MM:SS,mmm")]
pub struct TimestampError(String);

/// A subtitle style timestamp (`HH:MM:SS,mmm`).
///
/// Parsing also accepts a `.` before the milliseconds. The only
/// transformation applied is the separator: no range checks are made between
/// two timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrtTimestamp {
    hms: String,
    millis: String,
}

impl SrtTimestamp {
    /// Format with a `.` millisecond separator, as ffmpeg expects.
    pub fn ffmpeg(&self) -> String {
        format!("{}.{}", self.hms, self.millis)
    }
}

impl fmt::Display for SrtTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.hms, self.millis)
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for SrtTimestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TimestampError(s.to_owned());
        let (hms, millis) = s
            .split_once(|c: char| c == ',' || c == '.')
            .ok_or_else(invalid)?;
        if millis.len() != 3 || !all_digits(millis) {
            return Err(invalid());
        }
        let parts = hms.split(':').collect::<Vec<_>>();
        match parts.as_slice() {
            [h, m, sec] if h.len() >= 2 && m.len() == 2 && sec.len() == 2 => {
                if !(all_digits(h) && all_digits(m) && all_digits(sec)) {
                    return Err(invalid());
                }
            }
            _ => return Err(invalid()),
        }
        Ok(SrtTimestamp {
            hms: hms.to_owned(),
            millis: millis.to_owned(),
        })
    }
}
