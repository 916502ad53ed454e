use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const MAX_EPISODE_NUMBER: u32 = 99;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EpisodeError {
    #[error("season and episode must be between 1 and {MAX_EPISODE_NUMBER}, got season={0} episode={1}")]
    OutOfRange(u32, u32),
    #[error("invalid episode code: {0:?}")]
    InvalidCode(String),
}

/// A season/episode pair, written canonically as `SxxEyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EpisodeRef {
    season: u32,
    episode: u32,
}

impl EpisodeRef {
    pub fn new(season: u32, episode: u32) -> Result<EpisodeRef, EpisodeError> {
        let valid = 1..=MAX_EPISODE_NUMBER;
        if !valid.contains(&season) || !valid.contains(&episode) {
            return Err(EpisodeError::OutOfRange(season, episode));
        }
        Ok(EpisodeRef { season, episode })
    }

    pub fn season(&self) -> u32 {
        self.season
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{:02}E{:02}", self.season, self.episode)
    }
}

impl FromStr for EpisodeRef {
    type Err = EpisodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EpisodeError::InvalidCode(s.to_owned());
        let bytes = s.as_bytes();
        if bytes.len() != 6
            || !bytes[0].eq_ignore_ascii_case(&b'S')
            || !bytes[3].eq_ignore_ascii_case(&b'E')
        {
            return Err(invalid());
        }
        let number = |digits: &str| -> Result<u32, EpisodeError> {
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            digits.parse().map_err(|_| invalid())
        };
        EpisodeRef::new(number(&s[1..3])?, number(&s[4..6])?)
    }
}

impl TryFrom<String> for EpisodeRef {
    type Error = EpisodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EpisodeRef> for String {
    fn from(e: EpisodeRef) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_zero_padded() {
        let e = EpisodeRef::new(1, 9).unwrap();
        assert_eq!(e.code(), "S01E09");
        assert_eq!(EpisodeRef::new(12, 22).unwrap().code(), "S12E22");
    }

    #[test]
    fn parse_code() {
        let e: EpisodeRef = "S04E11".parse().unwrap();
        assert_eq!((e.season(), e.episode()), (4, 11));
        let lower: EpisodeRef = "s04e11".parse().unwrap();
        assert_eq!(lower, e);
    }

    #[test]
    fn reject_bad_codes() {
        for code in ["S4E11", "S04E1x", "X04E11", "S04E00", "S+4E11", ""] {
            assert!(code.parse::<EpisodeRef>().is_err(), "{code:?} should fail");
        }
    }

    #[test]
    fn reject_zero_season() {
        assert_eq!(EpisodeRef::new(0, 1), Err(EpisodeError::OutOfRange(0, 1)));
        assert!(EpisodeRef::new(100, 1).is_err());
    }
}
