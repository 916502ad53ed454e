use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

const ARTIFACT_ID_LEN: usize = 12;
const MAX_ARTIFACT_ID_LEN: usize = 64;

/// Database row id of a subtitle line.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtitleId(i64);

impl SubtitleId {
    pub fn new(id: i64) -> SubtitleId {
        SubtitleId(id)
    }
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubtitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ArtifactIdError {
    #[error("artifact id must not be empty")]
    Empty,
    #[error("artifact id is longer than {MAX_ARTIFACT_ID_LEN} characters")]
    TooLong,
    #[error("artifact id {0:?} may only contain ascii letters, digits, '-' and '_'")]
    InvalidCharacter(String),
}

/// Opaque token naming a generated artifact on disk and in its url.
///
/// Fresh ids are random, never sequential. Ids supplied by a caller are
/// restricted to a filename-safe alphabet so they can not escape the output
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn generate() -> ArtifactId {
        let mut s = uuid::Uuid::new_v4().simple().to_string();
        s.truncate(ARTIFACT_ID_LEN);
        ArtifactId(s)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for ArtifactId {
    type Err = ArtifactIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ArtifactIdError::Empty);
        }
        if s.len() > MAX_ARTIFACT_ID_LEN {
            return Err(ArtifactIdError::TooLong);
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ArtifactIdError::InvalidCharacter(s.to_owned()));
        }
        Ok(ArtifactId(s.to_owned()))
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = ArtifactIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_ids_are_short_hex() {
        let id = ArtifactId::generate();
        assert_eq!(id.as_str().len(), ARTIFACT_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_ids_do_not_repeat() {
        let ids = (0..1000)
            .map(|_| ArtifactId::generate())
            .collect::<HashSet<_>>();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn caller_ids_are_checked() {
        assert!("my-meme_01".parse::<ArtifactId>().is_ok());
        assert_eq!("".parse::<ArtifactId>(), Err(ArtifactIdError::Empty));
        assert!(matches!(
            "../etc/passwd".parse::<ArtifactId>(),
            Err(ArtifactIdError::InvalidCharacter(_))
        ));
        assert_eq!(
            "a".repeat(65).parse::<ArtifactId>(),
            Err(ArtifactIdError::TooLong)
        );
    }
}
