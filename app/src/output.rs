use std::{
    fs::File,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::TempPath;
use veepiac_core::{ArtifactId, MediaKind};

use crate::MediaError;

const TMP_PREFIX: &str = ".tmp";

/// Where generated media is written and how it is addressed from outside.
///
/// Files are always written next to their final location and renamed into
/// place, so a reader either sees a complete artifact or nothing.
#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
    base_url: String,
}

impl OutputStore {
    pub fn new<P: Into<PathBuf>>(root: P, base_url: &str) -> OutputStore {
        OutputStore {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(id: &ArtifactId, ext: &str) -> String {
        format!("{}.{}", id.as_str(), ext)
    }

    /// `<root>/<kind>s/<id>.<ext>`
    pub fn path(&self, kind: MediaKind, id: &ArtifactId, ext: &str) -> PathBuf {
        self.root
            .join(kind.directory())
            .join(Self::file_name(id, ext))
    }

    /// `<base url>/<kind>s/<id>.<ext>`
    pub fn url(&self, kind: MediaKind, id: &ArtifactId, ext: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url,
            kind.directory(),
            Self::file_name(id, ext)
        )
    }

    /// The directory for a kind, created if needed.
    pub fn kind_dir(&self, kind: MediaKind) -> Result<PathBuf, MediaError> {
        let dir = self.root.join(kind.directory());
        std::fs::create_dir_all(&dir)
            .map_err(|e| MediaError::io(format!("could not create {:?}", dir), e))?;
        Ok(dir)
    }

    /// Create the output file through `write`, then rename it into place.
    ///
    /// If `write` fails the temp file is removed and the final path is not
    /// touched.
    pub fn write_atomic<F>(
        &self,
        kind: MediaKind,
        id: &ArtifactId,
        ext: &str,
        write: F,
    ) -> Result<PathBuf, MediaError>
    where
        F: FnOnce(&mut File) -> Result<(), MediaError>,
    {
        let mut tmp = self.named_temp(kind, ext)?;
        write(tmp.as_file_mut())?;

        let target = self.path(kind, id, ext);
        tmp.persist(&target)
            .map_err(|e| MediaError::io(format!("could not move output to {:?}", target), e.error))?;
        log::debug!("wrote {:?}", target);
        Ok(target)
    }

    fn named_temp(&self, kind: MediaKind, ext: &str) -> Result<tempfile::NamedTempFile, MediaError> {
        let dir = self.kind_dir(kind)?;
        let suffix = format!(".{}", ext);
        tempfile::Builder::new()
            .prefix(TMP_PREFIX)
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|e| MediaError::io(format!("could not create temp file in {:?}", dir), e))
    }

    /// An empty temp file in the kind directory, for writers that need a path
    /// rather than a handle. Removed on drop unless persisted.
    pub fn temp_path(&self, kind: MediaKind, ext: &str) -> Result<TempPath, MediaError> {
        Ok(self.named_temp(kind, ext)?.into_temp_path())
    }

    /// Rename a finished temp file to its final name.
    pub fn persist(
        &self,
        tmp: TempPath,
        kind: MediaKind,
        id: &ArtifactId,
        ext: &str,
    ) -> Result<PathBuf, MediaError> {
        let target = self.path(kind, id, ext);
        tmp.persist(&target)
            .map_err(|e| MediaError::io(format!("could not move output to {:?}", target), e.error))?;
        log::debug!("wrote {:?}", target);
        Ok(target)
    }
}

/// A generated file, as handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct MediaArtifact {
    pub kind: MediaKind,
    pub id: ArtifactId,
    pub path: PathBuf,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MediaArtifact {
    pub(crate) fn new(
        store: &OutputStore,
        kind: MediaKind,
        id: ArtifactId,
        ext: &str,
        path: PathBuf,
        retention: chrono::Duration,
    ) -> MediaArtifact {
        let created_at = Utc::now();
        MediaArtifact {
            kind,
            url: store.url(kind, &id, ext),
            id,
            path,
            created_at,
            expires_at: created_at + retention,
        }
    }

    pub fn response(&self) -> ArtifactResponse {
        ArtifactResponse {
            id: self.id.clone(),
            url: self.url.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// The public view of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactResponse {
    pub id: ArtifactId,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
