//! Scratch-directory artifacts.
//!
//! Every artifact gets a fresh UUID v4 file name inside the scratch directory,
//! so any number of concurrently running jobs can write side by side without
//! touching each other's files. Artifacts are never removed by this module.

use std::{
    io,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};
use uuid::Uuid;

/// Writes source content to uniquely named files in a scratch directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// Create a writer for `dir` without touching the filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the scratch directory if it is missing and return a writer for it.
    ///
    /// An existing directory is reused as is, unless `clear` is set in which
    /// case its previous contents are removed first.
    pub async fn prepare(dir: impl Into<PathBuf>, clear: bool) -> io::Result<Self> {
        let dir = dir.into();
        if clear && tokio::fs::try_exists(&dir).await? {
            warn!("Clearing scratch directory {:?}", dir);
            tokio::fs::remove_dir_all(&dir).await?;
        }
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact named after `id`.
    ///
    /// `extension` may be given with or without its leading dot; an empty
    /// extension produces a bare file name.
    pub fn artifact_path(&self, id: Uuid, extension: &str) -> PathBuf {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            self.dir.join(id.to_string())
        } else {
            self.dir.join(format!("{id}.{extension}"))
        }
    }

    /// Write `content` under a freshly generated name and return its path.
    pub async fn write_artifact(&self, content: &[u8], extension: &str) -> io::Result<PathBuf> {
        self.write_artifact_as(Uuid::new_v4(), content, extension)
            .await
    }

    /// Write `content` to the artifact named after `id` and return its path.
    ///
    /// The write has fully completed once this returns.
    pub async fn write_artifact_as(
        &self,
        id: Uuid,
        content: &[u8],
        extension: &str,
    ) -> io::Result<PathBuf> {
        let path = self.artifact_path(id, extension);
        tokio::fs::write(&path, content).await?;
        debug!("Wrote {} bytes to artifact {:?}", content.len(), path);
        Ok(path)
    }
}
