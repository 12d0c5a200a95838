//! Source units read from the corpus.

use std::path::{Path, PathBuf};

use crate::prelude::*;

/// One input file to validate. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Where the source was found. Used as its identity in the results.
    pub path: PathBuf,
    /// Raw file content.
    pub content: Vec<u8>,
    /// Extension including the leading dot, empty when the file has none.
    pub extension: String,
}

impl SourceUnit {
    /// Build a unit from content already in memory.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            content: content.into(),
            extension,
        }
    }

    /// Read the unit at `path`.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = tokio::fs::read(&path).await?;
        Ok(Self::new(path, content))
    }

    /// Content decoded as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
