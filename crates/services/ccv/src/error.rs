use std::{io, path::PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::error::Error),

    #[error(transparent)]
    Config(#[from] ccv_config::error::Error),

    #[error("Failed to prepare scratch directory {path:?} - {source}")]
    ScratchDir { path: PathBuf, source: io::Error },

    #[error("Failed to read source directory {path:?} - {source}")]
    SourceDir { path: PathBuf, source: io::Error },

    #[error("Failed to write report {path:?} - {source}")]
    Report { path: PathBuf, source: io::Error },
}
