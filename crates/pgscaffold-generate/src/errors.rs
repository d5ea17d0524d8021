use std::path::PathBuf;

use thiserror::Error;

/// Errors emitted by the generation pipeline.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Schema(#[from] pgscaffold_core::Error),
    #[error(transparent)]
    Preserve(#[from] pgscaffold_preserve::PreserveError),
    #[error("unknown generator set: {0}")]
    UnknownVersion(String),
    #[error("two artifacts render to the same path: {0}")]
    DuplicateArtifact(String),
    #[error("invalid output directory: {0}")]
    InvalidOutput(PathBuf),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
