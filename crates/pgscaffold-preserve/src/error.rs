use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors of the preservation engine.
///
/// Per-file problems met while scanning a tree are reported as
/// [`crate::PreservationWarning`] instead.
#[derive(Debug, Error)]
pub enum PreserveError {
    #[error("directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("invalid path for generated file: {0}")]
    InvalidPath(PathBuf),
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PreserveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PreserveError>;
