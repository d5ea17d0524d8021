use thiserror::Error;

/// Core error type shared across pg-scaffold crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A foreign key or column reference points at something that does not exist,
    /// or the catalog violates an entity invariant.
    #[error("schema integrity error: {0}")]
    SchemaIntegrity(String),
    /// A foreign key spans more than one column pair.
    #[error("unsupported schema in table '{table}': {message}")]
    UnsupportedSchema { table: String, message: String },
    /// The catalog document could not be read or decoded.
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias for results returned by pg-scaffold crates.
pub type Result<T> = std::result::Result<T, Error>;
