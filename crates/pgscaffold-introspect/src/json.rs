use std::fs;
use std::path::{Path, PathBuf};

use pgscaffold_core::{Error, RawCatalog, Result};

use crate::adapter::CatalogSource;

/// Catalog source backed by a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    path: PathBuf,
}

impl JsonCatalogSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonCatalogSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RawCatalog> {
        let contents = fs::read_to_string(&self.path).map_err(|err| {
            Error::Catalog(format!("failed to read {}: {err}", self.path.display()))
        })?;
        serde_json::from_str(&contents).map_err(|err| {
            Error::Catalog(format!("failed to decode {}: {err}", self.path.display()))
        })
    }
}
