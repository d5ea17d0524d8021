use pgscaffold_core::{RawCatalog, Result};

/// Trait implemented by anything that can supply raw catalog facts.
///
/// Fetching the catalog is a single blocking call made before resolution.
pub trait CatalogSource {
    /// Short description used in logs (e.g. a file path).
    fn describe(&self) -> String;

    /// Load the catalog document.
    fn load(&self) -> Result<RawCatalog>;
}

/// Catalog already held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    catalog: RawCatalog,
}

impl InMemoryCatalog {
    pub fn new(catalog: RawCatalog) -> Self {
        Self { catalog }
    }
}

impl CatalogSource for InMemoryCatalog {
    fn describe(&self) -> String {
        format!("in-memory catalog ({} tables)", self.catalog.tables.len())
    }

    fn load(&self) -> Result<RawCatalog> {
        Ok(self.catalog.clone())
    }
}
