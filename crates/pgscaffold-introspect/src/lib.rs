//! Schema introspection: raw catalog sources, default-value normalization and
//! the relationship resolver that turns catalog facts into an entity graph.

pub mod adapter;
pub mod defaults;
pub mod json;
pub mod options;
pub mod resolver;

pub use adapter::{CatalogSource, InMemoryCatalog};
pub use defaults::parse_default;
pub use json::JsonCatalogSource;
pub use options::{CollisionPolicy, ResolveOptions};
pub use resolver::{Resolver, resolve, resolve_with_options};

pub use pgscaffold_core::EntityGraph;
