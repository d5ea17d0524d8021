//! Core contracts and helpers for pg-scaffold.
//!
//! This crate defines the raw catalog contract, the normalized entity graph,
//! table-name normalization, and the error taxonomy shared by the resolver,
//! the generators and the CLI.

pub mod catalog;
pub mod defaults;
pub mod entity;
pub mod error;
pub mod naming;
pub mod relationship;

pub use catalog::{RawCatalog, RawColumn, RawForeignKey, RawIndex, RawTable, RawUniqueConstraint};
pub use defaults::DefaultValue;
pub use entity::{Column, Entity, EntityGraph};
pub use error::{Error, Result};
pub use naming::{EnglishInflector, Inflector, Naming};
pub use relationship::{Cardinality, ForwardEdge, RelationshipEdge, ReverseEdge};
