//! Generation pipeline for pg-scaffold.
//!
//! Resolves a catalog into an entity graph, renders the artifacts of a
//! generator set, and carries hand-written regions of the previous output
//! over into the new tree.

pub mod errors;
pub mod model;
pub mod pipeline;
pub mod render;

pub use errors::{GenerateError, Result};
pub use model::{GenVersion, GenerateOptions, GenerationReport};
pub use pipeline::{GenerationPipeline, GenerationResult};
pub use render::{Artifact, ArtifactKind, Renderer, render_all, renderers_for};
