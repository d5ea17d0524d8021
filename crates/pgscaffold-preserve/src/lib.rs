//! Code preservation for regenerated source trees.
//!
//! Generated files carry a provenance header on their first line and
//! START/END marker pairs around regions meant for hand-written code. A
//! regeneration cycle extracts those regions from the previous tree and
//! splices them back into the fresh one.

pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod markers;
pub mod report;
pub mod writer;

pub use block::PreservedBlock;
pub use config::{DEFAULT_TOOL_NAME, PreserveConfig, comment_prefix};
pub use engine::Preserver;
pub use error::{PreserveError, Result};
pub use markers::{MarkerKind, is_generated_file};
pub use report::{CycleReport, Extraction, PreservationWarning, RestoreReport};
pub use writer::{region, render_generated, write_atomic, write_generated};
