use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Hand-written content captured from one region of a generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreservedBlock {
    /// Path relative to the scanned tree, `/`-separated.
    pub file_relative_path: String,
    /// `None` for the unlabeled default region.
    pub block_label: Option<String>,
    /// Exact text between the markers, line endings included.
    pub content: String,
    /// 1-based half-open range of the content lines in the source file.
    pub source_line_range: Range<usize>,
}

impl PreservedBlock {
    pub fn label(&self) -> Option<&str> {
        self.block_label.as_deref()
    }
}
