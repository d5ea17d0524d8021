use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::block::PreservedBlock;

/// Non-fatal problems met while extracting or restoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum PreservationWarning {
    MarkerMismatch {
        path: String,
        line: usize,
        message: String,
    },
    ProvenanceMismatch {
        path: String,
    },
    MissingTarget {
        path: String,
    },
    OrphanedBlock {
        path: String,
        label: Option<String>,
    },
    Io {
        path: String,
        message: String,
    },
}

impl PreservationWarning {
    pub fn code(&self) -> &'static str {
        match self {
            PreservationWarning::MarkerMismatch { .. } => "marker_mismatch",
            PreservationWarning::ProvenanceMismatch { .. } => "provenance_mismatch",
            PreservationWarning::MissingTarget { .. } => "missing_target",
            PreservationWarning::OrphanedBlock { .. } => "orphaned_block",
            PreservationWarning::Io { .. } => "io",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            PreservationWarning::MarkerMismatch { path, .. }
            | PreservationWarning::ProvenanceMismatch { path }
            | PreservationWarning::MissingTarget { path }
            | PreservationWarning::OrphanedBlock { path, .. }
            | PreservationWarning::Io { path, .. } => path,
        }
    }
}

impl fmt::Display for PreservationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreservationWarning::MarkerMismatch {
                path,
                line,
                message,
            } => write!(f, "{path}:{line}: {message}"),
            PreservationWarning::ProvenanceMismatch { path } => {
                write!(f, "{path}: no provenance header, file left untouched")
            }
            PreservationWarning::MissingTarget { path } => {
                write!(f, "{path}: preserved code has no regenerated file")
            }
            PreservationWarning::OrphanedBlock { path, label } => write!(
                f,
                "{path}: preserved block '{}' has no region in the regenerated file",
                label.as_deref().unwrap_or("<default>")
            ),
            PreservationWarning::Io { path, message } => write!(f, "{path}: {message}"),
        }
    }
}

/// Append a warning and log it as it is recorded.
pub(crate) fn record(warnings: &mut Vec<PreservationWarning>, warning: PreservationWarning) {
    warn!(event = warning.code(), path = %warning.path(), "{warning}");
    warnings.push(warning);
}

/// Result of scanning a previous output tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Preserved blocks keyed by relative file path.
    pub blocks: BTreeMap<String, Vec<PreservedBlock>>,
    pub warnings: Vec<PreservationWarning>,
}

impl Extraction {
    pub fn file_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.values().map(Vec::len).sum()
    }
}

/// Result of splicing preserved blocks into a regenerated tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreReport {
    /// Files whose content changed, relative paths in scan order.
    pub files_updated: Vec<String>,
    /// Files with preserved code that were not written.
    pub skipped: Vec<String>,
    pub warnings: Vec<PreservationWarning>,
}

/// Outcome of a full extract-then-restore cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    pub files_preserved: usize,
    pub blocks_preserved: usize,
    pub files_updated: Vec<String>,
    pub skipped: Vec<String>,
    /// Extraction warnings followed by restoration warnings.
    pub warnings: Vec<PreservationWarning>,
}

impl CycleReport {
    pub fn new(extraction: Extraction, restore: RestoreReport) -> Self {
        let files_preserved = extraction.file_count();
        let blocks_preserved = extraction.block_count();
        let mut warnings = extraction.warnings;
        warnings.extend(restore.warnings);

        Self {
            files_preserved,
            blocks_preserved,
            files_updated: restore.files_updated,
            skipped: restore.skipped,
            warnings,
        }
    }

    pub fn warnings_by_code(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for warning in &self.warnings {
            *counts.entry(warning.code()).or_insert(0) += 1;
        }
        counts
    }
}
