use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use pgscaffold_introspect::ResolveOptions;
use pgscaffold_preserve::{CycleReport, PreservationWarning, PreserveConfig};
use serde::{Deserialize, Serialize};

use crate::errors::GenerateError;

/// Versioned set of renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenVersion {
    /// Schema documents plus SQLAlchemy-style models.
    #[default]
    V1,
    /// Everything in `v1` plus TypeScript interfaces.
    V2,
}

impl GenVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            GenVersion::V1 => "v1",
            GenVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for GenVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenVersion {
    type Err = GenerateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(GenVersion::V1),
            "v2" | "2" => Ok(GenVersion::V2),
            other => Err(GenerateError::UnknownVersion(other.to_string())),
        }
    }
}

/// Options for the generation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Directory that receives the generated tree.
    pub output_dir: PathBuf,
    pub gen_version: GenVersion,
    pub preserve: PreserveConfig,
    pub resolve: ResolveOptions,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated"),
            gen_version: GenVersion::default(),
            preserve: PreserveConfig::default(),
            resolve: ResolveOptions::default(),
        }
    }
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub gen_version: GenVersion,
    pub output_dir: PathBuf,
    pub entities: usize,
    pub relationship_edges: usize,
    /// Files written by the renderers, relative to the output directory.
    pub files_written: Vec<String>,
    /// Rendered files not written because a hand-written file holds the path.
    pub files_protected: Vec<String>,
    pub files_preserved: usize,
    pub blocks_preserved: usize,
    pub files_restored: Vec<String>,
    pub skipped: Vec<String>,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<PreservationWarning>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, gen_version: GenVersion, output_dir: PathBuf) -> Self {
        Self {
            run_id,
            gen_version,
            output_dir,
            entities: 0,
            relationship_edges: 0,
            files_written: Vec::new(),
            files_protected: Vec::new(),
            files_preserved: 0,
            blocks_preserved: 0,
            files_restored: Vec::new(),
            skipped: Vec::new(),
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
            duration_ms: 0,
        }
    }

    pub fn record_warning(&mut self, warning: PreservationWarning) {
        *self
            .warnings_by_code
            .entry(warning.code().to_string())
            .or_insert(0) += 1;
        self.warnings.push(warning);
    }

    pub fn record_cycle(&mut self, cycle: CycleReport) {
        self.files_preserved = cycle.files_preserved;
        self.blocks_preserved = cycle.blocks_preserved;
        self.files_restored = cycle.files_updated;
        self.skipped.extend(cycle.skipped);
        for warning in cycle.warnings {
            self.record_warning(warning);
        }
    }
}
