use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use pgscaffold_core::EntityGraph;
use pgscaffold_introspect::{CatalogSource, resolve_with_options};
use pgscaffold_preserve::{
    CycleReport, Extraction, PreservationWarning, Preserver, write_atomic,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::{GenerateError, Result};
use crate::model::{GenerateOptions, GenerationReport};
use crate::render::{Artifact, ArtifactKind, display_path, owned_dirs, render_all};

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub output_dir: PathBuf,
    pub report: GenerationReport,
}

/// Regenerate-and-restore cycle over one output directory.
///
/// The previous tree is read before anything is written. Only its
/// hand-written files are carried over; every generated file is rendered
/// from scratch. New content is assembled in a sibling staging directory that replaces the output
/// directory only once every step succeeded; on failure the staging
/// directory is removed and the previous tree is left as it was.
#[derive(Debug, Clone)]
pub struct GenerationPipeline {
    options: GenerateOptions,
}

impl GenerationPipeline {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Load, resolve and generate. Resolution errors abort before any file
    /// is touched.
    pub fn run(&self, source: &dyn CatalogSource) -> Result<GenerationResult> {
        let catalog = source.load()?;
        info!(
            event = "catalog_loaded",
            source = %source.describe(),
            tables = catalog.tables.len()
        );
        let graph = resolve_with_options(&catalog, self.options.resolve.clone())?;
        self.run_graph(&graph)
    }

    pub fn run_graph(&self, graph: &EntityGraph) -> Result<GenerationResult> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let output_dir = self.options.output_dir.clone();
        let (parent, name) = split_output(&output_dir)?;

        let artifacts = render_all(self.options.gen_version, graph)?;
        check_unique_paths(&artifacts)?;

        let preserver = Preserver::new(self.options.preserve.clone());
        let extraction = preserver.extract(&output_dir)?;

        let mut report =
            GenerationReport::new(run_id.clone(), self.options.gen_version, output_dir.clone());
        report.entities = graph.len();
        report.relationship_edges = graph.edge_count();

        info!(
            event = "generation_started",
            run_id = %run_id,
            gen_version = %self.options.gen_version,
            output_dir = %output_dir.display(),
            artifacts = artifacts.len()
        );

        fs::create_dir_all(&parent).map_err(|err| GenerateError::io(&parent, err))?;
        let staging = parent.join(format!(".{name}.staging-{run_id}"));
        let backup = parent.join(format!(".{name}.previous-{run_id}"));

        let owned = owned_dirs(self.options.gen_version);
        let outcome = stage(
            &preserver,
            &staging,
            &output_dir,
            &owned,
            &artifacts,
            extraction,
            &mut report,
        )
        .and_then(|()| swap(&staging, &output_dir, &backup));

        if let Err(err) = outcome {
            if staging.exists() {
                if let Err(cleanup) = fs::remove_dir_all(&staging) {
                    warn!(
                        event = "staging_cleanup_failed",
                        path = %staging.display(),
                        error = %cleanup
                    );
                }
            }
            warn!(event = "generation_failed", run_id = %run_id, error = %err);
            return Err(err);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(
            event = "generation_completed",
            run_id = %run_id,
            files_written = report.files_written.len(),
            files_restored = report.files_restored.len(),
            skipped = report.skipped.len(),
            warnings = report.warnings.len(),
            duration_ms = report.duration_ms
        );

        Ok(GenerationResult { output_dir, report })
    }
}

fn split_output(output_dir: &Path) -> Result<(PathBuf, String)> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(GenerateError::InvalidOutput(output_dir.to_path_buf()));
    }
    let name = output_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| GenerateError::InvalidOutput(output_dir.to_path_buf()))?;
    let parent = match output_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((parent, name))
}

fn check_unique_paths(artifacts: &[Artifact]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for artifact in artifacts {
        if !seen.insert(artifact.relative_path.as_path()) {
            return Err(GenerateError::DuplicateArtifact(artifact.display_path()));
        }
    }
    Ok(())
}

/// Build the complete next tree inside `staging`.
fn stage(
    preserver: &Preserver,
    staging: &Path,
    output_dir: &Path,
    owned: &[PathBuf],
    artifacts: &[Artifact],
    extraction: Extraction,
    report: &mut GenerationReport,
) -> Result<()> {
    fs::create_dir_all(staging).map_err(|err| GenerateError::io(staging, err))?;
    if output_dir.is_dir() {
        carry_handwritten(preserver, output_dir, staging, owned)?;
    }

    for artifact in artifacts {
        let destination = staging.join(&artifact.relative_path);
        let relative = artifact.display_path();

        match artifact.kind {
            ArtifactKind::Source => {
                if is_handwritten(preserver, &destination) {
                    report.record_warning(PreservationWarning::ProvenanceMismatch {
                        path: relative.clone(),
                    });
                    warn!(event = "artifact_protected", path = %relative);
                    report.files_protected.push(relative);
                    continue;
                }
                preserver.write_generated(&artifact.body, &destination)?;
            }
            ArtifactKind::Data => write_atomic(&destination, artifact.body.as_bytes())?,
        }
        debug!(event = "artifact_written", path = %relative);
        report.files_written.push(relative);
    }

    let restore = preserver.restore(staging, &extraction.blocks)?;
    report.record_cycle(CycleReport::new(extraction, restore));
    Ok(())
}

/// An existing file at `path` without the provenance header.
fn is_handwritten(preserver: &Preserver, path: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match fs::read_to_string(path) {
        Ok(content) => !preserver.is_generated_file(&content),
        Err(_) => true,
    }
}

/// Copy the files of `from` that the generator does not own into `to`.
/// Header-stamped files and everything under `owned` stay behind.
fn carry_handwritten(
    preserver: &Preserver,
    from: &Path,
    to: &Path,
    owned: &[PathBuf],
) -> Result<()> {
    let walker = WalkDir::new(from)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
            !owned.iter().any(|dir| relative.starts_with(dir))
        });

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(from).to_path_buf();
            GenerateError::io(path, err.into())
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|err| GenerateError::io(&target, err))?;
        } else if entry.file_type().is_file() {
            if is_generated(preserver, entry.path()) {
                debug!(event = "stale_generated_dropped", path = %display_path(relative));
                continue;
            }
            fs::copy(entry.path(), &target).map_err(|err| GenerateError::io(entry.path(), err))?;
        } else {
            debug!(
                event = "copy_skipped",
                path = %display_path(relative)
            );
        }
    }
    Ok(())
}

fn is_generated(preserver: &Preserver, path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|content| preserver.is_generated_file(&content))
        .unwrap_or(false)
}

/// Move `staging` over `output_dir`, keeping the previous tree until the
/// new one is in place.
fn swap(staging: &Path, output_dir: &Path, backup: &Path) -> Result<()> {
    let had_previous = output_dir.exists();
    if had_previous {
        fs::rename(output_dir, backup).map_err(|err| GenerateError::io(output_dir, err))?;
    }

    if let Err(err) = fs::rename(staging, output_dir) {
        if had_previous {
            if let Err(restore) = fs::rename(backup, output_dir) {
                warn!(
                    event = "previous_tree_restore_failed",
                    path = %backup.display(),
                    error = %restore
                );
            }
        }
        return Err(GenerateError::io(output_dir, err));
    }

    if had_previous {
        if let Err(err) = fs::remove_dir_all(backup) {
            warn!(event = "previous_tree_cleanup_failed", path = %backup.display(), error = %err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_must_name_a_directory() {
        assert!(matches!(
            split_output(Path::new("/")),
            Err(GenerateError::InvalidOutput(_))
        ));
        let (parent, name) = split_output(Path::new("generated")).expect("relative");
        assert_eq!(parent, PathBuf::from("."));
        assert_eq!(name, "generated");
    }

    #[test]
    fn duplicate_artifact_paths_are_rejected() {
        let artifacts = vec![
            Artifact::source("app/models/user.py", String::new()),
            Artifact::source("app/models/user.py", String::new()),
        ];
        assert!(matches!(
            check_unique_paths(&artifacts),
            Err(GenerateError::DuplicateArtifact(path)) if path == "app/models/user.py"
        ));
    }
}
