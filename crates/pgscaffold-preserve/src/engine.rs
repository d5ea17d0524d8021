use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::block::PreservedBlock;
use crate::config::PreserveConfig;
use crate::error::{PreserveError, Result};
use crate::markers::{self, Scan};
use crate::report::{CycleReport, Extraction, PreservationWarning, RestoreReport, record};
use crate::writer;

/// Extracts hand-written regions from a previous output tree and splices them
/// into a regenerated one.
#[derive(Debug, Clone, Default)]
pub struct Preserver {
    config: PreserveConfig,
}

impl Preserver {
    pub fn new(config: PreserveConfig) -> Self {
        Self { config }
    }

    pub fn is_generated_file(&self, content: &str) -> bool {
        markers::is_generated_file(content, &self.config.tool_name)
    }

    pub fn write_generated(&self, body: &str, destination: &Path) -> Result<()> {
        writer::write_generated(body, destination, &self.config.tool_name)
    }

    /// Collect every closed region from generated files under `tree`.
    ///
    /// A missing tree is a first generation and yields an empty extraction.
    pub fn extract(&self, tree: &Path) -> Result<Extraction> {
        let mut extraction = Extraction::default();
        if !tree.is_dir() {
            debug!(event = "preserve_source_missing", path = %tree.display());
            return Ok(extraction);
        }

        for (path, relative) in self.source_files(tree, &mut extraction.warnings) {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    record(
                        &mut extraction.warnings,
                        PreservationWarning::Io {
                            path: relative,
                            message: err.to_string(),
                        },
                    );
                    continue;
                }
            };

            if !self.is_generated_file(&content) {
                debug!(event = "preserve_skip_unmarked", path = %relative);
                continue;
            }

            let lines: Vec<&str> = content.split_inclusive('\n').collect();
            let scan = markers::scan(lines.iter().copied());
            report_issues(&scan, &relative, &mut extraction.warnings);

            let blocks: Vec<PreservedBlock> = scan
                .regions
                .iter()
                .map(|region| {
                    let range = region.content_lines();
                    PreservedBlock {
                        file_relative_path: relative.clone(),
                        block_label: region.label.clone(),
                        content: lines[range.start - 1..range.end - 1].concat(),
                        source_line_range: range,
                    }
                })
                .collect();

            if !blocks.is_empty() {
                debug!(event = "preserve_extracted", path = %relative, blocks = blocks.len());
                extraction.blocks.insert(relative, blocks);
            }
        }

        info!(
            event = "preserve_extract_done",
            path = %tree.display(),
            files = extraction.file_count(),
            blocks = extraction.block_count(),
            warnings = extraction.warnings.len()
        );
        Ok(extraction)
    }

    /// Splice preserved blocks into the generated files under `tree`.
    ///
    /// Files are rewritten only when their content changes.
    pub fn restore(
        &self,
        tree: &Path,
        blocks: &BTreeMap<String, Vec<PreservedBlock>>,
    ) -> Result<RestoreReport> {
        if !tree.is_dir() {
            return Err(PreserveError::MissingDirectory(tree.to_path_buf()));
        }

        let mut report = RestoreReport::default();
        let mut seen = BTreeSet::new();

        for (path, relative) in self.source_files(tree, &mut report.warnings) {
            let Some(preserved) = blocks.get(&relative) else {
                continue;
            };
            seen.insert(relative.clone());

            match self.restore_file(&path, &relative, preserved, &mut report.warnings) {
                Ok(true) => {
                    debug!(event = "preserve_restored", path = %relative);
                    report.files_updated.push(relative);
                }
                Ok(false) => {}
                Err(skip) => {
                    record(&mut report.warnings, skip);
                    report.skipped.push(relative);
                }
            }
        }

        for relative in blocks.keys().filter(|key| !seen.contains(*key)) {
            record(
                &mut report.warnings,
                PreservationWarning::MissingTarget {
                    path: relative.clone(),
                },
            );
            report.skipped.push(relative.clone());
        }

        info!(
            event = "preserve_restore_done",
            path = %tree.display(),
            updated = report.files_updated.len(),
            skipped = report.skipped.len(),
            warnings = report.warnings.len()
        );
        Ok(report)
    }

    /// Extract from `previous`, then restore into `regenerated`.
    pub fn preserve_and_restore(&self, previous: &Path, regenerated: &Path) -> Result<CycleReport> {
        let mut extraction = self.extract(previous)?;
        let blocks = std::mem::take(&mut extraction.blocks);
        let restore = self.restore(regenerated, &blocks)?;
        extraction.blocks = blocks;
        Ok(CycleReport::new(extraction, restore))
    }

    /// `Ok(true)` when the file was rewritten; `Err` carries the reason it
    /// was skipped.
    fn restore_file(
        &self,
        path: &Path,
        relative: &str,
        preserved: &[PreservedBlock],
        warnings: &mut Vec<PreservationWarning>,
    ) -> std::result::Result<bool, PreservationWarning> {
        let content = fs::read_to_string(path).map_err(|err| PreservationWarning::Io {
            path: relative.to_string(),
            message: err.to_string(),
        })?;

        if !self.is_generated_file(&content) {
            return Err(PreservationWarning::ProvenanceMismatch {
                path: relative.to_string(),
            });
        }

        let updated = splice(&content, relative, preserved, warnings);
        if updated == content {
            return Ok(false);
        }

        writer::write_atomic(path, updated.as_bytes()).map_err(|err| PreservationWarning::Io {
            path: relative.to_string(),
            message: err.to_string(),
        })?;
        Ok(true)
    }

    /// Allowed files under `root` in sorted order, with `/`-separated
    /// relative paths.
    fn source_files(
        &self,
        root: &Path,
        warnings: &mut Vec<PreservationWarning>,
    ) -> Vec<(PathBuf, String)> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|path| relative_key(root, path))
                        .unwrap_or_default();
                    record(
                        warnings,
                        PreservationWarning::Io {
                            path,
                            message: err.to_string(),
                        },
                    );
                    continue;
                }
            };

            if entry.file_type().is_file() && self.config.handles(entry.path()) {
                let relative = relative_key(root, entry.path());
                files.push((entry.into_path(), relative));
            }
        }

        files
    }
}

fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn report_issues(scan: &Scan, relative: &str, warnings: &mut Vec<PreservationWarning>) {
    for issue in &scan.issues {
        record(
            warnings,
            PreservationWarning::MarkerMismatch {
                path: relative.to_string(),
                line: issue.line(),
                message: issue.describe(),
            },
        );
    }
}

/// Replace the text between each region's markers with the preserved block
/// of the same label. Marker lines are kept verbatim.
fn splice(
    content: &str,
    relative: &str,
    preserved: &[PreservedBlock],
    warnings: &mut Vec<PreservationWarning>,
) -> String {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let scan = markers::scan(lines.iter().copied());
    report_issues(&scan, relative, warnings);

    // 0-based index of the first content line -> (index of the END line, replacement)
    let mut replacements: BTreeMap<usize, (usize, &str)> = BTreeMap::new();
    for block in preserved {
        match scan.region(block.label()) {
            Some(region) => {
                replacements.insert(region.start_line, (region.end_line - 1, block.content.as_str()));
            }
            None => record(
                warnings,
                PreservationWarning::OrphanedBlock {
                    path: relative.to_string(),
                    label: block.block_label.clone(),
                },
            ),
        }
    }

    let mut out = String::with_capacity(content.len());
    let mut idx = 0;
    while idx < lines.len() {
        if let Some(&(end, replacement)) = replacements.get(&idx) {
            out.push_str(replacement);
            out.push_str(lines[end]);
            idx = end + 1;
            continue;
        }
        out.push_str(lines[idx]);
        idx += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(label: Option<&str>, content: &str) -> PreservedBlock {
        PreservedBlock {
            file_relative_path: "m.py".to_string(),
            block_label: label.map(str::to_string),
            content: content.to_string(),
            source_line_range: 1..1,
        }
    }

    #[test]
    fn splice_replaces_only_matching_labels() {
        let fresh = "\
# Generated by pg-scaffold t
# -- Preserve Custom code START: imports --
# -- Preserve Custom code END: imports --
class M: ...
# -- Preserve Custom code START --
# -- Preserve Custom code END --
";
        let mut warnings = Vec::new();
        let out = splice(
            fresh,
            "m.py",
            &[
                block(None, "def extra():\n    return 1\n"),
                block(Some("validators"), "x\n"),
            ],
            &mut warnings,
        );

        assert_eq!(
            out,
            "\
# Generated by pg-scaffold t
# -- Preserve Custom code START: imports --
# -- Preserve Custom code END: imports --
class M: ...
# -- Preserve Custom code START --
def extra():
    return 1
# -- Preserve Custom code END --
"
        );
        assert_eq!(
            warnings,
            vec![PreservationWarning::OrphanedBlock {
                path: "m.py".to_string(),
                label: Some("validators".to_string())
            }]
        );
    }

    #[test]
    fn splice_without_trailing_newline_keeps_end_marker() {
        let fresh = "# h\n# -- Preserve Custom code START --\nold\n# -- Preserve Custom code END --";
        let mut warnings = Vec::new();
        let out = splice(fresh, "m.py", &[block(None, "new\n")], &mut warnings);
        assert_eq!(
            out,
            "# h\n# -- Preserve Custom code START --\nnew\n# -- Preserve Custom code END --"
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn relative_keys_use_forward_slashes() {
        let root = Path::new("/out");
        assert_eq!(
            relative_key(root, &root.join("app").join("models").join("user.py")),
            "app/models/user.py"
        );
    }
}
