//! Marker and provenance-header recognition plus the region scanner.
//!
//! Recognition is case-insensitive and accepts `#`, `//` and `--` as the
//! comment prefix regardless of file type, along with the older
//! `#-- ... --#` marker form.

use std::sync::OnceLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
}

impl MarkerKind {
    fn keyword(self) -> &'static str {
        match self {
            MarkerKind::Start => "START",
            MarkerKind::End => "END",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub label: Option<String>,
}

fn marker_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"(?i)^\s*(?:#|//|--)\s*#?--\s*preserve\s+custom\s+code\s+(?P<kind>start|end)(?:\s*:\s*(?P<label>[a-z0-9_.\-]+(?:\s+[a-z0-9_.\-]+)*?))?\s*--#?\s*$",
            )
            .ok()
        })
        .as_ref()
}

fn header_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)^\s*(?:#|//|--)\s*#?\s*generated\s+by\s+(?P<tool>\S+)").ok()
        })
        .as_ref()
}

/// Parse one line as a preservation marker.
pub fn parse_marker(line: &str) -> Option<Marker> {
    let captures = marker_pattern()?.captures(line)?;
    let kind = if captures["kind"].eq_ignore_ascii_case("start") {
        MarkerKind::Start
    } else {
        MarkerKind::End
    };
    // Inner whitespace runs collapse so `my  block` and `my block` pair up.
    let label = captures
        .name("label")
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "));
    Some(Marker { kind, label })
}

/// Tool name recorded in a provenance header line, if the line is one.
pub fn header_tool(line: &str) -> Option<&str> {
    header_pattern()?
        .captures(line)?
        .name("tool")
        .map(|m| m.as_str())
}

/// True when the first line of `content` is a provenance header naming `tool_name`.
pub fn is_generated_file(content: &str, tool_name: &str) -> bool {
    content
        .lines()
        .next()
        .and_then(header_tool)
        .is_some_and(|tool| tool == tool_name)
}

pub fn marker_line(prefix: &str, kind: MarkerKind, label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{prefix} -- Preserve Custom code {}: {label} --", kind.keyword()),
        None => format!("{prefix} -- Preserve Custom code {} --", kind.keyword()),
    }
}

/// A complete START/END pair. Line numbers are 1-based and point at the
/// marker lines themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub label: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
}

impl Region {
    /// 1-based half-open range of the content lines between the markers.
    pub fn content_lines(&self) -> std::ops::Range<usize> {
        self.start_line + 1..self.end_line
    }
}

/// Marker problems found while scanning. None of them stop the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIssue {
    Unterminated { label: Option<String>, line: usize },
    StrayEnd { label: Option<String>, line: usize },
    MismatchedEnd {
        open: Option<String>,
        found: Option<String>,
        line: usize,
    },
}

impl ScanIssue {
    pub fn line(&self) -> usize {
        match self {
            ScanIssue::Unterminated { line, .. }
            | ScanIssue::StrayEnd { line, .. }
            | ScanIssue::MismatchedEnd { line, .. } => *line,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ScanIssue::Unterminated { label, line } => {
                format!("START{} at line {line} has no END", label_suffix(label))
            }
            ScanIssue::StrayEnd { label, line } => {
                format!("END{} at line {line} has no START", label_suffix(label))
            }
            ScanIssue::MismatchedEnd { open, found, line } => format!(
                "END{} at line {line} does not close the open START{}",
                label_suffix(found),
                label_suffix(open)
            ),
        }
    }
}

fn label_suffix(label: &Option<String>) -> String {
    label
        .as_deref()
        .map(|label| format!(" '{label}'"))
        .unwrap_or_default()
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Scan {
    /// Closed regions in file order, first occurrence of each label only.
    pub regions: Vec<Region>,
    pub issues: Vec<ScanIssue>,
}

impl Scan {
    pub fn region(&self, label: Option<&str>) -> Option<&Region> {
        self.regions
            .iter()
            .find(|region| region.label.as_deref() == label)
    }
}

#[derive(Debug)]
enum State {
    Outside,
    Inside {
        label: Option<String>,
        start_line: usize,
    },
}

/// Run the marker state machine over `lines`.
pub fn scan<'a>(lines: impl IntoIterator<Item = &'a str>) -> Scan {
    let mut scan = Scan::default();
    let mut state = State::Outside;

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let Some(marker) = parse_marker(line) else {
            continue;
        };

        state = match (state, marker.kind) {
            (State::Outside, MarkerKind::Start) => State::Inside {
                label: marker.label,
                start_line: line_no,
            },
            (State::Outside, MarkerKind::End) => {
                scan.issues.push(ScanIssue::StrayEnd {
                    label: marker.label,
                    line: line_no,
                });
                State::Outside
            }
            (State::Inside { label, start_line }, MarkerKind::Start) => {
                scan.issues.push(ScanIssue::Unterminated {
                    label,
                    line: start_line,
                });
                State::Inside {
                    label: marker.label,
                    start_line: line_no,
                }
            }
            (State::Inside { label, start_line }, MarkerKind::End) if label == marker.label => {
                if scan.region(label.as_deref()).is_none() {
                    scan.regions.push(Region {
                        label,
                        start_line,
                        end_line: line_no,
                    });
                }
                State::Outside
            }
            (State::Inside { label, start_line }, MarkerKind::End) => {
                scan.issues.push(ScanIssue::MismatchedEnd {
                    open: label.clone(),
                    found: marker.label,
                    line: line_no,
                });
                State::Inside { label, start_line }
            }
        };
    }

    if let State::Inside { label, start_line } = state {
        scan.issues.push(ScanIssue::Unterminated {
            label,
            line: start_line,
        });
    }

    scan
}

/// True when any line of `body` is a START marker.
pub fn has_start_marker(body: &str) -> bool {
    body.lines()
        .filter_map(parse_marker)
        .any(|marker| marker.kind == MarkerKind::Start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_current_and_legacy_markers() {
        let legacy = parse_marker("# #-- Preserve Custom code START --#").expect("legacy start");
        assert_eq!(legacy.kind, MarkerKind::Start);
        assert_eq!(legacy.label, None);

        let legacy_end = parse_marker("// #-- Preserve Custom code END   --#\r").expect("legacy end");
        assert_eq!(legacy_end.kind, MarkerKind::End);

        let labeled = parse_marker("  -- -- preserve custom code start: seed-data --").expect("sql");
        assert_eq!(labeled.label.as_deref(), Some("seed-data"));

        assert_eq!(
            parse_marker(&marker_line("#", MarkerKind::End, Some("imports"))),
            Some(Marker {
                kind: MarkerKind::End,
                label: Some("imports".to_string())
            })
        );
        assert!(parse_marker("# Preserve Custom code START").is_none());
        assert!(parse_marker("x = 1  # -- Preserve Custom code START --").is_none());
    }

    #[test]
    fn labels_may_contain_spaces() {
        let start = parse_marker("# -- Preserve Custom code START: my block --").expect("start");
        assert_eq!(start.label.as_deref(), Some("my block"));

        let end = parse_marker("#-- Preserve Custom code END: my   block --#").expect("end");
        assert_eq!(end.label.as_deref(), Some("my block"));

        let scan = scan([
            "# -- Preserve Custom code START: my block --\n",
            "x = 1\n",
            "# -- Preserve Custom code END: my  block --\n",
        ]);
        assert!(scan.issues.is_empty());
        assert_eq!(scan.region(Some("my block")).map(|r| r.start_line), Some(1));
    }

    #[test]
    fn header_names_the_tool() {
        assert_eq!(
            header_tool("# Generated by pg-scaffold 2026-01-02T03:04:05Z"),
            Some("pg-scaffold")
        );
        assert_eq!(
            header_tool("// # Generated by pg-scaffolding 2024-05-01 10:00:00"),
            Some("pg-scaffolding")
        );
        assert!(is_generated_file("# Generated by pg-scaffold now\nx = 1\n", "pg-scaffold"));
        assert!(!is_generated_file("x = 1\n# Generated by pg-scaffold now\n", "pg-scaffold"));
        assert!(!is_generated_file("# Generated by other-tool now\n", "pg-scaffold"));
    }

    #[test]
    fn scans_labeled_regions_in_order() {
        let text = "\
# -- Preserve Custom code START: imports --
import os
# -- Preserve Custom code END: imports --
body
# -- Preserve Custom code START --
# -- Preserve Custom code END --
";
        let scan = scan(text.lines());
        assert!(scan.issues.is_empty());
        assert_eq!(scan.regions.len(), 2);
        assert_eq!(scan.regions[0].label.as_deref(), Some("imports"));
        assert_eq!(scan.regions[0].content_lines(), 2..3);
        assert_eq!(scan.regions[1].label, None);
        assert_eq!(scan.regions[1].content_lines(), 6..6);
    }

    #[test]
    fn unmatched_markers_are_issues_not_regions() {
        let text = "\
# -- Preserve Custom code END --
# -- Preserve Custom code START: a --
kept
# -- Preserve Custom code END: b --
# -- Preserve Custom code START: c --
";
        let scan = scan(text.lines());
        assert!(scan.regions.is_empty());
        assert_eq!(
            scan.issues,
            vec![
                ScanIssue::StrayEnd { label: None, line: 1 },
                ScanIssue::MismatchedEnd {
                    open: Some("a".to_string()),
                    found: Some("b".to_string()),
                    line: 4
                },
                ScanIssue::Unterminated {
                    label: Some("a".to_string()),
                    line: 2
                },
                ScanIssue::Unterminated {
                    label: Some("c".to_string()),
                    line: 5
                },
            ]
        );
    }

    #[test]
    fn later_regions_with_the_same_label_are_ignored() {
        let text = "\
# -- Preserve Custom code START --
first
# -- Preserve Custom code END --
# -- Preserve Custom code START --
second
# -- Preserve Custom code END --
";
        let scan = scan(text.lines());
        assert_eq!(scan.regions.len(), 1);
        assert_eq!(scan.regions[0].start_line, 1);
    }
}
