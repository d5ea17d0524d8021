use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::config::comment_prefix;
use crate::error::{PreserveError, Result};
use crate::markers::{MarkerKind, has_start_marker, marker_line};

pub fn header_line(prefix: &str, tool_name: &str, timestamp: DateTime<Utc>) -> String {
    format!(
        "{prefix} Generated by {tool_name} {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// A START/END pair enclosing `content`, for renderers that place regions
/// themselves.
pub fn region(prefix: &str, label: Option<&str>, content: &str) -> String {
    let mut out = marker_line(prefix, MarkerKind::Start, label);
    out.push('\n');
    out.push_str(content);
    if !content.is_empty() && !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&marker_line(prefix, MarkerKind::End, label));
    out.push('\n');
    out
}

/// Full text of a generated file: provenance header, body, and a default
/// empty region when the body declares no region of its own.
pub fn render_generated(
    body: &str,
    destination: &Path,
    tool_name: &str,
    timestamp: DateTime<Utc>,
) -> String {
    let prefix = comment_prefix(destination);

    let mut out = header_line(prefix, tool_name, timestamp);
    out.push('\n');
    out.push_str(body);

    if !has_start_marker(body) {
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&region(prefix, None, ""));
    }

    out
}

/// Stamp and atomically write a generated file.
pub fn write_generated(body: &str, destination: &Path, tool_name: &str) -> Result<()> {
    let content = render_generated(body, destination, tool_name, Utc::now());
    write_atomic(destination, content.as_bytes())?;
    debug!(event = "generated_file_written", path = %destination.display());
    Ok(())
}

/// Write through a sibling temp file and rename it over `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| PreserveError::io(parent, err))?;
        }
    }

    let tmp_path = temp_path(path)?;
    let written = write_and_sync(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(PreserveError::io(path, err));
    }

    Ok(())
}

fn write_and_sync(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| PreserveError::InvalidPath(path.to_path_buf()))?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::markers::{is_generated_file, scan};

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn stamps_header_and_default_region() {
        let content = render_generated(
            "class User:\n    pass",
            Path::new("app/models/user.py"),
            "pg-scaffold",
            fixed_time(),
        );

        assert_eq!(
            content,
            "# Generated by pg-scaffold 2026-03-01T12:30:00Z\n\
             class User:\n    pass\n\
             \n\
             # -- Preserve Custom code START --\n\
             # -- Preserve Custom code END --\n"
        );
        assert!(is_generated_file(&content, "pg-scaffold"));
    }

    #[test]
    fn keeps_regions_declared_by_the_body() {
        let body = format!(
            "{}export interface User {{}}\n",
            region("//", Some("imports"), "")
        );
        let content = render_generated(&body, Path::new("types/user.ts"), "pg-scaffold", fixed_time());

        assert!(content.starts_with("// Generated by pg-scaffold "));
        let scan = scan(content.lines());
        assert_eq!(scan.regions.len(), 1);
        assert_eq!(scan.regions[0].label.as_deref(), Some("imports"));
    }

    #[test]
    fn write_generated_creates_parents_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("app").join("models").join("user.py");

        write_generated("x = 1\n", &path, "pg-scaffold").expect("write");

        let content = fs::read_to_string(&path).expect("read");
        assert!(is_generated_file(&content, "pg-scaffold"));
        let leftovers: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
