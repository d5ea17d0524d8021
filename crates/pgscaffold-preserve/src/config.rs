use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TOOL_NAME: &str = "pg-scaffold";

/// Settings shared by extraction, restoration and the generated-file writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreserveConfig {
    /// Tool name stamped into (and expected in) the provenance header.
    pub tool_name: String,
    /// File extensions, without the dot, that are scanned for markers.
    pub extensions: Vec<String>,
}

impl Default for PreserveConfig {
    fn default() -> Self {
        Self {
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            extensions: vec!["py".to_string(), "ts".to_string()],
        }
    }
}

impl PreserveConfig {
    pub fn handles(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed == ext))
    }
}

/// Line-comment prefix used for headers and markers in a file of this type.
pub fn comment_prefix(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("ts" | "tsx" | "js" | "jsx" | "rs" | "go" | "java" | "kt") => "//",
        Some("sql") => "--",
        _ => "#",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_follow_extension() {
        assert_eq!(comment_prefix(Path::new("app/models/user.py")), "#");
        assert_eq!(comment_prefix(Path::new("types/user.ts")), "//");
        assert_eq!(comment_prefix(Path::new("src/lib.RS")), "//");
        assert_eq!(comment_prefix(Path::new("db/seed.sql")), "--");
        assert_eq!(comment_prefix(Path::new("Makefile")), "#");
    }

    #[test]
    fn default_config_handles_python_and_typescript() {
        let config = PreserveConfig::default();
        assert!(config.handles(Path::new("a/b.py")));
        assert!(config.handles(Path::new("b.ts")));
        assert!(!config.handles(Path::new("schema_json/user.json")));
        assert!(!config.handles(Path::new("README")));
    }
}
