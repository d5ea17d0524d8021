//! Renderers turn the entity graph into artifacts. Each generator-set
//! version is a fixed list of renderers.

use std::path::{Path, PathBuf};

use pgscaffold_core::EntityGraph;
use pgscaffold_preserve::region;

use crate::errors::Result;
use crate::model::GenVersion;

mod schema_json;
mod sqlalchemy;
mod types;
mod typescript;

pub use schema_json::SchemaJsonRenderer;
pub use sqlalchemy::SqlAlchemyRenderer;
pub use types::{sqlalchemy_type, typescript_type};
pub use typescript::TypeScriptRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Source file: stamped with the provenance header and a preservation target.
    Source,
    /// Data document owned entirely by the generator.
    Data,
}

/// One rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub relative_path: PathBuf,
    pub kind: ArtifactKind,
    pub body: String,
}

impl Artifact {
    pub fn source(relative_path: impl Into<PathBuf>, body: String) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: ArtifactKind::Source,
            body,
        }
    }

    pub fn data(relative_path: impl Into<PathBuf>, body: String) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: ArtifactKind::Data,
            body,
        }
    }

    /// `/`-separated relative path, as used in reports.
    pub fn display_path(&self) -> String {
        display_path(&self.relative_path)
    }
}

pub(crate) fn display_path(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Source body with the `imports` region first and the default region last.
pub(crate) fn wrap_source(prefix: &str, imports: &str, body: &str) -> String {
    let mut out = region(prefix, Some("imports"), "");
    out.push_str(imports);
    if !imports.is_empty() {
        out.push('\n');
    }
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out.push('\n');
    out.push_str(&region(prefix, None, ""));
    out
}

pub trait Renderer {
    fn name(&self) -> &'static str;

    fn render(&self, graph: &EntityGraph) -> Result<Vec<Artifact>>;

    /// Directories whose whole content this renderer rewrites on every run.
    fn owned_dirs(&self) -> &'static [&'static str] {
        &[]
    }
}

pub fn renderers_for(version: GenVersion) -> Vec<Box<dyn Renderer>> {
    match version {
        GenVersion::V1 => vec![Box::new(SchemaJsonRenderer), Box::new(SqlAlchemyRenderer)],
        GenVersion::V2 => vec![
            Box::new(SchemaJsonRenderer),
            Box::new(SqlAlchemyRenderer),
            Box::new(TypeScriptRenderer),
        ],
    }
}

/// Directories of a generator set that are never carried over from the
/// previous output.
pub fn owned_dirs(version: GenVersion) -> Vec<PathBuf> {
    renderers_for(version)
        .iter()
        .flat_map(|renderer| renderer.owned_dirs().iter().map(PathBuf::from))
        .collect()
}

/// Render every artifact of a generator set, in renderer order.
pub fn render_all(version: GenVersion, graph: &EntityGraph) -> Result<Vec<Artifact>> {
    let mut artifacts = Vec::new();
    for renderer in renderers_for(version) {
        let rendered = renderer.render(graph)?;
        tracing::debug!(
            renderer = renderer.name(),
            artifacts = rendered.len(),
            "renderer finished"
        );
        artifacts.extend(rendered);
    }
    Ok(artifacts)
}
