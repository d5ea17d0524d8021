use pgscaffold_core::EntityGraph;

use crate::errors::Result;
use crate::render::{Artifact, Renderer};

const SCHEMA_DIR: &str = "schema_json";

/// `schema_json/<table>.json`: one entity document per table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaJsonRenderer;

impl Renderer for SchemaJsonRenderer {
    fn name(&self) -> &'static str {
        "schema_json"
    }

    fn render(&self, graph: &EntityGraph) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(graph.len());
        for entity in graph.entities() {
            let mut body = serde_json::to_string_pretty(entity)?;
            body.push('\n');
            artifacts.push(Artifact::data(
                format!("{SCHEMA_DIR}/{}.json", entity.table_name),
                body,
            ));
        }
        Ok(artifacts)
    }

    fn owned_dirs(&self) -> &'static [&'static str] {
        &[SCHEMA_DIR]
    }
}
