use heck::ToLowerCamelCase;
use pgscaffold_core::{Entity, EntityGraph};

use crate::errors::Result;
use crate::render::types::typescript_type;
use crate::render::{Artifact, Renderer, wrap_source};

/// `types/<file>.ts`: API response and UI interfaces per entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptRenderer;

impl Renderer for TypeScriptRenderer {
    fn name(&self) -> &'static str {
        "typescript"
    }

    fn render(&self, graph: &EntityGraph) -> Result<Vec<Artifact>> {
        Ok(graph
            .entities()
            .map(|entity| {
                Artifact::source(
                    format!("types/{}.ts", entity.file_name),
                    render_interfaces(entity),
                )
            })
            .collect())
    }
}

fn render_interfaces(entity: &Entity) -> String {
    // Response payloads may omit any field; UI state always carries all of them.
    let body = format!(
        "{}\n{}",
        interface(entity, "Response", "?:"),
        interface(entity, "UI", ":")
    );
    wrap_source("//", "", &body)
}

fn interface(entity: &Entity, suffix: &str, separator: &str) -> String {
    let mut out = format!("export interface {}{suffix} {{\n", entity.class_name);
    for column in &entity.columns {
        out.push_str(&format!(
            "    {}{separator} {};\n",
            column.name.to_lower_camel_case(),
            typescript_type(column)
        ));
    }
    out.push_str("}\n");
    out
}
