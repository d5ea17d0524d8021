use std::collections::BTreeSet;

use pgscaffold_core::{Column, DefaultValue, Entity, EntityGraph, ForwardEdge, ReverseEdge};

use crate::errors::Result;
use crate::render::types::{SqlModule, sql_type};
use crate::render::{Artifact, Renderer, wrap_source};

const MODELS_DIR: &str = "app/models";

/// SQLAlchemy declarative models under `app/models/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlAlchemyRenderer;

impl Renderer for SqlAlchemyRenderer {
    fn name(&self) -> &'static str {
        "sqlalchemy"
    }

    fn render(&self, graph: &EntityGraph) -> Result<Vec<Artifact>> {
        let mut artifacts = Vec::with_capacity(graph.len() + 2);
        artifacts.push(Artifact::source(
            format!("{MODELS_DIR}/base.py"),
            render_base(),
        ));
        artifacts.push(Artifact::source(
            format!("{MODELS_DIR}/__init__.py"),
            render_init(graph),
        ));
        for entity in graph.entities() {
            artifacts.push(Artifact::source(
                format!("{MODELS_DIR}/{}.py", entity.file_name),
                render_model(entity),
            ));
        }
        Ok(artifacts)
    }
}

fn model_class(class_name: &str) -> String {
    format!("{class_name}Model")
}

fn render_base() -> String {
    wrap_source(
        "#",
        "from sqlalchemy.orm import DeclarativeBase\n",
        "\nclass Base(DeclarativeBase):\n    pass\n",
    )
}

fn render_init(graph: &EntityGraph) -> String {
    let mut imports = String::from("from .base import Base\n");
    let mut exports = String::from("__all__ = [\n    \"Base\",\n");

    for entity in graph.entities() {
        let class = model_class(&entity.class_name);
        imports.push_str(&format!("from .{} import {class}\n", entity.file_name));
        exports.push_str(&format!("    \"{class}\",\n"));
    }
    exports.push_str("]\n");

    wrap_source("#", &imports, &exports)
}

#[derive(Default)]
struct Imports {
    core: BTreeSet<&'static str>,
    postgres: BTreeSet<&'static str>,
    relationship: bool,
}

impl Imports {
    fn render(&self) -> String {
        let mut out = String::new();
        if !self.core.is_empty() {
            let names: Vec<&str> = self.core.iter().copied().collect();
            out.push_str(&format!("from sqlalchemy import {}\n", names.join(", ")));
        }
        if !self.postgres.is_empty() {
            let names: Vec<&str> = self.postgres.iter().copied().collect();
            out.push_str(&format!(
                "from sqlalchemy.dialects.postgresql import {}\n",
                names.join(", ")
            ));
        }
        if self.relationship {
            out.push_str("from sqlalchemy.orm import relationship\n");
        }
        out.push_str("\nfrom .base import Base\n");
        out
    }
}

fn render_model(entity: &Entity) -> String {
    let mut imports = Imports::default();
    imports.core.insert("Column");

    let mut body = format!(
        "\nclass {}(Base):\n    __tablename__ = {}\n",
        model_class(&entity.class_name),
        py_string(&entity.table_name)
    );

    if !entity.columns.is_empty() {
        body.push('\n');
    }
    for column in &entity.columns {
        let line = column_line(entity, column, &mut imports);
        body.push_str(&attribute(&column.name, &line));
    }

    if !entity.relationship_edges.is_empty() {
        imports.relationship = true;
        body.push('\n');
    }
    for edge in entity.forward_edges() {
        body.push_str(&attribute(&edge.local_name, &forward_relationship(edge)));
    }
    for edge in entity.reverse_edges() {
        body.push_str(&attribute(&edge.local_name, &reverse_relationship(edge)));
    }

    wrap_source("#", &imports.render(), &body)
}

fn attribute(name: &str, value: &str) -> String {
    format!("    {name} = {value}\n")
}

fn column_line(entity: &Entity, column: &Column, imports: &mut Imports) -> String {
    let sql = sql_type(column);
    match sql.module {
        SqlModule::Core => imports.core.insert(sql.import),
        SqlModule::Postgres => imports.postgres.insert(sql.import),
    };

    let mut args = vec![sql.expr];

    if let Some(DefaultValue::Sequence { name }) = &column.default {
        imports.core.insert("Sequence");
        args.push(format!("Sequence({})", py_string(name)));
    }

    if let Some(edge) = entity.foreign_key_for(&column.name) {
        imports.core.insert("ForeignKey");
        args.push(format!(
            "ForeignKey({})",
            py_string(&format!("{}.{}", edge.target_table, edge.target_column))
        ));
    }

    if column.is_primary_key {
        args.push("primary_key=True".to_string());
    } else {
        if !column.nullable {
            args.push("nullable=False".to_string());
        }
        if column.is_unique {
            args.push("unique=True".to_string());
        }
        if column.is_indexed {
            args.push("index=True".to_string());
        }
    }

    if let Some(default) = column.default.as_ref().and_then(|d| server_default(d, imports)) {
        args.push(format!("server_default={default}"));
    }

    format!("Column({})", args.join(", "))
}

fn server_default(default: &DefaultValue, imports: &mut Imports) -> Option<String> {
    let rendered = match default {
        DefaultValue::Sequence { .. } => return None,
        DefaultValue::CurrentTimestamp => {
            imports.core.insert("func");
            "func.now()".to_string()
        }
        DefaultValue::CurrentDate => {
            imports.core.insert("func");
            "func.current_date()".to_string()
        }
        DefaultValue::CurrentTime => {
            imports.core.insert("func");
            "func.current_time()".to_string()
        }
        DefaultValue::Boolean(value) => {
            imports.core.insert("text");
            format!("text({})", py_string(if *value { "true" } else { "false" }))
        }
        DefaultValue::Integer(value) => {
            imports.core.insert("text");
            format!("text({})", py_string(&value.to_string()))
        }
        DefaultValue::BigInteger(digits) => {
            imports.core.insert("text");
            format!("text({})", py_string(digits))
        }
        DefaultValue::Float(value) => {
            imports.core.insert("text");
            format!("text({})", py_string(&value.to_string()))
        }
        DefaultValue::String(value) => py_string(value),
    };
    Some(rendered)
}

fn forward_relationship(edge: &ForwardEdge) -> String {
    let mut args = vec![
        py_string(&model_class(&edge.target_class_name)),
        format!("back_populates={}", py_string(&edge.remote_back_reference_name)),
        format!("foreign_keys=[{}]", edge.owning_column),
    ];
    if edge.owning_table == edge.target_table {
        args.push(format!("remote_side=[{}]", edge.target_column));
    }
    if edge.cardinality.is_one_to_one() {
        args.push("uselist=False".to_string());
    }
    format!("relationship({})", args.join(", "))
}

fn reverse_relationship(edge: &ReverseEdge) -> String {
    let source = model_class(&edge.source_class_name);
    let mut args = vec![
        py_string(&source),
        format!("back_populates={}", py_string(&edge.remote_back_reference_name)),
        format!(
            "foreign_keys={}",
            py_string(&format!("[{source}.{}]", edge.source_column))
        ),
    ];
    if !edge.uses_list {
        args.push("uselist=False".to_string());
    }
    format!("relationship({})", args.join(", "))
}

/// Double-quoted Python string literal.
fn py_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgscaffold_core::{Cardinality, RelationshipEdge};

    fn column(name: &str, declared_type: &str) -> Column {
        Column {
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            length: None,
            nullable: true,
            has_server_default: false,
            default: None,
            is_indexed: false,
            is_unique: false,
            is_primary_key: false,
        }
    }

    fn order_entity() -> Entity {
        let mut id = column("id", "INTEGER");
        id.is_primary_key = true;
        id.is_indexed = true;
        id.nullable = false;
        id.has_server_default = true;
        id.default = Some(DefaultValue::Sequence {
            name: "order_id_seq".to_string(),
        });

        let mut customer_id = column("customer_id", "INTEGER");
        customer_id.nullable = false;
        customer_id.is_indexed = true;

        let mut status = column("status", "VARCHAR");
        status.length = Some(20);
        status.has_server_default = true;
        status.default = Some(DefaultValue::String("new".to_string()));

        let mut placed_at = column("placed_at", "TIMESTAMP");
        placed_at.has_server_default = true;
        placed_at.default = Some(DefaultValue::CurrentTimestamp);

        Entity {
            table_name: "order".to_string(),
            class_name: "Order".to_string(),
            file_name: "order".to_string(),
            columns: vec![id, customer_id, status, placed_at],
            relationship_edges: vec![RelationshipEdge::Forward(ForwardEdge {
                owning_table: "order".to_string(),
                owning_column: "customer_id".to_string(),
                target_table: "customer".to_string(),
                target_column: "id".to_string(),
                cardinality: Cardinality::ManyToOne,
                local_name: "customer".to_string(),
                remote_back_reference_name: "orders".to_string(),
                target_class_name: "Customer".to_string(),
                target_file_name: "customer".to_string(),
            })],
        }
    }

    #[test]
    fn renders_columns_and_relationships() {
        let model = render_model(&order_entity());

        assert!(model.starts_with("# -- Preserve Custom code START: imports --\n"));
        assert!(model.contains(
            "from sqlalchemy import Column, ForeignKey, Integer, Sequence, String, TIMESTAMP, func\n"
        ));
        assert!(model.contains("from sqlalchemy.orm import relationship\n"));
        assert!(model.contains("class OrderModel(Base):\n    __tablename__ = \"order\"\n"));
        assert!(model.contains(
            "    id = Column(Integer, Sequence(\"order_id_seq\"), primary_key=True)\n"
        ));
        assert!(model.contains(
            "    customer_id = Column(Integer, ForeignKey(\"customer.id\"), nullable=False, index=True)\n"
        ));
        assert!(model.contains("    status = Column(String(20), server_default=\"new\")\n"));
        assert!(model.contains("    placed_at = Column(TIMESTAMP, server_default=func.now())\n"));
        assert!(model.contains(
            "    customer = relationship(\"CustomerModel\", back_populates=\"orders\", foreign_keys=[customer_id])\n"
        ));
        assert!(model.ends_with(
            "# -- Preserve Custom code START --\n# -- Preserve Custom code END --\n"
        ));
    }

    #[test]
    fn reverse_one_to_one_is_scalar() {
        let edge = ReverseEdge {
            owning_table: "user".to_string(),
            source_table: "profile".to_string(),
            source_column: "user_id".to_string(),
            cardinality: Cardinality::OneToOne,
            local_name: "profile".to_string(),
            remote_back_reference_name: "user".to_string(),
            uses_list: false,
            source_class_name: "Profile".to_string(),
            source_file_name: "profile".to_string(),
        };
        assert_eq!(
            reverse_relationship(&edge),
            "relationship(\"ProfileModel\", back_populates=\"user\", foreign_keys=\"[ProfileModel.user_id]\", uselist=False)"
        );
    }

    #[test]
    fn big_integer_defaults_keep_every_digit() {
        let mut imports = Imports::default();
        let rendered = server_default(
            &DefaultValue::BigInteger("12345678901234567890".to_string()),
            &mut imports,
        );
        assert_eq!(rendered.as_deref(), Some("text(\"12345678901234567890\")"));
        assert!(imports.core.contains("text"));
    }

    #[test]
    fn quotes_python_strings() {
        assert_eq!(py_string("it's \"x\"\n"), "\"it's \\\"x\\\"\\n\"");
    }
}
