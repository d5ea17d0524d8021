use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::defaults::DefaultValue;
use crate::relationship::{ForwardEdge, RelationshipEdge, ReverseEdge};

/// Normalized column metadata. One per physical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Column {
    pub name: String,
    /// Type name without parameters (e.g. `VARCHAR`).
    pub declared_type: String,
    pub length: Option<u32>,
    pub nullable: bool,
    pub has_server_default: bool,
    pub default: Option<DefaultValue>,
    pub is_indexed: bool,
    pub is_unique: bool,
    pub is_primary_key: bool,
}

/// Normalized representation of one table plus its columns and relationships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Entity {
    pub table_name: String,
    pub class_name: String,
    pub file_name: String,
    pub columns: Vec<Column>,
    pub relationship_edges: Vec<RelationshipEdge>,
}

impl Entity {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn forward_edges(&self) -> impl Iterator<Item = &ForwardEdge> {
        self.relationship_edges
            .iter()
            .filter_map(RelationshipEdge::as_forward)
    }

    pub fn reverse_edges(&self) -> impl Iterator<Item = &ReverseEdge> {
        self.relationship_edges
            .iter()
            .filter_map(RelationshipEdge::as_reverse)
    }

    /// Forward edge derived from the given foreign-key column, if any.
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForwardEdge> {
        self.forward_edges()
            .find(|edge| edge.owning_column == column)
    }
}

/// Entity graph keyed by table name, iterated in table-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EntityGraph {
    entities: BTreeMap<String, Entity>,
}

impl EntityGraph {
    pub fn new(entities: BTreeMap<String, Entity>) -> Self {
        Self { entities }
    }

    pub fn get(&self, table_name: &str) -> Option<&Entity> {
        self.entities.get(table_name)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Total number of edges across all entities.
    pub fn edge_count(&self) -> usize {
        self.entities
            .values()
            .map(|entity| entity.relationship_edges.len())
            .sum()
    }
}

impl<'a> IntoIterator for &'a EntityGraph {
    type Item = (&'a String, &'a Entity);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}
