use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Raw catalog document as supplied by a catalog source.
///
/// Tables are keyed by name, which makes table names unique by construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawCatalog {
    pub tables: BTreeMap<String, RawTable>,
}

/// Catalog facts for a single table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub indexes: Vec<RawIndex>,
    #[serde(default)]
    pub unique_constraints: Vec<RawUniqueConstraint>,
    #[serde(default)]
    pub foreign_keys: Vec<RawForeignKey>,
}

/// Column metadata exactly as reported by the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawColumn {
    pub name: String,
    /// Type string, possibly parameterized (e.g. `VARCHAR(255)`).
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Raw default expression (e.g. `nextval('users_id_seq'::regclass)`).
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
}

fn default_nullable() -> bool {
    true
}

/// Index definition reduced to the facts the resolver needs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawIndex {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

/// Unique constraint definition.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawUniqueConstraint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Foreign key definition preserving column ordering.
///
/// Multi-column keys are accepted here and rejected by the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RawForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub constrained_columns: Vec<String>,
    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

impl RawForeignKey {
    /// Human readable identity used in error messages.
    pub fn describe(&self, table: &str) -> String {
        let name = self.name.as_deref().unwrap_or("<unnamed>");
        format!(
            "{name} ({table}.[{}] -> {}.[{}])",
            self.constrained_columns.join(", "),
            self.referred_table,
            self.referred_columns.join(", ")
        )
    }
}
