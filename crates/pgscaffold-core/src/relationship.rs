use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cardinality of a foreign-key relationship, seen from the owning table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    OneToOne,
    ManyToOne,
}

impl Cardinality {
    /// Cardinality depends only on whether the foreign-key column is unique.
    pub fn infer(column_is_unique_or_primary: bool) -> Self {
        if column_is_unique_or_primary {
            Cardinality::OneToOne
        } else {
            Cardinality::ManyToOne
        }
    }

    pub fn is_one_to_one(self) -> bool {
        matches!(self, Cardinality::OneToOne)
    }
}

/// Edge owned by the table holding the foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForwardEdge {
    pub owning_table: String,
    pub owning_column: String,
    pub target_table: String,
    pub target_column: String,
    pub cardinality: Cardinality,
    pub local_name: String,
    pub remote_back_reference_name: String,
    pub target_class_name: String,
    pub target_file_name: String,
}

/// Edge owned by the referenced table, mirroring a [`ForwardEdge`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReverseEdge {
    pub owning_table: String,
    pub source_table: String,
    pub source_column: String,
    pub cardinality: Cardinality,
    pub local_name: String,
    pub remote_back_reference_name: String,
    /// The referenced side sees a collection unless the relationship is one-to-one.
    pub uses_list: bool,
    pub source_class_name: String,
    pub source_file_name: String,
}

/// Directional relationship descriptor attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationshipEdge {
    Forward(ForwardEdge),
    Reverse(ReverseEdge),
}

impl RelationshipEdge {
    pub fn local_name(&self) -> &str {
        match self {
            RelationshipEdge::Forward(edge) => &edge.local_name,
            RelationshipEdge::Reverse(edge) => &edge.local_name,
        }
    }

    pub fn remote_back_reference_name(&self) -> &str {
        match self {
            RelationshipEdge::Forward(edge) => &edge.remote_back_reference_name,
            RelationshipEdge::Reverse(edge) => &edge.remote_back_reference_name,
        }
    }

    /// Table on the other end of the edge.
    pub fn remote_table(&self) -> &str {
        match self {
            RelationshipEdge::Forward(edge) => &edge.target_table,
            RelationshipEdge::Reverse(edge) => &edge.source_table,
        }
    }

    /// Foreign-key column the edge was derived from.
    pub fn foreign_key_column(&self) -> &str {
        match self {
            RelationshipEdge::Forward(edge) => &edge.owning_column,
            RelationshipEdge::Reverse(edge) => &edge.source_column,
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        match self {
            RelationshipEdge::Forward(edge) => edge.cardinality,
            RelationshipEdge::Reverse(edge) => edge.cardinality,
        }
    }

    pub fn as_forward(&self) -> Option<&ForwardEdge> {
        match self {
            RelationshipEdge::Forward(edge) => Some(edge),
            RelationshipEdge::Reverse(_) => None,
        }
    }

    pub fn as_reverse(&self) -> Option<&ReverseEdge> {
        match self {
            RelationshipEdge::Forward(_) => None,
            RelationshipEdge::Reverse(edge) => Some(edge),
        }
    }

    /// True when `other` is the partner edge produced from the same foreign key.
    pub fn is_partner_of(&self, other: &RelationshipEdge) -> bool {
        match (self, other) {
            (RelationshipEdge::Forward(fwd), RelationshipEdge::Reverse(rev))
            | (RelationshipEdge::Reverse(rev), RelationshipEdge::Forward(fwd)) => {
                fwd.owning_table == rev.source_table
                    && fwd.owning_column == rev.source_column
                    && fwd.target_table == rev.owning_table
            }
            _ => false,
        }
    }
}
