use serde::{Deserialize, Serialize};

/// What the resolver does when two edges on one entity share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Suffix colliding edges with their foreign-key column.
    #[default]
    Disambiguate,
    /// Fail with a schema integrity error.
    Reject,
}

/// Options that control how resolution behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    pub collision_policy: CollisionPolicy,
}
