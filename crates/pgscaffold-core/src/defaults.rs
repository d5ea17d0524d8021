use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Normalized server-side default for a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Boolean(bool),
    Integer(i64),
    /// Integer literal outside the `i64` range, kept as its exact digits.
    BigInteger(String),
    Float(f64),
    CurrentTimestamp,
    CurrentDate,
    CurrentTime,
    /// Auto-increment through a named sequence (`nextval(...)`).
    Sequence { name: String },
    /// Opaque string literal, quotes and casts removed.
    String(String),
}
