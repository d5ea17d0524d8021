use std::collections::BTreeSet;

use pgscaffold_core::{Column, Error, RawColumn, RawTable, Result};

use crate::defaults::parse_default;

/// Column names that make a foreign key one-to-one: primary-key members plus
/// members of any unique index or unique constraint.
pub(crate) fn unique_or_primary(table: &RawTable) -> BTreeSet<&str> {
    let mut columns = unique_columns(table);
    columns.extend(
        table
            .columns
            .iter()
            .filter(|column| column.primary_key)
            .map(|column| column.name.as_str()),
    );
    columns
}

fn unique_columns(table: &RawTable) -> BTreeSet<&str> {
    let from_indexes = table
        .indexes
        .iter()
        .filter(|index| index.unique)
        .flat_map(|index| index.columns.iter());
    let from_constraints = table
        .unique_constraints
        .iter()
        .flat_map(|constraint| constraint.columns.iter());

    from_indexes
        .chain(from_constraints)
        .map(String::as_str)
        .collect()
}

fn indexed_columns(table: &RawTable) -> BTreeSet<&str> {
    table
        .indexes
        .iter()
        .flat_map(|index| index.columns.iter())
        .map(String::as_str)
        .collect()
}

/// Column pass: normalize every column of `table`, preserving catalog order.
pub(crate) fn map_columns(table_name: &str, table: &RawTable) -> Result<Vec<Column>> {
    let unique = unique_columns(table);
    let indexed = indexed_columns(table);

    let mut seen = BTreeSet::new();
    let mut columns = Vec::with_capacity(table.columns.len());

    for raw in &table.columns {
        if raw.name.trim().is_empty() {
            return Err(Error::SchemaIntegrity(format!(
                "table '{table_name}' has a column with an empty name"
            )));
        }
        if !seen.insert(raw.name.as_str()) {
            return Err(Error::SchemaIntegrity(format!(
                "duplicate column name: {table_name}.{}",
                raw.name
            )));
        }

        columns.push(map_column(raw, &unique, &indexed));
    }

    Ok(columns)
}

fn map_column(raw: &RawColumn, unique: &BTreeSet<&str>, indexed: &BTreeSet<&str>) -> Column {
    let name = raw.name.as_str();
    let (declared_type, type_length) = split_type(&raw.data_type);

    Column {
        name: raw.name.clone(),
        declared_type,
        length: raw.length.or(type_length),
        nullable: raw.nullable,
        has_server_default: raw.default.is_some(),
        default: parse_default(raw.default.as_deref()),
        is_indexed: indexed.contains(name) || raw.primary_key,
        is_unique: unique.contains(name),
        is_primary_key: raw.primary_key,
    }
}

/// `VARCHAR(255)` -> (`VARCHAR`, Some(255)); `NUMERIC(10, 2)` -> (`NUMERIC`, None).
fn split_type(data_type: &str) -> (String, Option<u32>) {
    let Some((base, rest)) = data_type.split_once('(') else {
        return (data_type.trim().to_string(), None);
    };

    let args = rest.split(')').next().unwrap_or("");
    let length = args.trim().parse::<u32>().ok();
    (base.trim().to_string(), length)
}
