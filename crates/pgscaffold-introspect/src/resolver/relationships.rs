use std::collections::BTreeMap;

use pgscaffold_core::{
    Cardinality, Error, ForwardEdge, Naming, RawCatalog, RawForeignKey, Result, ReverseEdge,
};
use tracing::debug;

use crate::options::CollisionPolicy;
use crate::resolver::columns::unique_or_primary;

/// Forward and reverse edge derived from the same foreign key.
#[derive(Debug, Clone)]
pub(crate) struct EdgePair {
    pub forward: ForwardEdge,
    pub reverse: ReverseEdge,
}

/// Relationship pass: one edge pair per single-column foreign key, in catalog order.
pub(crate) fn collect_pairs(catalog: &RawCatalog, naming: &Naming<'_>) -> Result<Vec<EdgePair>> {
    let mut pairs = Vec::new();

    for (table_name, table) in &catalog.tables {
        let keys = unique_or_primary(table);

        for fk in &table.foreign_keys {
            let (column, referred_column) = single_column_pair(table_name, fk)?;
            check_references(catalog, table_name, fk, column, referred_column)?;

            let cardinality = Cardinality::infer(keys.contains(column));
            let one_to_one = cardinality.is_one_to_one();
            let target = fk.referred_table.as_str();

            debug!(
                table = %table_name,
                column = %column,
                target = %target,
                cardinality = ?cardinality,
                "foreign key resolved"
            );

            let forward = ForwardEdge {
                owning_table: table_name.clone(),
                owning_column: column.to_string(),
                target_table: target.to_string(),
                target_column: referred_column.to_string(),
                cardinality,
                local_name: naming.variable_name(target, true),
                remote_back_reference_name: naming.variable_name(table_name, one_to_one),
                target_class_name: naming.class_name(target),
                target_file_name: naming.file_name(target),
            };

            let reverse = ReverseEdge {
                owning_table: target.to_string(),
                source_table: table_name.clone(),
                source_column: column.to_string(),
                cardinality,
                local_name: naming.variable_name(table_name, one_to_one),
                remote_back_reference_name: naming.variable_name(target, true),
                uses_list: !one_to_one,
                source_class_name: naming.class_name(table_name),
                source_file_name: naming.file_name(table_name),
            };

            pairs.push(EdgePair { forward, reverse });
        }
    }

    Ok(pairs)
}

fn single_column_pair<'a>(table: &str, fk: &'a RawForeignKey) -> Result<(&'a str, &'a str)> {
    match (fk.constrained_columns.as_slice(), fk.referred_columns.as_slice()) {
        ([column], [referred]) => Ok((column.as_str(), referred.as_str())),
        (constrained, referred) => Err(Error::UnsupportedSchema {
            table: table.to_string(),
            message: format!(
                "foreign key {} maps {} column(s) to {}; only single-column foreign keys are supported",
                fk.describe(table),
                constrained.len(),
                referred.len()
            ),
        }),
    }
}

fn check_references(
    catalog: &RawCatalog,
    table_name: &str,
    fk: &RawForeignKey,
    column: &str,
    referred_column: &str,
) -> Result<()> {
    let owning = &catalog.tables[table_name];
    if !owning.columns.iter().any(|col| col.name == column) {
        return Err(Error::SchemaIntegrity(format!(
            "foreign key column not found: {table_name}.{column} in {}",
            fk.describe(table_name)
        )));
    }

    let target = catalog.tables.get(&fk.referred_table).ok_or_else(|| {
        Error::SchemaIntegrity(format!(
            "referenced table not found: {} in {}",
            fk.referred_table,
            fk.describe(table_name)
        ))
    })?;

    if !target.columns.iter().any(|col| col.name == referred_column) {
        return Err(Error::SchemaIntegrity(format!(
            "referenced column not found: {}.{referred_column} in {}",
            fk.referred_table,
            fk.describe(table_name)
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Forward,
    Reverse,
}

/// Edges on one entity that share a local name.
#[derive(Debug)]
struct Collision {
    table: String,
    name: String,
    members: Vec<(Side, usize)>,
}

fn find_collisions(pairs: &[EdgePair]) -> Vec<Collision> {
    let mut by_name: BTreeMap<(&str, &str), Vec<(Side, usize)>> = BTreeMap::new();

    for (idx, pair) in pairs.iter().enumerate() {
        by_name
            .entry((pair.forward.owning_table.as_str(), pair.forward.local_name.as_str()))
            .or_default()
            .push((Side::Forward, idx));
        by_name
            .entry((pair.reverse.owning_table.as_str(), pair.reverse.local_name.as_str()))
            .or_default()
            .push((Side::Reverse, idx));
    }

    by_name
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|((table, name), members)| Collision {
            table: table.to_string(),
            name: name.to_string(),
            members,
        })
        .collect()
}

/// Apply the collision policy to the edge pairs of a whole catalog.
///
/// Renaming an edge always updates the partner's back reference, so the
/// symmetry between forward and reverse edges holds afterwards.
pub(crate) fn resolve_collisions(
    mut pairs: Vec<EdgePair>,
    policy: CollisionPolicy,
) -> Result<Vec<EdgePair>> {
    let collisions = find_collisions(&pairs);
    let Some(first) = collisions.first() else {
        return Ok(pairs);
    };

    if policy == CollisionPolicy::Reject {
        return Err(collision_error(first));
    }

    for collision in &collisions {
        debug!(
            table = %collision.table,
            name = %collision.name,
            edges = collision.members.len(),
            "disambiguating relationship names"
        );
        for &(side, idx) in &collision.members {
            let pair = &mut pairs[idx];
            match side {
                Side::Forward => {
                    let renamed = format!(
                        "{}_via_{}",
                        pair.forward.local_name, pair.forward.owning_column
                    );
                    pair.reverse.remote_back_reference_name = renamed.clone();
                    pair.forward.local_name = renamed;
                }
                Side::Reverse => {
                    let renamed = format!(
                        "{}_for_{}",
                        pair.reverse.local_name, pair.reverse.source_column
                    );
                    pair.forward.remote_back_reference_name = renamed.clone();
                    pair.reverse.local_name = renamed;
                }
            }
        }
    }

    if let Some(remaining) = find_collisions(&pairs).first() {
        return Err(collision_error(remaining));
    }

    Ok(pairs)
}

fn collision_error(collision: &Collision) -> Error {
    Error::SchemaIntegrity(format!(
        "relationship name '{}' is used by {} edges on table '{}'",
        collision.name,
        collision.members.len(),
        collision.table
    ))
}
