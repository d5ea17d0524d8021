use std::collections::BTreeMap;

use pgscaffold_core::{
    EnglishInflector, Entity, EntityGraph, Error, Naming, RawCatalog, RelationshipEdge, Result,
};
use tracing::info;

use crate::options::ResolveOptions;

mod columns;
mod relationships;

/// Resolve a raw catalog with the English inflector and default options.
pub fn resolve(catalog: &RawCatalog) -> Result<EntityGraph> {
    resolve_with_options(catalog, ResolveOptions::default())
}

/// Resolve a raw catalog with the English inflector and caller-provided options.
pub fn resolve_with_options(catalog: &RawCatalog, options: ResolveOptions) -> Result<EntityGraph> {
    let inflector = EnglishInflector;
    Resolver::new(Naming::new(&inflector), options).resolve(catalog)
}

/// Converts raw catalog facts into an entity graph.
///
/// Resolution is all-or-nothing: any integrity or unsupported-schema error
/// aborts before a graph is returned.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    naming: Naming<'a>,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(naming: Naming<'a>, options: ResolveOptions) -> Self {
        Self { naming, options }
    }

    pub fn resolve(&self, catalog: &RawCatalog) -> Result<EntityGraph> {
        let mut entities = self.table_pass(catalog)?;

        for (table_name, table) in &catalog.tables {
            let columns = columns::map_columns(table_name, table)?;
            if let Some(entity) = entities.get_mut(table_name) {
                entity.columns = columns;
            }
        }

        let pairs = relationships::collect_pairs(catalog, &self.naming)?;
        let pairs = relationships::resolve_collisions(pairs, self.options.collision_policy)?;

        // Reverse edges land after every table's forward edges so the result does
        // not depend on which table the catalog lists first.
        let mut reverse_edges = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let owner = pair.forward.owning_table.clone();
            attach(&mut entities, &owner, RelationshipEdge::Forward(pair.forward))?;
            reverse_edges.push(pair.reverse);
        }
        for reverse in reverse_edges {
            let owner = reverse.owning_table.clone();
            attach(&mut entities, &owner, RelationshipEdge::Reverse(reverse))?;
        }

        let graph = EntityGraph::new(entities);
        info!(
            event = "catalog_resolved",
            entities = graph.len(),
            edges = graph.edge_count()
        );
        Ok(graph)
    }

    fn table_pass(&self, catalog: &RawCatalog) -> Result<BTreeMap<String, Entity>> {
        let mut entities = BTreeMap::new();
        for table_name in catalog.tables.keys() {
            if table_name.trim().is_empty() {
                return Err(Error::SchemaIntegrity(
                    "catalog contains a table with an empty name".to_string(),
                ));
            }

            entities.insert(
                table_name.clone(),
                Entity {
                    table_name: table_name.clone(),
                    class_name: self.naming.class_name(table_name),
                    file_name: self.naming.file_name(table_name),
                    columns: Vec::new(),
                    relationship_edges: Vec::new(),
                },
            );
        }
        Ok(entities)
    }
}

fn attach(
    entities: &mut BTreeMap<String, Entity>,
    table: &str,
    edge: RelationshipEdge,
) -> Result<()> {
    let entity = entities.get_mut(table).ok_or_else(|| {
        Error::SchemaIntegrity(format!("relationship references unknown table: {table}"))
    })?;
    entity.relationship_edges.push(edge);
    Ok(())
}
