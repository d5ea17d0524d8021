use std::fs;

use pgscaffold_core::{Cardinality, DefaultValue, EntityGraph, Error, RawCatalog, RelationshipEdge};
use pgscaffold_introspect::{CatalogSource, InMemoryCatalog, JsonCatalogSource, resolve};
use serde_json::json;

fn shop_catalog() -> RawCatalog {
    serde_json::from_value(json!({
        "tables": {
            "customer": {
                "columns": [
                    {"name": "id", "type": "INTEGER", "nullable": false, "primary_key": true,
                     "default": "nextval('customer_id_seq'::regclass)"},
                    {"name": "status", "type": "VARCHAR(20)", "nullable": false,
                     "default": "'active'::character varying"},
                    {"name": "created_at", "type": "TIMESTAMP", "nullable": false,
                     "default": "now()"}
                ]
            },
            "user": {
                "columns": [
                    {"name": "id", "type": "INTEGER", "nullable": false, "primary_key": true}
                ]
            },
            "profile": {
                "columns": [
                    {"name": "user_id", "type": "INTEGER", "nullable": false, "primary_key": true},
                    {"name": "bio", "type": "TEXT"}
                ],
                "foreign_keys": [{
                    "constrained_columns": ["user_id"],
                    "referred_table": "user",
                    "referred_columns": ["id"]
                }]
            },
            "order": {
                "columns": [
                    {"name": "id", "type": "INTEGER", "nullable": false, "primary_key": true},
                    {"name": "customer_id", "type": "INTEGER", "nullable": false}
                ],
                "indexes": [{"columns": ["customer_id"], "unique": false}],
                "foreign_keys": [{
                    "name": "order_customer_id_fkey",
                    "constrained_columns": ["customer_id"],
                    "referred_table": "customer",
                    "referred_columns": ["id"]
                }]
            },
            "team": {
                "columns": [{"name": "id", "type": "INTEGER", "primary_key": true}]
            },
            "fixture": {
                "columns": [
                    {"name": "id", "type": "INTEGER", "primary_key": true},
                    {"name": "home_team_id", "type": "INTEGER"},
                    {"name": "away_team_id", "type": "INTEGER"}
                ],
                "foreign_keys": [
                    {"constrained_columns": ["home_team_id"], "referred_table": "team",
                     "referred_columns": ["id"]},
                    {"constrained_columns": ["away_team_id"], "referred_table": "team",
                     "referred_columns": ["id"]}
                ]
            }
        }
    }))
    .expect("parse catalog")
}

fn assert_symmetric(graph: &EntityGraph) {
    for entity in graph.entities() {
        for edge in &entity.relationship_edges {
            let remote = graph.get(edge.remote_table()).expect("remote entity");
            let partners: Vec<&RelationshipEdge> = remote
                .relationship_edges
                .iter()
                .filter(|candidate| candidate.is_partner_of(edge))
                .collect();
            assert_eq!(
                partners.len(),
                1,
                "edge {} on {} needs exactly one partner",
                edge.local_name(),
                entity.table_name
            );
            let partner = partners[0];
            assert_eq!(partner.remote_back_reference_name(), edge.local_name());
            assert_eq!(partner.local_name(), edge.remote_back_reference_name());
        }
    }
}

#[test]
fn every_edge_has_one_mirrored_partner() {
    let graph = resolve(&shop_catalog()).expect("resolve");
    assert_symmetric(&graph);
    assert_eq!(graph.edge_count(), 8);
}

#[test]
fn primary_key_foreign_key_is_one_to_one() {
    let graph = resolve(&shop_catalog()).expect("resolve");

    let profile = graph.get("profile").expect("profile");
    let forward = profile.foreign_key_for("user_id").expect("forward edge");
    assert_eq!(forward.local_name, "user");
    assert_eq!(forward.cardinality, Cardinality::OneToOne);
    assert_eq!(forward.remote_back_reference_name, "profile");

    let user = graph.get("user").expect("user");
    let reverse = user.reverse_edges().next().expect("reverse edge");
    assert_eq!(reverse.local_name, "profile");
    assert!(!reverse.uses_list);
}

#[test]
fn plain_foreign_key_is_many_to_one() {
    let graph = resolve(&shop_catalog()).expect("resolve");

    let order = graph.get("order").expect("order");
    let forward = order.foreign_key_for("customer_id").expect("forward edge");
    assert_eq!(forward.cardinality, Cardinality::ManyToOne);
    assert_eq!(forward.local_name, "customer");
    assert_eq!(forward.remote_back_reference_name, "orders");
    assert_eq!(forward.target_class_name, "Customer");

    let customer = graph.get("customer").expect("customer");
    let reverse = customer.reverse_edges().next().expect("reverse edge");
    assert_eq!(reverse.local_name, "orders");
    assert_eq!(reverse.source_class_name, "Order");
    assert!(reverse.uses_list);
}

#[test]
fn colliding_edges_are_suffixed_symmetrically() {
    let graph = resolve(&shop_catalog()).expect("resolve");

    let fixture = graph.get("fixture").expect("fixture");
    let names: Vec<&str> = fixture.forward_edges().map(|e| e.local_name.as_str()).collect();
    assert_eq!(names, vec!["team_via_home_team_id", "team_via_away_team_id"]);

    let team = graph.get("team").expect("team");
    let names: Vec<&str> = team.reverse_edges().map(|e| e.local_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["fixtures_for_home_team_id", "fixtures_for_away_team_id"]
    );
}

#[test]
fn column_defaults_are_normalized() {
    let graph = resolve(&shop_catalog()).expect("resolve");
    let customer = graph.get("customer").expect("customer");

    assert_eq!(
        customer.column("id").and_then(|c| c.default.clone()),
        Some(DefaultValue::Sequence {
            name: "customer_id_seq".to_string()
        })
    );
    assert_eq!(
        customer.column("status").and_then(|c| c.default.clone()),
        Some(DefaultValue::String("active".to_string()))
    );
    assert_eq!(
        customer.column("created_at").and_then(|c| c.default.clone()),
        Some(DefaultValue::CurrentTimestamp)
    );
    assert_eq!(customer.column("status").and_then(|c| c.length), Some(20));
}

#[test]
fn composite_foreign_key_is_rejected_without_output() {
    let mut catalog = shop_catalog();
    let order = catalog.tables.get_mut("order").expect("order");
    order.foreign_keys[0].constrained_columns = vec!["customer_id".to_string(), "id".to_string()];
    order.foreign_keys[0].referred_columns = vec!["id".to_string(), "status".to_string()];

    let result = resolve(&catalog);
    match result {
        Err(Error::UnsupportedSchema { table, message }) => {
            assert_eq!(table, "order");
            assert!(message.contains("order_customer_id_fkey"));
        }
        other => panic!("expected unsupported schema error, got {other:?}"),
    }
}

#[test]
fn missing_reference_is_an_integrity_error() {
    let mut catalog = shop_catalog();
    catalog
        .tables
        .get_mut("order")
        .expect("order")
        .foreign_keys[0]
        .referred_table = "client".to_string();

    let err = resolve(&catalog).expect_err("missing table must fail");
    assert!(matches!(err, Error::SchemaIntegrity(message) if message.contains("client")));

    let mut catalog = shop_catalog();
    catalog
        .tables
        .get_mut("order")
        .expect("order")
        .foreign_keys[0]
        .referred_columns = vec!["uuid".to_string()];

    let err = resolve(&catalog).expect_err("missing column must fail");
    assert!(matches!(err, Error::SchemaIntegrity(message) if message.contains("customer.uuid")));
}

#[test]
fn catalog_sources_load_the_same_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("catalog.json");
    fs::write(
        &path,
        serde_json::to_vec_pretty(&shop_catalog()).expect("encode catalog"),
    )
    .expect("write catalog");

    let from_file = JsonCatalogSource::new(&path).load().expect("load json");
    let from_memory = InMemoryCatalog::new(shop_catalog()).load().expect("load memory");

    let left = resolve(&from_file).expect("resolve file");
    let right = resolve(&from_memory).expect("resolve memory");
    assert_eq!(left, right);

    let missing = JsonCatalogSource::new(dir.path().join("absent.json")).load();
    assert!(matches!(missing, Err(Error::Catalog(_))));
}
