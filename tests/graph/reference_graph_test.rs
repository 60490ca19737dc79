// tests/graph/reference_graph_test.rs
#[path = "../common/mod.rs"]
mod common;

use domain_filter::graph::{ReferenceChain, ReferenceGraph};
use serde_json::{json, Value};

fn chains_of(registry: &domain_filter::registry::Registry, entity: &str, raw: Value) -> Vec<String> {
    let parsed = registry.parse_filter(entity, &raw).unwrap();
    ReferenceGraph::build(&parsed)
        .chains()
        .iter()
        .map(ReferenceChain::to_string)
        .collect()
}

#[test]
fn test_flat_filter_has_no_chains() {
    let registry = common::recruiting();
    let parsed = registry
        .parse_filter("user", &json!({"email": {"equals": "a@b.com"}}))
        .unwrap();
    let graph = ReferenceGraph::build(&parsed);
    assert_eq!(graph.root(), "user");
    assert_eq!(graph.entity_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.chains().is_empty());
}

#[test]
fn test_one_level() {
    let registry = common::recruiting();
    assert_eq!(
        chains_of(
            registry,
            "user",
            json!({"address": {"state": {"equals": "CA"}}})
        ),
        ["user -> address"]
    );
}

#[test]
fn test_null_reference_still_forms_chain() {
    let registry = common::recruiting();
    assert_eq!(
        chains_of(registry, "user", json!({"address": null})),
        ["user -> address"]
    );
}

#[test]
fn test_two_levels_and_siblings() {
    let registry = common::recruiting();
    let chains = chains_of(
        registry,
        "conversationRequirements",
        json!({
            "conversation": {"application": {"status": {"equals": "hired"}}},
            "jobRequirements": {"priority": {"lessThan": 3}}
        }),
    );
    assert_eq!(
        chains,
        [
            "conversationRequirements -> conversation -> application",
            "conversationRequirements -> jobRequirements",
        ]
    );
}

#[test]
fn test_mutual_reference_terminates() {
    let registry = common::mutual_registry();
    let chains = chains_of(
        &registry,
        "a",
        json!({"b": {"a": {"id": {"equals": "x"}}}}),
    );
    assert_eq!(chains, ["a -> b"]);

    let deep = json!({"b": {"a": {"b": {"a": {"b": {"score": {"greaterThan": 1}}}}}}});
    assert_eq!(chains_of(&registry, "a", deep), ["a -> b"]);
}

#[test]
fn test_diamond_yields_both_paths() {
    let registry = common::diamond_registry();
    let raw = json!({
        "left": {"leaf": {"id": {"equals": "from-left"}}},
        "right": {"leaf": {"tip": {"label": {"equals": "t"}}}}
    });
    let parsed = registry.parse_filter("root", &raw).unwrap();
    let graph = ReferenceGraph::build(&parsed);

    assert_eq!(graph.neighbors("root"), ["left", "right"]);
    assert_eq!(graph.neighbors("left"), ["leaf"]);
    assert_eq!(graph.neighbors("right"), ["leaf"]);
    // `leaf` is expanded once, from the first nested filter that reached it.
    assert!(graph.neighbors("leaf").is_empty());
    assert!(!graph.contains("tip"));

    let chains: Vec<String> = graph.chains().iter().map(ToString::to_string).collect();
    assert_eq!(chains, ["root -> left -> leaf", "root -> right -> leaf"]);
}

#[test]
fn test_reference_to_expanded_entity_records_no_edge() {
    let registry = common::diamond_registry();
    let raw = json!({
        "leaf": {"id": {"equals": "direct"}},
        "left": {"leaf": {"id": {"equals": "late"}}, "weight": {"greaterThan": 1}}
    });
    let parsed = registry.parse_filter("root", &raw).unwrap();
    let graph = ReferenceGraph::build(&parsed);

    // `leaf` is expanded straight from the root, before `left` is.
    let adjacency = graph.adjacency();
    assert_eq!(adjacency["root"], ["leaf", "left"]);
    assert!(adjacency["left"].is_empty());

    let chains: Vec<String> = graph.chains().iter().map(ToString::to_string).collect();
    assert_eq!(chains, ["root -> leaf", "root -> left"]);
}

#[test]
fn test_same_level_siblings_both_reach_entity() {
    let registry = common::diamond_registry();
    let raw = json!({
        "right": {"leaf": {"id": {"equals": "a"}}},
        "left": {"leaf": {"id": {"equals": "b"}}}
    });
    let parsed = registry.parse_filter("root", &raw).unwrap();
    let graph = ReferenceGraph::build(&parsed);
    assert_eq!(graph.neighbors("right"), ["leaf"]);
    assert_eq!(graph.neighbors("left"), ["leaf"]);
}

#[test]
fn test_unknown_entity_has_no_neighbors() {
    let registry = common::mutual_registry();
    let parsed = registry.parse_filter("a", &json!({})).unwrap();
    let graph = ReferenceGraph::build(&parsed);
    assert!(graph.neighbors("zzz").is_empty());
    assert_eq!(graph.adjacency().len(), 1);
}
