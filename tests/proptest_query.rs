//! Property-based tests using proptest
//!
//! These tests verify query normalization, cache key canonicalization and
//! cache transitions using randomized inputs.

use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use wpcache::query::{normalize, serialize};
use wpcache::{get_resource, selectors, Action, Entity, Query, ResourceState, Store};

/// Generate an arbitrary scalar parameter value
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i32>().prop_map(|n| json!(n)),
        any::<bool>().prop_map(|b| json!(b)),
        "[a-zA-Z0-9 _-]{0,12}".prop_map(|s| json!(s)),
    ]
}

/// Generate parameter pairs, sometimes reusing default names and values
fn arb_pairs() -> impl Strategy<Value = Vec<(String, Value)>> {
    let default_pair = prop_oneof![
        Just(("_embed".to_string(), json!(true))),
        Just(("number".to_string(), json!(10))),
        Just(("offset".to_string(), json!(0))),
        Just(("order".to_string(), json!("ASC"))),
    ];
    let random_pair = ("[a-z_]{1,8}", arb_scalar());
    prop::collection::vec(prop_oneof![default_pair, random_pair], 0..8)
}

fn build(pairs: &[(String, Value)]) -> Query {
    let mut query = Query::new();
    for (key, value) in pairs {
        query.insert(key, value.clone());
    }
    query
}

fn defaults() -> Query {
    get_resource("children").unwrap().default_query.clone()
}

/// Entity lists with unique ids, in random order
fn arb_entities() -> impl Strategy<Value = Vec<Entity>> {
    prop::collection::hash_set(0i64..1000, 0..20)
        .prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(|ids| {
            ids.into_iter()
                .map(|id| Entity::from_value(json!({"id": id, "slug": format!("s-{}", id)})).unwrap())
                .collect()
        })
}

fn ids(list: &[&Entity]) -> Vec<Value> {
    list.iter().map(|e| e.get("id").cloned().unwrap_or(Value::Null)).collect()
}

proptest! {
    /// Normalizing twice gives the same result as normalizing once
    #[test]
    fn normalize_is_idempotent(pairs in arb_pairs()) {
        let query = build(&pairs);
        let once = normalize(&query, &defaults());
        let twice = normalize(&once, &defaults());
        prop_assert_eq!(once, twice);
    }

    /// Normalization never adds parameters and leaves no default behind
    #[test]
    fn normalize_only_removes_defaults(pairs in arb_pairs()) {
        let query = build(&pairs);
        let defaults = defaults();
        let normalized = normalize(&query, &defaults);

        prop_assert!(normalized.len() <= query.len());
        for (key, value) in normalized.iter() {
            prop_assert_eq!(query.get(key), Some(value));
            prop_assert_ne!(defaults.get(key), Some(value));
        }
    }

    /// Building the same parameters in reverse order yields the same key
    #[test]
    fn key_is_order_independent(pairs in arb_pairs()) {
        let mut unique: Vec<(String, Value)> = Vec::new();
        for (key, value) in pairs {
            if !unique.iter().any(|(k, _)| *k == key) {
                unique.push((key, value));
            }
        }
        let forward = build(&unique);
        unique.reverse();
        let backward = build(&unique);

        prop_assert_eq!(serialize(&forward, &defaults()), serialize(&backward, &defaults()));
    }

    /// Keys are fully lower-cased
    #[test]
    fn key_is_lower_case(pairs in arb_pairs()) {
        let key = serialize(&build(&pairs), &defaults());
        prop_assert_eq!(key.as_str().to_lowercase(), key.as_str());
    }

    /// A key depends only on the normalized query
    #[test]
    fn key_ignores_default_parameters(pairs in arb_pairs()) {
        let query = build(&pairs);
        let normalized = normalize(&query, &defaults());
        prop_assert_eq!(serialize(&query, &defaults()), serialize(&normalized, &defaults()));
    }

    /// A second successful fetch fully replaces the first id list
    #[test]
    fn query_index_is_replaced(first in arb_entities(), second in arb_entities(), page in 1i64..50) {
        let def = Arc::new(get_resource("pages").unwrap().clone());
        let query = Query::new().with("paged", page);

        let state = ResourceState::new(def)
            .reduce(&Action::EntitiesReceived { entities: first.clone() })
            .reduce(&Action::QueryRequestSuccess { query: query.clone(), entities: first, total: 1 })
            .reduce(&Action::EntitiesReceived { entities: second.clone() })
            .reduce(&Action::QueryRequestSuccess { query: query.clone(), entities: second.clone(), total: 1 });

        let list = selectors::get_entities_for_query(&state, &query).unwrap();
        let expected: Vec<&Entity> = second.iter().collect();
        prop_assert_eq!(ids(&list), ids(&expected));
    }

    /// Fields not present in a later payload survive the merge
    #[test]
    fn cached_fields_survive_partial_updates(
        id in 0i64..100,
        extra in "[a-z]{1,8}",
        title in "[a-zA-Z ]{0,16}",
    ) {
        let def = Arc::new(get_resource("pages").unwrap().clone());
        let full = Entity::from_value(json!({"id": id, "extra": extra.clone(), "title": "old"})).unwrap();
        let partial = Entity::from_value(json!({"id": id, "title": title.clone()})).unwrap();

        let state = ResourceState::new(def)
            .reduce(&Action::EntitiesReceived { entities: vec![full] })
            .reduce(&Action::EntitiesReceived { entities: vec![partial] });

        let cached = selectors::get_entity(&state, &id.into()).unwrap();
        prop_assert_eq!(cached.get("extra"), Some(&json!(extra)));
        prop_assert_eq!(cached.get("title"), Some(&json!(title)));
    }

    /// Unfetched queries always report the default total through the shared store
    #[test]
    fn unfetched_total_is_default(pairs in arb_pairs()) {
        let def = Arc::new(get_resource("children").unwrap().clone());
        let store = Store::new(ResourceState::new(def));
        let query = build(&pairs);

        let total = tokio_test::block_on(store.select(|state| selectors::get_total_for_query(state, &query)));
        prop_assert_eq!(total, wpcache::DEFAULT_TOTAL);
    }
}
