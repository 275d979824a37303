//! Query normalization and key serialization

use super::{Query, QueryKey};
use serde_json::{Map, Value};

/// Drop every parameter whose value equals the resource default for that name.
///
/// Equality is strict: `10` and `"10"` are different values.
pub fn normalize(query: &Query, defaults: &Query) -> Query {
    query
        .iter()
        .filter(|(key, value)| defaults.get(key) != Some(*value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Serialize a query into its lower-cased JSON cache key.
pub fn serialize(query: &Query, defaults: &Query) -> QueryKey {
    let normalized = normalize(query, defaults);

    let map: Map<String, Value> = normalized
        .iter()
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    QueryKey::new(Value::Object(map).to_string().to_lowercase())
}
