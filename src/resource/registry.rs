//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the REST resource definitions from embedded JSON files
//! and provides lookup functions for the rest of the crate.

use crate::query::{self, Query, QueryKey};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[include_str!("../resources/wordpress.json")];

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub display_name: String,
    /// Collection path below the API root, e.g. `/wp/v2/pages`
    pub endpoint: String,
    #[serde(default = "default_id_field")]
    pub id_field: String,
    #[serde(default = "default_slug_field")]
    pub slug_field: String,
    /// Response header carrying the total number of matches
    pub count_header: String,
    /// Parameters the server applies anyway; stripped before keying
    #[serde(default)]
    pub default_query: Query,
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_slug_field() -> String {
    "slug".to_string()
}

impl ResourceDef {
    /// Normalize a query against this resource's defaults
    pub fn normalize(&self, query: &Query) -> Query {
        query::normalize(query, &self.default_query)
    }

    /// Cache key of a query for this resource
    pub fn key(&self, query: &Query) -> QueryKey {
        query::serialize(query, &self.default_query)
    }
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get all resource keys, sorted
pub fn get_all_resource_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = get_registry()
        .resources
        .keys()
        .map(|s| s.as_str())
        .collect();
    keys.sort_unstable();
    keys
}
