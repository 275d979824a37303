//! Resource cache
//!
//! Holds every entity received for one resource kind, keyed by id, plus the
//! ordered id list and total count returned for each query. The cache only
//! changes through the `on_*` transitions; reads never fail and tolerate an
//! empty cache.

mod entity;

pub use entity::{Entity, EntityId};

use crate::query::{Query, QueryKey};
use crate::resource::ResourceDef;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Total reported for a query that has no usable count
pub const DEFAULT_TOTAL: u64 = 1;

/// Entity store and query index for a single resource kind
#[derive(Debug, Clone)]
pub struct CacheState {
    def: Arc<ResourceDef>,
    items: HashMap<EntityId, Entity>,
    queries: HashMap<QueryKey, Vec<EntityId>>,
    totals: HashMap<QueryKey, u64>,
    slugs: HashMap<String, EntityId>,
    /// Maximum number of indexed queries, `None` for unbounded
    query_capacity: Option<usize>,
    /// Indexed query keys, least recently written first
    query_order: VecDeque<QueryKey>,
}

impl CacheState {
    pub fn new(def: Arc<ResourceDef>) -> Self {
        Self {
            def,
            items: HashMap::new(),
            queries: HashMap::new(),
            totals: HashMap::new(),
            slugs: HashMap::new(),
            query_capacity: None,
            query_order: VecDeque::new(),
        }
    }

    /// Bound the number of indexed queries.
    ///
    /// Once more than `capacity` queries are indexed, the one written longest
    /// ago loses its id list and total. Entities and slugs are kept.
    pub fn with_query_capacity(mut self, capacity: usize) -> Self {
        self.query_capacity = Some(capacity.max(1));
        self
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Upsert received entities by id (shallow merge) and index their slugs
    pub fn on_entities_received(&mut self, entities: &[Entity]) {
        for entity in entities {
            let Some(id) = entity.id(&self.def.id_field) else {
                tracing::warn!(
                    "Skipping {} entity without '{}' field",
                    self.def.display_name,
                    self.def.id_field
                );
                continue;
            };

            if let Some(slug) = entity.slug(&self.def.slug_field) {
                self.slugs.insert(slug.to_string(), id.clone());
            }

            match self.items.get_mut(&id) {
                Some(cached) => cached.merge(entity),
                None => {
                    self.items.insert(id, entity.clone());
                }
            }
        }
    }

    /// Replace the id list and total for a query
    pub fn on_query_fetch_succeeded(&mut self, query: &Query, entities: &[Entity], total: u64) {
        let key = self.def.key(query);
        let ids: Vec<EntityId> = entities
            .iter()
            .filter_map(|entity| entity.id(&self.def.id_field))
            .collect();

        tracing::debug!("Indexing {} ids for query {}", ids.len(), key);

        self.queries.insert(key.clone(), ids);
        self.totals.insert(key.clone(), total);
        self.touch(key);
    }

    /// Point a slug at an entity id
    pub fn on_slug_resolved(&mut self, slug: &str, id: EntityId) {
        self.slugs.insert(slug.to_string(), id);
    }

    /// Drop an entity from the store; slug and query indexes keep their ids
    pub fn evict_entity(&mut self, id: &EntityId) -> Option<Entity> {
        self.items.remove(id)
    }

    fn touch(&mut self, key: QueryKey) {
        self.query_order.retain(|k| k != &key);
        self.query_order.push_back(key);

        let Some(capacity) = self.query_capacity else {
            return;
        };
        while self.query_order.len() > capacity {
            if let Some(oldest) = self.query_order.pop_front() {
                tracing::debug!("Evicting query {}", oldest);
                self.queries.remove(&oldest);
                self.totals.remove(&oldest);
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn get_entity(&self, id: &EntityId) -> Option<&Entity> {
        self.items.get(id)
    }

    /// Entities for a query in server order, or `None` if it was never fetched.
    ///
    /// Ids whose entity is no longer cached are skipped, so the list may be
    /// shorter than the original response.
    pub fn get_entities_for_query(&self, query: &Query) -> Option<Vec<&Entity>> {
        let ids = self.queries.get(&self.def.key(query))?;
        Some(ids.iter().filter_map(|id| self.items.get(id)).collect())
    }

    /// Total matches for a query; [`DEFAULT_TOTAL`] when unknown
    pub fn get_total_for_query(&self, query: &Query) -> u64 {
        match self.get_known_total_for_query(query) {
            Some(total) if total > 0 => total,
            _ => DEFAULT_TOTAL,
        }
    }

    /// Total matches for a query, `None` until a list fetch succeeded
    pub fn get_known_total_for_query(&self, query: &Query) -> Option<u64> {
        self.totals.get(&self.def.key(query)).copied()
    }

    pub fn get_id_for_slug(&self, slug: &str) -> Option<&EntityId> {
        self.slugs.get(slug)
    }

    pub fn entity_count(&self) -> usize {
        self.items.len()
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }
}
