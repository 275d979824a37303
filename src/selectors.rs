//! Selectors
//!
//! Read-only accessors over a [`ResourceState`]. None of them fail; an empty
//! state yields `false`, `None` or the default total.

use crate::cache::{Entity, EntityId};
use crate::query::Query;
use crate::store::ResourceState;
use crate::tracker::RequestState;

pub fn get_entity<'a>(state: &'a ResourceState, id: &EntityId) -> Option<&'a Entity> {
    state.cache().get_entity(id)
}

/// Entities for a query, `None` if the query was never fetched
pub fn get_entities_for_query<'a>(state: &'a ResourceState, query: &Query) -> Option<Vec<&'a Entity>> {
    state.cache().get_entities_for_query(query)
}

/// Total matches for a query, 1 when unknown
pub fn get_total_for_query(state: &ResourceState, query: &Query) -> u64 {
    state.cache().get_total_for_query(query)
}

/// Total matches for a query, `None` when unknown
pub fn get_known_total_for_query(state: &ResourceState, query: &Query) -> Option<u64> {
    state.cache().get_known_total_for_query(query)
}

pub fn is_requesting_entity(state: &ResourceState, slug: &str) -> bool {
    state.tracker().entity_state(slug).is_pending()
}

pub fn is_requesting_query(state: &ResourceState, query: &Query) -> bool {
    query_request_state(state, query).is_pending()
}

pub fn entity_request_state<'a>(state: &'a ResourceState, slug: &str) -> &'a RequestState {
    state.tracker().entity_state(slug)
}

pub fn query_request_state<'a>(state: &'a ResourceState, query: &Query) -> &'a RequestState {
    state.tracker().query_state(&state.def().key(query))
}

/// Id recorded for a slug. May point at an entity that is no longer cached.
pub fn get_entity_id_from_slug<'a>(state: &'a ResourceState, slug: &str) -> Option<&'a EntityId> {
    state.cache().get_id_for_slug(slug)
}

/// Entity for a slug, if both the slug and the entity are known
pub fn get_entity_by_slug<'a>(state: &'a ResourceState, slug: &str) -> Option<&'a Entity> {
    get_entity_id_from_slug(state, slug).and_then(|id| get_entity(state, id))
}
