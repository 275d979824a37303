//! Resource Store
//!
//! Combines the cache and request tracker of one resource kind and applies
//! [`Action`]s to them. [`Store`] shares that state between concurrent
//! fetches; each dispatch takes the write lock for exactly one transition.

use crate::action::Action;
use crate::cache::{CacheState, Entity, EntityId};
use crate::resource::ResourceDef;
use crate::tracker::RequestTracker;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Complete client-side state of one resource kind
#[derive(Debug, Clone)]
pub struct ResourceState {
    def: Arc<ResourceDef>,
    cache: CacheState,
    tracker: RequestTracker,
}

impl ResourceState {
    pub fn new(def: Arc<ResourceDef>) -> Self {
        Self {
            cache: CacheState::new(def.clone()),
            tracker: RequestTracker::new(),
            def,
        }
    }

    pub fn with_query_capacity(mut self, capacity: usize) -> Self {
        self.cache = self.cache.with_query_capacity(capacity);
        self
    }

    pub fn def(&self) -> &ResourceDef {
        &self.def
    }

    pub fn cache(&self) -> &CacheState {
        &self.cache
    }

    pub fn tracker(&self) -> &RequestTracker {
        &self.tracker
    }

    /// Apply one transition. Never fails.
    pub fn apply(&mut self, action: &Action) {
        match action {
            Action::EntityRequest { slug } => self.tracker.entity_started(slug),
            Action::EntityRequestSuccess { slug, id } => {
                self.tracker.entity_succeeded(slug);
                self.cache.on_slug_resolved(slug, id.clone());
            }
            Action::EntityRequestFailure { slug, error } => {
                self.tracker.entity_failed(slug, error.clone());
            }
            Action::EntitiesReceived { entities } => self.cache.on_entities_received(entities),
            Action::QueryRequest { query } => self.tracker.query_started(&self.def.key(query)),
            Action::QueryRequestSuccess {
                query,
                entities,
                total,
            } => {
                self.cache.on_query_fetch_succeeded(query, entities, *total);
                self.tracker.query_succeeded(&self.def.key(query));
            }
            Action::QueryRequestFailure { query, error } => {
                self.tracker.query_failed(&self.def.key(query), error.clone());
            }
        }
    }

    /// Drop one cached entity, leaving query and slug indexes as they are
    pub fn evict_entity(&mut self, id: &EntityId) -> Option<Entity> {
        tracing::debug!("Evicting {} entity {}", self.def.display_name, id);
        self.cache.evict_entity(id)
    }

    /// Consuming form of [`apply`](Self::apply)
    pub fn reduce(mut self, action: &Action) -> Self {
        self.apply(action);
        self
    }
}

/// Shared handle to a [`ResourceState`]
#[derive(Debug, Clone)]
pub struct Store {
    state: Arc<RwLock<ResourceState>>,
}

impl Store {
    pub fn new(state: ResourceState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn dispatch(&self, action: Action) {
        tracing::debug!("dispatch {}", action.name());
        self.state.write().await.apply(&action);
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, ResourceState> {
        self.state.read().await
    }

    /// Run a selector against the current state
    pub async fn select<R>(&self, selector: impl FnOnce(&ResourceState) -> R) -> R {
        let state = self.state.read().await;
        selector(&state)
    }
}
