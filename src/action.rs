//! State transitions dispatched against a resource store

use crate::cache::{Entity, EntityId};
use crate::error::TransportError;
use crate::query::Query;

/// A single transition of a resource's cache and request state
#[derive(Debug, Clone)]
pub enum Action {
    /// Single-entity fetch started
    EntityRequest { slug: String },
    /// Single-entity fetch resolved the slug to `id`
    EntityRequestSuccess { slug: String, id: EntityId },
    EntityRequestFailure { slug: String, error: TransportError },
    /// Entities arrived from any fetch
    EntitiesReceived { entities: Vec<Entity> },
    /// List fetch started
    QueryRequest { query: Query },
    QueryRequestSuccess {
        query: Query,
        entities: Vec<Entity>,
        total: u64,
    },
    QueryRequestFailure { query: Query, error: TransportError },
}

impl Action {
    /// Stable name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::EntityRequest { .. } => "entity/REQUEST",
            Self::EntityRequestSuccess { .. } => "entity/REQUEST_SUCCESS",
            Self::EntityRequestFailure { .. } => "entity/REQUEST_FAILURE",
            Self::EntitiesReceived { .. } => "entities/RECEIVE",
            Self::QueryRequest { .. } => "query/REQUEST",
            Self::QueryRequestSuccess { .. } => "query/REQUEST_SUCCESS",
            Self::QueryRequestFailure { .. } => "query/REQUEST_FAILURE",
        }
    }
}
