//! Request Tracker
//!
//! Tracks the lifecycle of single-entity requests (by slug) and list
//! requests (by query key).

use crate::error::TransportError;
use crate::query::QueryKey;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Lifecycle of the latest request for a tracked key
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    /// Never requested
    #[default]
    Idle,
    /// Request in flight
    Pending { since: DateTime<Utc> },
    /// Last request completed
    Succeeded { at: DateTime<Utc> },
    /// Last request failed
    Failed {
        error: TransportError,
        at: DateTime<Utc>,
    },
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Short label for logs and CLI output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending { .. } => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed { .. } => "failed",
        }
    }
}

static IDLE: RequestState = RequestState::Idle;

/// Per-slug and per-query request state
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    entities: HashMap<String, RequestState>,
    queries: HashMap<QueryKey, RequestState>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity_started(&mut self, slug: &str) {
        self.entities
            .insert(slug.to_string(), RequestState::Pending { since: Utc::now() });
    }

    pub fn entity_succeeded(&mut self, slug: &str) {
        self.entities
            .insert(slug.to_string(), RequestState::Succeeded { at: Utc::now() });
    }

    pub fn entity_failed(&mut self, slug: &str, error: TransportError) {
        self.entities.insert(
            slug.to_string(),
            RequestState::Failed {
                error,
                at: Utc::now(),
            },
        );
    }

    pub fn query_started(&mut self, key: &QueryKey) {
        self.queries
            .insert(key.clone(), RequestState::Pending { since: Utc::now() });
    }

    pub fn query_succeeded(&mut self, key: &QueryKey) {
        self.queries
            .insert(key.clone(), RequestState::Succeeded { at: Utc::now() });
    }

    pub fn query_failed(&mut self, key: &QueryKey, error: TransportError) {
        self.queries.insert(
            key.clone(),
            RequestState::Failed {
                error,
                at: Utc::now(),
            },
        );
    }

    pub fn entity_state(&self, slug: &str) -> &RequestState {
        self.entities.get(slug).unwrap_or(&IDLE)
    }

    pub fn query_state(&self, key: &QueryKey) -> &RequestState {
        self.queries.get(key).unwrap_or(&IDLE)
    }

    /// Number of requests currently in flight
    pub fn pending_count(&self) -> usize {
        self.entities
            .values()
            .chain(self.queries.values())
            .filter(|state| state.is_pending())
            .count()
    }
}
