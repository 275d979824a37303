//! Fetch trigger
//!
//! Decides whether a consumer whose inputs changed needs a fetch. The
//! decision is a pure function of the previous inputs, the next inputs and
//! the current state, so any event loop can drive it.

use crate::query::Query;
use crate::selectors;
use crate::store::ResourceState;

/// What a consumer currently wants to display
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchInputs {
    /// Set for a single-entity view, unset for a list view
    pub slug: Option<String>,
    pub query: Query,
}

impl FetchInputs {
    pub fn list(query: Query) -> Self {
        Self { slug: None, query }
    }

    pub fn single(slug: &str) -> Self {
        Self {
            slug: Some(slug.to_string()),
            query: Query::new(),
        }
    }
}

/// A fetch the orchestrator should run
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPlan {
    List(Query),
    Single(String),
}

/// Plan a fetch for `next`, or `None` if nothing needs to happen.
///
/// `previous` is `None` on first use. Unchanged inputs never refetch, and a
/// request already pending for the same slug or query is not duplicated.
pub fn plan_fetch(
    previous: Option<&FetchInputs>,
    next: &FetchInputs,
    state: &ResourceState,
) -> Option<FetchPlan> {
    if previous == Some(next) {
        return None;
    }

    match &next.slug {
        Some(slug) if !selectors::is_requesting_entity(state, slug) => {
            tracing::debug!("Request single entity {}", slug);
            Some(FetchPlan::Single(slug.clone()))
        }
        Some(_) => None,
        None if !selectors::is_requesting_query(state, &next.query) => {
            tracing::debug!("Request list using query {}", state.def().key(&next.query));
            Some(FetchPlan::List(next.query.clone()))
        }
        None => None,
    }
}
