//! Client-side query cache for paginated WordPress REST resources.
//!
//! Queries are normalized against per-resource defaults and serialized into
//! canonical keys. Fetched entities are cached by id, result lists are
//! indexed per query key, and request state is tracked per slug and per
//! query. Reads go through [`selectors`].
//!
//! # Module Structure
//!
//! - [`query`] - Query model, normalization and cache keys
//! - [`cache`] - Entity store, query index, slug index
//! - [`tracker`] - In-flight and completed request state
//! - [`action`] / [`store`] - Transitions and the shared state they apply to
//! - [`selectors`] - Read accessors over the state
//! - [`orchestrator`] - Async list and single-entity fetch workflow
//! - [`trigger`] - Pure "should we fetch" decision for changing inputs
//! - [`transport`] - Network boundary and its `reqwest` implementation
//! - [`resource`] - Resource definitions and per-kind handles

pub mod action;
pub mod cache;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod query;
pub mod resource;
pub mod selectors;
pub mod store;
pub mod tracker;
pub mod transport;
pub mod trigger;

pub use action::Action;
pub use cache::{Entity, EntityId, DEFAULT_TOTAL};
pub use error::TransportError;
pub use orchestrator::FetchOrchestrator;
pub use query::{Query, QueryKey};
pub use resource::{get_resource, ResourceDef, ResourceHandle, Resources};
pub use store::{ResourceState, Store};
pub use tracker::RequestState;
pub use transport::{HttpTransport, Transport};
pub use trigger::{plan_fetch, FetchInputs, FetchPlan};
