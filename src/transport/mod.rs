//! Transport boundary
//!
//! The cache engine never talks to the network directly. It is handed a
//! [`Transport`] at construction, which performs the list and count calls.
//!
//! # Module Structure
//!
//! - [`http`] - `reqwest` implementation against a WordPress REST API

pub mod http;

pub use http::HttpTransport;

use crate::cache::Entity;
use crate::error::TransportError;
use crate::query::Query;
use async_trait::async_trait;

/// Network collaborator used by the fetch orchestrator
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a collection endpoint and return its entities in response order
    async fn list(&self, endpoint: &str, query: &Query) -> Result<Vec<Entity>, TransportError>;

    /// Read the total match count from `header` of a HEAD request.
    ///
    /// Implementations return [`DEFAULT_TOTAL`](crate::cache::DEFAULT_TOTAL)
    /// when the header is missing, unparseable or zero.
    async fn count(&self, endpoint: &str, header: &str, query: &Query) -> Result<u64, TransportError>;
}
