//! Resource abstraction layer
//!
//! Every REST resource kind is described by a [`ResourceDef`]: its collection
//! endpoint, id and slug fields, default query and count header. Definitions
//! are loaded from JSON at compile time, so a new kind needs no code changes.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`handle`] - Binds a definition to its own store and fetch orchestrator
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wpcache::resource::Resources;
//! use wpcache::transport::HttpTransport;
//!
//! async fn first_page() -> anyhow::Result<()> {
//!     let transport = Arc::new(HttpTransport::new("https://example.com/")?);
//!     let resources = Resources::from_registry(transport, None);
//!     let pages = resources.get("pages").unwrap();
//!     pages.orchestrator().fetch_list(Default::default()).await?;
//!     Ok(())
//! }
//! ```

mod handle;
mod registry;

pub use handle::{ResourceHandle, Resources};
pub use registry::*;
