//! Fetch Orchestrator
//!
//! Runs list and single-entity fetches for one resource kind and reports
//! every step to the [`Store`] as an [`Action`]. Transport failures end in a
//! `*RequestFailure` action; they are also returned to the caller, but the
//! store is already up to date by then.
//!
//! The orchestrator does not deduplicate. Check the tracker first (see
//! [`crate::trigger`]); two callers racing past that check both fetch.

use crate::action::Action;
use crate::cache::{EntityId, DEFAULT_TOTAL};
use crate::error::TransportError;
use crate::query::Query;
use crate::resource::ResourceDef;
use crate::store::Store;
use crate::transport::Transport;
use crate::trigger::FetchPlan;
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

/// Fetch workflow for one resource kind
#[derive(Clone)]
pub struct FetchOrchestrator {
    def: Arc<ResourceDef>,
    transport: Arc<dyn Transport>,
    store: Store,
}

impl FetchOrchestrator {
    pub fn new(def: Arc<ResourceDef>, transport: Arc<dyn Transport>, store: Store) -> Self {
        Self {
            def,
            transport,
            store,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Fetch one page of a collection and its total count
    pub async fn fetch_list(&self, query: Query) -> Result<(), TransportError> {
        let request_id = Uuid::new_v4();
        tracing::info!(
            "[{}] Requesting {} list {}",
            request_id,
            self.def.display_name,
            self.def.key(&query)
        );

        self.store
            .dispatch(Action::QueryRequest {
                query: query.clone(),
            })
            .await;

        let wire_query = query.embedded();

        let entities = match self.transport.list(&self.def.endpoint, &wire_query).await {
            Ok(entities) => entities,
            Err(error) => {
                tracing::warn!("[{}] List request failed: {}", request_id, error);
                self.store
                    .dispatch(Action::QueryRequestFailure {
                        query,
                        error: error.clone(),
                    })
                    .await;
                return Err(error);
            }
        };

        self.store
            .dispatch(Action::EntitiesReceived {
                entities: entities.clone(),
            })
            .await;

        // A failed count does not fail the list
        let total = match self
            .transport
            .count(&self.def.endpoint, &self.def.count_header, &wire_query)
            .await
        {
            Ok(total) => total,
            Err(error) => {
                tracing::warn!(
                    "[{}] Count request failed, using {}: {}",
                    request_id,
                    DEFAULT_TOTAL,
                    error
                );
                DEFAULT_TOTAL
            }
        };

        tracing::info!(
            "[{}] Received {} entities (total {})",
            request_id,
            entities.len(),
            total
        );

        self.store
            .dispatch(Action::QueryRequestSuccess {
                query,
                entities,
                total,
            })
            .await;

        Ok(())
    }

    /// Fetch a single entity by slug; returns its id
    pub async fn fetch_single(&self, slug: &str) -> Result<EntityId, TransportError> {
        let request_id = Uuid::new_v4();
        tracing::info!(
            "[{}] Requesting {} '{}'",
            request_id,
            self.def.display_name,
            slug
        );

        self.store
            .dispatch(Action::EntityRequest {
                slug: slug.to_string(),
            })
            .await;

        match self.resolve_slug(slug).await {
            Ok(id) => {
                tracing::info!("[{}] Resolved '{}' to {}", request_id, slug, id);
                Ok(id)
            }
            Err(error) => {
                tracing::warn!("[{}] Single request failed: {}", request_id, error);
                self.store
                    .dispatch(Action::EntityRequestFailure {
                        slug: slug.to_string(),
                        error: error.clone(),
                    })
                    .await;
                Err(error)
            }
        }
    }

    async fn resolve_slug(&self, slug: &str) -> Result<EntityId, TransportError> {
        let query = Query::new().with(&self.def.slug_field, slug).embedded();
        let entities = self.transport.list(&self.def.endpoint, &query).await?;

        let Some(entity) = entities.into_iter().next() else {
            return Err(TransportError::Empty {
                slug: slug.to_string(),
            });
        };
        let Some(id) = entity.id(&self.def.id_field) else {
            return Err(TransportError::Decode(format!(
                "entity for '{}' has no '{}' field",
                slug, self.def.id_field
            )));
        };

        self.store
            .dispatch(Action::EntitiesReceived {
                entities: vec![entity],
            })
            .await;
        self.store
            .dispatch(Action::EntityRequestSuccess {
                slug: slug.to_string(),
                id: id.clone(),
            })
            .await;

        Ok(id)
    }

    /// Fetch several list queries concurrently
    pub async fn fetch_lists(&self, queries: Vec<Query>) -> Vec<Result<(), TransportError>> {
        join_all(queries.into_iter().map(|query| self.fetch_list(query))).await
    }

    /// Execute a plan produced by [`crate::trigger::plan_fetch`]
    pub async fn run(&self, plan: FetchPlan) -> Result<(), TransportError> {
        match plan {
            FetchPlan::List(query) => self.fetch_list(query).await,
            FetchPlan::Single(slug) => self.fetch_single(&slug).await.map(|_| ()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Entity;
    use crate::resource::get_resource;
    use crate::selectors;
    use crate::store::ResourceState;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// In-memory transport recording every call
    struct FakeTransport {
        list: Result<Value, TransportError>,
        count: Result<u64, TransportError>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn new(list: Result<Value, TransportError>, count: Result<u64, TransportError>) -> Self {
            Self {
                list,
                count,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn list(&self, endpoint: &str, query: &Query) -> Result<Vec<Entity>, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("GET {} {}", endpoint, serde_json::to_string(query).unwrap()));
            self.list
                .clone()
                .map(|body| serde_json::from_value(body).unwrap())
        }

        async fn count(&self, endpoint: &str, header: &str, _query: &Query) -> Result<u64, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("HEAD {} {}", endpoint, header));
            self.count.clone()
        }
    }

    fn orchestrator(transport: Arc<FakeTransport>) -> FetchOrchestrator {
        let def = Arc::new(get_resource("children").unwrap().clone());
        let store = Store::new(ResourceState::new(def.clone()));
        FetchOrchestrator::new(def, transport, store)
    }

    #[tokio::test]
    async fn test_fetch_list_success() {
        let transport = Arc::new(FakeTransport::new(
            Ok(json!([{"id": 2, "slug": "a"}, {"id": 5, "slug": "b"}])),
            Ok(7),
        ));
        let orchestrator = orchestrator(transport.clone());
        let query = Query::new().with("paged", 1);

        orchestrator.fetch_list(query.clone()).await.unwrap();

        let state = orchestrator.store().read().await;
        assert_eq!(selectors::get_entities_for_query(&state, &query).unwrap().len(), 2);
        assert_eq!(selectors::get_total_for_query(&state, &query), 7);
        assert!(!selectors::is_requesting_query(&state, &query));
        assert_eq!(
            selectors::get_entity_id_from_slug(&state, "b"),
            Some(&EntityId::Int(5))
        );

        let calls = transport.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                r#"GET /wp/v2/pages {"_embed":true,"paged":1}"#.to_string(),
                "HEAD /wp/v2/pages X-WP-TotalChildren".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_list_count_failure_falls_back() {
        let transport = Arc::new(FakeTransport::new(
            Ok(json!([{"id": 2}])),
            Err(TransportError::Network("connection reset".to_string())),
        ));
        let orchestrator = orchestrator(transport);
        let query = Query::new().with("paged", 2);

        assert!(orchestrator.fetch_list(query.clone()).await.is_ok());

        let state = orchestrator.store().read().await;
        assert_eq!(selectors::get_total_for_query(&state, &query), DEFAULT_TOTAL);
        assert!(matches!(
            selectors::query_request_state(&state, &query),
            crate::tracker::RequestState::Succeeded { .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_list_failure_is_recorded() {
        let error = TransportError::Status {
            status: 500,
            url: "x".to_string(),
        };
        let transport = Arc::new(FakeTransport::new(Err(error.clone()), Ok(1)));
        let orchestrator = orchestrator(transport.clone());
        let query = Query::new().with("paged", 3);

        assert_eq!(orchestrator.fetch_list(query.clone()).await, Err(error.clone()));

        let state = orchestrator.store().read().await;
        assert!(selectors::get_entities_for_query(&state, &query).is_none());
        assert_eq!(selectors::query_request_state(&state, &query).error(), Some(&error));
        // No count request after a failed list
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_single_success() {
        let transport = Arc::new(FakeTransport::new(
            Ok(json!([{"id": 9, "slug": "about", "title": "About"}])),
            Ok(1),
        ));
        let orchestrator = orchestrator(transport.clone());

        assert_eq!(orchestrator.fetch_single("about").await, Ok(EntityId::Int(9)));

        let state = orchestrator.store().read().await;
        assert!(!selectors::is_requesting_entity(&state, "about"));
        assert_eq!(
            selectors::get_entity_by_slug(&state, "about").and_then(|e| e.get("title")),
            Some(&json!("About"))
        );
        assert_eq!(
            transport.calls.lock().unwrap()[0],
            r#"GET /wp/v2/pages {"_embed":true,"slug":"about"}"#
        );
    }

    #[tokio::test]
    async fn test_fetch_single_empty_result_fails() {
        let transport = Arc::new(FakeTransport::new(Ok(json!([])), Ok(1)));
        let orchestrator = orchestrator(transport);

        let result = orchestrator.fetch_single("missing").await;
        assert_eq!(
            result,
            Err(TransportError::Empty {
                slug: "missing".to_string()
            })
        );

        let state = orchestrator.store().read().await;
        assert!(!selectors::is_requesting_entity(&state, "missing"));
        assert!(selectors::entity_request_state(&state, "missing").error().is_some());
        assert!(selectors::get_entity_id_from_slug(&state, "missing").is_none());
    }

    #[tokio::test]
    async fn test_fetch_lists_runs_every_query() {
        let transport = Arc::new(FakeTransport::new(Ok(json!([{"id": 1}])), Ok(2)));
        let orchestrator = orchestrator(transport);
        let pages: Vec<Query> = (1..=3).map(|n| Query::new().with("paged", n)).collect();

        let results = orchestrator.fetch_lists(pages.clone()).await;
        assert!(results.iter().all(Result::is_ok));

        let state = orchestrator.store().read().await;
        for page in &pages {
            assert_eq!(selectors::get_total_for_query(&state, page), 2);
        }
    }
}
