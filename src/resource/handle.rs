//! Per-resource composition of store and orchestrator

use super::registry::{get_registry, ResourceDef};
use crate::error::TransportError;
use crate::orchestrator::FetchOrchestrator;
use crate::store::{ResourceState, Store};
use crate::transport::Transport;
use crate::trigger::{plan_fetch, FetchInputs};
use std::collections::HashMap;
use std::sync::Arc;

/// Cache state and fetch workflow for one resource kind
#[derive(Clone)]
pub struct ResourceHandle {
    def: Arc<ResourceDef>,
    orchestrator: FetchOrchestrator,
}

impl ResourceHandle {
    pub fn new(def: ResourceDef, transport: Arc<dyn Transport>, query_capacity: Option<usize>) -> Self {
        let def = Arc::new(def);
        let mut state = ResourceState::new(def.clone());
        if let Some(capacity) = query_capacity {
            state = state.with_query_capacity(capacity);
        }
        let orchestrator = FetchOrchestrator::new(def.clone(), transport, Store::new(state));
        Self { def, orchestrator }
    }

    pub fn def(&self) -> &ResourceDef {
        &self.def
    }

    pub fn store(&self) -> &Store {
        self.orchestrator.store()
    }

    pub fn orchestrator(&self) -> &FetchOrchestrator {
        &self.orchestrator
    }

    /// React to an input change: fetch if the trigger asks for it.
    ///
    /// Returns `None` when no fetch was needed. The tracker is read before the
    /// fetch starts, so concurrent callers can still both fetch.
    pub async fn sync(
        &self,
        previous: Option<&FetchInputs>,
        next: &FetchInputs,
    ) -> Option<Result<(), TransportError>> {
        let plan = self.store().select(|state| plan_fetch(previous, next, state)).await?;
        Some(self.orchestrator.run(plan).await)
    }
}

/// One [`ResourceHandle`] per registered resource kind, sharing a transport
#[derive(Clone, Default)]
pub struct Resources {
    handles: HashMap<String, ResourceHandle>,
}

impl Resources {
    /// Instantiate every resource in the registry
    pub fn from_registry(transport: Arc<dyn Transport>, query_capacity: Option<usize>) -> Self {
        let handles = get_registry()
            .resources
            .iter()
            .map(|(key, def)| {
                (
                    key.clone(),
                    ResourceHandle::new(def.clone(), transport.clone(), query_capacity),
                )
            })
            .collect();
        Self { handles }
    }

    pub fn get(&self, key: &str) -> Option<&ResourceHandle> {
        self.handles.get(key)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
