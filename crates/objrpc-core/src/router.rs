//! Router indirection
//!
//! A router forwards all client traffic through its own client-facing
//! endpoints. [`RouterInfo`] is the local handle the core consults during
//! resolution: it caches the router's client endpoints after the first
//! lookup and carries the callback adapter bound to new connections so
//! that return traffic from the router can be dispatched.

use crate::connection::ObjectAdapter;
use crate::endpoint::Endpoint;
use crate::types::Identity;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Remote router boundary.
///
/// Implementations are internally thread-safe; lookups may block on
/// network I/O.
#[async_trait]
pub trait Router: Send + Sync {
    /// Identity of the router object itself
    fn identity(&self) -> &Identity;

    /// The router's client-facing endpoints; all routed traffic goes here
    async fn get_client_endpoints(&self) -> Result<Vec<Endpoint>>;
}

/// Local state for one router: endpoint cache and callback adapter
pub struct RouterInfo {
    router: Arc<dyn Router>,
    client_endpoints: tokio::sync::Mutex<Option<Vec<Endpoint>>>,
    adapter: Mutex<Option<Arc<dyn ObjectAdapter>>>,
}

impl RouterInfo {
    /// Create an info wrapper for a router
    pub fn new(router: Arc<dyn Router>) -> Self {
        Self {
            router,
            client_endpoints: tokio::sync::Mutex::new(None),
            adapter: Mutex::new(None),
        }
    }

    /// The underlying router
    pub fn router(&self) -> &Arc<dyn Router> {
        &self.router
    }

    /// The router's client endpoints, fetched once and cached.
    ///
    /// The lock is held across the lookup so concurrent references do not
    /// issue duplicate remote calls.
    pub async fn get_client_endpoints(&self) -> Result<Vec<Endpoint>> {
        let mut cached = self.client_endpoints.lock().await;
        if let Some(endpoints) = cached.as_ref() {
            return Ok(endpoints.clone());
        }

        let endpoints = self.router.get_client_endpoints().await?;
        debug!(
            router = %self.router.identity(),
            count = endpoints.len(),
            "fetched router client endpoints"
        );
        *cached = Some(endpoints.clone());
        Ok(endpoints)
    }

    /// The adapter receiving callbacks from this router, if one was set
    pub fn get_adapter(&self) -> Option<Arc<dyn ObjectAdapter>> {
        self.adapter.lock().unwrap().clone()
    }

    /// Set the adapter receiving callbacks from this router
    pub fn set_adapter(&self, adapter: Option<Arc<dyn ObjectAdapter>>) {
        *self.adapter.lock().unwrap() = adapter;
    }
}

impl PartialEq for RouterInfo {
    fn eq(&self, other: &Self) -> bool {
        self.router.identity() == other.router.identity()
    }
}

impl Eq for RouterInfo {}

/// One [`RouterInfo`] per router identity, created on demand
#[derive(Default)]
pub struct RouterManager {
    table: Mutex<HashMap<Identity, Arc<RouterInfo>>>,
}

impl RouterManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Info for the given router, creating it if not seen before.
    /// `None` passes through as `None`.
    pub fn get(&self, router: Option<Arc<dyn Router>>) -> Option<Arc<RouterInfo>> {
        let router = router?;
        let mut table = self.table.lock().unwrap();
        let info = table
            .entry(router.identity().clone())
            .or_insert_with(|| Arc::new(RouterInfo::new(router)));
        Some(info.clone())
    }

    /// Drop all router state
    pub fn clear(&self) {
        self.table.lock().unwrap().clear();
    }
}
