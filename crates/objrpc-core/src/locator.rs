//! Locator indirection
//!
//! A locator maps adapter ids to live endpoint sets. [`LocatorInfo`] is
//! the resolution handle the core uses: it consults a per-locator
//! [`LocatorTable`] cache first and reports whether its answer came from
//! the cache, which gates the single stale-cache retry during connection
//! establishment. All proxies to the same locator identity share one
//! table, so an invalidation is seen by every reference.

use crate::endpoint::Endpoint;
use crate::reference::Reference;
use crate::types::Identity;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Remote locator boundary.
///
/// Implementations are internally thread-safe; lookups may block on
/// network I/O.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Identity of the locator object itself
    fn identity(&self) -> &Identity;

    /// Resolve an adapter id to its current endpoints
    async fn find_adapter_endpoints(&self, adapter_id: &str) -> Result<Vec<Endpoint>>;
}

/// Cache of adapter-id resolutions for one locator identity
#[derive(Default)]
pub struct LocatorTable {
    adapter_endpoints: Mutex<HashMap<String, Vec<Endpoint>>>,
}

impl LocatorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached endpoints for an adapter id, if present
    pub fn get_adapter_endpoints(&self, adapter_id: &str) -> Option<Vec<Endpoint>> {
        self.adapter_endpoints
            .lock()
            .unwrap()
            .get(adapter_id)
            .cloned()
    }

    /// Record a resolution
    pub fn add_adapter_endpoints(&self, adapter_id: &str, endpoints: Vec<Endpoint>) {
        self.adapter_endpoints
            .lock()
            .unwrap()
            .insert(adapter_id.to_string(), endpoints);
    }

    /// Remove a cached resolution, returning what was cached
    pub fn remove_adapter_endpoints(&self, adapter_id: &str) -> Option<Vec<Endpoint>> {
        self.adapter_endpoints.lock().unwrap().remove(adapter_id)
    }

    /// Drop every cached resolution
    pub fn clear(&self) {
        self.adapter_endpoints.lock().unwrap().clear();
    }
}

/// Resolution handle for one locator: remote lookup plus shared cache
pub struct LocatorInfo {
    locator: Arc<dyn Locator>,
    table: Arc<LocatorTable>,
}

impl LocatorInfo {
    /// Create an info wrapper around a locator and its cache table
    pub fn new(locator: Arc<dyn Locator>, table: Arc<LocatorTable>) -> Self {
        Self { locator, table }
    }

    /// The underlying locator
    pub fn locator(&self) -> &Arc<dyn Locator> {
        &self.locator
    }

    /// Endpoints for the reference's adapter id, and whether they came
    /// from the cache. A cache miss performs the remote lookup and
    /// populates the cache.
    pub async fn get_endpoints(&self, reference: &Reference) -> Result<(Vec<Endpoint>, bool)> {
        let adapter_id = reference.adapter_id();
        debug_assert!(
            !adapter_id.is_empty(),
            "locator resolution requires an indirect reference"
        );

        if let Some(endpoints) = self.table.get_adapter_endpoints(adapter_id) {
            trace!(adapter = adapter_id, "found endpoints in locator cache");
            return Ok((endpoints, true));
        }

        let endpoints = self.locator.find_adapter_endpoints(adapter_id).await?;
        debug!(
            adapter = adapter_id,
            count = endpoints.len(),
            "resolved adapter endpoints via locator"
        );
        self.table.add_adapter_endpoints(adapter_id, endpoints.clone());
        Ok((endpoints, false))
    }

    /// Invalidate the cached resolution for the reference's adapter id
    pub fn clear_cache(&self, reference: &Reference) {
        if self
            .table
            .remove_adapter_endpoints(reference.adapter_id())
            .is_some()
        {
            trace!(
                adapter = reference.adapter_id(),
                "removed endpoints from locator cache"
            );
        }
    }
}

impl PartialEq for LocatorInfo {
    fn eq(&self, other: &Self) -> bool {
        self.locator.identity() == other.locator.identity()
    }
}

impl Eq for LocatorInfo {}

/// One [`LocatorInfo`] per locator, with one shared [`LocatorTable`] per
/// locator identity
#[derive(Default)]
pub struct LocatorManager {
    table: Mutex<HashMap<Identity, Arc<LocatorInfo>>>,
    locator_tables: Mutex<HashMap<Identity, Arc<LocatorTable>>>,
}

impl LocatorManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Info for the given locator, creating it if not seen before.
    /// `None` passes through as `None`.
    pub fn get(&self, locator: Option<Arc<dyn Locator>>) -> Option<Arc<LocatorInfo>> {
        let locator = locator?;
        let identity = locator.identity().clone();

        let mut table = self.table.lock().unwrap();
        let info = table.entry(identity.clone()).or_insert_with(|| {
            let shared = self
                .locator_tables
                .lock()
                .unwrap()
                .entry(identity)
                .or_insert_with(|| Arc::new(LocatorTable::new()))
                .clone();
            Arc::new(LocatorInfo::new(locator, shared))
        });
        Some(info.clone())
    }

    /// Drop all locator state, including cached resolutions
    pub fn clear(&self) {
        self.table.lock().unwrap().clear();
        self.locator_tables.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_round_trip() {
        let table = LocatorTable::new();
        assert!(table.get_adapter_endpoints("A").is_none());

        let endpoints = vec![Endpoint::tcp("h", 1)];
        table.add_adapter_endpoints("A", endpoints.clone());
        assert_eq!(table.get_adapter_endpoints("A"), Some(endpoints.clone()));

        assert_eq!(table.remove_adapter_endpoints("A"), Some(endpoints));
        assert!(table.get_adapter_endpoints("A").is_none());
        assert!(table.remove_adapter_endpoints("A").is_none());
    }

    #[test]
    fn test_manager_shares_table_per_identity() {
        struct NullLocator(Identity);

        #[async_trait]
        impl Locator for NullLocator {
            fn identity(&self) -> &Identity {
                &self.0
            }

            async fn find_adapter_endpoints(&self, _: &str) -> Result<Vec<Endpoint>> {
                Ok(vec![])
            }
        }

        let manager = LocatorManager::new();
        let a = manager
            .get(Some(Arc::new(NullLocator(Identity::new("L")))))
            .unwrap();
        let b = manager
            .get(Some(Arc::new(NullLocator(Identity::new("L")))))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(manager.get(None).is_none());
    }
}
