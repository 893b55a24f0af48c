//! Client runtime shared by all references
//!
//! The runtime bundles the process-wide collaborators: the outgoing
//! connection factory, the router and locator managers, and the shuffle
//! source used when ordering endpoint candidates. Seeding the shuffle
//! source through [`RuntimeConfig`] makes candidate ordering
//! deterministic without touching the resolution logic.

use crate::connection::OutgoingConnectionFactory;
use crate::locator::LocatorManager;
use crate::router::RouterManager;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Seed for the endpoint shuffle source; random when unset
    pub rng_seed: Option<u64>,
    /// Default security requirement for newly created references
    pub default_secure: bool,
    /// Default collocation-optimization hint for newly created references
    pub default_collocation_optimized: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rng_seed: None,
            default_secure: false,
            default_collocation_optimized: true,
        }
    }
}

/// Shared client runtime
pub struct Runtime {
    config: RuntimeConfig,
    connection_factory: Arc<dyn OutgoingConnectionFactory>,
    router_manager: RouterManager,
    locator_manager: LocatorManager,
    rng: Mutex<StdRng>,
}

impl Runtime {
    /// Create a runtime around a connection factory
    pub fn new(
        connection_factory: Arc<dyn OutgoingConnectionFactory>,
        config: RuntimeConfig,
    ) -> Arc<Self> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Arc::new(Self {
            config,
            connection_factory,
            router_manager: RouterManager::new(),
            locator_manager: LocatorManager::new(),
            rng: Mutex::new(rng),
        })
    }

    /// Runtime configuration
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The pooled connection factory
    pub fn connection_factory(&self) -> &Arc<dyn OutgoingConnectionFactory> {
        &self.connection_factory
    }

    /// The router manager
    pub fn router_manager(&self) -> &RouterManager {
        &self.router_manager
    }

    /// The locator manager
    pub fn locator_manager(&self) -> &LocatorManager {
        &self.locator_manager
    }

    /// Uniformly shuffle a candidate slice in place
    pub fn shuffle<T>(&self, items: &mut [T]) {
        let mut rng = self.rng.lock().unwrap();
        items.shuffle(&mut *rng);
    }
}
