//! Reference construction
//!
//! The factory is the sole legal constructor of [`Reference`]. It
//! validates the adapter-id/endpoints exclusivity invariant, applies the
//! configured defaults, and interns structurally-equal instances behind a
//! weak cache keyed by structural hash. Interning is an optimization:
//! callers must rely on value equality, never on instance identity.

use crate::connection::Connection;
use crate::endpoint::Endpoint;
use crate::locator::Locator;
use crate::reference::Reference;
use crate::router::Router;
use crate::runtime::Runtime;
use crate::types::{Identity, Mode, ObjRpcError};
use crate::{wire, Result};
use bytes::Buf;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, Weak};

/// The full field set of a reference, as accepted by
/// [`ReferenceFactory::create`]
#[derive(Clone)]
pub struct ReferenceParams {
    /// Identity of the addressed object
    pub identity: Identity,
    /// Request context
    pub context: BTreeMap<String, String>,
    /// Facet name; empty for the default facet
    pub facet: String,
    /// Invocation mode
    pub mode: Mode,
    /// Whether a secure transport is required
    pub secure: bool,
    /// Adapter id; mutually exclusive with `endpoints`
    pub adapter_id: String,
    /// Direct endpoints; mutually exclusive with `adapter_id`
    pub endpoints: Vec<Endpoint>,
    /// Router indirection handle
    pub router_info: Option<Arc<crate::router::RouterInfo>>,
    /// Locator indirection handle
    pub locator_info: Option<Arc<crate::locator::LocatorInfo>>,
    /// Pre-bound connections bypassing endpoint resolution
    pub fixed_connections: Vec<Arc<dyn Connection>>,
    /// Same-process shortcut hint
    pub collocation_optimized: bool,
}

struct FactoryState {
    runtime: Arc<Runtime>,
    cache: Mutex<HashMap<u32, Vec<Weak<Reference>>>>,
    default_router: Mutex<Option<Arc<dyn Router>>>,
    default_locator: Mutex<Option<Arc<dyn Locator>>>,
}

/// Validated construction and interning of references
#[derive(Clone)]
pub struct ReferenceFactory {
    state: Arc<FactoryState>,
}

impl ReferenceFactory {
    /// Create a factory bound to a runtime
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self {
            state: Arc::new(FactoryState {
                runtime,
                cache: Mutex::new(HashMap::new()),
                default_router: Mutex::new(None),
                default_locator: Mutex::new(None),
            }),
        }
    }

    /// The runtime this factory is bound to
    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.state.runtime
    }

    /// Router applied to references created by the convenience
    /// constructors and by `change_default`
    pub fn default_router(&self) -> Option<Arc<dyn Router>> {
        self.state.default_router.lock().unwrap().clone()
    }

    /// Set the default router
    pub fn set_default_router(&self, router: Option<Arc<dyn Router>>) {
        *self.state.default_router.lock().unwrap() = router;
    }

    /// Locator applied to references created by the convenience
    /// constructors and by `change_default`
    pub fn default_locator(&self) -> Option<Arc<dyn Locator>> {
        self.state.default_locator.lock().unwrap().clone()
    }

    /// Set the default locator
    pub fn set_default_locator(&self, locator: Option<Arc<dyn Locator>>) {
        *self.state.default_locator.lock().unwrap() = locator;
    }

    /// Construct a reference from the full field set.
    ///
    /// # Panics
    ///
    /// A non-empty adapter id combined with non-empty endpoints is a
    /// programming error and aborts construction.
    pub fn create(&self, params: ReferenceParams) -> Arc<Reference> {
        assert!(
            params.adapter_id.is_empty() || params.endpoints.is_empty(),
            "a reference cannot carry both an adapter id and endpoints"
        );

        let candidate = Arc::new(Reference::new(self.clone(), params));

        let mut cache = self.state.cache.lock().unwrap();
        let bucket = cache.entry(candidate.hash_value()).or_default();
        bucket.retain(|weak| weak.strong_count() > 0);
        for weak in bucket.iter() {
            if let Some(existing) = weak.upgrade() {
                if *existing == *candidate {
                    return existing;
                }
            }
        }
        bucket.push(Arc::downgrade(&candidate));
        candidate
    }

    /// Reference addressing the object directly through endpoints
    pub fn direct(&self, identity: Identity, endpoints: Vec<Endpoint>) -> Arc<Reference> {
        let mut params = self.default_params(identity);
        params.endpoints = endpoints;
        self.create(params)
    }

    /// Reference resolving the object through a locator by adapter id
    pub fn indirect(
        &self,
        identity: Identity,
        adapter_id: impl Into<String>,
    ) -> Arc<Reference> {
        let mut params = self.default_params(identity);
        params.adapter_id = adapter_id.into();
        self.create(params)
    }

    /// Reference pinned to pre-bound connections; endpoint resolution is
    /// bypassed entirely
    pub fn fixed(
        &self,
        identity: Identity,
        connections: Vec<Arc<dyn Connection>>,
    ) -> Arc<Reference> {
        let mut params = self.default_params(identity);
        params.fixed_connections = connections;
        self.create(params)
    }

    /// Unmarshal a reference. The identity has already been read by the
    /// caller.
    pub fn create_from_stream<B: Buf>(
        &self,
        identity: Identity,
        buf: &mut B,
    ) -> Result<Arc<Reference>> {
        let facet_path = wire::read_string_seq(buf)?;
        let facet = match facet_path.len() {
            0 => String::new(),
            1 => facet_path.into_iter().next().unwrap_or_default(),
            n => {
                return Err(ObjRpcError::InvalidReference(format!(
                    "facet path has {n} elements, expected 0 or 1"
                )))
            }
        };

        if buf.remaining() < 1 {
            return Err(ObjRpcError::BufferUnderflow { needed: 1, have: 0 });
        }
        let mode = Mode::from_byte(buf.get_u8())?;
        let secure = wire::read_bool(buf)?;

        let count = wire::read_size(buf)?;
        let mut params = self.default_params(identity);
        params.facet = facet;
        params.mode = mode;
        params.secure = secure;
        if count > 0 {
            let mut endpoints = Vec::with_capacity(count.min(16));
            for _ in 0..count {
                endpoints.push(Endpoint::decode(buf)?);
            }
            params.endpoints = endpoints;
        } else {
            params.adapter_id = wire::read_string(buf)?;
        }
        Ok(self.create(params))
    }

    fn default_params(&self, identity: Identity) -> ReferenceParams {
        let config = self.state.runtime.config();
        ReferenceParams {
            identity,
            context: BTreeMap::new(),
            facet: String::new(),
            mode: Mode::Twoway,
            secure: config.default_secure,
            adapter_id: String::new(),
            endpoints: Vec::new(),
            router_info: self
                .state
                .runtime
                .router_manager()
                .get(self.default_router()),
            locator_info: self
                .state
                .runtime
                .locator_manager()
                .get(self.default_locator()),
            fixed_connections: Vec::new(),
            collocation_optimized: config.default_collocation_optimized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::OutgoingConnectionFactory;
    use crate::runtime::RuntimeConfig;
    use async_trait::async_trait;
    use bytes::BytesMut;

    struct NoopConnector;

    #[async_trait]
    impl OutgoingConnectionFactory for NoopConnector {
        async fn create(&self, _: &[Endpoint]) -> Result<Arc<dyn Connection>> {
            Err(ObjRpcError::ConnectFailed("noop".to_string()))
        }
    }

    fn fixture() -> ReferenceFactory {
        let runtime = Runtime::new(
            Arc::new(NoopConnector),
            RuntimeConfig {
                rng_seed: Some(1),
                ..RuntimeConfig::default()
            },
        );
        ReferenceFactory::new(runtime)
    }

    #[test]
    #[should_panic(expected = "cannot carry both")]
    fn test_adapter_id_and_endpoints_is_a_precondition_violation() {
        let factory = fixture();
        let mut params = factory.default_params(Identity::new("obj"));
        params.adapter_id = "A".to_string();
        params.endpoints = vec![Endpoint::tcp("h", 1)];
        factory.create(params);
    }

    #[test]
    fn test_interning_returns_existing_equal_instance() {
        let factory = fixture();
        let a = factory.indirect(Identity::new("obj"), "A");
        let b = factory.indirect(Identity::new("obj"), "A");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_change_back_round_trips_to_interned_instance() {
        let factory = fixture();
        let original = factory.indirect(Identity::new("obj"), "A");
        let changed = original.change_facet("X");
        assert!(!Arc::ptr_eq(&original, &changed));

        let back = changed.change_facet("");
        assert!(Arc::ptr_eq(&original, &back));
    }

    #[test]
    fn test_interning_is_weak() {
        let factory = fixture();
        let hash = {
            let r = factory.indirect(Identity::new("gone"), "A");
            r.hash_value()
        };
        // instance dropped; a new equal one is constructed fresh
        let again = factory.indirect(Identity::new("gone"), "A");
        assert_eq!(again.hash_value(), hash);
    }

    #[test]
    fn test_direct_helper_defaults() {
        let factory = fixture();
        let r = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)]);
        assert_eq!(r.mode(), Mode::Twoway);
        assert!(!r.secure());
        assert!(r.collocation_optimized());
        assert!(r.facet().is_empty());
        assert!(r.adapter_id().is_empty());
        assert!(r.context().is_empty());
    }

    #[test]
    fn test_stream_round_trip_direct() {
        let factory = fixture();
        let original = factory
            .direct(
                Identity::new("obj"),
                vec![
                    Endpoint::tcp("h1", 4061).with_timeout(3000),
                    Endpoint::ssl("h2", 4062),
                ],
            )
            .change_mode(Mode::BatchOneway)
            .change_secure(true);

        let mut buf = BytesMut::new();
        original.stream_write(&mut buf);

        let decoded = factory
            .create_from_stream(original.identity().clone(), &mut buf.freeze())
            .unwrap();
        assert_eq!(decoded.facet(), original.facet());
        assert_eq!(decoded.mode(), original.mode());
        assert_eq!(decoded.secure(), original.secure());
        assert_eq!(decoded.endpoints(), original.endpoints());
        assert_eq!(decoded.adapter_id(), original.adapter_id());
    }

    #[test]
    fn test_stream_round_trip_indirect() {
        let factory = fixture();
        let original = factory
            .indirect(Identity::with_category("obj", "cat"), "MyAdapter")
            .change_facet("admin");

        let mut buf = BytesMut::new();
        original.stream_write(&mut buf);

        let decoded = factory
            .create_from_stream(original.identity().clone(), &mut buf.freeze())
            .unwrap();
        assert_eq!(decoded.facet(), "admin");
        assert_eq!(decoded.adapter_id(), "MyAdapter");
        assert!(decoded.endpoints().is_empty());
        // identical field set: interning hands back the same instance
        assert!(Arc::ptr_eq(&original, &decoded));
    }

    #[test]
    fn test_stream_rejects_long_facet_path() {
        let factory = fixture();
        let mut buf = BytesMut::new();
        wire::write_string_seq(
            &mut buf,
            &["a".to_string(), "b".to_string()],
        );
        let err = factory
            .create_from_stream(Identity::new("obj"), &mut buf.freeze())
            .unwrap_err();
        assert!(matches!(err, ObjRpcError::InvalidReference(_)));
    }
}
