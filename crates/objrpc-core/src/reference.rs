//! Remote object references
//!
//! A [`Reference`] is the immutable descriptor of a remote object target:
//! identity, invocation parameters, and either direct endpoints, an
//! adapter id resolved through a locator, a router indirection, or a set
//! of pre-bound connections. It is created exclusively by the
//! [`ReferenceFactory`](crate::factory::ReferenceFactory); every "change"
//! operation is copy-on-write and returns a new instance through the
//! factory, or the reference itself when nothing would change.
//!
//! References are safe for unsynchronized concurrent reads. The only
//! blocking operation is [`Reference::get_connection`], which may perform
//! router/locator lookups and connection establishment.

use crate::connection::{connections_equal, Connection};
use crate::endpoint::Endpoint;
use crate::factory::{ReferenceFactory, ReferenceParams};
use crate::locator::{Locator, LocatorInfo};
use crate::router::{Router, RouterInfo};
use crate::types::strutil::{contains_any, escape_string};
use crate::types::{Identity, Mode, ObjRpcError};
use crate::{wire, Result};
use bytes::BufMut;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Characters that separate fields in the proxy text form; identity and
/// facet strings containing any of them are quoted.
const SEPARATORS: &str = " \t\n\r:@";

/// Immutable descriptor of a remote object target
pub struct Reference {
    factory: ReferenceFactory,
    identity: Identity,
    context: BTreeMap<String, String>,
    facet: String,
    mode: Mode,
    secure: bool,
    adapter_id: String,
    endpoints: Vec<Endpoint>,
    router_info: Option<Arc<RouterInfo>>,
    locator_info: Option<Arc<LocatorInfo>>,
    fixed_connections: Vec<Arc<dyn Connection>>,
    collocation_optimized: bool,
    hash_value: u32,
}

/// Same instance, or value-equal; used for router and locator handles
fn infos_equal<T: PartialEq>(a: &Option<Arc<T>>, b: &Option<Arc<T>>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(x), Some(y)) => Arc::ptr_eq(x, y) || **x == **y,
        _ => false,
    }
}

impl Reference {
    /// Construct a reference. Only the factory calls this; it has already
    /// validated the adapter-id/endpoints exclusivity invariant.
    pub(crate) fn new(factory: ReferenceFactory, params: ReferenceParams) -> Self {
        let hash_value = Self::compute_hash(
            &params.identity,
            &params.context,
            &params.facet,
            params.mode,
            params.secure,
        );
        Self {
            factory,
            identity: params.identity,
            context: params.context,
            facet: params.facet,
            mode: params.mode,
            secure: params.secure,
            adapter_id: params.adapter_id,
            endpoints: params.endpoints,
            router_info: params.router_info,
            locator_info: params.locator_info,
            fixed_connections: params.fixed_connections,
            collocation_optimized: params.collocation_optimized,
            hash_value,
        }
    }

    /// The hash folds in identity, context, facet, mode, and secure only.
    /// Endpoints, adapter id, indirection handles, and fixed connections
    /// are deliberately excluded: references to different targets that
    /// share the addressed object collide in hash-based storage. Full
    /// equality distinguishes them.
    fn compute_hash(
        identity: &Identity,
        context: &BTreeMap<String, String>,
        facet: &str,
        mode: Mode,
        secure: bool,
    ) -> u32 {
        fn fold(h: u32, s: &str) -> u32 {
            s.chars()
                .fold(h, |h, c| h.wrapping_mul(5).wrapping_add(c as u32))
        }

        let mut h = fold(0, &identity.name);
        h = fold(h, &identity.category);
        for (key, value) in context {
            h = fold(h, key);
            h = fold(h, value);
        }
        h = fold(h, facet);
        h = h.wrapping_mul(5).wrapping_add(mode as u32);
        h.wrapping_mul(5).wrapping_add(secure as u32)
    }

    /// Identity of the addressed object
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Request context sent with every invocation
    pub fn context(&self) -> &BTreeMap<String, String> {
        &self.context
    }

    /// Facet name; empty addresses the default facet
    pub fn facet(&self) -> &str {
        &self.facet
    }

    /// Invocation mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Whether a secure transport is required
    pub fn secure(&self) -> bool {
        self.secure
    }

    /// Adapter id; non-empty means "resolve via the locator"
    pub fn adapter_id(&self) -> &str {
        &self.adapter_id
    }

    /// Direct endpoints; non-empty means no indirection
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Router indirection handle
    pub fn router_info(&self) -> Option<&Arc<RouterInfo>> {
        self.router_info.as_ref()
    }

    /// Locator indirection handle
    pub fn locator_info(&self) -> Option<&Arc<LocatorInfo>> {
        self.locator_info.as_ref()
    }

    /// Pre-bound connections; non-empty bypasses endpoint resolution
    pub fn fixed_connections(&self) -> &[Arc<dyn Connection>] {
        &self.fixed_connections
    }

    /// Same-process shortcut hint, consumed by the invocation layer
    pub fn collocation_optimized(&self) -> bool {
        self.collocation_optimized
    }

    /// Precomputed structural hash
    pub fn hash_value(&self) -> u32 {
        self.hash_value
    }

    /// The factory that created this reference
    pub fn factory(&self) -> &ReferenceFactory {
        &self.factory
    }

    pub(crate) fn to_params(&self) -> ReferenceParams {
        ReferenceParams {
            identity: self.identity.clone(),
            context: self.context.clone(),
            facet: self.facet.clone(),
            mode: self.mode,
            secure: self.secure,
            adapter_id: self.adapter_id.clone(),
            endpoints: self.endpoints.clone(),
            router_info: self.router_info.clone(),
            locator_info: self.locator_info.clone(),
            fixed_connections: self.fixed_connections.clone(),
            collocation_optimized: self.collocation_optimized,
        }
    }

    // ------------------------------------------------------------------
    // Copy-on-write change operations
    //
    // Every change operation routes through the factory. When the
    // requested value equals the current one the resulting field set is
    // structurally identical, so the factory's interning cache hands back
    // this very instance rather than a reconstruction.
    // ------------------------------------------------------------------

    /// Reference with a different identity
    pub fn change_identity(&self, identity: Identity) -> Arc<Reference> {
        let mut params = self.to_params();
        params.identity = identity;
        self.factory.create(params)
    }

    /// Reference with a different request context
    pub fn change_context(&self, context: BTreeMap<String, String>) -> Arc<Reference> {
        let mut params = self.to_params();
        params.context = context;
        self.factory.create(params)
    }

    /// Reference addressing a different facet
    pub fn change_facet(&self, facet: impl Into<String>) -> Arc<Reference> {
        let mut params = self.to_params();
        params.facet = facet.into();
        self.factory.create(params)
    }

    /// Reference with a different invocation mode
    pub fn change_mode(&self, mode: Mode) -> Arc<Reference> {
        let mut params = self.to_params();
        params.mode = mode;
        self.factory.create(params)
    }

    /// Reference with a different security requirement
    pub fn change_secure(&self, secure: bool) -> Arc<Reference> {
        let mut params = self.to_params();
        params.secure = secure;
        self.factory.create(params)
    }

    /// Reference resolving through a different adapter id
    pub fn change_adapter_id(&self, adapter_id: impl Into<String>) -> Arc<Reference> {
        let mut params = self.to_params();
        params.adapter_id = adapter_id.into();
        self.factory.create(params)
    }

    /// Reference with different direct endpoints
    pub fn change_endpoints(&self, endpoints: Vec<Endpoint>) -> Arc<Reference> {
        let mut params = self.to_params();
        params.endpoints = endpoints;
        self.factory.create(params)
    }

    /// Reference with the timeout changed on every endpoint
    pub fn change_timeout(&self, timeout_ms: i32) -> Arc<Reference> {
        let mut params = self.to_params();
        params.endpoints = self
            .endpoints
            .iter()
            .map(|e| e.with_timeout(timeout_ms))
            .collect();
        self.factory.create(params)
    }

    /// Reference with the compression flag changed on every endpoint
    pub fn change_compress(&self, compress: bool) -> Arc<Reference> {
        let mut params = self.to_params();
        params.endpoints = self
            .endpoints
            .iter()
            .map(|e| e.with_compress(compress))
            .collect();
        self.factory.create(params)
    }

    /// Reference routed through a different router
    pub fn change_router(&self, router: Option<Arc<dyn Router>>) -> Arc<Reference> {
        let mut params = self.to_params();
        params.router_info = self.factory.runtime().router_manager().get(router);
        self.factory.create(params)
    }

    /// Reference resolving through a different locator
    pub fn change_locator(&self, locator: Option<Arc<dyn Locator>>) -> Arc<Reference> {
        let mut params = self.to_params();
        params.locator_info = self.factory.runtime().locator_manager().get(locator);
        self.factory.create(params)
    }

    /// Reference with a different collocation-optimization hint
    pub fn change_collocation_optimized(&self, enabled: bool) -> Arc<Reference> {
        let mut params = self.to_params();
        params.collocation_optimized = enabled;
        self.factory.create(params)
    }

    /// Reference with invocation parameters reset to their defaults:
    /// default facet, twoway, not secure, no fixed connections, the
    /// factory's default router and locator. Identity, context, adapter
    /// id, and endpoints are kept.
    pub fn change_default(&self) -> Arc<Reference> {
        let runtime = self.factory.runtime();
        let mut params = self.to_params();
        params.facet = String::new();
        params.mode = Mode::Twoway;
        params.secure = false;
        params.router_info = runtime.router_manager().get(self.factory.default_router());
        params.locator_info = runtime
            .locator_manager()
            .get(self.factory.default_locator());
        params.fixed_connections = Vec::new();
        params.collocation_optimized = runtime.config().default_collocation_optimized;
        self.factory.create(params)
    }

    // ------------------------------------------------------------------
    // Candidate filtering
    // ------------------------------------------------------------------

    /// Mode filter, uniform shuffle, then security policy. When security
    /// is required, non-capable candidates are dropped; otherwise the
    /// shuffled sequence is stably partitioned so non-secure candidates
    /// come first, keeping the randomized order within each partition.
    fn filter_candidates<T>(
        &self,
        mut candidates: Vec<T>,
        is_datagram: impl Fn(&T) -> bool,
        is_secure: impl Fn(&T) -> bool,
    ) -> Vec<T> {
        if self.mode.is_datagram() {
            candidates.retain(|c| is_datagram(c));
        } else {
            candidates.retain(|c| !is_datagram(c));
        }

        self.factory.runtime().shuffle(&mut candidates);

        if self.secure {
            candidates.retain(|c| is_secure(c));
            candidates
        } else {
            let (mut preferred, secure): (Vec<T>, Vec<T>) =
                candidates.into_iter().partition(|c| !is_secure(c));
            preferred.extend(secure);
            preferred
        }
    }

    /// Filter and order endpoint candidates for this reference.
    /// Index 0 of the result is the most preferred candidate.
    pub fn filter_endpoints(&self, all: &[Endpoint]) -> Vec<Endpoint> {
        let known: Vec<Endpoint> = all.iter().filter(|e| !e.is_unknown()).cloned().collect();
        self.filter_candidates(known, Endpoint::is_datagram, Endpoint::is_secure)
    }

    /// Filter and order connection candidates for this reference, keyed on
    /// each connection's originating endpoint capabilities.
    pub fn filter_connections(
        &self,
        all: &[Arc<dyn Connection>],
    ) -> Vec<Arc<dyn Connection>> {
        self.filter_candidates(
            all.to_vec(),
            |c| c.endpoint().is_datagram(),
            |c| c.endpoint().is_secure(),
        )
    }

    // ------------------------------------------------------------------
    // Connection resolution
    // ------------------------------------------------------------------

    /// Produce a live connection for this reference.
    ///
    /// Fixed connections bypass resolution entirely. Otherwise the
    /// candidate endpoints come from the router (routing takes priority),
    /// the reference's own endpoints, or the locator; candidates are
    /// filtered per the reference's mode and security requirement, and the
    /// connection factory materializes or reuses a connection.
    ///
    /// When resolution went through the locator and its answer came from
    /// the cache, a connection-establishment failure invalidates the
    /// cached entry and retries exactly once with freshly resolved
    /// endpoints. Every other failure propagates immediately.
    pub async fn get_connection(&self) -> Result<Arc<dyn Connection>> {
        if !self.fixed_connections.is_empty() {
            let filtered = self.filter_connections(&self.fixed_connections);
            return filtered
                .into_iter()
                .next()
                .ok_or_else(|| ObjRpcError::NoEndpoint(self.to_string()));
        }

        loop {
            let mut cached = false;
            let mut candidates: Option<Vec<Endpoint>> = None;

            if let Some(router_info) = &self.router_info {
                // Routing takes priority: everything goes to the router's
                // client endpoints.
                candidates = Some(router_info.get_client_endpoints().await?);
            } else if !self.endpoints.is_empty() {
                candidates = Some(self.endpoints.clone());
            } else if let Some(locator_info) = &self.locator_info {
                let (endpoints, was_cached) = locator_info.get_endpoints(self).await?;
                cached = was_cached;
                candidates = Some(endpoints);
            }

            let filtered = match candidates {
                Some(endpoints) => self.filter_endpoints(&endpoints),
                None => Vec::new(),
            };
            if filtered.is_empty() {
                return Err(ObjRpcError::NoEndpoint(self.to_string()));
            }

            let connector = self.factory.runtime().connection_factory().clone();
            match connector.create(&filtered).await {
                Ok(connection) => {
                    // Bind the router's callback adapter so return traffic
                    // arriving on this connection can be dispatched.
                    if let Some(router_info) = &self.router_info {
                        if let Some(adapter) = router_info.get_adapter() {
                            connection.set_adapter(adapter);
                        }
                    }
                    return Ok(connection);
                }
                Err(err) => {
                    if self.router_info.is_none() && self.endpoints.is_empty() {
                        if let Some(locator_info) = &self.locator_info {
                            locator_info.clear_cache(self);
                            if cached {
                                trace!(
                                    error = %err,
                                    proxy = %self,
                                    "connection to cached endpoints failed, \
                                     removing endpoints from cache and trying one more time"
                                );
                                continue;
                            }
                        }
                    }
                    return Err(err);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Wire form
    // ------------------------------------------------------------------

    /// Marshal this reference. The identity is written by the caller.
    ///
    /// The facet is written as a zero-or-one-element string sequence for
    /// compatibility with the legacy facet-path encoding.
    pub fn stream_write<B: BufMut>(&self, buf: &mut B) {
        if self.facet.is_empty() {
            wire::write_size(buf, 0);
        } else {
            wire::write_size(buf, 1);
            wire::write_string(buf, &self.facet);
        }

        buf.put_u8(self.mode as u8);
        wire::write_bool(buf, self.secure);

        wire::write_size(buf, self.endpoints.len());
        if !self.endpoints.is_empty() {
            debug_assert!(self.adapter_id.is_empty());
            for endpoint in &self.endpoints {
                endpoint.encode(buf);
            }
        } else {
            wire::write_string(buf, &self.adapter_id);
        }
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.identity == other.identity
            && self.context == other.context
            && self.facet == other.facet
            && self.mode == other.mode
            && self.secure == other.secure
            && self.adapter_id == other.adapter_id
            && self.endpoints == other.endpoints
            && infos_equal(&self.router_info, &other.router_info)
            && infos_equal(&self.locator_info, &other.locator_info)
            && connections_equal(&self.fixed_connections, &other.fixed_connections)
            && self.collocation_optimized == other.collocation_optimized
    }
}

impl Eq for Reference {}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash_value.hash(state);
    }
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("identity", &self.identity)
            .field("facet", &self.facet)
            .field("mode", &self.mode)
            .field("secure", &self.secure)
            .field("adapter_id", &self.adapter_id)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Reference {
    /// The canonical proxy text form:
    /// `<identity>[ -f <facet>] <mode-flag>[ -s] (@ <adapter-id> | :<endpoint>...)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.identity.to_string();
        if contains_any(&id, SEPARATORS) {
            write!(f, "\"{id}\"")?;
        } else {
            write!(f, "{id}")?;
        }

        if !self.facet.is_empty() {
            let facet = escape_string(&self.facet, "");
            if contains_any(&facet, SEPARATORS) {
                write!(f, " -f \"{facet}\"")?;
            } else {
                write!(f, " -f {facet}")?;
            }
        }

        write!(f, " {}", self.mode.flag())?;

        if self.secure {
            write!(f, " -s")?;
        }

        if !self.endpoints.is_empty() {
            debug_assert!(self.adapter_id.is_empty());
            for endpoint in &self.endpoints {
                let s = endpoint.to_string();
                if !s.is_empty() {
                    write!(f, ":{s}")?;
                }
            }
        } else {
            let adapter = escape_string(&self.adapter_id, "");
            if contains_any(&adapter, " \t\n\r") {
                write!(f, " @ \"{adapter}\"")?;
            } else {
                write!(f, " @ {adapter}")?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::OutgoingConnectionFactory;
    use crate::factory::ReferenceFactory;
    use crate::runtime::{Runtime, RuntimeConfig};
    use async_trait::async_trait;
    use bytes::{Buf, BytesMut};

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
                rng_seed: Some(42),
                ..RuntimeConfig::default()
            },
        );
        ReferenceFactory::new(runtime)
    }

    #[test]
    fn test_change_with_current_value_returns_same_instance() {
        let factory = fixture();
        let r = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)]);

        assert!(Arc::ptr_eq(&r, &r.change_facet("")));
        assert!(Arc::ptr_eq(&r, &r.change_mode(Mode::Twoway)));
        assert!(Arc::ptr_eq(&r, &r.change_secure(false)));
        assert!(Arc::ptr_eq(&r, &r.change_identity(Identity::new("obj"))));
        assert!(Arc::ptr_eq(&r, &r.change_adapter_id("")));
        assert!(Arc::ptr_eq(&r, &r.change_endpoints(vec![Endpoint::tcp("h", 1)])));
        assert!(Arc::ptr_eq(&r, &r.change_router(None)));
        assert!(Arc::ptr_eq(&r, &r.change_locator(None)));
        assert!(Arc::ptr_eq(&r, &r.change_context(BTreeMap::new())));
    }

    #[test]
    fn test_change_facet_creates_distinct_reference() {
        let factory = fixture();
        let original = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)]);
        let changed = original.change_facet("X");

        assert!(!Arc::ptr_eq(&original, &changed));
        assert_eq!(changed.facet(), "X");
        assert_eq!(original.facet(), "");
        assert_ne!(*original, *changed);
    }

    #[test]
    fn test_equality_covers_endpoints_despite_hash_collision() {
        let factory = fixture();
        let a = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h1", 1)]);
        let b = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h2", 2)]);

        // hash deliberately ignores endpoints
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_endpoint_order_is_significant() {
        let factory = fixture();
        let e1 = Endpoint::tcp("h1", 1);
        let e2 = Endpoint::tcp("h2", 2);
        let a = factory.direct(Identity::new("obj"), vec![e1.clone(), e2.clone()]);
        let b = factory.direct(Identity::new("obj"), vec![e2, e1]);
        assert_ne!(*a, *b);
    }

    #[test]
    fn test_context_affects_equality_and_hash() {
        let factory = fixture();
        let plain = factory.indirect(Identity::new("obj"), "A");
        let mut ctx = BTreeMap::new();
        ctx.insert("tx".to_string(), "42".to_string());
        let with_ctx = plain.change_context(ctx);

        assert_ne!(*plain, *with_ctx);
        assert_ne!(plain.hash_value(), with_ctx.hash_value());
    }

    #[test]
    fn test_display_indirect_secure_oneway() {
        let factory = fixture();
        let r = factory
            .indirect(Identity::new("foo"), "MyAdapter")
            .change_mode(Mode::Oneway)
            .change_secure(true);
        assert_eq!(r.to_string(), "foo -o -s @ MyAdapter");
    }

    #[test]
    fn test_display_quotes_identity_with_separators() {
        let factory = fixture();
        let r = factory.indirect(Identity::new("my obj"), "A");
        assert_eq!(r.to_string(), "\"my obj\" -t @ A");
    }

    #[test]
    fn test_display_facet_and_endpoints() {
        let factory = fixture();
        let r = factory
            .direct(Identity::new("obj"), vec![Endpoint::tcp("host", 4061)])
            .change_facet("admin");
        assert_eq!(r.to_string(), "obj -f admin -t:tcp -h host -p 4061");
    }

    #[test]
    fn test_display_quotes_adapter_with_whitespace() {
        let factory = fixture();
        let r = factory.indirect(Identity::new("obj"), "my adapter");
        assert_eq!(r.to_string(), "obj -t @ \"my adapter\"");
    }

    #[test]
    fn test_filter_drops_datagram_for_stream_modes() {
        let factory = fixture();
        let r = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)]);

        let all = vec![
            Endpoint::tcp("h", 1),
            Endpoint::udp("h", 2),
            Endpoint::ssl("h", 3),
        ];
        for mode in [Mode::Twoway, Mode::Oneway, Mode::BatchOneway] {
            let filtered = r.change_mode(mode).filter_endpoints(&all);
            assert!(!filtered.is_empty());
            assert!(filtered.iter().all(|e| !e.is_datagram()));
        }
        for mode in [Mode::Datagram, Mode::BatchDatagram] {
            let filtered = r.change_mode(mode).filter_endpoints(&all);
            assert_eq!(filtered, vec![Endpoint::udp("h", 2)]);
        }
    }

    #[test]
    fn test_filter_drops_unknown_endpoints() {
        let factory = fixture();
        let r = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)]);

        let opaque = Endpoint::Opaque(crate::endpoint::OpaqueEndpoint {
            kind: 77,
            bytes: bytes::Bytes::from_static(b"?"),
        });
        let filtered = r.filter_endpoints(&[opaque, Endpoint::tcp("h", 1)]);
        assert_eq!(filtered, vec![Endpoint::tcp("h", 1)]);
    }

    #[test]
    fn test_filter_secure_keeps_only_secure() {
        let factory = fixture();
        let e1 = Endpoint::tcp("h", 1);
        let e2 = Endpoint::ssl("h", 2);
        let r = factory
            .direct(Identity::new("obj"), vec![e1.clone()])
            .change_secure(true);

        let filtered = r.filter_endpoints(&[e1, e2.clone()]);
        assert_eq!(filtered, vec![e2]);
    }

    #[test]
    fn test_filter_partitions_non_secure_first() {
        let factory = fixture();
        let e1 = Endpoint::tcp("h", 1);
        let e2 = Endpoint::ssl("h", 2);
        let r = factory.direct(Identity::new("obj"), vec![e1.clone()]);

        // regardless of shuffle outcome, the stable partition puts the
        // non-secure endpoint first
        for _ in 0..8 {
            let filtered = r.filter_endpoints(&[e1.clone(), e2.clone()]);
            assert_eq!(filtered, vec![e1.clone(), e2.clone()]);
        }
    }

    #[test]
    fn test_filter_partition_keeps_every_candidate() {
        let factory = fixture();
        let r = factory.direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)]);

        let all: Vec<Endpoint> = (0..6)
            .map(|i| Endpoint::tcp("h", i))
            .chain((6..12).map(|i| Endpoint::ssl("h", i)))
            .collect();
        let filtered = r.filter_endpoints(&all);

        assert_eq!(filtered.len(), 12);
        assert!(filtered[..6].iter().all(|e| !e.is_secure()));
        assert!(filtered[6..].iter().all(|e| e.is_secure()));
    }

    #[test]
    fn test_seeded_filter_order_is_reproducible() {
        // two factories with the same seed order identically: the shuffle
        // source is injectable and the partition adds no reordering of
        // its own
        let all: Vec<Endpoint> = (0..6)
            .map(|i| Endpoint::tcp("h", i))
            .chain((6..12).map(|i| Endpoint::ssl("h", i)))
            .collect();

        let first = fixture()
            .direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)])
            .filter_endpoints(&all);
        let second = fixture()
            .direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)])
            .filter_endpoints(&all);
        assert_eq!(first, second);
    }

    #[test]
    fn test_stream_write_adapter_form() {
        let factory = fixture();
        let r = factory
            .indirect(Identity::new("obj"), "MyAdapter")
            .change_mode(Mode::Oneway)
            .change_secure(true);

        let mut buf = BytesMut::new();
        r.stream_write(&mut buf);

        let mut expected = BytesMut::new();
        expected.put_u8(0); // empty facet path
        expected.put_u8(Mode::Oneway as u8);
        expected.put_u8(1); // secure
        expected.put_u8(0); // zero endpoints
        wire::write_string(&mut expected, "MyAdapter");
        assert_eq!(buf, expected);
    }

    #[test]
    fn test_stream_write_facet_as_single_element_seq() {
        let factory = fixture();
        let r = factory
            .direct(Identity::new("obj"), vec![Endpoint::tcp("h", 1)])
            .change_facet("admin");

        let mut buf = BytesMut::new();
        r.stream_write(&mut buf);
        let mut bytes = buf.freeze();

        let facet_path = wire::read_string_seq(&mut bytes).unwrap();
        assert_eq!(facet_path, vec!["admin".to_string()]);
        assert_eq!(Mode::from_byte(bytes.get_u8()).unwrap(), Mode::Twoway);
    }
}
