//! Connection-layer collaborator boundary
//!
//! The client core does not own sockets. It asks an
//! [`OutgoingConnectionFactory`] to materialize or reuse a connection for
//! a filtered candidate endpoint set, and only ever touches the resulting
//! [`Connection`] through its originating endpoint and the adapter binding
//! used for router callbacks.

use crate::endpoint::Endpoint;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Handle to an object adapter, bound to connections that must dispatch
/// callbacks (e.g. return traffic arriving through a router).
pub trait ObjectAdapter: Send + Sync {
    /// Adapter name, for diagnostics
    fn name(&self) -> &str;
}

/// An established transport session.
///
/// Connections have instance identity only: two handles are the same
/// connection iff they point at the same session. Implementations are
/// internally synchronized; the core calls them concurrently from many
/// references.
pub trait Connection: std::fmt::Debug + Send + Sync {
    /// The endpoint this connection was established to
    fn endpoint(&self) -> &Endpoint;

    /// Bind an adapter for dispatching callbacks received on this connection
    fn set_adapter(&self, adapter: Arc<dyn ObjectAdapter>);
}

/// Pooled outgoing connection acquisition.
#[async_trait]
pub trait OutgoingConnectionFactory: Send + Sync {
    /// Materialize or reuse a connection for the given candidate endpoints,
    /// tried in order of preference. Fails with a connection-establishment
    /// error when every candidate fails.
    async fn create(&self, endpoints: &[Endpoint]) -> Result<Arc<dyn Connection>>;
}

/// Element-wise instance equality of two connection sequences
pub(crate) fn connections_equal(
    a: &[Arc<dyn Connection>],
    b: &[Arc<dyn Connection>],
) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| Arc::ptr_eq(x, y))
}
