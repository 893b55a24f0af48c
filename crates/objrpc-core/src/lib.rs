//! objrpc client core: addressing and connection establishment
//!
//! This crate is the client-side core of the objrpc middleware. Given a
//! remote-object reference (identity, facet, invocation mode, security
//! requirement, and either direct endpoints or an indirection through a
//! router or locator), it produces a live transport connection suitable
//! for invoking operations.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  Client core (this crate)                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Reference           │  ReferenceFactory  │  Selection       │
//! │  - identity/facet    │  - validation      │  - mode filter   │
//! │  - change ops (COW)  │  - interning       │  - shuffle       │
//! │  - text/wire forms   │  - defaults        │  - sec partition │
//! ├──────────────────────────────────────────────────────────────┤
//! │  RouterInfo          │  LocatorInfo       │  Runtime         │
//! │  (endpoint cache)    │  (adapter cache)   │  (config, RNG)   │
//! ├──────────────────────────────────────────────────────────────┤
//! │   Router / Locator / OutgoingConnectionFactory / Connection  │
//! │            (collaborator traits, transport layer)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Concepts
//!
//! - **Reference**: immutable descriptor of a remote object target;
//!   "change" operations are copy-on-write through the factory
//! - **Adapter id**: logical name resolved to live endpoints via a
//!   locator, used instead of direct endpoints
//! - **Router**: indirection forwarding all traffic through its own
//!   client-facing endpoints
//! - **Fixed connection**: a connection pre-bound to a reference,
//!   bypassing endpoint resolution
//!
//! # Modules
//!
//! - [`types`]: identities, invocation modes, errors
//! - [`endpoint`]: transport endpoints and their capability flags
//! - [`connection`]: connection-layer collaborator traits
//! - [`router`] / [`locator`]: indirection handles and their caches
//! - [`reference`]: the reference value object and resolution logic
//! - [`factory`]: validated construction and interning
//! - [`runtime`]: shared configuration and the shuffle source
//! - [`wire`]: encoding primitives

pub mod connection;
pub mod endpoint;
pub mod factory;
pub mod locator;
pub mod reference;
pub mod router;
pub mod runtime;
pub mod types;
pub mod wire;

pub use connection::{Connection, ObjectAdapter, OutgoingConnectionFactory};
pub use endpoint::{Endpoint, OpaqueEndpoint, SslEndpoint, TcpEndpoint, UdpEndpoint};
pub use factory::{ReferenceFactory, ReferenceParams};
pub use locator::{Locator, LocatorInfo, LocatorManager, LocatorTable};
pub use reference::Reference;
pub use router::{Router, RouterInfo, RouterManager};
pub use runtime::{Runtime, RuntimeConfig};
pub use types::{Identity, Mode, ObjRpcError, Result};
