//! Core objrpc value types
//!
//! This module contains the leaf data types used throughout the client
//! core: object identities, invocation modes, the error taxonomy, and
//! the string escaping helpers behind the proxy text form.

mod error;
mod identity;
mod mode;
pub mod strutil;

pub use error::{ObjRpcError, Result};
pub use identity::Identity;
pub use mode::Mode;
