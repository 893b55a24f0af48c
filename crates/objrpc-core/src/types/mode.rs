//! Invocation modes

use crate::types::{ObjRpcError, Result};
use std::fmt;

/// Invocation semantics of a reference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// Request/reply over a stream transport
    #[default]
    Twoway = 0,
    /// Fire-and-forget over a stream transport
    Oneway = 1,
    /// Buffered oneway, flushed in batches
    BatchOneway = 2,
    /// Fire-and-forget over a datagram transport
    Datagram = 3,
    /// Buffered datagram, flushed in batches
    BatchDatagram = 4,
}

impl Mode {
    /// True for the modes that require a datagram transport
    pub fn is_datagram(self) -> bool {
        matches!(self, Mode::Datagram | Mode::BatchDatagram)
    }

    /// The mode flag used in the proxy text form
    pub fn flag(self) -> &'static str {
        match self {
            Mode::Twoway => "-t",
            Mode::Oneway => "-o",
            Mode::BatchOneway => "-O",
            Mode::Datagram => "-d",
            Mode::BatchDatagram => "-D",
        }
    }

    /// Decode from the wire byte
    pub fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(Mode::Twoway),
            1 => Ok(Mode::Oneway),
            2 => Ok(Mode::BatchOneway),
            3 => Ok(Mode::Datagram),
            4 => Ok(Mode::BatchDatagram),
            _ => Err(ObjRpcError::InvalidReference(format!(
                "unknown invocation mode: {b}"
            ))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Twoway => "twoway",
            Mode::Oneway => "oneway",
            Mode::BatchOneway => "batch-oneway",
            Mode::Datagram => "datagram",
            Mode::BatchDatagram => "batch-datagram",
        };
        write!(f, "{name}")
    }
}
