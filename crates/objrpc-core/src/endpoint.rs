//! Transport endpoints
//!
//! An endpoint is a concrete transport address with capability flags.
//! Unrecognized transports decode into [`OpaqueEndpoint`], which keeps
//! the raw bytes so the endpoint can be re-marshaled unchanged and is
//! dropped from candidate sets during filtering.

use crate::types::{ObjRpcError, Result};
use crate::wire;
use bytes::{Buf, BufMut, Bytes};
use std::fmt;

/// Wire identifiers for the built-in transports
pub mod endpoint_kind {
    /// TCP/IP transport
    pub const TCP: u16 = 1;
    /// TLS over TCP
    pub const SSL: u16 = 2;
    /// UDP datagram transport
    pub const UDP: u16 = 3;
}

/// Timeout value meaning "no timeout configured"
pub const NO_TIMEOUT: i32 = -1;

/// TCP endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TcpEndpoint {
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Connection timeout in milliseconds, [`NO_TIMEOUT`] when disabled
    pub timeout_ms: i32,
    /// Whether payload compression is requested
    pub compress: bool,
}

/// TLS endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SslEndpoint {
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Connection timeout in milliseconds, [`NO_TIMEOUT`] when disabled
    pub timeout_ms: i32,
    /// Whether payload compression is requested
    pub compress: bool,
}

/// UDP endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UdpEndpoint {
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Whether payload compression is requested
    pub compress: bool,
}

/// Endpoint for a transport this client does not recognize.
///
/// Round-trips the raw body bytes under the original kind identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpaqueEndpoint {
    /// Wire kind identifier of the unrecognized transport
    pub kind: u16,
    /// Raw body bytes, re-marshaled verbatim
    pub bytes: Bytes,
}

/// A transport endpoint with capability flags
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// TCP endpoint
    Tcp(TcpEndpoint),
    /// TLS endpoint
    Ssl(SslEndpoint),
    /// UDP endpoint
    Udp(UdpEndpoint),
    /// Unrecognized transport
    Opaque(OpaqueEndpoint),
}

impl Endpoint {
    /// Create a TCP endpoint with no timeout and no compression
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp(TcpEndpoint {
            host: host.into(),
            port,
            timeout_ms: NO_TIMEOUT,
            compress: false,
        })
    }

    /// Create a TLS endpoint with no timeout and no compression
    pub fn ssl(host: impl Into<String>, port: u16) -> Self {
        Self::Ssl(SslEndpoint {
            host: host.into(),
            port,
            timeout_ms: NO_TIMEOUT,
            compress: false,
        })
    }

    /// Create a UDP endpoint with no compression
    pub fn udp(host: impl Into<String>, port: u16) -> Self {
        Self::Udp(UdpEndpoint {
            host: host.into(),
            port,
            compress: false,
        })
    }

    /// Wire kind identifier
    pub fn kind(&self) -> u16 {
        match self {
            Self::Tcp(_) => endpoint_kind::TCP,
            Self::Ssl(_) => endpoint_kind::SSL,
            Self::Udp(_) => endpoint_kind::UDP,
            Self::Opaque(o) => o.kind,
        }
    }

    /// True for datagram transports
    pub fn is_datagram(&self) -> bool {
        matches!(self, Self::Udp(_))
    }

    /// True for transports providing security
    pub fn is_secure(&self) -> bool {
        matches!(self, Self::Ssl(_))
    }

    /// True for transports this client does not recognize
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }

    /// Connection timeout in milliseconds, [`NO_TIMEOUT`] when the
    /// transport has none configured or supports none
    pub fn timeout_ms(&self) -> i32 {
        match self {
            Self::Tcp(t) => t.timeout_ms,
            Self::Ssl(s) => s.timeout_ms,
            Self::Udp(_) | Self::Opaque(_) => NO_TIMEOUT,
        }
    }

    /// Copy of this endpoint with the given timeout. Transports without a
    /// timeout setting return themselves unchanged.
    pub fn with_timeout(&self, timeout_ms: i32) -> Self {
        match self {
            Self::Tcp(t) => Self::Tcp(TcpEndpoint {
                timeout_ms,
                ..t.clone()
            }),
            Self::Ssl(s) => Self::Ssl(SslEndpoint {
                timeout_ms,
                ..s.clone()
            }),
            Self::Udp(_) | Self::Opaque(_) => self.clone(),
        }
    }

    /// Copy of this endpoint with the given compression flag. Opaque
    /// endpoints return themselves unchanged.
    pub fn with_compress(&self, compress: bool) -> Self {
        match self {
            Self::Tcp(t) => Self::Tcp(TcpEndpoint {
                compress,
                ..t.clone()
            }),
            Self::Ssl(s) => Self::Ssl(SslEndpoint {
                compress,
                ..s.clone()
            }),
            Self::Udp(u) => Self::Udp(UdpEndpoint {
                compress,
                ..u.clone()
            }),
            Self::Opaque(_) => self.clone(),
        }
    }

    /// Encode to buffer: kind, body length, body
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        buf.put_u16_le(self.kind());

        let mut body = bytes::BytesMut::new();
        match self {
            Self::Tcp(t) => {
                wire::write_string(&mut body, &t.host);
                body.put_u16_le(t.port);
                body.put_i32_le(t.timeout_ms);
                wire::write_bool(&mut body, t.compress);
            }
            Self::Ssl(s) => {
                wire::write_string(&mut body, &s.host);
                body.put_u16_le(s.port);
                body.put_i32_le(s.timeout_ms);
                wire::write_bool(&mut body, s.compress);
            }
            Self::Udp(u) => {
                wire::write_string(&mut body, &u.host);
                body.put_u16_le(u.port);
                wire::write_bool(&mut body, u.compress);
            }
            Self::Opaque(o) => {
                body.put_slice(&o.bytes);
            }
        }

        buf.put_u32_le(body.len() as u32);
        buf.put_slice(&body);
    }

    /// Decode from buffer. Unrecognized kinds decode as [`Endpoint::Opaque`].
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < 6 {
            return Err(ObjRpcError::BufferUnderflow {
                needed: 6,
                have: buf.remaining(),
            });
        }

        let kind = buf.get_u16_le();
        let len = buf.get_u32_le() as usize;
        if buf.remaining() < len {
            return Err(ObjRpcError::BufferUnderflow {
                needed: len,
                have: buf.remaining(),
            });
        }
        let mut body = buf.copy_to_bytes(len);

        match kind {
            endpoint_kind::TCP => {
                let host = wire::read_string(&mut body)?;
                let (port, timeout_ms) = read_port_timeout(&mut body)?;
                let compress = wire::read_bool(&mut body)?;
                Ok(Self::Tcp(TcpEndpoint {
                    host,
                    port,
                    timeout_ms,
                    compress,
                }))
            }
            endpoint_kind::SSL => {
                let host = wire::read_string(&mut body)?;
                let (port, timeout_ms) = read_port_timeout(&mut body)?;
                let compress = wire::read_bool(&mut body)?;
                Ok(Self::Ssl(SslEndpoint {
                    host,
                    port,
                    timeout_ms,
                    compress,
                }))
            }
            endpoint_kind::UDP => {
                let host = wire::read_string(&mut body)?;
                if body.remaining() < 2 {
                    return Err(ObjRpcError::InvalidEndpoint(
                        "truncated udp endpoint body".to_string(),
                    ));
                }
                let port = body.get_u16_le();
                let compress = wire::read_bool(&mut body)?;
                Ok(Self::Udp(UdpEndpoint {
                    host,
                    port,
                    compress,
                }))
            }
            _ => Ok(Self::Opaque(OpaqueEndpoint { kind, bytes: body })),
        }
    }
}

fn read_port_timeout<B: Buf>(body: &mut B) -> Result<(u16, i32)> {
    if body.remaining() < 6 {
        return Err(ObjRpcError::InvalidEndpoint(
            "truncated endpoint body".to_string(),
        ));
    }
    Ok((body.get_u16_le(), body.get_i32_le()))
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(t) => {
                write!(f, "tcp -h {} -p {}", t.host, t.port)?;
                if t.timeout_ms != NO_TIMEOUT {
                    write!(f, " -t {}", t.timeout_ms)?;
                }
                if t.compress {
                    write!(f, " -z")?;
                }
                Ok(())
            }
            Self::Ssl(s) => {
                write!(f, "ssl -h {} -p {}", s.host, s.port)?;
                if s.timeout_ms != NO_TIMEOUT {
                    write!(f, " -t {}", s.timeout_ms)?;
                }
                if s.compress {
                    write!(f, " -z")?;
                }
                Ok(())
            }
            Self::Udp(u) => {
                write!(f, "udp -h {} -p {}", u.host, u.port)?;
                if u.compress {
                    write!(f, " -z")?;
                }
                Ok(())
            }
            Self::Opaque(o) => {
                write!(f, "opaque -t {} -v ", o.kind)?;
                for b in o.bytes.iter() {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}
