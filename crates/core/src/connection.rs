//! Per-connection context and the listener set (§3 ConnectionContext,
//! ListenerSet).

use crate::admission::AdmissionVerdict;
use crate::ids::CancelSecret;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Address family a listener endpoint was bound on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressFamily {
    Inet4,
    Inet6,
    Local,
}

/// One bound endpoint in the ListenerSet (§3, §4.1). The set is established
/// at boot and immutable thereafter; this type is the caller-facing
/// metadata a listener returns alongside an accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerDescriptor {
    pub family: AddressFamily,
}

impl ListenerDescriptor {
    /// Local endpoints never offer secure-transport negotiation (§4.2,
    /// §8 boundary behavior: "Secure-negotiation on a local endpoint ->
    /// always reply 'N'").
    pub fn is_local(&self) -> bool {
        self.family == AddressFamily::Local
    }
}

/// Frontend-to-supervisor protocol version accepted for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl ProtocolVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Fields are parsed name/value pairs from version 3 onward; earlier
    /// versions use a fixed-width legacy record (§4.2).
    pub fn uses_name_value_pairs(self) -> bool {
        self.major >= 3
    }
}

/// A single extra name/value pair carried in the startup packet that is
/// not one of the recognized fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOption {
    pub name: String,
    pub value: String,
}

/// Per-connection state, owned by the supervisor before spawn and by the
/// worker after (§3 ConnectionContext).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionContext {
    pub listener: ListenerDescriptor,
    pub remote_addr: Option<SocketAddr>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub extra_options: Vec<ConnectionOption>,
    pub protocol_version: ProtocolVersion,
    pub admission_verdict: Option<AdmissionVerdict>,
    pub cancel_secret: Option<CancelSecret>,
}

impl ConnectionContext {
    pub fn new(listener: ListenerDescriptor, protocol_version: ProtocolVersion) -> Self {
        Self {
            listener,
            remote_addr: None,
            database: None,
            user: None,
            extra_options: Vec::new(),
            protocol_version,
            admission_verdict: None,
            cancel_secret: None,
        }
    }

    /// A missing database defaults to the user name (§4.2). Call only
    /// after `user` has been populated from the handshake; a missing user
    /// is itself a fatal protocol condition handled upstream.
    pub fn database_or_default(&self) -> Option<&str> {
        self.database.as_deref().or(self.user.as_deref())
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
