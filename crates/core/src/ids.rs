//! Identity and secret types carried on the wire and in the worker registry.
//!
//! Both are plain `u32` newtypes: the startup-packet cancel-request body is
//! `uint32 worker-id, uint32 cancel-secret`, so there is no benefit to a
//! richer representation at this layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, unique-for-its-lifetime identity of a spawned worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(u32);

impl WorkerId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

/// Unguessable per-worker token that authenticates an out-of-band cancel
/// request. Never transmitted back to the client; only compared.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelSecret(u32);

impl CancelSecret {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

// Deliberately not `Debug`/`Display` with the raw value: a leaked log line
// would defeat the secret's purpose. Use `WorkerId` in log messages instead.
impl fmt::Debug for CancelSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CancelSecret(..)")
    }
}

impl From<u32> for CancelSecret {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
