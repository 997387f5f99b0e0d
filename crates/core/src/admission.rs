//! Admission controller (C3): a pure function of `SupervisorState` and the
//! current worker count.

use crate::state::SupervisorState;
use serde::{Deserialize, Serialize};

/// A client-visible rejection category (§7: "user-visible rejections carry
/// a stable category").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionCategory {
    Starting,
    ShuttingDown,
    Recovering,
    Saturated,
    UnsupportedProtocol,
    BadUser,
    Internal,
}

impl RejectionCategory {
    /// The stable wire-visible name from §7's table.
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionCategory::Starting => "STARTING",
            RejectionCategory::ShuttingDown => "SHUTTING_DOWN",
            RejectionCategory::Recovering => "RECOVERING",
            RejectionCategory::Saturated => "SATURATED",
            RejectionCategory::UnsupportedProtocol => "UNSUPPORTED_PROTOCOL",
            RejectionCategory::BadUser => "BAD_USER",
            RejectionCategory::Internal => "INTERNAL",
        }
    }
}

/// The admission controller's verdict for one handshake (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmissionVerdict {
    Ok,
    Reject(RejectionCategory),
}

impl AdmissionVerdict {
    pub fn is_ok(self) -> bool {
        matches!(self, AdmissionVerdict::Ok)
    }
}

/// Configuration inputs to admission that are not part of process-wide
/// state: the true hard cap and the factor-of-two soft cap derived from it
/// (§4.3, §9 "Factor-of-two soft cap").
#[derive(Debug, Clone, Copy)]
pub struct AdmissionLimits {
    pub max_connections: u32,
}

impl AdmissionLimits {
    /// The soft cap applied at handshake time: some of the counted workers
    /// are still in the unauthenticated handshake phase and may fail
    /// before ever counting against the true cap, which is re-enforced
    /// inside each worker when it joins shared state.
    pub fn soft_cap(&self) -> u32 {
        self.max_connections.saturating_mul(2)
    }
}

/// Decides whether a new connection may proceed, given fleet-wide state
/// and the current worker count (§4.3). Evaluated in the order the spec
/// lists the verdicts: Starting, ShuttingDown, Recovering, Saturated, Ok.
pub fn admit(state: &SupervisorState, worker_count: u32, limits: AdmissionLimits) -> AdmissionVerdict {
    if state.startup_child.is_some() {
        return AdmissionVerdict::Reject(RejectionCategory::Starting);
    }
    if state.life_phase.is_shutting_down() {
        return AdmissionVerdict::Reject(RejectionCategory::ShuttingDown);
    }
    if state.fatal_error {
        return AdmissionVerdict::Reject(RejectionCategory::Recovering);
    }
    if worker_count >= limits.soft_cap() {
        return AdmissionVerdict::Reject(RejectionCategory::Saturated);
    }
    AdmissionVerdict::Ok
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
