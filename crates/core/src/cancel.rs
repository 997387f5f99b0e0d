//! Cancellation router (C9): matches a cancel request to a registered
//! worker. Never reports anything back to the requester — a miss and a
//! secret mismatch are indistinguishable outcomes, by design (§4.9: "no
//! oracle").

use crate::ids::{CancelSecret, WorkerId};
use crate::registry::WorkerRegistry;

/// A decoded cancel-request body (§6: `uint32 worker-id, uint32
/// cancel-secret`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelRequest {
    pub worker_id: WorkerId,
    pub cancel_secret: CancelSecret,
}

/// The only two outcomes the router distinguishes internally; both are
/// silent to the client, but the daemon layer still needs to know whether
/// to actually deliver an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Delivered(WorkerId),
    Silent,
}

/// Looks up `request.worker_id` and, only if both the entry exists and its
/// cancel-secret matches, reports that the interrupt should be delivered.
pub fn route(registry: &WorkerRegistry, request: CancelRequest) -> CancelOutcome {
    match registry.find(request.worker_id) {
        Some(entry) if entry.cancel_secret == request.cancel_secret => {
            CancelOutcome::Delivered(request.worker_id)
        }
        _ => CancelOutcome::Silent,
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
