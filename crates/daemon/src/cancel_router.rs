//! Cancellation router wiring (C9): routes a decoded [`CancelRequest`]
//! against the live registry and, on a match, delivers a real interrupt to
//! the matched worker's pid (§4.9).

use std::collections::HashMap;

use keeper_core::{route, CancelOutcome, CancelRequest, ChildSignal, WorkerId, WorkerRegistry};

use crate::signals::deliver;

/// Routes `request` and, if it matched a live worker, signals its pid. The
/// outcome is returned only for logging/testing; nothing is ever reported
/// back to the client that sent the cancel request (§4.9 "no oracle").
pub fn handle_cancel(
    registry: &WorkerRegistry,
    pids: &HashMap<WorkerId, u32>,
    request: CancelRequest,
) -> CancelOutcome {
    let outcome = route(registry, request);
    if let CancelOutcome::Delivered(worker_id) = outcome {
        if let Some(&pid) = pids.get(&worker_id) {
            deliver(pid, ChildSignal::Interrupt);
        }
    }
    outcome
}

#[cfg(test)]
#[path = "cancel_router_tests.rs"]
mod tests;
