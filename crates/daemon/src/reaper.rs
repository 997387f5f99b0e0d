//! Reaper wiring (C8): the non-blocking `waitpid`-equivalent loop that
//! turns real child exits into [`keeper_core::reaper::reap`] calls. The
//! classification logic itself lives in `keeper-core`; this module only
//! owns the pid table and the OS-level polling (`Child::try_wait`, which
//! wraps a non-blocking `waitpid(pid, WNOHANG)` under the hood).

use std::collections::HashMap;

use keeper_core::{ChildRole, ExitOutcome, WorkerId};

use crate::aux::AuxiliaryTable;

/// Polls every tracked child with a non-blocking wait and returns the
/// first one found to have exited, along with its classified outcome.
/// Called once per `ChildExit` signal and once per tick, since SIGCHLD
/// coalesces multiple simultaneous exits into a single notification — the
/// main loop keeps calling this until it returns `None` before moving on.
pub fn poll_one_exit(
    startup_child: &mut Option<(WorkerId, tokio::process::Child)>,
    aux_table: &mut AuxiliaryTable,
    workers: &mut HashMap<WorkerId, tokio::process::Child>,
) -> Option<(ChildRole, ExitOutcome)> {
    if let Some((_, child)) = startup_child.as_mut() {
        if let Ok(Some(status)) = child.try_wait() {
            startup_child.take();
            return Some((ChildRole::StartupChild, outcome_of(status)));
        }
    }

    if let Some((kind, status)) = aux_table.poll_exited() {
        return Some((ChildRole::Auxiliary(kind), outcome_of(status)));
    }

    let exited_worker = workers.iter_mut().find_map(|(id, child)| match child.try_wait() {
        Ok(Some(status)) => Some((*id, status)),
        _ => None,
    });
    if let Some((id, status)) = exited_worker {
        workers.remove(&id);
        return Some((ChildRole::Worker(id), outcome_of(status)));
    }

    None
}

fn outcome_of(status: std::process::ExitStatus) -> ExitOutcome {
    if status.success() {
        ExitOutcome::Zero
    } else {
        ExitOutcome::NonZero
    }
}

#[cfg(test)]
#[path = "reaper_tests.rs"]
mod tests;
