//! Startup/recovery child (§4.6): recreates whatever shared state the
//! supervisor itself refuses to touch (§1 Non-goals: "does not itself
//! ... touch shared storage beyond what is required to (re)create it at
//! boot and after a crash"). Real buffer/lock-table initialization is
//! outside this supervisor's scope; this is the minimal process that
//! fills the role, so `keeper-daemon` has a real child to spawn, wait on,
//! and classify the exit status of (§4.8).
//!
//! Unlike the other re-exec'd children this one needs no handoff file: it
//! carries no per-spawn state, only the fact that it was asked to run.

use tracing::info;

/// Runs to completion and returns the process exit code. A non-zero exit
/// here is what drives the reaper into (or back into) `CrashRecovery`
/// (§4.8); a zero exit clears `FatalError` and advances the life phase.
pub async fn run() -> i32 {
    info!("startup/recovery running");
    0
}

#[cfg(test)]
#[path = "startup_proc_tests.rs"]
mod tests;
