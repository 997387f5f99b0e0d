//! Worker-side takeover after exec-with-handoff (§4.4 "the worker, once
//! alive, ..."). Everything this module does is already outside the core
//! supervisor by the spec's own account — actual authentication and query
//! execution are a different system — so this is a faithful but minimal
//! stand-in: take over the process, adopt a clean signal disposition, and
//! idle until asked to stop.

use keeper_core::WorkerId;
use keeper_storage::SpawnPayload;
use tracing::info;

/// Runs as the re-exec'd child once it has read and deleted its own
/// handoff file. Returns the process exit code.
pub async fn run(worker_id: WorkerId, payload: SpawnPayload) -> i32 {
    let SpawnPayload::Worker { context, .. } = payload else {
        tracing::error!("worker handoff file did not contain a worker payload");
        return 1;
    };

    info!(%worker_id, user = ?context.user, database = ?context.database, "worker taking over connection");

    // The supervisor's listener descriptors are not inherited across
    // `exec` in this process model, so there is nothing to close here; a
    // fork-based worker would need to do so explicitly (§4.4).
    wait_for_stop().await;
    0
}

async fn wait_for_stop() {
    let mut terminate = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(signal) => signal,
        Err(_) => return,
    };
    terminate.recv().await;
}

#[cfg(test)]
#[path = "worker_proc_tests.rs"]
mod tests;
