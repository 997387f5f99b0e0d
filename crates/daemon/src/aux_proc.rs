//! Auxiliary-side takeover after exec-with-handoff: the counterpart to
//! `worker_proc` for the four steady-state auxiliaries (§4.6). Real page
//! writing, archiving, stats collection, and log redirection are all
//! outside this supervisor's scope; this is the minimal process that
//! occupies the role so the reaper and signal plumbing have something
//! real to track.

use keeper_core::AuxiliaryKind;
use keeper_storage::SpawnPayload;
use tracing::info;

pub async fn run(payload: SpawnPayload) -> i32 {
    let SpawnPayload::Auxiliary { kind } = payload else {
        tracing::error!("auxiliary handoff file did not contain an auxiliary payload");
        return 1;
    };

    info!(?kind, "auxiliary taking over its role");
    wait_for_stop(kind).await;
    0
}

async fn wait_for_stop(kind: AuxiliaryKind) {
    let mut terminate = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(signal) => signal,
        Err(_) => return,
    };
    let mut quit = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::quit()) {
        Ok(signal) => signal,
        Err(_) => return,
    };
    tokio::select! {
        _ = terminate.recv() => info!(?kind, "auxiliary stopping on terminate"),
        _ = quit.recv() => info!(?kind, "auxiliary stopping on quit"),
    }
}

#[cfg(test)]
#[path = "aux_proc_tests.rs"]
mod tests;
