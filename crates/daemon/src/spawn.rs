//! Worker spawner (C4): the five-step sequence of §4.4, implemented as
//! "exec-with-handoff" (§9) — the same `keeperd` binary is re-exec'd with
//! a hidden `--worker-handoff <path>` flag pointing at a per-spawn
//! serialization file, instead of forking and inheriting memory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::warn;

use keeper_core::{
    new_entry, CancelSecret, ConnectionContext, EntropySource, WorkerId, WorkerRegistry,
};
use keeper_storage::{write, SpawnPayload, StorageError};

#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("a worker with this id is already registered")]
    AlreadyRegistered,
    #[error("failed to write the spawn handoff file: {0}")]
    Handoff(#[from] StorageError),
    #[error("failed to start worker process: {0}")]
    Exec(#[source] std::io::Error),
}

/// A worker the supervisor just spawned: its registry identity and the OS
/// handle needed to later wait on and signal it.
pub struct SpawnedWorker {
    pub worker_id: WorkerId,
    pub child: Child,
}

/// Runs the §4.4 sequence. `next_worker_id` generates the next unique id
/// (monotonic counter owned by the caller); `handoff_dir` is where the
/// per-spawn JSON file is written.
pub async fn spawn_worker(
    registry: &mut WorkerRegistry,
    entropy: &dyn EntropySource,
    clock: &impl keeper_core::Clock,
    handoff_dir: &Path,
    exe: &Path,
    worker_id: WorkerId,
    mut context: ConnectionContext,
) -> Result<SpawnedWorker, SpawnError> {
    // Step 1: draw the cancel-secret before anything else so the entropy
    // sequence advances even if the spawn itself later fails.
    let cancel_secret = CancelSecret::new(entropy.next_u32());
    context.cancel_secret = Some(cancel_secret);

    // Step 2: pre-allocate the registry row.
    let entry = new_entry(worker_id, cancel_secret, clock);
    registry.insert(entry).map_err(|_| SpawnError::AlreadyRegistered)?;

    match try_spawn(handoff_dir, exe, worker_id, context).await {
        Ok(child) => Ok(SpawnedWorker { worker_id, child }),
        Err(err) => {
            // Step 4 failure path: free the pre-allocated row.
            registry.remove(worker_id);
            Err(err)
        }
    }
}

async fn try_spawn(
    handoff_dir: &Path,
    exe: &Path,
    worker_id: WorkerId,
    context: ConnectionContext,
) -> Result<Child, SpawnError> {
    let handoff_path = handoff_dir.join(format!("spawn-{}.json", nanoid::nanoid!(12)));
    write(&handoff_path, &SpawnPayload::Worker { worker_id, context })?;

    // Step 3: flush stdout so the child does not duplicate buffered output
    // across the spawn boundary.
    let _ = std::io::stdout().flush();

    // Step 4: spawn via re-exec-with-handoff.
    Command::new(exe)
        .arg("--worker-handoff")
        .arg(&handoff_path)
        .stdin(Stdio::null())
        .spawn()
        .map_err(|err| {
            let _ = std::fs::remove_file(&handoff_path);
            SpawnError::Exec(err)
        })
}

/// Where per-spawn handoff files live under the data directory.
pub fn handoff_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("spawn")
}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
