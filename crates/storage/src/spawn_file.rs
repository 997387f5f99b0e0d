//! Per-spawn serialization file (§6, §9 "spawn-plus-serialize" /
//! "exec-with-handoff"): on platforms without fork-based inheritance, the
//! variables a newly re-exec'd worker or auxiliary needs are written to a
//! file before spawn and read (then deleted) by the child itself.

use crate::error::StorageError;
use keeper_core::{AuxiliaryKind, ConnectionContext, WorkerId};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What a re-exec'd child needs to know about its own role. The supervisor
/// never shares writable in-process memory with a spawned child (§5), so
/// this is the entire handoff surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SpawnPayload {
    Worker { worker_id: WorkerId, context: ConnectionContext },
    Auxiliary { kind: AuxiliaryKind },
}

/// Writes the handoff file before the child is spawned (§4.4 step 4
/// ordering: registry row pre-allocated, then flush stdout, then spawn).
pub fn write(path: &Path, payload: &SpawnPayload) -> Result<(), StorageError> {
    let json = serde_json::to_vec(payload).map_err(|err| StorageError::Serialize(path.to_path_buf(), err))?;
    std::fs::write(path, json).map_err(|err| StorageError::Io(path.to_path_buf(), err))
}

/// Reads and immediately removes the handoff file. Called once, by the
/// child, immediately after it re-execs into its role.
pub fn read_and_delete(path: &Path) -> Result<SpawnPayload, StorageError> {
    let bytes = std::fs::read(path).map_err(|err| StorageError::Io(path.to_path_buf(), err))?;
    let payload = serde_json::from_slice(&bytes).map_err(|err| StorageError::Deserialize(path.to_path_buf(), err))?;
    let _ = std::fs::remove_file(path);
    Ok(payload)
}

#[cfg(test)]
#[path = "spawn_file_tests.rs"]
mod tests;
