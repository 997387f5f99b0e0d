//! Auxiliary supervisor (C6): the four steady-state auxiliaries of §4.6
//! that are tracked via [`AuxiliaryKind`] — the startup/recovery child is
//! tracked separately as `SupervisorState::startup_child` and driven by
//! C7/C8 directly (`Effect::RetryStartup`), since it is not itself an
//! `AuxiliaryKind`.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use thiserror::Error;
use tokio::process::{Child, Command};

use keeper_core::{AuxiliaryKind, LifePhase, SupervisorState, WorkerId};
use keeper_storage::{write, SpawnPayload, StorageError};

/// The subset of configuration that governs whether an auxiliary is
/// required, independent of process-wide state (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct AuxiliaryConfig {
    pub archiving_enabled: bool,
    pub log_redirection_enabled: bool,
}

#[derive(Debug, Error)]
pub enum AuxSpawnError {
    #[error("failed to write the spawn handoff file: {0}")]
    Handoff(#[from] StorageError),
    #[error("failed to start auxiliary process: {0}")]
    Exec(#[source] std::io::Error),
}

/// A running auxiliary's identity and OS handle.
struct Slot {
    worker_id: WorkerId,
    child: Child,
}

/// Tracks which of the four auxiliaries are currently live. Writable only
/// from the main-loop task, mirroring `WorkerRegistry`'s single-writer rule
/// (§4.5).
#[derive(Default)]
pub struct AuxiliaryTable {
    slots: HashMap<AuxiliaryKind, Slot>,
}

impl AuxiliaryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_present(&self, kind: AuxiliaryKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn worker_id(&self, kind: AuxiliaryKind) -> Option<WorkerId> {
        self.slots.get(&kind).map(|slot| slot.worker_id)
    }

    pub fn pid(&self, kind: AuxiliaryKind) -> Option<u32> {
        self.slots.get(&kind).and_then(|slot| slot.child.id())
    }

    fn insert(&mut self, kind: AuxiliaryKind, worker_id: WorkerId, child: Child) {
        self.slots.insert(kind, Slot { worker_id, child });
    }

    /// Removes the slot for `kind`, returning its child handle so the
    /// caller can finish reaping it. Absent is not an error: the reaper may
    /// race a duplicate exit notification (mirrors `WorkerRegistry::remove`).
    pub fn remove(&mut self, kind: AuxiliaryKind) -> Option<Child> {
        self.slots.remove(&kind).map(|slot| slot.child)
    }

    pub fn kinds_present(&self) -> impl Iterator<Item = AuxiliaryKind> + '_ {
        self.slots.keys().copied()
    }

    /// Non-blocking check of every tracked auxiliary; removes and returns
    /// the first one found to have exited. `None` if all are still
    /// running (or there is nothing to check).
    pub fn poll_exited(&mut self) -> Option<(AuxiliaryKind, std::process::ExitStatus)> {
        let exited_kind = self.slots.iter_mut().find_map(|(kind, slot)| match slot.child.try_wait() {
            Ok(Some(status)) => Some((*kind, status)),
            _ => None,
        });
        if let Some((kind, status)) = exited_kind {
            self.slots.remove(&kind);
            return Some((kind, status));
        }
        None
    }
}

/// Whether `kind` must be running right now, per the §4.6 table. The
/// startup/recovery auxiliary is excluded; see the module doc comment.
pub fn required(kind: AuxiliaryKind, state: &SupervisorState, config: AuxiliaryConfig) -> bool {
    match kind {
        AuxiliaryKind::PageWriter => state.page_writer_required(),
        AuxiliaryKind::Archiver => state.life_phase == LifePhase::Running && config.archiving_enabled,
        AuxiliaryKind::Stats => state.life_phase == LifePhase::Running,
        AuxiliaryKind::Logger => config.log_redirection_enabled,
    }
}

/// Whether `kind`'s death, observed outside of a deliberate shutdown signal,
/// should be treated as a crash (§4.6, §4.8). Only the page writer's death
/// triggers crash recovery; the reaper handles that case directly. The
/// other three are restarted best-effort and their death is never fatal.
pub fn death_is_crash(kind: AuxiliaryKind) -> bool {
    matches!(kind, AuxiliaryKind::PageWriter)
}

/// Every `AuxiliaryKind` that is required right now but not currently
/// present, in a fixed, deterministic order. Called on every tick and after
/// any effect that might change an auxiliary's required-ness
/// (`SchedulePageWriter`, `ConditionallyScheduleArchiverAndStats`,
/// `RestartAuxiliary`).
pub fn missing(state: &SupervisorState, config: AuxiliaryConfig, table: &AuxiliaryTable) -> Vec<AuxiliaryKind> {
    [AuxiliaryKind::PageWriter, AuxiliaryKind::Archiver, AuxiliaryKind::Stats, AuxiliaryKind::Logger]
        .into_iter()
        .filter(|&kind| required(kind, state, config) && !table.is_present(kind))
        .collect()
}

/// Spawns `kind` via exec-with-handoff (§9), the same strategy `spawn.rs`
/// uses for client workers, and records it in `table`.
pub async fn spawn_auxiliary(
    table: &mut AuxiliaryTable,
    handoff_dir: &Path,
    exe: &Path,
    worker_id: WorkerId,
    kind: AuxiliaryKind,
) -> Result<(), AuxSpawnError> {
    let handoff_path = handoff_dir.join(format!("aux-{}.json", nanoid::nanoid!(12)));
    write(&handoff_path, &SpawnPayload::Auxiliary { kind })?;

    let _ = std::io::stdout().flush();

    let child = Command::new(exe)
        .arg("--aux-handoff")
        .arg(&handoff_path)
        .stdin(std::process::Stdio::null())
        .spawn()
        .map_err(|err| {
            let _ = std::fs::remove_file(&handoff_path);
            AuxSpawnError::Exec(err)
        })?;

    table.insert(kind, worker_id, child);
    Ok(())
}

#[cfg(test)]
#[path = "aux_tests.rs"]
mod tests;
