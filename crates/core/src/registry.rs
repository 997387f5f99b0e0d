//! Worker registry (C5): the authoritative set of live workers.
//!
//! Writable only by the spawner and reaper; readable by the cancellation
//! router. In the real supervisor all mutation is serialized by masking
//! signal delivery for the duration of the call (§4.5) rather than by a
//! lock — `keeper-daemon` enforces that by only ever touching this type
//! from the single main-loop task. `IndexMap` gives deterministic
//! insertion-order iteration, which keeps "drain the registry" logic and
//! its tests reproducible.

use crate::clock::Clock;
use crate::ids::{CancelSecret, WorkerId};
use indexmap::IndexMap;

/// A single live worker's registry row (§3 WorkerEntry).
#[derive(Debug, Clone, Copy)]
pub struct WorkerEntry {
    pub worker_id: WorkerId,
    pub cancel_secret: CancelSecret,
    pub created_at_epoch_ms: u64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("worker {0} is already registered")]
    AlreadyRegistered(WorkerId),
}

/// Authoritative set of live workers (§3, §4.5).
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    entries: IndexMap<WorkerId, WorkerEntry>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self { entries: IndexMap::new() }
    }

    /// Inserts a freshly spawned worker's row. Must happen before the
    /// worker begins execution so a cancel arriving immediately after
    /// spawn cannot miss it (§3, §5 ordering guarantee).
    pub fn insert(&mut self, entry: WorkerEntry) -> Result<(), RegistryError> {
        if self.entries.contains_key(&entry.worker_id) {
            return Err(RegistryError::AlreadyRegistered(entry.worker_id));
        }
        self.entries.insert(entry.worker_id, entry);
        Ok(())
    }

    /// Removes a worker once it has been observed to exit. Returns the
    /// removed entry, if any; removing an absent id is not an error since
    /// the reaper may race a duplicate exit notification.
    pub fn remove(&mut self, worker_id: WorkerId) -> Option<WorkerEntry> {
        self.entries.shift_remove(&worker_id)
    }

    pub fn find(&self, worker_id: WorkerId) -> Option<&WorkerEntry> {
        self.entries.get(&worker_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkerEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn worker_ids(&self) -> impl Iterator<Item = WorkerId> + '_ {
        self.entries.keys().copied()
    }
}

/// Builds a registry row, drawing the secret from the given entropy source
/// and the timestamp from the given clock. Does not insert it; callers
/// decide insertion order relative to the spawn itself (§4.4 step 2).
pub fn new_entry(
    worker_id: WorkerId,
    cancel_secret: CancelSecret,
    clock: &impl Clock,
) -> WorkerEntry {
    WorkerEntry {
        worker_id,
        cancel_secret,
        created_at_epoch_ms: clock.epoch_ms(),
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
