//! Daemon-level errors (§7): mostly thin wrappers that record enough
//! context to decide an exit code in `main`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine the data directory")]
    NoDataDir,

    #[error("data directory {0} is missing or unreadable")]
    DataDirUnreadable(PathBuf),

    #[error("failed to acquire the lock file: another supervisor is already running")]
    LockFailed(#[source] std::io::Error),

    #[error("no listener endpoint could be bound")]
    BindFailed,

    #[error("storage error: {0}")]
    Storage(#[from] keeper_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LifecycleError {
    /// Maps to the exit codes of §6's CLI surface table.
    pub fn exit_code(&self) -> i32 {
        match self {
            LifecycleError::NoDataDir | LifecycleError::DataDirUnreadable(_) => 2,
            _ => 1,
        }
    }
}
