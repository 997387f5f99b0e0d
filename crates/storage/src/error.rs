//! Storage-layer errors (§6 Persisted state, §7 StartupFailure/BindFailure).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine the data directory")]
    NoDataDir,

    #[error("data directory {0} is missing or unreadable")]
    DataDirUnreadable(PathBuf),

    #[error("failed to acquire the lock file: another supervisor is already running")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to serialize record at {0}: {1}")]
    Serialize(PathBuf, #[source] serde_json::Error),

    #[error("failed to deserialize record at {0}: {1}")]
    Deserialize(PathBuf, #[source] serde_json::Error),

    #[error("IO error at {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}
