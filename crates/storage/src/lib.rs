// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! keeper-storage: everything the supervisor persists outside of its own
//! memory — the data-directory lock file, the options record, the
//! optional external pid file, and the per-spawn handoff file used to
//! pass a freshly re-exec'd worker or auxiliary its role (§6 Persisted
//! state, §9 exec-with-handoff).

pub mod error;
pub mod lock;
pub mod options_record;
pub mod pidfile;
pub mod spawn_file;

pub use error::StorageError;
pub use lock::LockFile;
pub use options_record::OptionsRecord;
pub use spawn_file::{read_and_delete, write, SpawnPayload};
