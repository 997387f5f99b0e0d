//! The optional external pid file (§6 "Persisted state"): a plain text
//! file outside the data directory that tooling (init scripts, process
//! supervisors) can read without knowing the data-directory layout.

use crate::error::StorageError;
use std::path::Path;

pub fn write(path: &Path, pid: u32) -> Result<(), StorageError> {
    std::fs::write(path, format!("{pid}\n")).map_err(|err| StorageError::Io(path.to_path_buf(), err))
}

pub fn remove_if_present(path: &Path) {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

#[cfg(test)]
#[path = "pidfile_tests.rs"]
mod tests;
