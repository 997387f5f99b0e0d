//! The data-directory lock file: records the supervisor's process id and
//! listening port, and exclusively owns the data directory for the
//! lifetime of the process (§6 "Persisted state").

use crate::error::StorageError;
use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An acquired, exclusively-locked lock file. The lock is released when
/// this value is dropped, at which point the file itself is left behind
/// (removed explicitly during an orderly shutdown, see `keeper-daemon`'s
/// lifecycle).
pub struct LockFile {
    path: PathBuf,
    file: std::fs::File,
}

impl LockFile {
    /// Acquires the lock **before** any other startup work, matching the
    /// ordering the rest of this crate depends on: a second supervisor
    /// must fail fast rather than race the first over the socket or
    /// options-record files.
    pub fn acquire(path: &Path, pid: u32, port: Option<u16>) -> Result<Self, StorageError> {
        let file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|err| StorageError::Io(path.to_path_buf(), err))?;
        file.try_lock_exclusive().map_err(StorageError::LockFailed)?;

        let mut file = file;
        file.set_len(0).map_err(|err| StorageError::Io(path.to_path_buf(), err))?;
        match port {
            Some(port) => writeln!(file, "{pid}\n{port}"),
            None => writeln!(file, "{pid}"),
        }
        .map_err(|err| StorageError::Io(path.to_path_buf(), err))?;

        Ok(Self { path: path.to_path_buf(), file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
