//! The options-record file: the exact argument vector used to start the
//! supervisor, persisted so `reload` and diagnostics can recover it
//! (§6 "Persisted state").

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsRecord {
    pub argv: Vec<String>,
}

impl OptionsRecord {
    pub fn from_current_process() -> Self {
        Self { argv: std::env::args().collect() }
    }

    pub fn write(&self, path: &Path) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(self).map_err(|err| StorageError::Serialize(path.to_path_buf(), err))?;
        std::fs::write(path, json).map_err(|err| StorageError::Io(path.to_path_buf(), err))
    }

    pub fn read(path: &Path) -> Result<Self, StorageError> {
        let bytes = std::fs::read(path).map_err(|err| StorageError::Io(path.to_path_buf(), err))?;
        serde_json::from_slice(&bytes).map_err(|err| StorageError::Deserialize(path.to_path_buf(), err))
    }
}

#[cfg(test)]
#[path = "options_record_tests.rs"]
mod tests;
