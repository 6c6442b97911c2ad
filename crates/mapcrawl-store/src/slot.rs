//! A single named JSON file mirroring the accumulated collection.
//!
//! Reads are forgiving: a missing or corrupt slot loads as an empty
//! collection. Writes go through a sibling temp file and a rename so a crash
//! mid-write never leaves a truncated slot behind.

use std::path::{Path, PathBuf};

use mapcrawl_core::Record;

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct JsonSlot {
    path: PathBuf,
}

impl JsonSlot {
    /// Slot stored as `<dir>/<name>.json`.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{name}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored collection, treating a missing or unreadable slot as empty.
    #[must_use]
    pub fn load(&self) -> Vec<Record> {
        match self.try_load() {
            Ok(Some(records)) => {
                tracing::info!(path = %self.path.display(), count = records.len(), "restored records from backup");
                records
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "backup could not be loaded; starting empty");
                Vec::new()
            }
        }
    }

    /// Load the stored collection, returning `Ok(None)` when no slot exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Json`] if its contents are not a record array.
    pub fn try_load(&self) -> Result<Option<Vec<Record>>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Json {
                path: self.path.display().to_string(),
                source: e,
            })
    }

    /// Overwrite the slot with `records`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, records: &[Record]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let body = serde_json::to_vec(records).map_err(|e| StoreError::Json {
            path: self.path.display().to_string(),
            source: e,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    /// Remove the slot. A slot that does not exist is already clear.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
