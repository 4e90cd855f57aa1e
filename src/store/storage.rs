// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Durable key-value slots for persisted store state.
//!
//! The store writes one versioned JSON blob to a named slot:
//! `{ "state": { "annotations", "history", "currentStep" }, "version" }`.

use crate::models::annotation::Annotation;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Slot name the annotation store persists under.
pub const STORE_SLOT: &str = "annotation-store";

/// Schema version of [`PersistedBlob`]; blobs with another version are discarded.
pub const STORE_VERSION: u32 = 1;

/// A backend holding named string slots.
pub trait StorageBackend {
    /// Read a slot; `Ok(None)` if it was never written.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot.
    fn write(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot. Removing a missing slot is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Stores each slot as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;

        // Replace atomically via rename
        let path = self.slot_path(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

/// In-memory slots, used when persistence is disabled and in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }
}

/// Committed store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub annotations: Vec<Annotation>,
    pub history: Vec<Vec<Annotation>>,
    pub current_step: usize,
}

/// Versioned envelope written to [`STORE_SLOT`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedBlob {
    pub state: PersistedState,
    pub version: u32,
}

/// Just the version tag, read before trusting the rest of a blob.
#[derive(Deserialize)]
pub(crate) struct VersionProbe {
    pub version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.read("slot").unwrap(), None);

        storage.write("slot", "one").unwrap();
        storage.write("slot", "two").unwrap();
        assert_eq!(storage.read("slot").unwrap().as_deref(), Some("two"));

        storage.remove("slot").unwrap();
        storage.remove("slot").unwrap();
        assert_eq!(storage.read("slot").unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let slot_dir = dir.path().join("nested").join("state");
        let mut storage = FileStorage::new(&slot_dir);

        assert_eq!(storage.read(STORE_SLOT).unwrap(), None);
        storage.write(STORE_SLOT, "{}").unwrap();
        assert!(slot_dir.join("annotation-store.json").exists());
        assert_eq!(storage.read(STORE_SLOT).unwrap().as_deref(), Some("{}"));

        storage.remove(STORE_SLOT).unwrap();
        assert_eq!(storage.read(STORE_SLOT).unwrap(), None);
    }
}
