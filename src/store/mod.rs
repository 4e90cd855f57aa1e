// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation store with undo/redo history.
//!
//! The store exclusively owns the annotation list of one editing session.
//! Every mutation records a complete snapshot in a linear [`History`]; the
//! working list is always the snapshot at the history cursor. Other
//! components observe changes through [`AnnotationStore::subscribe`] and the
//! owning session persists state with [`AnnotationStore::save`] /
//! [`AnnotationStore::load`].

pub mod history;
pub mod storage;

use crate::error::AnnotationError;
use crate::io::serialization;
use crate::models::annotation::{Annotation, AnnotationPatch};
use anyhow::{Context, Result};
use history::History;
use storage::{
    PersistedBlob, PersistedState, StorageBackend, VersionProbe, STORE_SLOT, STORE_VERSION,
};

/// Handle returned by [`AnnotationStore::subscribe`].
pub type SubscriptionId = u64;

/// Undo/redo position reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub current_step: usize,
    pub len: usize,
}

type Listener = Box<dyn FnMut(&[Annotation], HistoryStatus)>;

/// Session-scoped annotation store.
pub struct AnnotationStore {
    history: History<Vec<Annotation>>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStore")
            .field("history", &self.history)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AnnotationStore {
    /// Create an empty store: one empty snapshot, cursor 0.
    pub fn new() -> Self {
        Self::from_history(History::new(Vec::new()))
    }

    fn from_history(history: History<Vec<Annotation>>) -> Self {
        Self {
            history,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Cap the number of snapshots kept in history.
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = self.history.with_max_size(limit);
        self
    }

    /// The working list.
    pub fn annotations(&self) -> &[Annotation] {
        self.history.current()
    }

    pub fn get(&self, id: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|a| a.id() == id)
    }

    /// All snapshots, oldest first.
    pub fn history(&self) -> &[Vec<Annotation>] {
        self.history.entries()
    }

    pub fn current_step(&self) -> usize {
        self.history.cursor()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            current_step: self.current_step(),
            len: self.history.len(),
        }
    }

    /// Register a listener called after every change to the working list
    /// or history position.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&[Annotation], HistoryStatus) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    fn notify(&mut self) {
        let status = self.status();
        let annotations = self.history.current();
        for (_, listener) in self.listeners.iter_mut() {
            listener(annotations, status);
        }
    }

    fn commit(&mut self, snapshot: Vec<Annotation>) {
        self.history.push(snapshot);
        self.notify();
    }

    /// Append an annotation as a new history step.
    pub fn add(&mut self, annotation: Annotation) -> Result<(), AnnotationError> {
        if self.get(annotation.id()).is_some() {
            return Err(AnnotationError::DuplicateId(annotation.id().to_string()));
        }
        annotation.validate()?;

        log::debug!("Adding {} annotation {}", annotation.kind().as_str(), annotation.id());
        let mut snapshot = self.annotations().to_vec();
        snapshot.push(annotation);
        self.commit(snapshot);
        Ok(())
    }

    /// Remove the annotation with `id` as a new history step.
    ///
    /// A missing id is reported as `NotFound` and records nothing.
    pub fn remove(&mut self, id: &str) -> Result<Annotation, AnnotationError> {
        let index = self
            .annotations()
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        let mut snapshot = self.annotations().to_vec();
        let removed = snapshot.remove(index);
        self.commit(snapshot);
        Ok(removed)
    }

    /// Merge `patch` into the annotation with `id` as a new history step.
    ///
    /// A missing id is reported as `NotFound` and records nothing.
    pub fn update(&mut self, id: &str, patch: AnnotationPatch) -> Result<(), AnnotationError> {
        let index = self
            .annotations()
            .iter()
            .position(|a| a.id() == id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        let mut snapshot = self.annotations().to_vec();
        snapshot[index].apply(patch)?;
        self.commit(snapshot);
        Ok(())
    }

    /// Empty the working list and collapse history to one empty snapshot.
    pub fn clear(&mut self) {
        self.history.reset(Vec::new());
        self.notify();
    }

    /// Step back one snapshot; returns whether anything changed.
    pub fn undo(&mut self) -> bool {
        if self.history.undo().is_none() {
            return false;
        }
        self.notify();
        true
    }

    /// Step forward one snapshot; returns whether anything changed.
    pub fn redo(&mut self) -> bool {
        if self.history.redo().is_none() {
            return false;
        }
        self.notify();
        true
    }

    /// Serialize the working list as pretty-printed JSON.
    pub fn export_annotations(&self) -> Result<String, AnnotationError> {
        serialization::to_json(self.annotations())
    }

    /// Replace the working list with parsed `json`, starting a fresh history.
    ///
    /// On error nothing changes. Returns the number of imported annotations.
    pub fn import_annotations(&mut self, json: &str) -> Result<usize, AnnotationError> {
        let annotations = serialization::from_json(json)?;
        Ok(self.replace_all(annotations))
    }

    /// Replace the working list with already-validated annotations,
    /// starting a fresh history.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) -> usize {
        let count = annotations.len();
        self.history.reset(annotations);
        self.notify();
        count
    }

    /// Write the committed state to the store's slot.
    pub fn save(&self, storage: &mut dyn StorageBackend) -> Result<()> {
        let blob = PersistedBlob {
            state: PersistedState {
                annotations: self.annotations().to_vec(),
                history: self.history().to_vec(),
                current_step: self.current_step(),
            },
            version: STORE_VERSION,
        };
        let json = serde_json::to_string(&blob).context("failed to serialize store state")?;
        storage.write(STORE_SLOT, &json)?;
        log::debug!(
            "Persisted {} annotations, step {}/{}",
            blob.state.annotations.len(),
            blob.state.current_step + 1,
            blob.state.history.len()
        );
        Ok(())
    }

    /// Rehydrate from the store's slot.
    ///
    /// A missing, unreadable, corrupted or differently-versioned blob yields
    /// an empty store; the problem is logged and never propagated.
    pub fn load(storage: &dyn StorageBackend) -> Self {
        match Self::restore(storage) {
            Ok(Some(store)) => store,
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("Discarding persisted annotation state: {:#}", e);
                Self::new()
            }
        }
    }

    fn restore(storage: &dyn StorageBackend) -> Result<Option<Self>> {
        let Some(json) = storage.read(STORE_SLOT)? else {
            return Ok(None);
        };

        let probe: VersionProbe =
            serde_json::from_str(&json).context("persisted state is not a versioned blob")?;
        if probe.version != STORE_VERSION {
            anyhow::bail!(
                "persisted state has version {}, expected {}",
                probe.version,
                STORE_VERSION
            );
        }

        let blob: PersistedBlob =
            serde_json::from_str(&json).context("persisted state is corrupted")?;
        let PersistedState {
            annotations,
            history,
            current_step,
        } = blob.state;

        let history = History::from_parts(history, current_step).with_context(|| {
            format!("history cursor {} is out of range", current_step)
        })?;
        if history.current() != &annotations {
            anyhow::bail!("working list does not match history[{}]", current_step);
        }
        for (step, snapshot) in history.entries().iter().enumerate() {
            serialization::ensure_unique_ids(snapshot)
                .with_context(|| format!("history[{}] is inconsistent", step))?;
        }

        log::info!(
            "Restored {} annotations ({} history steps)",
            annotations.len(),
            history.len()
        );
        Ok(Some(Self::from_history(history)))
    }
}
