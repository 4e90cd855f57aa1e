// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Linear snapshot history for undo/redo.
//!
//! Every entry is a complete snapshot, not a diff. `cursor` always points at
//! a valid entry; pushing after an undo discards the redo branch.

/// History of complete snapshots with a cursor at the active one.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T: Clone> {
    /// Snapshots, oldest first
    entries: Vec<T>,
    /// Index of the active snapshot
    cursor: usize,
    /// Maximum number of snapshots kept (unbounded if `None`)
    max_size: Option<usize>,
}

impl<T: Clone> History<T> {
    /// Start a history holding a single snapshot.
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            max_size: None,
        }
    }

    /// Limit the number of snapshots kept; the oldest are dropped first.
    pub fn with_max_size(mut self, max_size: Option<usize>) -> Self {
        self.max_size = max_size.map(|n| n.max(1));
        self.enforce_limit();
        self
    }

    /// Rebuild a history from persisted parts.
    ///
    /// Returns `None` if `entries` is empty or `cursor` is out of range.
    pub fn from_parts(entries: Vec<T>, cursor: usize) -> Option<Self> {
        if cursor >= entries.len() {
            return None;
        }
        Some(Self {
            entries,
            cursor,
            max_size: None,
        })
    }

    /// The active snapshot.
    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Truncate any redo branch, append `snapshot` and make it active.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(snapshot);
        self.cursor = self.entries.len() - 1;
        self.enforce_limit();
    }

    /// Replace the whole history with a single snapshot.
    pub fn reset(&mut self, snapshot: T) {
        self.entries.clear();
        self.entries.push(snapshot);
        self.cursor = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back; returns the newly active snapshot.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Step forward; returns the newly active snapshot.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    fn enforce_limit(&mut self) {
        let Some(max) = self.max_size else {
            return;
        };
        if self.entries.len() <= max {
            return;
        }
        // Redo entries go first, then the oldest; the active snapshot stays.
        let mut excess = self.entries.len() - max;
        let redo = self.entries.len() - self.cursor - 1;
        let from_redo = excess.min(redo);
        self.entries.truncate(self.entries.len() - from_redo);
        excess -= from_redo;

        let from_front = excess.min(self.cursor);
        self.entries.drain(..from_front);
        self.cursor -= from_front;
    }
}

#[cfg(test)]
mod tests {
    use super::History;

    #[test]
    fn test_undo_redo_flow() {
        let mut history = History::new(vec![1]);
        history.push(vec![1, 2]);
        history.push(vec![1, 2, 3]);

        assert_eq!(history.undo(), Some(&vec![1, 2]));
        assert_eq!(history.undo(), Some(&vec![1]));
        assert_eq!(history.undo(), None);
        assert!(!history.can_undo());

        assert_eq!(history.redo(), Some(&vec![1, 2]));
        history.push(vec![9]);
        assert_eq!(history.redo(), None);
        assert_eq!(history.entries(), &[vec![1], vec![1, 2], vec![9]]);
    }

    #[test]
    fn test_reset_drops_everything() {
        let mut history = History::new(0);
        history.push(1);
        history.push(2);
        history.reset(7);

        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert_eq!(*history.current(), 7);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_size_drops_oldest() {
        let mut history = History::new(0).with_max_size(Some(3));
        for i in 1..=5 {
            history.push(i);
        }

        assert_eq!(history.entries(), &[3, 4, 5]);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn test_limit_keeps_active_snapshot() {
        let at_start = History::from_parts(vec![0, 1, 2, 3, 4, 5], 0)
            .unwrap()
            .with_max_size(Some(3));
        assert_eq!(*at_start.current(), 0);
        assert_eq!(at_start.entries(), &[0, 1, 2]);
        assert_eq!(at_start.cursor(), 0);

        let near_start = History::from_parts(vec![0, 1, 2, 3, 4, 5], 1)
            .unwrap()
            .with_max_size(Some(3));
        assert_eq!(*near_start.current(), 1);
        assert_eq!(near_start.entries(), &[0, 1, 2]);

        let near_end = History::from_parts(vec![0, 1, 2, 3, 4, 5], 4)
            .unwrap()
            .with_max_size(Some(2));
        assert_eq!(*near_end.current(), 4);
        assert_eq!(near_end.entries(), &[3, 4]);
        assert!(!near_end.can_redo());
    }

    #[test]
    fn test_from_parts_rejects_bad_cursor() {
        assert!(History::<u8>::from_parts(vec![], 0).is_none());
        assert!(History::from_parts(vec![1, 2], 2).is_none());

        let history = History::from_parts(vec![1, 2, 3], 1).unwrap();
        assert_eq!(*history.current(), 2);
        assert!(history.can_undo());
        assert!(history.can_redo());
    }
}
