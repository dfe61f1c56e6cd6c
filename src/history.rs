//! Undo/redo history over full state snapshots.
//!
//! The history is a linear list of committed states plus a cursor. Entries
//! before the cursor are undo targets, entries after it are redo targets.
//!
//! Continuous gestures (vertex drags) don't commit on every pointer move.
//! They go through a drag buffer instead:
//! - `start_dragging` remembers the state before the gesture
//! - `update_during_drag` overwrites the in-progress state (no history growth)
//! - `finish_dragging` commits the final state as one entry
//! - `cancel_dragging` throws the in-progress state away

use crate::constants::DEFAULT_MAX_HISTORY;

/// Configuration for the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of committed states to keep, including the base state
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_HISTORY,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    revision: u64,
    value: T,
}

/// Snapshot history with a separate drag buffer.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    entries: Vec<Entry<T>>,
    current: usize,
    temp_state: Option<T>,
    original_before_drag: Option<T>,
    next_revision: u64,
    config: HistoryConfig,
}

impl<T: Clone> History<T> {
    /// Create a history whose base entry is `initial`.
    pub fn new(initial: T) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(initial: T, config: HistoryConfig) -> Self {
        Self {
            entries: vec![Entry {
                revision: 0,
                value: initial,
            }],
            current: 0,
            temp_state: None,
            original_before_drag: None,
            next_revision: 1,
            config: HistoryConfig {
                max_entries: config.max_entries.max(1),
            },
        }
    }

    fn check_invariants(&self) {
        debug_assert!(!self.entries.is_empty(), "history has no base entry");
        debug_assert!(
            self.current < self.entries.len(),
            "history cursor {} out of sync with {} entries",
            self.current,
            self.entries.len()
        );
        debug_assert!(
            self.temp_state.is_none() || self.original_before_drag.is_some(),
            "drag buffer holds a temp state without a pre-drag snapshot"
        );
    }

    /// The committed state at the cursor.
    pub fn committed(&self) -> &T {
        self.check_invariants();
        &self.entries[self.current].value
    }

    /// What the canvas shows: the in-progress drag state if any, else the committed state.
    pub fn present(&self) -> &T {
        self.temp_state.as_ref().unwrap_or_else(|| self.committed())
    }

    /// Revision number of the committed state at the cursor.
    pub fn revision(&self) -> u64 {
        self.entries[self.current].revision
    }

    /// Commit a new state. Any redo tail is discarded.
    pub fn commit(&mut self, value: T) {
        self.entries.truncate(self.current + 1);
        self.entries.push(Entry {
            revision: self.next_revision,
            value,
        });
        self.next_revision += 1;

        // Limit history size
        while self.entries.len() > self.config.max_entries {
            self.entries.remove(0);
        }
        self.current = self.entries.len() - 1;

        log::debug!(
            "📝 History: committed revision {} ({} entries)",
            self.revision(),
            self.entries.len()
        );
        self.check_invariants();
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    /// Step back one entry. An active drag is cancelled first.
    pub fn undo(&mut self) -> Option<&T> {
        if self.is_dragging() {
            self.cancel_dragging();
        }
        if !self.can_undo() {
            return None;
        }
        self.current -= 1;
        log::debug!("⏪ Undo: now at revision {}", self.revision());
        Some(self.committed())
    }

    /// Step forward one entry. An active drag is cancelled first.
    pub fn redo(&mut self) -> Option<&T> {
        if self.is_dragging() {
            self.cancel_dragging();
        }
        if !self.can_redo() {
            return None;
        }
        self.current += 1;
        log::debug!("⏩ Redo: now at revision {}", self.revision());
        Some(self.committed())
    }

    /// Drop all history and start over from `initial`.
    pub fn clear_history(&mut self, initial: T) {
        self.entries = vec![Entry {
            revision: self.next_revision,
            value: initial,
        }];
        self.next_revision += 1;
        self.current = 0;
        self.temp_state = None;
        self.original_before_drag = None;
        log::debug!("🗑️ History cleared");
    }

    /// Number of committed entries, base state included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its base state.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get number of undo steps available
    pub fn undo_count(&self) -> usize {
        self.current
    }

    /// Get number of redo steps available
    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.current - 1
    }

    pub fn is_dragging(&self) -> bool {
        self.original_before_drag.is_some()
    }

    /// Begin a drag gesture, remembering `initial` as the pre-drag state.
    pub fn start_dragging(&mut self, initial: T) {
        if self.is_dragging() {
            log::warn!("Starting new drag while previous drag still active - discarding it");
        }
        self.original_before_drag = Some(initial);
        self.temp_state = None;
        log::debug!("Drag started");
    }

    /// Replace the in-progress drag state. Does nothing outside a drag.
    pub fn update_during_drag(&mut self, value: T) {
        if self.is_dragging() {
            self.temp_state = Some(value);
        } else {
            log::warn!("Drag update without an active drag ignored");
        }
    }

    /// End the drag and commit `value` as one history entry.
    pub fn finish_dragging(&mut self, value: T) {
        self.temp_state = None;
        self.original_before_drag = None;
        self.commit(value);
        log::debug!("Drag finished");
    }

    /// Abandon the drag. Returns the pre-drag state; history is not touched.
    pub fn cancel_dragging(&mut self) -> Option<T> {
        self.temp_state = None;
        let original = self.original_before_drag.take();
        if original.is_some() {
            log::debug!("Drag cancelled");
        }
        original
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_cannot_undo_or_redo() {
        let history = History::new(0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(*history.present(), 0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_k_commits_need_k_undos() {
        let mut history = History::new(0);
        for i in 1..=5 {
            history.commit(i);
        }
        assert!(history.can_undo());

        let mut undos = 0;
        while history.undo().is_some() {
            undos += 1;
        }
        assert_eq!(undos, 5);
        assert_eq!(*history.present(), 0);
    }

    #[test]
    fn test_redo_after_undo() {
        let mut history = History::new("a");
        history.commit("b");
        assert_eq!(history.undo(), Some(&"a"));
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(&"b"));
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn test_commit_truncates_redo_tail() {
        let mut history = History::new(0);
        history.commit(1);
        history.commit(2);
        history.undo();
        history.undo();
        assert_eq!(history.redo_count(), 2);

        history.commit(7);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(*history.present(), 7);
    }

    #[test]
    fn test_max_entries() {
        let mut history = History::with_config(0, HistoryConfig { max_entries: 3 });
        for i in 1..=5 {
            history.commit(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo_count(), 2);
        assert_eq!(*history.present(), 5);
    }

    #[test]
    fn test_drag_updates_do_not_grow_history() {
        let mut history = History::new(0);
        history.start_dragging(0);
        for i in 1..100 {
            history.update_during_drag(i);
            assert_eq!(*history.present(), i);
            assert_eq!(*history.committed(), 0);
        }
        assert_eq!(history.len(), 1);

        history.finish_dragging(99);
        assert_eq!(history.len(), 2);
        assert!(!history.is_dragging());
        assert_eq!(history.undo(), Some(&0));
    }

    #[test]
    fn test_cancel_drag_restores_pre_drag_state() {
        let mut history = History::new(10);
        history.commit(20);
        history.start_dragging(20);
        history.update_during_drag(21);
        history.update_during_drag(22);

        assert_eq!(history.cancel_dragging(), Some(20));
        assert_eq!(history.len(), 2);
        assert_eq!(*history.present(), 20);
        assert!(!history.is_dragging());
    }

    #[test]
    fn test_present_falls_back_before_first_update() {
        let mut history = History::new(1);
        history.start_dragging(1);
        assert_eq!(*history.present(), 1);
        assert!(history.is_dragging());
    }

    #[test]
    fn test_undo_during_drag_cancels_drag() {
        let mut history = History::new(0);
        history.commit(1);
        history.start_dragging(1);
        history.update_during_drag(5);
        assert_eq!(history.undo(), Some(&0));
        assert!(!history.is_dragging());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_update_outside_drag_is_ignored() {
        let mut history = History::new(0);
        history.update_during_drag(3);
        assert_eq!(*history.present(), 0);
    }

    #[test]
    fn test_clear_history() {
        let mut history = History::new(0);
        history.commit(1);
        let before = history.revision();
        history.clear_history(42);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(*history.present(), 42);
        assert_ne!(history.revision(), before);
    }

    #[test]
    fn test_revisions_are_unique_per_commit() {
        let mut history = History::new(0);
        history.commit(1);
        let r1 = history.revision();
        history.undo();
        history.commit(2);
        assert_ne!(history.revision(), r1);
    }
}
