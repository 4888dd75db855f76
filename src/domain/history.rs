//! Linear undo/redo over immutable snapshots.

use tracing::trace;

/// Ordered snapshots plus a cursor.
///
/// Recording truncates everything after the cursor first, so redo is lost
/// once a new edit branches off after an undo. With a `limit`, the oldest
/// snapshots are dropped once the stack grows past it.
#[derive(Debug, Clone)]
pub struct HistoryStack<T> {
    snapshots: Vec<T>,
    index: usize,
    limit: Option<usize>,
}

impl<T: Clone> HistoryStack<T> {
    /// Start a history whose only snapshot is `initial`.
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![initial],
            index: 0,
            limit: None,
        }
    }

    /// Limits below 1 are raised to 1: the current state is always kept.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.max(1));
        self.enforce_limit();
        self
    }

    pub fn record(&mut self, snapshot: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index = self.snapshots.len() - 1;
        self.enforce_limit();
        trace!(index = self.index, len = self.snapshots.len(), "history recorded");
    }

    /// Step back, returning the snapshot now current. `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.snapshots.get(self.index)
    }

    /// Step forward, returning the snapshot now current. `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.snapshots.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            if self.snapshots.len() > limit {
                let excess = self.snapshots.len() - limit;
                self.snapshots.drain(..excess);
                self.index = self.index.saturating_sub(excess);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fresh_history_when_undo_or_redo_then_noop() {
        let mut history = HistoryStack::new(0);
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert_eq!(history.current(), Some(&0));
    }

    #[test]
    fn given_recorded_snapshots_when_undo_redo_then_walks_linearly() {
        let mut history = HistoryStack::new(0);
        history.record(1);
        history.record(2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert_eq!(history.redo(), None);
    }

    #[test]
    fn given_undo_when_recording_then_redo_tail_discarded() {
        let mut history = HistoryStack::new(0);
        history.record(1);
        history.record(2);
        history.undo();
        history.record(3);

        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.redo(), Some(&3));
    }

    #[test]
    fn given_limit_when_exceeded_then_oldest_dropped() {
        let mut history = HistoryStack::new(0).with_limit(3);
        for i in 1..=5 {
            history.record(i);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(&5));
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert_eq!(history.undo(), None);
    }
}
