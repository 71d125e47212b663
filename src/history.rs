/// Default number of snapshots kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Bounded linear log of snapshots with a cursor.
///
/// The entry under the cursor is the current state. Pushing truncates any
/// redo tail and evicts the oldest entries beyond capacity.
#[derive(Debug, Clone)]
pub struct History<S> {
    /// Stack of snapshots, oldest first
    entries: Vec<S>,
    /// Index of the current snapshot, meaningless while empty
    cursor: usize,
    capacity: usize,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl<S> History<S> {
    /// Creates an empty history. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, snapshot: S) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back and return the now-current snapshot
    pub fn undo(&mut self) -> Option<&S> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward and return the now-current snapshot
    pub fn redo(&mut self) -> Option<&S> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn current(&self) -> Option<&S> {
        self.entries.get(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear the history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_truncates_redo_tail() {
        let mut h = History::new(10);
        h.push(1);
        h.push(2);
        h.push(3);
        assert_eq!(h.undo(), Some(&2));
        assert_eq!(h.undo(), Some(&1));
        h.push(4);
        assert!(!h.can_redo());
        assert_eq!(h.len(), 2);
        assert_eq!(h.undo(), Some(&1));
        assert_eq!(h.redo(), Some(&4));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::new(DEFAULT_HISTORY_CAPACITY);
        for i in 0..60 {
            h.push(i);
        }
        assert_eq!(h.len(), 50);
        assert_eq!(h.current(), Some(&59));
        while h.can_undo() {
            h.undo();
        }
        assert_eq!(h.current(), Some(&10));
        assert!(h.undo().is_none());
    }

    #[test]
    fn test_empty_history() {
        let mut h: History<u8> = History::default();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(h.undo().is_none());
        assert!(h.redo().is_none());
        assert!(h.current().is_none());
    }
}
