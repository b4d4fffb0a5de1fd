//! Per-tab navigation history
//!
//! A pure, indexable log of addresses with a current position. The stack
//! never performs I/O: after `back()`/`forward()` the caller instructs the
//! rendering surface to load whatever address the position lands on.

use serde::{Deserialize, Serialize};

/// Invariant: `entries` is never empty and `index < entries.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryStack {
    entries: Vec<String>,
    index: usize,
}

impl HistoryStack {
    /// Seed the stack with the tab's initial address.
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            index: 0,
        }
    }

    /// Record a navigation.
    ///
    /// Re-pushing the current entry is a no-op, so redundant commit signals
    /// from the engine cause no growth. A push from a mid-stack position
    /// discards the forward branch first: a fresh navigation after going
    /// back replaces what was ahead, matching standard browser semantics.
    pub fn push(&mut self, address: impl Into<String>) {
        let address = address.into();
        if self.entries[self.index] == address {
            return;
        }

        self.entries.truncate(self.index + 1);
        self.entries.push(address);
        self.index += 1;
    }

    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Step back one entry, returning the new current address.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    /// Step forward one entry, returning the new current address.
    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true once seeded; kept for the conventional pairing.
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Restart the stack at a single address. Used when a home tab converts
    /// to a surfaced tab in place.
    pub fn reset(&mut self, address: impl Into<String>) {
        self.entries = vec![address.into()];
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_advances_index() {
        let mut stack = HistoryStack::new("a");
        stack.push("b");
        stack.push("c");

        assert_eq!(stack.entries(), ["a", "b", "c"]);
        assert_eq!(stack.index(), 2);
        assert_eq!(stack.current(), "c");
    }

    #[test]
    fn test_push_is_idempotent_on_current_entry() {
        let mut stack = HistoryStack::new("a");
        stack.push("b");
        stack.push("b");
        stack.push("b");

        assert_eq!(stack.entries(), ["a", "b"]);
        assert_eq!(stack.index(), 1);
    }

    #[test]
    fn test_back_and_forward() {
        let mut stack = HistoryStack::new("a");
        stack.push("b");
        stack.push("c");

        assert_eq!(stack.back(), Some("b"));
        assert_eq!(stack.back(), Some("a"));
        assert!(!stack.can_go_back());
        assert_eq!(stack.back(), None);

        assert_eq!(stack.forward(), Some("b"));
        assert_eq!(stack.forward(), Some("c"));
        assert!(!stack.can_go_forward());
        assert_eq!(stack.forward(), None);
    }

    #[test]
    fn test_push_truncates_forward_branch() {
        let mut stack = HistoryStack::new("a");
        stack.push("b");
        stack.push("c");
        stack.back();
        stack.push("d");

        assert_eq!(stack.entries(), ["a", "b", "d"]);
        assert_eq!(stack.current(), "d");
        assert!(!stack.can_go_forward());
    }

    #[test]
    fn test_push_after_back_to_same_entry_is_noop() {
        let mut stack = HistoryStack::new("a");
        stack.push("b");
        stack.back();
        stack.push("a");

        assert_eq!(stack.entries(), ["a", "b"]);
        assert_eq!(stack.index(), 0);
        assert!(stack.can_go_forward());
    }

    #[test]
    fn test_reset() {
        let mut stack = HistoryStack::new("a");
        stack.push("b");
        stack.reset("c");

        assert_eq!(stack.entries(), ["c"]);
        assert_eq!(stack.index(), 0);
        assert!(!stack.can_go_back());
        assert!(!stack.can_go_forward());
    }
}
