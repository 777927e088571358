//! The deduplicated, insertion-ordered announcement queue.

use std::sync::{Arc, Mutex, PoisonError};

use hearthbot_core::error::{HearthError, Result};

use crate::store::ItemStore;

/// What happened to an `add` call that did not fail outright.
///
/// A duplicate is not an error — the caller reports it differently, but
/// the queue is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The item was appended; `pending` is the new queue length.
    Added { pending: usize },
    /// An equal item is already queued; `pending` is the unchanged length.
    Duplicate { pending: usize },
}

/// Pending announcement items, backed by an [`ItemStore`].
///
/// Uniqueness is by exact string equality after trimming.
pub struct BroadcastQueue {
    store: Arc<dyn ItemStore>,
    // Serializes the check-then-append in `add` so two concurrent adds of
    // the same text cannot both pass the duplicate check.
    add_guard: Mutex<()>,
}

impl BroadcastQueue {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            store,
            add_guard: Mutex::new(()),
        }
    }

    /// Queue one item. Whitespace is trimmed first; empty input is
    /// rejected without touching the queue.
    pub fn add(&self, text: &str) -> Result<AddOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(HearthError::EmptyBroadcast);
        }

        let _guard = self
            .add_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let items = self.store.list()?;
        if items.iter().any(|item| item == text) {
            return Ok(AddOutcome::Duplicate {
                pending: items.len(),
            });
        }
        self.store.append(text)?;
        Ok(AddOutcome::Added {
            pending: items.len() + 1,
        })
    }

    /// All pending items in insertion order.
    pub fn list(&self) -> Result<Vec<String>> {
        self.store.list()
    }

    /// Drop every pending item.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn queue() -> BroadcastQueue {
        BroadcastQueue::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_add_trims_and_appends() {
        let queue = queue();
        assert_eq!(
            queue.add("  Stardew Valley is free  ").unwrap(),
            AddOutcome::Added { pending: 1 }
        );
        assert_eq!(queue.list().unwrap(), vec!["Stardew Valley is free"]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let queue = queue();
        assert!(matches!(
            queue.add("   \t  "),
            Err(HearthError::EmptyBroadcast)
        ));
        assert!(queue.list().unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_is_reported_not_inserted() {
        let queue = queue();
        assert_eq!(
            queue.add("same item").unwrap(),
            AddOutcome::Added { pending: 1 }
        );
        // Trims to the same string: still a duplicate.
        assert_eq!(
            queue.add("  same item ").unwrap(),
            AddOutcome::Duplicate { pending: 1 }
        );
        assert_eq!(queue.list().unwrap().len(), 1);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let queue = queue();
        queue.add("one").unwrap();
        queue.add("two").unwrap();
        queue.add("three").unwrap();
        assert_eq!(queue.list().unwrap(), vec!["one", "two", "three"]);
        queue.clear().unwrap();
        assert!(queue.list().unwrap().is_empty());
    }
}
