//! The favorites access point: an insertion-ordered set of meal ids backed by
//! one persisted slot.
//!
//! Ordering is user-visible (list display order), so the ids live in a plain
//! vector and never get sorted or deduplicated after the fact. Every consumer
//! shares one instance through the application context.

use crate::store::{KvStore, PersistedSlot};
use std::sync::Arc;
use tokio::sync::watch;

/// The single durable key holding the whole favorites sequence.
pub const FAVORITES_KEY: &str = "favorites";

/// Shared, persisted favorites set.
pub struct Favorites {
    slot: PersistedSlot<Vec<String>>,
    version: watch::Sender<u64>,
}

impl Favorites {
    /// Opens the favorites slot over the given store, loading any previously
    /// persisted sequence.
    pub fn open(store: Arc<dyn KvStore>) -> Self {
        let slot = PersistedSlot::open(store, FAVORITES_KEY, Vec::new());
        let (version, _) = watch::channel(0);
        Self { slot, version }
    }

    /// Appends `id` to the end of the sequence and persists. A present id is
    /// a no-op: nothing is written and no change is signalled.
    pub fn add(&self, id: &str) {
        let changed = self.slot.mutate(|ids| {
            if ids.iter().any(|existing| existing == id) {
                false
            } else {
                ids.push(id.to_string());
                true
            }
        });
        if changed {
            self.bump();
        }
    }

    /// Removes `id` if present and persists; idempotent when absent.
    pub fn remove(&self, id: &str) {
        let changed = self.slot.mutate(|ids| {
            let before = ids.len();
            ids.retain(|existing| existing != id);
            ids.len() != before
        });
        if changed {
            self.bump();
        }
    }

    /// Pure membership query against the in-memory value.
    pub fn contains(&self, id: &str) -> bool {
        self.slot.get().iter().any(|existing| existing == id)
    }

    /// Current favorites in insertion order.
    pub fn list(&self) -> Vec<String> {
        self.slot.get()
    }

    /// Change notification: the receiver wakes on every effective mutation.
    /// Used by hydration to supersede an in-flight batch.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn favorites() -> Favorites {
        Favorites::open(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn add_is_idempotent() {
        let favorites = favorites();
        favorites.add("42");
        favorites.add("42");
        assert_eq!(favorites.list(), vec!["42".to_string()]);
    }

    #[test]
    fn remove_of_absent_id_is_a_no_op() {
        let favorites = favorites();
        favorites.add("42");
        favorites.remove("7");
        assert_eq!(favorites.list(), vec!["42".to_string()]);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let favorites = favorites();
        favorites.add("42");
        favorites.add("7");
        assert_eq!(favorites.list(), vec!["42".to_string(), "7".to_string()]);
    }

    #[test]
    fn contains_reflects_membership() {
        let favorites = favorites();
        assert!(!favorites.contains("42"));
        favorites.add("42");
        assert!(favorites.contains("42"));
        favorites.remove("42");
        assert!(!favorites.contains("42"));
    }

    #[test]
    fn reload_from_the_same_store_sees_prior_adds() {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());

        let first = Favorites::open(Arc::clone(&store));
        first.add("42");

        let reloaded = Favorites::open(store);
        assert!(reloaded.contains("42"));
        assert_eq!(reloaded.list(), vec!["42".to_string()]);
    }

    #[test]
    fn failed_writes_still_update_the_session_view() {
        let store: Arc<dyn KvStore> = Arc::new(crate::store::testing::WriteFailStore::new());
        let favorites = Favorites::open(store);

        favorites.add("42");
        assert!(favorites.contains("42"));
    }

    #[test]
    fn only_effective_mutations_signal_a_change() {
        let favorites = favorites();
        let rx = favorites.watch();
        assert_eq!(*rx.borrow(), 0);

        favorites.add("42");
        assert_eq!(*rx.borrow(), 1);

        favorites.add("42"); // no-op
        assert_eq!(*rx.borrow(), 1);

        favorites.remove("7"); // absent, no-op
        assert_eq!(*rx.borrow(), 1);

        favorites.remove("42");
        assert_eq!(*rx.borrow(), 2);
    }
}
