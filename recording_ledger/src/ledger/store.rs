//! Concurrent registry of user ledgers.

use super::models::{SharedUserLedger, UserLedger};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

/// Maps user IDs to their ledgers, creating each at most once.
#[derive(Debug, Default)]
pub struct UserStore {
    users: RwLock<HashMap<String, SharedUserLedger>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ledger for `user_id`, creating an empty one on first use.
    ///
    /// Existing users are served under the shared read lock. On a miss the
    /// write lock is taken and the map re-checked, so racing first accesses
    /// all receive the same ledger.
    pub fn get_or_create(&self, user_id: &str) -> SharedUserLedger {
        if let Some(ledger) = self.users.read().get(user_id) {
            return Arc::clone(ledger);
        }

        let mut users = self.users.write();
        let ledger = users.entry(user_id.to_string()).or_insert_with(|| {
            log::debug!("Creating ledger for user {user_id}");
            Arc::new(Mutex::new(UserLedger::new()))
        });
        Arc::clone(ledger)
    }

    /// Number of known users
    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_get_or_create_is_lazy() {
        let store = UserStore::new();
        assert!(store.is_empty());

        store.get_or_create("alice");
        store.get_or_create("alice");
        store.get_or_create("Alice");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_same_ledger_returned() {
        let store = UserStore::new();
        let first = store.get_or_create("alice");
        let second = store.get_or_create("alice");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_first_access_creates_one_ledger() {
        let store = Arc::new(UserStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.get_or_create("shared"))
            })
            .collect();

        let ledgers: Vec<SharedUserLedger> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(store.len(), 1);
        assert!(ledgers.iter().all(|l| Arc::ptr_eq(l, &ledgers[0])));
    }
}
