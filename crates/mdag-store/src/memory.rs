use std::collections::HashMap;
use std::sync::RwLock;

use mdag_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::traits::{KeyIter, KvStore};

/// In-memory, HashMap-based key-value store.
///
/// Intended for tests and embedding. Entries are held behind a `RwLock` for
/// safe concurrent access and cloned on read.
pub struct InMemoryKvStore {
    entries: RwLock<HashMap<ObjectId, Vec<u8>>>,
}

impl InMemoryKvStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored values.
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(|value| value.len() as u64)
            .sum()
    }
}

impl Default for InMemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for InMemoryKvStore {
    fn has(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn put(&self, id: &ObjectId, value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        map.insert(*id, value.to_vec());
        Ok(())
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        let map = self.entries.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.entries.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }

    /// Iterates a sorted snapshot; the lock is released before returning.
    fn keys(&self) -> StoreResult<KeyIter<'_>> {
        let mut ids: Vec<ObjectId> = {
            let map = self.entries.read().expect("lock poisoned");
            map.keys().copied().collect()
        };
        ids.sort();
        Ok(Box::new(ids.into_iter().map(Ok)))
    }
}

impl std::fmt::Debug for InMemoryKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryKvStore")
            .field("entry_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = InMemoryKvStore::new();
        store.put(&id(1), b"hello world").unwrap();
        assert_eq!(store.get(&id(1)).unwrap(), b"hello world");
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryKvStore::new();
        let err = store.get(&id(9)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(missing) if missing == id(9)));
    }

    #[test]
    fn put_is_idempotent() {
        let store = InMemoryKvStore::new();
        store.put(&id(1), b"same").unwrap();
        store.put(&id(1), b"same").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_replaces_existing_value() {
        let store = InMemoryKvStore::new();
        store.put(&id(1), b"first").unwrap();
        store.put(&id(1), b"second").unwrap();
        assert_eq!(store.get(&id(1)).unwrap(), b"second");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn has_tracks_presence() {
        let store = InMemoryKvStore::new();
        assert!(!store.has(&id(1)).unwrap());
        store.put(&id(1), b"present").unwrap();
        assert!(store.has(&id(1)).unwrap());
    }

    #[test]
    fn delete_present_and_missing() {
        let store = InMemoryKvStore::new();
        store.put(&id(1), b"to-delete").unwrap();
        assert!(store.delete(&id(1)).unwrap());
        assert!(!store.has(&id(1)).unwrap());
        assert!(!store.delete(&id(1)).unwrap());
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    #[test]
    fn keys_are_sorted_and_complete() {
        let store = InMemoryKvStore::new();
        for b in [3u8, 1, 2] {
            store.put(&id(b), &[b]).unwrap();
        }
        let keys: Vec<ObjectId> = store.keys().unwrap().collect::<StoreResult<_>>().unwrap();
        assert_eq!(keys, vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn keys_does_not_hold_lock() {
        let store = InMemoryKvStore::new();
        store.put(&id(1), b"a").unwrap();
        let mut keys = store.keys().unwrap();
        // A write while the iterator is alive must not deadlock.
        store.put(&id(2), b"b").unwrap();
        assert_eq!(keys.next().unwrap().unwrap(), id(1));
        assert!(keys.next().is_none());
    }

    // -----------------------------------------------------------------------
    // Utility methods
    // -----------------------------------------------------------------------

    #[test]
    fn len_and_total_bytes() {
        let store = InMemoryKvStore::default();
        assert!(store.is_empty());
        store.put(&id(1), b"12345").unwrap();
        store.put(&id(2), b"123456789").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.total_bytes(), 14);
    }

    #[test]
    fn works_through_references_and_boxes() {
        let store = InMemoryKvStore::new();
        let by_ref: &InMemoryKvStore = &store;
        KvStore::put(&by_ref, &id(1), b"x").unwrap();
        let boxed: Box<dyn KvStore> = Box::new(InMemoryKvStore::new());
        boxed.put(&id(2), b"y").unwrap();
        assert_eq!(store.get(&id(1)).unwrap(), b"x");
        assert_eq!(boxed.get(&id(2)).unwrap(), b"y");
    }

    #[test]
    fn concurrent_reads_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(InMemoryKvStore::new());
        store.put(&id(7), b"shared data").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    assert_eq!(store.get(&id(7)).unwrap(), b"shared data");
                })
            })
            .collect();

        for h in handles {
            h.join().expect("thread should not panic");
        }
    }

    #[test]
    fn debug_format() {
        let store = InMemoryKvStore::new();
        store.put(&id(1), b"x").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryKvStore"));
        assert!(debug.contains("entry_count"));
    }
}
