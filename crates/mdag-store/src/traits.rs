use mdag_types::ObjectId;

use crate::error::StoreResult;

/// Iterator over every key in a store.
///
/// Dropping the iterator releases whatever the backend holds open (locks,
/// directory handles), whether iteration ran to completion, stopped early, or
/// ended on an error item.
pub type KeyIter<'a> = Box<dyn Iterator<Item = StoreResult<ObjectId>> + 'a>;

/// Content-addressed key-value store.
///
/// All implementations must satisfy these invariants:
/// - `put` is an idempotent upsert: writing the same key twice leaves one
///   entry.
/// - `get` of an absent key fails with `StoreError::NotFound`.
/// - The store never interprets or verifies values.
/// - Safe for concurrent use from multiple threads.
pub trait KvStore: Send + Sync {
    /// Check whether a key is present.
    fn has(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Store `value` under `id`, replacing any existing value.
    fn put(&self, id: &ObjectId, value: &[u8]) -> StoreResult<()>;

    /// Read the value stored under `id`.
    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>>;

    /// Remove `id`. Returns `true` if the key existed.
    ///
    /// Deleting an object that is still linked from a tree breaks resolution
    /// through that tree.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Iterate over every key currently in the store.
    fn keys(&self) -> StoreResult<KeyIter<'_>>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn has(&self, id: &ObjectId) -> StoreResult<bool> {
        (**self).has(id)
    }

    fn put(&self, id: &ObjectId, value: &[u8]) -> StoreResult<()> {
        (**self).put(id, value)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        (**self).get(id)
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        (**self).delete(id)
    }

    fn keys(&self) -> StoreResult<KeyIter<'_>> {
        (**self).keys()
    }
}

impl<S: KvStore + ?Sized> KvStore for Box<S> {
    fn has(&self, id: &ObjectId) -> StoreResult<bool> {
        (**self).has(id)
    }

    fn put(&self, id: &ObjectId, value: &[u8]) -> StoreResult<()> {
        (**self).put(id, value)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        (**self).get(id)
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        (**self).delete(id)
    }

    fn keys(&self) -> StoreResult<KeyIter<'_>> {
        (**self).keys()
    }
}
