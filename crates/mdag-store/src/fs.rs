//! Loose-object directory store.
//!
//! On-disk layout, one file per key:
//!
//! ```text
//! <root>/<first 2 hex chars of key>/<remaining 62 hex chars>
//! ```
//!
//! Writes go to a temporary file inside the fan-out directory and are renamed
//! into place, so a reader never observes a partially written value.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mdag_types::ObjectId;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::{KeyIter, KvStore};

/// Filesystem-backed key-value store.
#[derive(Debug, Clone)]
pub struct FsKvStore {
    root: PathBuf,
    sync: bool,
}

impl FsKvStore {
    /// Open (or create) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root, sync: false })
    }

    /// `fsync` every value before it is renamed into place.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn key_from_entry(entry: &walkdir::DirEntry) -> Option<ObjectId> {
        let prefix = entry.path().parent()?.file_name()?.to_str()?;
        let rest = entry.file_name().to_str()?;
        if prefix.len() != 2 {
            return None;
        }
        format!("{prefix}{rest}").parse().ok()
    }
}

impl KvStore for FsKvStore {
    fn has(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).try_exists()?)
    }

    fn put(&self, id: &ObjectId, value: &[u8]) -> StoreResult<()> {
        let path = self.object_path(id);
        let dir = path
            .parent()
            .ok_or_else(|| StoreError::InvalidKey(path.display().to_string()))?;
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(value)?;
        if self.sync {
            tmp.as_file().sync_all()?;
        }
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(key = %id.short_hex(), len = value.len(), "stored object file");
        Ok(())
    }

    fn get(&self, id: &ObjectId) -> StoreResult<Vec<u8>> {
        match fs::read(self.object_path(id)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Walks the fan-out directories lazily in name order. Files that are not
    /// object files (including in-flight temporary files) are skipped.
    fn keys(&self) -> StoreResult<KeyIter<'_>> {
        let walk = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter();

        Ok(Box::new(walk.filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => match Self::key_from_entry(&entry) {
                Some(id) => Some(Ok(id)),
                None => {
                    debug!(path = %entry.path().display(), "skipping non-object file");
                    None
                }
            },
            Ok(_) => None,
            Err(e) => Some(Err(StoreError::Io(io::Error::from(e)))),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_hash([byte; 32])
    }

    fn temp_store() -> (tempfile::TempDir, FsKvStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsKvStore::open(dir.path().join("objects")).unwrap();
        (dir, store)
    }

    #[test]
    fn put_get_roundtrip() {
        let (_dir, store) = temp_store();
        store.put(&id(0xab), b"hello").unwrap();
        assert_eq!(store.get(&id(0xab)).unwrap(), b"hello");
        assert!(store.object_path(&id(0xab)).ends_with(format!("ab/{}", "ab".repeat(31))));
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.get(&id(1)),
            Err(StoreError::NotFound(missing)) if missing == id(1)
        ));
    }

    #[test]
    fn put_twice_keeps_one_file() {
        let (_dir, store) = temp_store();
        store.put(&id(1), b"v").unwrap();
        store.put(&id(1), b"v").unwrap();
        assert_eq!(store.keys().unwrap().count(), 1);
    }

    #[test]
    fn has_and_delete() {
        let (_dir, store) = temp_store();
        assert!(!store.has(&id(2)).unwrap());
        store.put(&id(2), b"x").unwrap();
        assert!(store.has(&id(2)).unwrap());
        assert!(store.delete(&id(2)).unwrap());
        assert!(!store.has(&id(2)).unwrap());
        assert!(!store.delete(&id(2)).unwrap());
    }

    #[test]
    fn keys_lists_all_and_skips_strays() {
        let (_dir, store) = temp_store();
        for b in [0x10u8, 0x02, 0xff] {
            store.put(&id(b), &[b]).unwrap();
        }
        fs::write(store.root().join("02").join("not-a-key"), b"junk").unwrap();
        fs::write(store.root().join("README"), b"top-level file").unwrap();

        let keys: Vec<ObjectId> = store.keys().unwrap().collect::<StoreResult<_>>().unwrap();
        assert_eq!(keys, vec![id(0x02), id(0x10), id(0xff)]);
    }

    #[test]
    fn early_break_releases_iterator() {
        let (_dir, store) = temp_store();
        store.put(&id(1), b"a").unwrap();
        store.put(&id(2), b"b").unwrap();
        {
            let mut keys = store.keys().unwrap();
            assert!(keys.next().is_some());
        }
        // Store remains fully usable after a partially consumed iterator.
        assert!(store.delete(&id(1)).unwrap());
        assert_eq!(store.keys().unwrap().count(), 1);
    }

    #[test]
    fn reopen_sees_existing_objects() {
        let (dir, store) = temp_store();
        store.put(&id(5), b"persisted").unwrap();
        drop(store);
        let reopened = FsKvStore::open(dir.path().join("objects")).unwrap().with_sync(true);
        assert_eq!(reopened.get(&id(5)).unwrap(), b"persisted");
    }
}
