//! Content-addressed key-value storage for the mdag object store.
//!
//! A store maps an [`ObjectId`](mdag_types::ObjectId) to the canonical bytes
//! of one object. Stores never interpret the bytes they hold and never
//! verify that a value digests to its key; integrity checking happens in the
//! DAG layer, which knows the hash algorithm.
//!
//! # Storage Backends
//!
//! All backends implement the [`KvStore`] trait:
//!
//! - [`InMemoryKvStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsKvStore`] -- loose-object directory, one file per key
//!
//! # Design Rules
//!
//! 1. `put` is an idempotent upsert keyed by content identifier.
//! 2. `get` of an absent key is an error ([`StoreError::NotFound`]), never an
//!    empty value.
//! 3. Key iteration releases its resources on drop, on every exit path.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsKvStore;
pub use memory::InMemoryKvStore;
pub use traits::{KeyIter, KvStore};
