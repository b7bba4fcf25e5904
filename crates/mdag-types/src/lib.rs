//! Foundation types for the mdag content-addressed object store.
//!
//! Every object in an mdag store is addressed by an [`ObjectId`]: the 256-bit
//! digest of the object's canonical bytes. This crate holds only the
//! identifier type and its parsing errors so that the store, hashing, and DAG
//! crates can share it without depending on each other.

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::ObjectId;
