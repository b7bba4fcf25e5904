//! Merkle DAG of files and directories over a content-addressed store.
//!
//! A [`Leaf`](Object::Leaf) is stored under the digest of its raw bytes; a
//! [`Tree`](Object::Tree) of named [`Link`]s is stored under the digest of
//! its canonical encoding. Changing any file changes the identifier of every
//! tree above it, up to the root.
//!
//! The crate is a set of functions over an explicitly supplied store
//! ([`mdag_store::KvStore`]) and hash provider ([`mdag_crypto::HashProvider`]);
//! there is no global store handle.
//!
//! - [`builder`] -- bottom-up insertion: [`add_leaf`], [`add_tree`], [`add_node`]
//! - [`resolver`] -- top-down, integrity-checked lookup: [`resolve`], [`list`]
//! - [`import`] -- ingest a directory from the local filesystem
//! - [`verify`] -- full-depth integrity walk of a stored tree
//!
//! ```
//! use mdag_crypto::Blake3Provider;
//! use mdag_dag::{add_node, resolve, Node};
//! use mdag_store::InMemoryKvStore;
//!
//! let store = InMemoryKvStore::new();
//! let tree = Node::from_paths([("x", "hello"), ("y/z", "world")]).unwrap();
//! let root = add_node(&store, &Blake3Provider, "", &tree).unwrap().hash;
//!
//! assert_eq!(resolve(&store, &Blake3Provider, &root, "y/z").unwrap(), b"world");
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod import;
pub mod object;
pub mod resolver;
pub mod verify;

pub use builder::{add_leaf, add_node, add_tree, put_object, Node};
pub use config::{DagConfig, StoreConfig};
pub use error::{DagError, DagResult, ErrorKind};
pub use import::import_path;
pub use object::{
    decode_tree, encode_tree, is_tree_encoding, tree_size, validate_name, Link, LinkType, Object,
    ObjectKind, TREE_TAG,
};
pub use resolver::{
    fetch_object, fetch_verified, list, list_with, resolve, resolve_object, resolve_with,
    ResolveOptions, DEFAULT_MAX_DEPTH,
};
pub use verify::{verify_tree, VerifyReport};
