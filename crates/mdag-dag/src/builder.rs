//! Bottom-up DAG construction.
//!
//! A parent tree embeds its children's identifiers, so children are always
//! inserted first. [`add_leaf`] and [`add_tree`] are the two primitives;
//! [`add_node`] composes them over an in-memory [`Node`] description.
//!
//! Every insertion is idempotent: an object whose identifier is already in
//! the store is not written again. Because each object is independently
//! addressed, retrying a failed insertion is always safe.

use std::collections::BTreeMap;

use mdag_crypto::{digest, HashProvider};
use mdag_store::KvStore;
use mdag_types::ObjectId;
use tracing::{debug, trace};

use crate::error::{DagError, DagResult};
use crate::object::{tree_size, validate_name, Link, LinkType, Object, ObjectKind};

/// Digest `bytes` and store them under that identifier unless already present.
fn store_encoded<S, P>(store: &S, provider: &P, kind: ObjectKind, bytes: &[u8]) -> DagResult<ObjectId>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let id = digest(provider, bytes);
    if store.has(&id).map_err(DagError::Storage)? {
        trace!(id = %id.short_hex(), %kind, "object already stored");
        return Ok(id);
    }
    store.put(&id, bytes).map_err(DagError::Storage)?;
    debug!(id = %id.short_hex(), %kind, len = bytes.len(), "stored object");
    Ok(id)
}

/// Insert any object and return its identifier.
pub fn put_object<S, P>(store: &S, provider: &P, object: &Object) -> DagResult<ObjectId>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let bytes = object.encode()?;
    store_encoded(store, provider, object.kind(), &bytes)
}

/// Insert file content as a leaf and return its identifier.
///
/// The identifier is the digest of `data` and the stored value is `data`
/// itself.
pub fn add_leaf<S, P>(store: &S, provider: &P, data: &[u8]) -> DagResult<ObjectId>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    store_encoded(store, provider, LinkType::File, data)
}

/// Insert a tree over already-inserted children and return its identifier.
///
/// Links may be given in any order; they are sorted by name before
/// encoding. Duplicate names fail with [`DagError::DuplicateLink`].
pub fn add_tree<S, P>(store: &S, provider: &P, links: Vec<Link>) -> DagResult<ObjectId>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    put_object(store, provider, &Object::tree(links)?)
}

/// In-memory description of a file or directory to insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    File(Vec<u8>),
    Dir(BTreeMap<String, Node>),
}

impl Node {
    pub fn file(data: impl Into<Vec<u8>>) -> Self {
        Self::File(data.into())
    }

    /// An empty directory.
    pub fn dir() -> Self {
        Self::Dir(BTreeMap::new())
    }

    /// Build a directory from `(path, content)` pairs such as
    /// `("sub/b.txt", "world")`. Intermediate directories are created.
    pub fn from_paths<I, K, D>(entries: I) -> DagResult<Self>
    where
        I: IntoIterator<Item = (K, D)>,
        K: AsRef<str>,
        D: Into<Vec<u8>>,
    {
        let mut root = Self::dir();
        for (path, data) in entries {
            root.insert(path.as_ref(), Self::File(data.into()))?;
        }
        Ok(root)
    }

    /// Place `node` at the slash-delimited `path` below this directory.
    pub fn insert(&mut self, path: &str, node: Node) -> DagResult<()> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((last, parents)) = segments.split_last() else {
            return Err(DagError::InvalidLinkName(path.to_string()));
        };

        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            validate_name(segment)?;
            let Self::Dir(children) = current else {
                return Err(DagError::NotADirectory {
                    path: segments[..depth].join("/"),
                });
            };
            current = children
                .entry(segment.to_string())
                .or_insert_with(Self::dir);
        }

        validate_name(last)?;
        let Self::Dir(children) = current else {
            return Err(DagError::NotADirectory {
                path: parents.join("/"),
            });
        };
        if children.contains_key(*last) {
            return Err(DagError::DuplicateLink(segments.join("/")));
        }
        children.insert(last.to_string(), node);
        Ok(())
    }
}

/// Insert `node` and everything below it, children first.
///
/// Returns the link a parent would hold for it under `name`; its `hash` is
/// the root identifier of the inserted subtree.
pub fn add_node<S, P>(store: &S, provider: &P, name: &str, node: &Node) -> DagResult<Link>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    match node {
        Node::File(data) => {
            let id = add_leaf(store, provider, data)?;
            Ok(Link::file(name, id, data.len() as u64))
        }
        Node::Dir(children) => {
            let links = children
                .iter()
                .map(|(child_name, child)| add_node(store, provider, child_name, child))
                .collect::<DagResult<Vec<Link>>>()?;
            let size = tree_size(&links);
            let id = add_tree(store, provider, links)?;
            Ok(Link::dir(name, id, size))
        }
    }
}
