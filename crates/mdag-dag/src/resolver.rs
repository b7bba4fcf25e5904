//! Top-down path resolution with integrity checks.
//!
//! Every object fetched on the way from the root to the target is re-hashed
//! and compared to the identifier it was fetched by; a mismatch halts
//! resolution with [`DagError::Integrity`] and no content is returned.
//!
//! A FILE link's target is returned as raw bytes and only DIR targets are
//! decoded as trees. The root has no link; it is read as the kind given in
//! [`ResolveOptions::root_kind`], or classified from its bytes when that is
//! unset.
//!
//! Resolving a path that ends on a directory fails with
//! [`DagError::IsADirectory`]; use [`list`] to read a directory's links.

use mdag_crypto::{digest, HashProvider};
use mdag_store::KvStore;
use mdag_types::ObjectId;
use tracing::{debug, warn};

use crate::error::{DagError, DagResult};
use crate::object::{is_tree_encoding, Link, LinkType, Object, ObjectKind};

/// Default bound on traversal depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Limits applied while walking the DAG.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum number of tree levels below the root that may be entered.
    pub max_depth: usize,
    /// How to read the root object. `None` classifies it by its bytes.
    pub root_kind: Option<ObjectKind>,
}

impl ResolveOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_root_kind(mut self, kind: ObjectKind) -> Self {
        self.root_kind = Some(kind);
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            root_kind: None,
        }
    }
}

/// Fetch the bytes stored under `id` and check they digest to `id`.
pub fn fetch_verified<S, P>(store: &S, provider: &P, id: &ObjectId) -> DagResult<Vec<u8>>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let bytes = store.get(id)?;
    let computed = digest(provider, &bytes);
    if computed != *id {
        warn!(
            expected = %id.short_hex(),
            computed = %computed.short_hex(),
            "stored object failed integrity check"
        );
        return Err(DagError::Integrity {
            expected: *id,
            computed,
        });
    }
    Ok(bytes)
}

/// Fetch and verify the object stored under `id`, classifying it by its
/// bytes (see [`Object::decode`]).
pub fn fetch_object<S, P>(store: &S, provider: &P, id: &ObjectId) -> DagResult<Object>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let bytes = fetch_verified(store, provider, id)?;
    Object::decode(&bytes)
}

/// Fetch and verify `id` as an object of a known kind.
///
/// A DIR target without the tree tag fails with
/// [`DagError::LinkTypeMismatch`] at `path`.
pub(crate) fn fetch_as<S, P>(
    store: &S,
    provider: &P,
    id: &ObjectId,
    kind: ObjectKind,
    path: &str,
) -> DagResult<Object>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let bytes = fetch_verified(store, provider, id)?;
    if kind == LinkType::Dir && !is_tree_encoding(&bytes) {
        return Err(DagError::LinkTypeMismatch {
            path: path.to_string(),
            declared: kind,
            found: LinkType::File,
        });
    }
    Object::decode_as(kind, bytes)
}

/// Fetch the root as `options` say.
pub(crate) fn fetch_root<S, P>(
    store: &S,
    provider: &P,
    root: &ObjectId,
    options: &ResolveOptions,
) -> DagResult<Object>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    match options.root_kind {
        Some(kind) => fetch_as(store, provider, root, kind, ""),
        None => fetch_object(store, provider, root),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Walk from `root` along `path` and return the object found there.
///
/// Every intermediate object must be a tree. The returned object may be a
/// leaf or a tree.
pub fn resolve_object<S, P>(
    store: &S,
    provider: &P,
    root: &ObjectId,
    path: &str,
    options: &ResolveOptions,
) -> DagResult<Object>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let segments = split_path(path);
    if segments.len() > options.max_depth {
        return Err(DagError::DepthExceeded {
            max_depth: options.max_depth,
        });
    }

    let mut current = fetch_root(store, provider, root, options)?;
    for (depth, segment) in segments.iter().enumerate() {
        let here = segments[..=depth].join("/");
        let Object::Tree(links) = &current else {
            return Err(DagError::NotADirectory {
                path: segments[..depth].join("/"),
            });
        };

        let link = links
            .iter()
            .find(|link| link.name == *segment)
            .ok_or_else(|| DagError::PathNotFound { path: here.clone() })?;
        debug!(path = %here, id = %link.hash.short_hex(), link_type = %link.link_type, "resolved segment");

        let is_last = depth + 1 == segments.len();
        if link.link_type == LinkType::File && !is_last {
            return Err(DagError::NotADirectory { path: here });
        }
        current = fetch_as(store, provider, &link.hash, link.link_type, &here)?;
    }
    Ok(current)
}

/// Return the bytes of the file at `path` below `root`, using default limits.
///
/// An empty path resolves the root itself.
pub fn resolve<S, P>(store: &S, provider: &P, root: &ObjectId, path: &str) -> DagResult<Vec<u8>>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    resolve_with(store, provider, root, path, &ResolveOptions::default())
}

/// [`resolve`] with explicit limits.
pub fn resolve_with<S, P>(
    store: &S,
    provider: &P,
    root: &ObjectId,
    path: &str,
    options: &ResolveOptions,
) -> DagResult<Vec<u8>>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    match resolve_object(store, provider, root, path, options)? {
        Object::Leaf(data) => Ok(data),
        Object::Tree(_) => Err(DagError::IsADirectory {
            path: split_path(path).join("/"),
        }),
    }
}

/// Return the links of the directory at `path` below `root`.
pub fn list<S, P>(store: &S, provider: &P, root: &ObjectId, path: &str) -> DagResult<Vec<Link>>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    list_with(store, provider, root, path, &ResolveOptions::default())
}

/// [`list`] with explicit limits.
pub fn list_with<S, P>(
    store: &S,
    provider: &P,
    root: &ObjectId,
    path: &str,
    options: &ResolveOptions,
) -> DagResult<Vec<Link>>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    match resolve_object(store, provider, root, path, options)? {
        Object::Tree(links) => Ok(links),
        Object::Leaf(_) => Err(DagError::NotADirectory {
            path: split_path(path).join("/"),
        }),
    }
}
