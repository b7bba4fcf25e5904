//! Leaf and Tree objects and their canonical encoding.
//!
//! A leaf is stored as its raw data, and its identifier is the digest of
//! those bytes. A tree is stored as [`TREE_TAG`] followed by the bincode
//! serialization of its links, with fixed-width little-endian integers and
//! trailing bytes rejected:
//!
//! ```text
//! Leaf: data
//! Tree: "mdag-tree-v1\0" [u64 count] count x Link
//! Link: [u64 len][name utf-8][32-byte hash][u64 size][u32 type: 0 = file, 1 = dir]
//! ```
//!
//! Tree links are sorted by name (byte-wise) before encoding, so a tree's
//! identifier does not depend on the order its links were supplied in.
//! Decoding rejects trees that are not in this canonical order.
//!
//! The link pointing at an object says how to read it. Only a root reached
//! without a link is classified from its bytes: anything starting with
//! [`TREE_TAG`] is read as a tree (see [`Object::decode`]).

use std::borrow::Cow;
use std::fmt;

use bincode::Options;
use mdag_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};

/// What a link points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    /// A leaf holding file bytes.
    File,
    /// A tree.
    Dir,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Dir => write!(f, "dir"),
        }
    }
}

/// Kind of a stored object. Same as the type of a link pointing at it.
pub type ObjectKind = LinkType;

/// A named reference from a tree to one child object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Entry name, unique within its tree.
    pub name: String,
    /// Content identifier of the child.
    pub hash: ObjectId,
    /// File length in bytes, or the cumulative file bytes below a directory.
    pub size: u64,
    pub link_type: LinkType,
}

impl Link {
    pub fn new(name: impl Into<String>, hash: ObjectId, size: u64, link_type: LinkType) -> Self {
        Self {
            name: name.into(),
            hash,
            size,
            link_type,
        }
    }

    /// Link to a leaf of `size` bytes.
    pub fn file(name: impl Into<String>, hash: ObjectId, size: u64) -> Self {
        Self::new(name, hash, size, LinkType::File)
    }

    /// Link to a tree whose files total `size` bytes.
    pub fn dir(name: impl Into<String>, hash: ObjectId, size: u64) -> Self {
        Self::new(name, hash, size, LinkType::Dir)
    }

    pub fn is_dir(&self) -> bool {
        self.link_type == LinkType::Dir
    }

    pub fn is_file(&self) -> bool {
        self.link_type == LinkType::File
    }
}

/// Cumulative size of a directory: the sum of its links' sizes.
pub fn tree_size(links: &[Link]) -> u64 {
    links
        .iter()
        .fold(0u64, |total, link| total.saturating_add(link.size))
}

/// Check that `name` can be used as a link name.
///
/// Names must be non-empty, must not be `.` or `..`, and must not contain
/// `/` (the path separator) or NUL.
pub fn validate_name(name: &str) -> DagResult<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\0']) {
        return Err(DagError::InvalidLinkName(name.to_string()));
    }
    Ok(())
}

/// A node of the DAG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Object {
    /// Raw file bytes.
    Leaf(Vec<u8>),
    /// Directory: links to children.
    Tree(Vec<Link>),
}

/// Prefix of every encoded tree.
pub const TREE_TAG: &[u8] = b"mdag-tree-v1\0";

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

fn serialize_tree(links: &[Link]) -> DagResult<Vec<u8>> {
    let mut bytes = TREE_TAG.to_vec();
    codec()
        .serialize_into(&mut bytes, links)
        .map_err(|e| DagError::Serialization(e.to_string()))?;
    Ok(bytes)
}

/// Validate names and sort by name; fail on duplicates.
///
/// Borrows when the links are already canonical.
fn canonical_links(links: &[Link]) -> DagResult<Cow<'_, [Link]>> {
    for link in links {
        validate_name(&link.name)?;
    }
    if links.windows(2).all(|w| w[0].name < w[1].name) {
        return Ok(Cow::Borrowed(links));
    }
    let mut sorted = links.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(dup) = sorted.windows(2).find(|w| w[0].name == w[1].name) {
        return Err(DagError::DuplicateLink(dup[0].name.clone()));
    }
    Ok(Cow::Owned(sorted))
}

/// Canonical bytes of a tree over `links` given in any order.
pub fn encode_tree(links: &[Link]) -> DagResult<Vec<u8>> {
    serialize_tree(&canonical_links(links)?)
}

/// Whether `bytes` carry the tree tag.
pub fn is_tree_encoding(bytes: &[u8]) -> bool {
    bytes.starts_with(TREE_TAG)
}

/// Parse the links of an encoded tree.
///
/// Fails with [`DagError::Serialization`] on a missing tag, malformed input,
/// trailing bytes, invalid link names, or links out of canonical order.
pub fn decode_tree(bytes: &[u8]) -> DagResult<Vec<Link>> {
    let body = bytes
        .strip_prefix(TREE_TAG)
        .ok_or_else(|| DagError::Serialization("missing tree tag".into()))?;
    let links: Vec<Link> = codec()
        .deserialize(body)
        .map_err(|e| DagError::Serialization(e.to_string()))?;

    for link in &links {
        validate_name(&link.name).map_err(|e| DagError::Serialization(e.to_string()))?;
    }
    if let Some(w) = links.windows(2).find(|w| w[0].name >= w[1].name) {
        return Err(DagError::Serialization(format!(
            "tree links not in canonical order: {:?} before {:?}",
            w[0].name, w[1].name
        )));
    }
    Ok(links)
}

impl Object {
    /// Build a tree from links in any order.
    ///
    /// Links are sorted by name. Duplicate or invalid names are rejected.
    pub fn tree(links: Vec<Link>) -> DagResult<Self> {
        let sorted = match canonical_links(&links)? {
            Cow::Borrowed(_) => None,
            Cow::Owned(sorted) => Some(sorted),
        };
        Ok(Self::Tree(sorted.unwrap_or(links)))
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Leaf(_) => LinkType::File,
            Self::Tree(_) => LinkType::Dir,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    /// The leaf's bytes, or `None` for a tree.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Leaf(data) => Some(data),
            Self::Tree(_) => None,
        }
    }

    /// The tree's links; empty for a leaf.
    pub fn links(&self) -> &[Link] {
        match self {
            Self::Leaf(_) => &[],
            Self::Tree(links) => links,
        }
    }

    /// Look up a link by name (linear scan).
    pub fn find(&self, name: &str) -> Option<&Link> {
        self.links().iter().find(|link| link.name == name)
    }

    /// Canonical bytes of this object: the data itself for a leaf.
    ///
    /// Tree links that are not already sorted are encoded in sorted order, so
    /// any two trees with the same set of links encode identically.
    pub fn encode(&self) -> DagResult<Vec<u8>> {
        match self {
            Self::Leaf(data) => Ok(data.clone()),
            Self::Tree(links) => encode_tree(links),
        }
    }

    /// Read stored bytes as an object of a known kind.
    pub fn decode_as(kind: ObjectKind, bytes: Vec<u8>) -> DagResult<Self> {
        match kind {
            LinkType::File => Ok(Self::Leaf(bytes)),
            LinkType::Dir => Ok(Self::Tree(decode_tree(&bytes)?)),
        }
    }

    /// Classify and parse stored bytes of unknown kind.
    ///
    /// Bytes starting with [`TREE_TAG`] must decode as a tree; anything else
    /// is a leaf. A file whose content itself starts with the tag can only be
    /// read through a FILE link or [`Object::decode_as`].
    pub fn decode(bytes: &[u8]) -> DagResult<Self> {
        if is_tree_encoding(bytes) {
            Ok(Self::Tree(decode_tree(bytes)?))
        } else {
            Ok(Self::Leaf(bytes.to_vec()))
        }
    }
}
