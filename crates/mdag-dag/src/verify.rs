//! Full-depth integrity walk of a stored tree.
//!
//! [`verify_tree`] fetches every object reachable from a root, re-hashing each
//! one, and stops at the first object that is missing, corrupt, undecodable,
//! or not a tree where its link says DIR. FILE targets are counted as leaves
//! whatever their bytes. Objects shared by several parents are
//! verified once.

use std::collections::{HashSet, VecDeque};

use mdag_crypto::HashProvider;
use mdag_store::KvStore;
use mdag_types::ObjectId;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DagError, DagResult};
use crate::object::{tree_size, Link, Object};
use crate::resolver::{fetch_as, fetch_root, ResolveOptions};

/// Summary of a successful [`verify_tree`] walk.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub root: Option<ObjectId>,
    /// Distinct tree objects verified.
    pub trees: usize,
    /// Distinct leaf objects verified.
    pub leaves: usize,
    /// Bytes held by the distinct leaves.
    pub leaf_bytes: u64,
    /// Links whose recorded size disagrees with the content below them.
    pub size_mismatches: Vec<String>,
}

impl VerifyReport {
    /// Total distinct objects verified.
    pub fn objects(&self) -> usize {
        self.trees + self.leaves
    }
}

/// Verify every object reachable from `root`.
pub fn verify_tree<S, P>(
    store: &S,
    provider: &P,
    root: &ObjectId,
    options: &ResolveOptions,
) -> DagResult<VerifyReport>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let mut report = VerifyReport {
        root: Some(*root),
        ..VerifyReport::default()
    };
    let mut visited: HashSet<ObjectId> = HashSet::new();
    // (id, path, depth, link that led here)
    let mut queue: VecDeque<(ObjectId, String, usize, Option<Link>)> = VecDeque::new();
    queue.push_back((*root, String::new(), 0, None));

    while let Some((id, path, depth, via)) = queue.pop_front() {
        if depth > options.max_depth {
            return Err(DagError::DepthExceeded {
                max_depth: options.max_depth,
            });
        }

        let object = match &via {
            Some(link) => fetch_as(store, provider, &id, link.link_type, &path)?,
            None => fetch_root(store, provider, &id, options)?,
        };
        let first_visit = visited.insert(id);

        match object {
            Object::Leaf(data) => {
                if let Some(link) = &via {
                    if link.size != data.len() as u64 {
                        report.size_mismatches.push(path.clone());
                    }
                }
                if first_visit {
                    report.leaves += 1;
                    report.leaf_bytes += data.len() as u64;
                }
            }
            Object::Tree(links) => {
                if let Some(link) = &via {
                    if link.size != tree_size(&links) {
                        report.size_mismatches.push(path.clone());
                    }
                }
                if !first_visit {
                    continue;
                }
                report.trees += 1;
                for link in links {
                    let child_path = if path.is_empty() {
                        link.name.clone()
                    } else {
                        format!("{path}/{}", link.name)
                    };
                    queue.push_back((link.hash, child_path, depth + 1, Some(link)));
                }
            }
        }
    }

    debug!(
        root = %root.short_hex(),
        trees = report.trees,
        leaves = report.leaves,
        "verified tree"
    );
    Ok(report)
}
