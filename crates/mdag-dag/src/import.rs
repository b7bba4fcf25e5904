//! Ingest files and directories from the local filesystem.
//!
//! The walk visits every directory's contents before the directory itself,
//! so each tree is inserted only after all of its children. Symlinks below
//! the root and special files (sockets, devices, FIFOs) are skipped.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mdag_crypto::HashProvider;
use mdag_store::KvStore;
use tracing::debug;
use walkdir::WalkDir;

use crate::builder::{add_leaf, add_tree};
use crate::error::{DagError, DagResult};
use crate::object::{tree_size, Link};

/// Insert the file or directory at `path` and return a link to it.
///
/// The link's name is the final component of `path` (empty for paths such
/// as `.`), and its `hash` is the root identifier of the inserted content.
/// Entry names that are not valid UTF-8 fail with
/// [`DagError::InvalidLinkName`].
pub fn import_path<S, P>(store: &S, provider: &P, path: impl AsRef<Path>) -> DagResult<Link>
where
    S: KvStore + ?Sized,
    P: HashProvider + ?Sized,
{
    let root = path.as_ref();
    // Links collected for each directory not yet inserted.
    let mut pending: HashMap<PathBuf, Vec<Link>> = HashMap::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .contents_first(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| DagError::Io(io::Error::from(e)))?;
        let is_root = entry.depth() == 0;
        let name = if is_root {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            entry
                .file_name()
                .to_str()
                .ok_or_else(|| {
                    DagError::InvalidLinkName(entry.file_name().to_string_lossy().into_owned())
                })?
                .to_string()
        };

        let file_type = entry.file_type();
        let link = if file_type.is_file() {
            let data = fs::read(entry.path())?;
            let id = add_leaf(store, provider, &data)?;
            Link::file(name, id, data.len() as u64)
        } else if file_type.is_dir() {
            let links = pending.remove(entry.path()).unwrap_or_default();
            let size = tree_size(&links);
            let id = add_tree(store, provider, links)?;
            debug!(path = %entry.path().display(), id = %id.short_hex(), "imported directory");
            Link::dir(name, id, size)
        } else if is_root {
            return Err(DagError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file or directory", root.display()),
            )));
        } else {
            debug!(path = %entry.path().display(), "skipping symlink or special file");
            continue;
        };

        if is_root {
            return Ok(link);
        }
        let parent = entry
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        pending.entry(parent).or_default().push(link);
    }

    Err(DagError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("nothing to import at {}", root.display()),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{add_node, Node};
    use crate::resolver::{list, resolve};
    use mdag_crypto::Blake3Provider;
    use mdag_store::{FsKvStore, InMemoryKvStore};

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn imports_directory_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("site");
        write(&src, "a.txt", "hello");
        write(&src, "sub/b.txt", "world");
        fs::create_dir_all(src.join("empty")).unwrap();

        let store = InMemoryKvStore::new();
        let link = import_path(&store, &Blake3Provider, &src).unwrap();
        assert_eq!(link.name, "site");
        assert!(link.is_dir());
        assert_eq!(link.size, 10);

        assert_eq!(resolve(&store, &Blake3Provider, &link.hash, "a.txt").unwrap(), b"hello");
        assert_eq!(resolve(&store, &Blake3Provider, &link.hash, "sub/b.txt").unwrap(), b"world");
        assert!(list(&store, &Blake3Provider, &link.hash, "empty").unwrap().is_empty());
    }

    #[test]
    fn matches_in_memory_build() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x", "hello");
        write(dir.path(), "y/z", "world");

        let store = InMemoryKvStore::new();
        let imported = import_path(&store, &Blake3Provider, dir.path()).unwrap();
        let node = Node::from_paths([("x", "hello"), ("y/z", "world")]).unwrap();
        let built = add_node(&store, &Blake3Provider, "", &node).unwrap();
        assert_eq!(imported.hash, built.hash);
        assert_eq!(imported.size, built.size);
    }

    #[test]
    fn imports_single_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "only.bin", "bytes");

        let store = InMemoryKvStore::new();
        let link = import_path(&store, &Blake3Provider, dir.path().join("only.bin")).unwrap();
        assert_eq!(link.name, "only.bin");
        assert!(link.is_file());
        assert_eq!(resolve(&store, &Blake3Provider, &link.hash, "").unwrap(), b"bytes");
    }

    #[test]
    fn missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryKvStore::new();
        let err = import_path(&store, &Blake3Provider, dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, DagError::Io(_)));
    }

    #[test]
    fn reimport_into_fs_store_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src, "a", "1");
        write(&src, "b/c", "2");
        let store = FsKvStore::open(dir.path().join("objects")).unwrap();

        let first = import_path(&store, &Blake3Provider, &src).unwrap();
        let count = store.keys().unwrap().count();
        let second = import_path(&store, &Blake3Provider, &src).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.keys().unwrap().count(), count);
        assert_eq!(count, 4);
    }

    #[cfg(unix)]
    #[test]
    fn skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        write(&src, "real", "data");
        std::os::unix::fs::symlink(src.join("real"), src.join("alias")).unwrap();

        let store = InMemoryKvStore::new();
        let link = import_path(&store, &Blake3Provider, &src).unwrap();
        let names: Vec<String> = list(&store, &Blake3Provider, &link.hash, "")
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, ["real"]);
    }
}
