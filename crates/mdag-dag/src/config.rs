use std::fs;
use std::path::{Path, PathBuf};

use mdag_crypto::HashAlgorithm;
use mdag_store::{FsKvStore, InMemoryKvStore, KvStore};
use serde::{Deserialize, Serialize};

use crate::error::{DagError, DagResult};
use crate::resolver::{ResolveOptions, DEFAULT_MAX_DEPTH};

/// Settings for opening a store and walking the DAG.
///
/// ```toml
/// hash = "sha256"
/// max_depth = 64
///
/// [store]
/// backend = "directory"
/// path = "/var/lib/mdag/objects"
/// sync = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagConfig {
    /// Digest algorithm for identifiers. Must match the one the store was
    /// written with.
    pub hash: HashAlgorithm,
    /// Bound on traversal depth for resolution and verification.
    pub max_depth: usize,
    pub store: StoreConfig,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            hash: HashAlgorithm::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            store: StoreConfig::default(),
        }
    }
}

/// Which key-value backend to open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Memory,
    Directory {
        path: PathBuf,
        #[serde(default)]
        sync: bool,
    },
}

impl DagConfig {
    pub fn from_toml_str(s: &str) -> DagResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| DagError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> DagResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| DagError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> DagResult<String> {
        toml::to_string(self).map_err(|e| DagError::Config(e.to_string()))
    }

    pub fn validate(&self) -> DagResult<()> {
        if self.max_depth == 0 {
            return Err(DagError::Config("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::default().with_max_depth(self.max_depth)
    }

    /// Open the configured backend.
    pub fn open_store(&self) -> DagResult<Box<dyn KvStore>> {
        match &self.store {
            StoreConfig::Memory => Ok(Box::new(InMemoryKvStore::new())),
            StoreConfig::Directory { path, sync } => {
                let store = FsKvStore::open(path).map_err(DagError::Storage)?;
                Ok(Box::new(store.with_sync(*sync)))
            }
        }
    }
}

impl From<&DagConfig> for ResolveOptions {
    fn from(config: &DagConfig) -> Self {
        config.resolve_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::add_leaf;
    use crate::resolver::resolve;

    #[test]
    fn defaults() {
        let c = DagConfig::default();
        assert_eq!(c.hash, HashAlgorithm::Blake3);
        assert_eq!(c.max_depth, 256);
        assert_eq!(c.store, StoreConfig::Memory);
        assert_eq!(DagConfig::from_toml_str("").unwrap(), c);
    }

    #[test]
    fn parses_full_config() {
        let c = DagConfig::from_toml_str(
            r#"
            hash = "sha256"
            max_depth = 64

            [store]
            backend = "directory"
            path = "/tmp/objects"
            sync = true
            "#,
        )
        .unwrap();
        assert_eq!(c.hash, HashAlgorithm::Sha256);
        assert_eq!(c.resolve_options(), ResolveOptions::default().with_max_depth(64));
        assert_eq!(
            c.store,
            StoreConfig::Directory {
                path: PathBuf::from("/tmp/objects"),
                sync: true
            }
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            DagConfig::from_toml_str("hash = \"md5\""),
            Err(DagError::Config(_))
        ));
        assert!(matches!(
            DagConfig::from_toml_str("max_depth = 0"),
            Err(DagError::Config(_))
        ));
        assert!(matches!(
            DagConfig::from_toml_str("[store]\nbackend = \"cloud\""),
            Err(DagError::Config(_))
        ));
    }

    #[test]
    fn toml_roundtrip() {
        let c = DagConfig {
            hash: HashAlgorithm::Sha256,
            max_depth: 8,
            store: StoreConfig::Directory {
                path: "objects".into(),
                sync: false,
            },
        };
        let text = c.to_toml_string().unwrap();
        assert_eq!(DagConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn load_and_open_directory_store() {
        let dir = tempfile::tempdir().unwrap();
        let objects = dir.path().join("objects");
        let config_path = dir.path().join("mdag.toml");
        fs::write(
            &config_path,
            format!(
                "[store]\nbackend = \"directory\"\npath = {:?}\n",
                objects.display().to_string()
            ),
        )
        .unwrap();

        let config = DagConfig::load(&config_path).unwrap();
        let store = config.open_store().unwrap();
        let id = add_leaf(&store, &config.hash, b"configured").unwrap();
        assert_eq!(resolve(&store, &config.hash, &id, "").unwrap(), b"configured");
        assert!(objects.is_dir());
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DagConfig::load(dir.path().join("absent.toml")),
            Err(DagError::Config(_))
        ));
    }
}
