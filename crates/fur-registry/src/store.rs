//! Durable descriptor persistence.
//!
//! Every package owns one directory below the store root, named by the slug of
//! its name, holding a single `furconfig.json`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use fur_utils::{
    fs::{ensure_dir_exists, list_dirs, write_atomic},
    slug,
};
use tracing::{debug, warn};

use crate::{
    error::{ErrorContext, RegistryError, Result},
    package::Descriptor,
};

pub const DESCRIPTOR_FILE: &str = "furconfig.json";

/// Storage backend for package descriptors.
pub trait DescriptorStore: Send + Sync {
    /// Persists `descriptor`, replacing any unit with the same slug.
    ///
    /// Readers never observe a partially written descriptor. On error nothing
    /// visible has changed.
    fn put(&self, descriptor: &Descriptor) -> Result<()>;

    /// Reads every stored descriptor.
    ///
    /// Units that cannot be read or parsed are skipped with a warning.
    fn load_all(&self) -> Result<Vec<Descriptor>>;
}

/// A [`DescriptorStore`] backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsDescriptorStore {
    root: PathBuf,
}

impl FsDescriptorStore {
    /// Opens the store rooted at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        ensure_dir_exists(&root)?;
        Ok(Self {
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory that holds the descriptor of `name`.
    pub fn unit_path(&self, name: &str) -> PathBuf {
        self.root.join(slug::sanitize(name))
    }

    fn read_unit(&self, path: &Path) -> Result<Descriptor> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading descriptor {}", path.display()))?;

        serde_json::from_str(&content).map_err(|err| {
            RegistryError::MalformedDescriptor {
                path: path.to_path_buf(),
                reason: err.to_string(),
            }
        })
    }
}

impl DescriptorStore for FsDescriptorStore {
    fn put(&self, descriptor: &Descriptor) -> Result<()> {
        let unit = self.unit_path(&descriptor.name);
        let mut json = serde_json::to_vec_pretty(descriptor)?;
        json.push(b'\n');

        ensure_dir_exists(&unit)
            .and_then(|_| write_atomic(unit.join(DESCRIPTOR_FILE), &json))
            .map_err(|err| {
                RegistryError::Storage {
                    name: descriptor.name.clone(),
                    source: err,
                }
            })?;

        debug!(name = %descriptor.name, path = %unit.display(), "stored descriptor");
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Descriptor>> {
        let mut descriptors = Vec::new();

        for unit in list_dirs(&self.root)? {
            let path = unit.join(DESCRIPTOR_FILE);
            if !path.is_file() {
                debug!(unit = %unit.display(), "no descriptor in unit, skipping");
                continue;
            }

            match self.read_unit(&path) {
                Ok(descriptor) => {
                    debug!(name = %descriptor.name, "loaded descriptor");
                    descriptors.push(descriptor);
                }
                Err(err) => warn!(path = %path.display(), "skipping descriptor: {err}"),
            }
        }

        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::tempdir;

    use super::*;

    fn descriptor(name: &str) -> Descriptor {
        serde_json::from_value(json!({
            "name": name,
            "version": "1.0.0",
            "authors": ["a"],
            "tags": ["t"],
            "homepage": "h",
            "issue_tracker": "i",
            "git": "g",
            "installer": "inst",
            "dependencies": ["dep@1.0.0"]
        }))
        .unwrap()
    }

    #[test]
    fn test_put_writes_descriptor_only() {
        let dir = tempdir().unwrap();
        let store = FsDescriptorStore::open(dir.path()).unwrap();
        store.put(&descriptor("acme/tool")).unwrap();

        let path = dir.path().join("acme_tool").join(DESCRIPTOR_FILE);
        let content = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["name"], "acme/tool");
        assert_eq!(value["Supported_Platforms"], json!([]));
        assert!(value.get("downloads").is_none());
        assert!(value.get("uploaded").is_none());
        assert!(content.starts_with("{\n  \"name\""));

        // no temporary file is left next to the descriptor
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(DESCRIPTOR_FILE)]);
    }

    #[test]
    fn test_load_all_round_trip() {
        let dir = tempdir().unwrap();
        let store = FsDescriptorStore::open(dir.path().join("projects")).unwrap();
        let first = descriptor("alpha");
        let second = descriptor("beta");
        store.put(&second).unwrap();
        store.put(&first).unwrap();

        let loaded = FsDescriptorStore::open(store.root()).unwrap().load_all().unwrap();
        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn test_load_all_skips_malformed_units() {
        let dir = tempdir().unwrap();
        let store = FsDescriptorStore::open(dir.path()).unwrap();
        store.put(&descriptor("good")).unwrap();

        let broken = dir.path().join("broken");
        fs::create_dir(&broken).unwrap();
        fs::write(broken.join(DESCRIPTOR_FILE), "{ not json").unwrap();

        let incomplete = dir.path().join("incomplete");
        fs::create_dir(&incomplete).unwrap();
        fs::write(incomplete.join(DESCRIPTOR_FILE), r#"{"name": "x"}"#).unwrap();

        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::write(dir.path().join("stray.json"), "{}").unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "good");
    }

    #[test]
    fn test_put_failure_is_storage_error() {
        let dir = tempdir().unwrap();
        let store = FsDescriptorStore::open(dir.path()).unwrap();

        // a plain file where the unit directory should be
        fs::write(dir.path().join("blocked"), "").unwrap();

        let err = store.put(&descriptor("blocked")).unwrap_err();
        assert!(matches!(err, RegistryError::Storage { ref name, .. } if name == "blocked"));
        assert!(store.load_all().unwrap().is_empty());
    }
}
