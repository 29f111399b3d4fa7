//! Durable storage: a registry of bases, per-base log unit files, and the
//! chain loader that materializes a base's current view.
//!
//! Layout under the store root:
//!
//! ```text
//! registry.json                   base registry (names, next sequence ids)
//! <base>/00000000_base.json       first unit, the baseline
//! <base>/00000001_mutate.json     appended patches, in creation order
//! ```
//!
//! The zero-padded sequence id makes lexicographic file order equal to
//! creation order, which is the order the loader folds units in.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Kind, MergeError, SetLog};

pub const REGISTRY_FILE: &str = "registry.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}", path = .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store root {} already exists; delete it to start over", .0.display())]
    AlreadyInitialized(PathBuf),

    #[error("store root {} is not initialized; run `setlogs init` first", .0.display())]
    NotInitialized(PathBuf),

    #[error("base named `{0}` already exists; choose another name")]
    BaseExists(String),

    #[error("base named `{0}` does not exist")]
    BaseNotFound(String),

    #[error("base `{name}` has an inconsistent log chain at {path}: {source}", path = .path.display())]
    Chain {
        name: String,
        path: PathBuf,
        #[source]
        source: MergeError,
    },
}

/// Per-base bookkeeping. `next_log_id` is the sequence number the next
/// appended unit will take; its owner assigns it before any later unit is
/// created, so units are strictly ordered.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BaseMeta {
    pub name: String,
    pub comment: String,
    pub next_log_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Registry {
    pub bases: BTreeMap<String, BaseMeta>,
}

/// Handle on a storage root. All paths derive from the root passed at
/// construction; there is no process-wide storage location.
pub struct Store {
    root: PathBuf,
    registry: Registry,
}

impl Store {
    /// Create a fresh store root. Refuses to touch an existing path.
    pub fn init(root: &Path) -> Result<Store, StoreError> {
        if root.exists() {
            return Err(StoreError::AlreadyInitialized(root.to_path_buf()));
        }
        fs::create_dir_all(root).map_err(|e| io_err(root, e))?;

        let store = Store {
            root: root.to_path_buf(),
            registry: Registry::default(),
        };
        store.save_registry()?;
        tracing::info!(root = %root.display(), "initialized store");
        Ok(store)
    }

    /// Open an existing store root.
    pub fn open(root: &Path) -> Result<Store, StoreError> {
        let path = root.join(REGISTRY_FILE);
        if !path.exists() {
            return Err(StoreError::NotInitialized(root.to_path_buf()));
        }
        let data = fs::read(&path).map_err(|e| io_err(&path, e))?;
        let registry = serde_json::from_slice(&data).map_err(|e| json_err(&path, e))?;
        Ok(Store {
            root: root.to_path_buf(),
            registry,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bases(&self) -> impl Iterator<Item = &BaseMeta> {
        self.registry.bases.values()
    }

    pub fn base(&self, name: &str) -> Result<&BaseMeta, StoreError> {
        self.registry
            .bases
            .get(name)
            .ok_or_else(|| StoreError::BaseNotFound(name.to_string()))
    }

    /// Register a new base and create its directory.
    pub fn create_base(&mut self, name: &str) -> Result<(), StoreError> {
        if self.registry.bases.contains_key(name) {
            return Err(StoreError::BaseExists(name.to_string()));
        }
        let dir = self.root.join(name);
        fs::create_dir(&dir).map_err(|e| io_err(&dir, e))?;
        self.registry.bases.insert(
            name.to_string(),
            BaseMeta {
                name: name.to_string(),
                comment: String::new(),
                next_log_id: 0,
            },
        );
        self.save_registry()
    }

    /// Append a log unit to a base's chain, durably, and advance the
    /// sequence. Returns the unit's final path.
    pub fn append(&mut self, name: &str, log: &SetLog) -> Result<PathBuf, StoreError> {
        let meta = self
            .registry
            .bases
            .get_mut(name)
            .ok_or_else(|| StoreError::BaseNotFound(name.to_string()))?;

        let file = format!("{:08}_{}.json", meta.next_log_id, log.kind);
        let path = self.root.join(&meta.name).join(file);
        write_setlog(&path, log)?;
        meta.next_log_id += 1;

        self.save_registry()?;
        tracing::debug!(path = %path.display(), "appended log unit");
        Ok(path)
    }

    /// Materialize a base's current view: fold every unit in creation order
    /// starting from an empty log. The first unit must be a baseline; the
    /// merge contract enforces that.
    pub fn load(&self, name: &str) -> Result<SetLog, StoreError> {
        let meta = self.base(name)?;
        let dir = self.root.join(&meta.name);

        let mut units = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| io_err(&dir, e))? {
            let entry = entry.map_err(|e| io_err(&dir, e))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if is_file && file_name.ends_with(".json") {
                units.push(file_name);
            }
        }
        units.sort();

        let mut logs = SetLog::new(Kind::Empty);
        for unit in units {
            let path = dir.join(&unit);
            let log = read_setlog(&path)?;
            logs.merge(&log).map_err(|source| StoreError::Chain {
                name: name.to_string(),
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), kind = %log.kind, "folded log unit");
        }
        Ok(logs)
    }

    fn save_registry(&self) -> Result<(), StoreError> {
        let path = self.root.join(REGISTRY_FILE);
        let data = serde_json::to_vec_pretty(&self.registry).map_err(|e| json_err(&path, e))?;
        atomic_write(&path, &data)
    }
}

/// Decode one log unit from disk.
pub fn read_setlog(path: &Path) -> Result<SetLog, StoreError> {
    let data = fs::read(path).map_err(|e| io_err(path, e))?;
    serde_json::from_slice(&data).map_err(|e| json_err(path, e))
}

/// Encode one log unit to disk, atomically.
pub fn write_setlog(path: &Path, log: &SetLog) -> Result<(), StoreError> {
    let data = serde_json::to_vec_pretty(log).map_err(|e| json_err(path, e))?;
    atomic_write(path, &data)
}

fn io_err(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn json_err(path: &Path, source: serde_json::Error) -> StoreError {
    StoreError::Json {
        path: path.to_path_buf(),
        source,
    }
}

/// Write-to-temp + fsync + rename. A reader never observes a half-written
/// file at the final path.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_err(dir, e))?;
    tmp.write_all(data).map_err(|e| io_err(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| io_err(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| io_err(path, e.error))?;

    // Make the rename itself durable.
    #[cfg(unix)]
    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }

    Ok(())
}
