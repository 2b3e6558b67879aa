//! Key/value backends standing in for browser local storage.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::{ConfigError, ConfigResult};

/// String-keyed, string-valued storage with local-storage semantics.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    fn get(&self, key: &str) -> ConfigResult<Option<String>>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> ConfigResult<()>;

    /// Delete a value. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn remove(&self, key: &str) -> ConfigResult<()>;
}

/// Shared handle passed to the session and preference stores.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Default state file location: `<config dir>/pikreg/storage.json`.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when the platform has no config dir.
pub fn default_state_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("pikreg").join("storage.json"))
        .ok_or(ConfigError::NoConfigDir)
}

/// JSON object file holding every key.
///
/// Each operation re-reads the file so several invocations sharing one state
/// file observe each other's writes. Updates hold an exclusive lock on a
/// sibling `.lock` file for the whole read-modify-write, and land in a unique
/// temp file that is synced and then renamed over the original.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

/// Exclusive lock held until dropped.
struct UpdateLock {
    _file: File,
}

impl FileStore {
    /// Store backed by `path`; the file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, operation: &'static str, source: io::Error) -> ConfigError {
        ConfigError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }

    fn parent_dir(&self) -> ConfigResult<&Path> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|source| self.io_err("create directory", source))?;
        Ok(parent)
    }

    fn lock(&self) -> ConfigResult<UpdateLock> {
        self.parent_dir()?;
        let mut lock_path = self.path.as_os_str().to_owned();
        lock_path.push(".lock");
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(PathBuf::from(lock_path))
            .map_err(|source| self.io_err("open lock", source))?;
        FileExt::lock_exclusive(&file).map_err(|source| self.io_err("lock", source))?;
        Ok(UpdateLock { _file: file })
    }

    fn read_all(&self) -> ConfigResult<BTreeMap<String, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => return Err(self.io_err("read", source)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| ConfigError::CorruptStore {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> ConfigResult<()> {
        let encoded =
            serde_json::to_vec_pretty(entries).map_err(|source| ConfigError::Encode { source })?;
        let mut staging = NamedTempFile::new_in(self.parent_dir()?)
            .map_err(|source| self.io_err("create temp file", source))?;
        staging
            .write_all(&encoded)
            .map_err(|source| self.io_err("write", source))?;
        staging
            .as_file()
            .sync_all()
            .map_err(|source| self.io_err("sync", source))?;
        staging
            .persist(&self.path)
            .map_err(|err| self.io_err("rename", err.error))?;
        Ok(())
    }

    fn update<F>(&self, change: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let _lock = self.lock()?;
        let mut entries = self.read_all()?;
        if change(&mut entries) {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> ConfigResult<()> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

/// Process-local store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        let entries = self.entries.lock().map_err(|_| ConfigError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut entries = self.entries.lock().map_err(|_| ConfigError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> ConfigResult<()> {
        let mut entries = self.entries.lock().map_err(|_| ConfigError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}
