//! Key/value persistence for client-side state.
//!
//! [`FileStorage`] keeps every item in one TOML table on disk, by default
//! `~/.genai/storage.toml`. [`MemoryStorage`] is the non-persistent variant.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use proto::StorageError;
use tracing::{debug, trace, warn};

/// Minimal string key/value store.
pub trait LocalStorage: Send + Sync {
    /// Returns the stored value for `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Stores or replaces the value for `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removes `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

// ── File-backed storage ────────────────────────────────────────────────────────

/// TOML file holding a flat `key = "value"` table.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `{dir}/storage.toml`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join("storage.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        trace!(path = %self.path.display(), exists = %self.path.exists(), "Reading storage");
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string(items).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, content)?;
        restrict_permissions(&self.path);
        debug!(path = %self.path.display(), items = %items.len(), "Storage saved");
        Ok(())
    }

    fn read_for_update(&self) -> BTreeMap<String, String> {
        match self.read_all() {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable storage file");
                BTreeMap::new()
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)) {
        warn!(path = %path.display(), error = %e, "Could not restrict storage permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut items = self.read_for_update();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        let mut items = self.read_for_update();
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&items)
    }
}

// ── In-memory storage ──────────────────────────────────────────────────────────

/// Process-local storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_set_get_remove_roundtrip() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::in_dir(tmp.path());

        assert_eq!(storage.get_item("k").expect("get"), None);
        storage.set_item("k", "v1").expect("set");
        storage.set_item("other", "v2").expect("set other");
        assert_eq!(storage.get_item("k").expect("get").as_deref(), Some("v1"));

        storage.remove_item("k").expect("remove");
        assert_eq!(storage.get_item("k").expect("get"), None);
        assert_eq!(storage.get_item("other").expect("get").as_deref(), Some("v2"));
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let tmp = tempfile::tempdir().expect("tempdir");
        FileStorage::in_dir(tmp.path())
            .set_item("persisted", "yes")
            .expect("set");

        let reopened = FileStorage::in_dir(tmp.path());
        assert_eq!(
            reopened.get_item("persisted").expect("get").as_deref(),
            Some("yes")
        );
    }

    #[test]
    fn corrupt_file_is_reported_on_read_and_replaced_on_write() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::in_dir(tmp.path());
        std::fs::write(storage.path(), "not = [valid").expect("write garbage");

        let err = storage.get_item("k").expect_err("corrupt file should error");
        assert!(matches!(err, StorageError::Corrupt { .. }));

        storage.set_item("k", "fresh").expect("set replaces corrupt file");
        assert_eq!(storage.get_item("k").expect("get").as_deref(), Some("fresh"));
    }

    #[test]
    fn removing_missing_key_is_a_no_op() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = FileStorage::in_dir(tmp.path());
        storage.remove_item("absent").expect("remove absent");
        assert!(!storage.path().exists());
    }

    #[test]
    fn memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1").expect("set");
        assert_eq!(storage.get_item("a").expect("get").as_deref(), Some("1"));
        storage.remove_item("a").expect("remove");
        assert_eq!(storage.get_item("a").expect("get"), None);
    }
}
