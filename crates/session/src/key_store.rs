//! Persistence of the user's inference API key.

use std::sync::Arc;

use proto::StorageError;
use tracing::{debug, warn};

use crate::storage::LocalStorage;

/// Storage key the credential lives under.
pub const API_KEY_STORAGE_KEY: &str = "cvs-genai-user-hf-api-key";

/// Holds the single stored API key. Stored in plain text with no expiry.
pub struct ApiKeyStore {
    storage: Arc<dyn LocalStorage>,
    has_existing_key: bool,
}

impl ApiKeyStore {
    pub fn new(storage: Arc<dyn LocalStorage>) -> Self {
        let mut store = Self {
            storage,
            has_existing_key: false,
        };
        store.has_existing_key = !store.load().is_empty();
        store
    }

    /// Returns the stored key, or an empty string when nothing is stored or
    /// the storage cannot be read.
    pub fn load(&self) -> String {
        match self.storage.get_item(API_KEY_STORAGE_KEY) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "API key storage unreadable, treating as empty");
                String::new()
            }
        }
    }

    /// Persists a non-empty key; an empty key deletes the stored value.
    pub fn save(&mut self, key: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return self.clear();
        }
        self.storage.set_item(API_KEY_STORAGE_KEY, key)?;
        self.has_existing_key = true;
        debug!("API key saved");
        Ok(())
    }

    /// Deletes the stored key unconditionally.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.storage.remove_item(API_KEY_STORAGE_KEY)?;
        self.has_existing_key = false;
        debug!("API key cleared");
        Ok(())
    }

    pub fn has_existing_key(&self) -> bool {
        self.has_existing_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    struct BrokenStorage;

    impl LocalStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn fresh_store_loads_empty_and_has_no_key() {
        let store = ApiKeyStore::new(Arc::new(MemoryStorage::new()));
        assert_eq!(store.load(), "");
        assert!(!store.has_existing_key());
    }

    #[test]
    fn save_then_load_returns_key_and_marks_existing() {
        let mut store = ApiKeyStore::new(Arc::new(MemoryStorage::new()));
        store.save("hf_1234567890abcdef").expect("save");
        assert_eq!(store.load(), "hf_1234567890abcdef");
        assert!(store.has_existing_key());
    }

    #[test]
    fn saving_empty_key_deletes_it() {
        let mut store = ApiKeyStore::new(Arc::new(MemoryStorage::new()));
        store.save("hf_1234567890abcdef").expect("save");
        store.save("").expect("save empty");
        assert_eq!(store.load(), "");
        assert!(!store.has_existing_key());
    }

    #[test]
    fn clear_removes_key() {
        let mut store = ApiKeyStore::new(Arc::new(MemoryStorage::new()));
        store.save("hf_1234567890abcdef").expect("save");
        store.clear().expect("clear");
        assert_eq!(store.load(), "");
    }

    #[test]
    fn existing_key_is_detected_on_open() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let storage = Arc::new(FileStorage::in_dir(tmp.path()));
        ApiKeyStore::new(storage.clone())
            .save("hf_persisted_key_1")
            .expect("save");

        let reopened = ApiKeyStore::new(storage);
        assert!(reopened.has_existing_key());
        assert_eq!(reopened.load(), "hf_persisted_key_1");
    }

    #[test]
    fn unreadable_storage_loads_as_empty() {
        let store = ApiKeyStore::new(Arc::new(BrokenStorage));
        assert_eq!(store.load(), "");
        assert!(!store.has_existing_key());
    }

    #[test]
    fn failed_save_keeps_existing_flag_unchanged() {
        let mut store = ApiKeyStore::new(Arc::new(BrokenStorage));
        let err = store.save("hf_1234567890abcdef").expect_err("save must fail");
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert!(!store.has_existing_key());
    }
}
