use std::sync::Arc;

use tracing::warn;

use super::session::Credential;
use super::storage::{Storage, UnavailableStorage};

/// Storage slot holding the session credential
pub const DEFAULT_SLOT: &str = "auth_token";

/// Durable persistence for exactly one session credential.
///
/// None of the operations fail: storage errors are logged and degrade to a
/// no-op (writes) or an absent credential (reads).
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
    slot: String,
}

impl CredentialStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_slot(storage, DEFAULT_SLOT)
    }

    pub fn with_slot(storage: Arc<dyn Storage>, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
        }
    }

    /// Store for a context without durable storage
    pub fn unavailable() -> Self {
        Self::new(Arc::new(UnavailableStorage))
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Overwrite the stored credential
    pub fn save(&self, credential: &Credential) {
        if let Err(e) = self.storage.set_item(&self.slot, credential.as_str()) {
            warn!(slot = %self.slot, error = %e, "Failed to persist credential");
        }
    }

    /// Read the stored credential, if any
    pub fn load(&self) -> Option<Credential> {
        match self.storage.get_item(&self.slot) {
            Ok(value) => value.and_then(Credential::new),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Failed to read stored credential");
                None
            }
        }
    }

    /// Remove the stored credential. Clearing an empty store is fine.
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.slot) {
            warn!(slot = %self.slot, error = %e, "Failed to remove stored credential");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::{FileStorage, MemoryStorage};

    fn credential(value: &str) -> Credential {
        Credential::new(value).unwrap()
    }

    #[test]
    fn test_save_load_clear() {
        let store = CredentialStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.is_available());
        assert_eq!(store.load(), None);

        store.save(&credential("T1"));
        assert_eq!(store.load(), Some(credential("T1")));

        store.save(&credential("T2"));
        assert_eq!(store.load(), Some(credential("T2")));

        store.clear();
        assert_eq!(store.load(), None);
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_uses_named_slot() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());
        store.save(&credential("T1"));
        assert_eq!(storage.get_item("auth_token").unwrap().as_deref(), Some("T1"));

        let custom = CredentialStore::with_slot(storage.clone(), "other_slot");
        assert_eq!(custom.load(), None);
    }

    #[test]
    fn test_unavailable_store_operations_are_no_ops() {
        let store = CredentialStore::unavailable();
        assert!(!store.is_available());
        store.save(&credential("T1"));
        assert_eq!(store.load(), None);
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_empty_stored_value_reads_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(DEFAULT_SLOT, "").unwrap();
        let store = CredentialStore::new(storage);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_storage_errors_degrade_to_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "{broken").unwrap();

        let store = CredentialStore::new(Arc::new(storage));
        assert_eq!(store.load(), None);
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_after_truncated_write_is_loadable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        std::fs::write(storage.path(), "{trunc").unwrap();

        let store = CredentialStore::new(Arc::new(storage));
        store.save(&credential("T1"));
        assert_eq!(store.load(), Some(credential("T1")));

        store.clear();
        assert_eq!(store.load(), None);
    }
}
