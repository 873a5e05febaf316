//! In-memory secret store

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// In-memory secret store for testing and ephemeral use
///
/// This store keeps secrets in memory and is fully read-write.
/// Secrets are lost when the store is dropped.
///
/// Absent keys fail with [`SecretStoreError::NotFound`] on both `get` and
/// `delete`, mirroring the keychain store, so tests hit the same
/// normalization paths as production.
///
/// # Thread Safety
///
/// The store uses `RwLock` internally and is safe to use from multiple threads.
///
/// # Example
///
/// ```
/// use keystash::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.set("device-1", "hunter2").unwrap();
/// assert_eq!(store.get("device-1").unwrap(), "hunter2");
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
    get_count: AtomicUsize,
}

impl MemorySecretStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_secrets(initial: HashMap<String, String>) -> Self {
        Self {
            secrets: RwLock::new(initial),
            get_count: AtomicUsize::new(0),
        }
    }

    /// Clear all secrets from the store
    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    /// Get the number of secrets in the store
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `get` calls served so far
    ///
    /// Lets tests assert load-once behavior without a scripted mock.
    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> SecretStoreResult<String> {
        self.get_count.fetch_add(1, Ordering::SeqCst);
        self.secrets
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }
}
