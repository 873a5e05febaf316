//! Core trait and error types for secret storage

use thiserror::Error;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("secret not found: {0}")]
    NotFound(String),

    #[error("store error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SecretStoreError {
    /// Whether this error is the distinguished "key is absent" condition.
    ///
    /// Read paths treat it as an empty record; delete paths treat it as
    /// success.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SecretStoreError::NotFound(_))
    }
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Trait for secret storage implementations
///
/// Implementations can be:
/// - System keychain (`KeychainSecretStore`)
/// - In-memory for testing (`MemorySecretStore`)
/// - Scripted for unit tests (`MockSecretStore`)
/// - Custom implementations (database, Vault, etc.)
///
/// `get` and `delete` fail with [`SecretStoreError::NotFound`] when the key is
/// absent so callers can tell "not there" apart from a broken backend.
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
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key
    fn get(&self, key: &str) -> SecretStoreResult<String>;

    /// Store a secret, overwriting any existing value
    fn set(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    /// Delete a secret
    ///
    /// Fails with [`SecretStoreError::NotFound`] when the key is absent.
    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_ok()
    }
}
