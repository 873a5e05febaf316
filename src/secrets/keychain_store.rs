//! System keychain secret store
//!
//! Uses the OS keychain for secure secret storage:
//! - macOS: Keychain
//! - Windows: Credential Manager
//! - Linux: Secret Service (GNOME Keyring, KWallet)

use keyring::Entry;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Secret store backed by the system keychain
///
/// This provides secure, persistent storage for credentials and tokens using
/// the operating system's native credential management:
///
/// - **macOS**: Keychain Services
/// - **Windows**: Credential Manager
/// - **Linux**: Secret Service API (GNOME Keyring, KWallet, etc.)
///
/// The service name namespaces entries in the keychain and is always passed
/// at construction; use distinct services for unrelated record kinds (e.g.
/// one for credentials, another for tokens) so keys cannot collide.
///
/// # Example
///
/// ```no_run
/// use keystash::secrets::{SecretStore, KeychainSecretStore};
///
/// let store = KeychainSecretStore::with_service("myapp.credentials");
///
/// store.set("device-1", "hunter2").unwrap();
/// assert_eq!(store.get("device-1").unwrap(), "hunter2");
/// ```
pub struct KeychainSecretStore {
    service_name: String,
}

impl KeychainSecretStore {
    /// Create a new keychain store namespaced by the given service name
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service_name: service.into(),
        }
    }

    /// The service name this store was constructed with
    pub fn service(&self) -> &str {
        &self.service_name
    }

    /// Get a keyring entry for the given key
    fn entry(&self, key: &str) -> SecretStoreResult<Entry> {
        Entry::new(&self.service_name, key)
            .map_err(|e| SecretStoreError::Backend(format!("failed to create keychain entry: {e}")))
    }
}

impl SecretStore for KeychainSecretStore {
    fn name(&self) -> &str {
        "keychain"
    }

    fn get(&self, key: &str) -> SecretStoreResult<String> {
        let entry = self.entry(key)?;
        match entry.get_password() {
            Ok(value) => Ok(value),
            Err(keyring::Error::NoEntry) => Err(SecretStoreError::NotFound(key.to_string())),
            Err(e) => Err(SecretStoreError::Backend(format!(
                "failed to read from keychain: {e}"
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        let entry = self.entry(key)?;
        entry
            .set_password(value)
            .map_err(|e| SecretStoreError::Backend(format!("failed to store in keychain: {e}")))
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        let entry = self.entry(key)?;
        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Err(SecretStoreError::NotFound(key.to_string())),
            Err(e) => Err(SecretStoreError::Backend(format!(
                "failed to delete from keychain: {e}"
            ))),
        }
    }
}
