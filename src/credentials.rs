//! Credential cache for a single device identity
//!
//! Wraps a [`SecretStore`] entry holding a username/password pair and caches
//! the decoded record after the first successful load. Updates and deletes
//! write through to the store before the in-memory state changes.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::log_error;
use crate::logging::{Logger, NoOpLogger, SharedLogger};
use crate::secrets::{SecretStore, SecretStoreError};

/// A username/password pair as persisted in the secret store
///
/// Serialized as `{"username":"…","password":"…"}`. Missing fields decode as
/// empty strings; a record that fails to decode is discarded whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Errors returned by [`CredentialCache`] mutators
///
/// Read accessors never return errors; failures there degrade to empty
/// strings and a log line.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("could not encode credentials: {0}")]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] SecretStoreError),
}

/// Lazy single-load cache for one credential record
///
/// The cache is bound to one store key (a device identity) at construction.
/// The first accessor call loads and decodes the record from the store; a
/// missing key is cached as an empty record, while a store or decode failure
/// leaves the cache unloaded so the next access retries. `update` and
/// `delete` write through to the store and reflect in memory only on success.
///
/// All operations take an internal mutex, so one instance can be shared
/// across threads; concurrent first reads still hit the store exactly once.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use keystash::{CredentialCache, MemorySecretStore};
///
/// let store = Arc::new(MemorySecretStore::new());
/// let cache = CredentialCache::new(store, "device-1");
///
/// assert_eq!(cache.username(), "");
///
/// cache.update("user@example.org", "123456").unwrap();
/// assert_eq!(cache.username(), "user@example.org");
/// assert_eq!(cache.password(), "123456");
/// ```
pub struct CredentialCache {
    store: Arc<dyn SecretStore>,
    key: String,
    logger: SharedLogger,
    // None = unloaded; Some = loaded, where the empty record stands for a
    // key that is absent from the store.
    state: Mutex<Option<CredentialRecord>>,
}

impl CredentialCache {
    /// Create a cache over `store`, bound to the record at `key`
    pub fn new(store: Arc<dyn SecretStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            logger: Arc::new(NoOpLogger),
            state: Mutex::new(None),
        }
    }

    /// Replace the logger used to report read-path failures
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// The cached username, or `""` if no record is stored or loading failed
    pub fn username(&self) -> String {
        self.with_record(|record| record.username.clone())
    }

    /// The cached password, or `""` if no record is stored or loading failed
    pub fn password(&self) -> String {
        self.with_record(|record| record.password.clone())
    }

    /// Persist a new credential pair and update the cache
    ///
    /// The store write happens first; the in-memory record changes only if
    /// the write succeeds.
    pub fn update(&self, username: &str, password: &str) -> Result<(), CredentialError> {
        let record = CredentialRecord {
            username: username.to_string(),
            password: password.to_string(),
        };
        let data = serde_json::to_string(&record).map_err(CredentialError::Encode)?;

        // Hold the lock across the store write so readers never observe the
        // new record before the write has succeeded.
        let mut state = self.state.lock();
        self.store.set(&self.key, &data)?;
        *state = Some(record);

        Ok(())
    }

    /// Remove the stored record and drop the cached copy
    ///
    /// Deleting a record that was never stored succeeds. On success the
    /// cache reverts to unloaded, so the next read queries the store again
    /// rather than assuming empty.
    pub fn delete(&self) -> Result<(), CredentialError> {
        let mut state = self.state.lock();
        match self.store.delete(&self.key) {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err.into()),
        }
        *state = None;

        Ok(())
    }

    /// Run `f` against the cached record, loading it first if needed
    fn with_record<T>(&self, f: impl FnOnce(&CredentialRecord) -> T) -> T {
        let mut state = self.state.lock();
        match &*state {
            Some(record) => f(record),
            None => match self.load() {
                Some(record) => {
                    let out = f(&record);
                    *state = Some(record);
                    out
                }
                // Transient failure: stay unloaded so the next access
                // retries the store.
                None => f(&CredentialRecord::default()),
            },
        }
    }

    /// Fetch and decode the record from the store
    ///
    /// `Some` marks the cache loaded, including the empty record when the
    /// key is absent. `None` is a transient failure, already logged.
    fn load(&self) -> Option<CredentialRecord> {
        let raw = match self.store.get(&self.key) {
            Ok(raw) => raw,
            Err(err) if err.is_not_found() => return Some(CredentialRecord::default()),
            Err(err) => {
                log_error!(self.logger, "could not get credentials: {err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(err) => {
                log_error!(self.logger, "could not decode credentials: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MockSecretStore;
    use parking_lot::Mutex;

    const DEVICE_ID: &str = "9c2dcb0a-9680-4c5e-b1e6-31ffbe4b6c45";
    const RECORD_JSON: &str = r#"{"username":"user@example.org","password":"123456"}"#;

    /// Captures error-level messages so tests can assert on them
    #[derive(Default)]
    struct RecordingLogger {
        errors: Mutex<Vec<String>>,
    }

    impl RecordingLogger {
        fn errors(&self) -> Vec<String> {
            self.errors.lock().clone()
        }
    }

    impl Logger for RecordingLogger {
        fn debug(&self, _message: &str) {}
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }

    fn cache_with_logger(
        store: Arc<MockSecretStore>,
    ) -> (CredentialCache, Arc<RecordingLogger>) {
        let logger = Arc::new(RecordingLogger::default());
        let cache = CredentialCache::new(store, DEVICE_ID).with_logger(logger.clone());
        (cache, logger)
    }

    #[test]
    fn test_username_missing_credentials() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(
            DEVICE_ID,
            Err(SecretStoreError::NotFound(DEVICE_ID.to_string())),
        );

        let (cache, logger) = cache_with_logger(store.clone());

        assert_eq!(cache.username(), "");
        assert!(logger.errors().is_empty());
        store.assert_satisfied();
    }

    #[test]
    fn test_username_store_error_is_logged_and_retried() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Err(SecretStoreError::Backend("get error".into())));
        // The failed load leaves the cache unloaded, so the next read hits
        // the store again.
        store.expect_get(DEVICE_ID, Ok(RECORD_JSON.to_string()));

        let (cache, logger) = cache_with_logger(store.clone());

        assert_eq!(cache.username(), "");
        assert_eq!(
            logger.errors(),
            vec!["could not get credentials: store error: get error".to_string()]
        );

        assert_eq!(cache.username(), "user@example.org");
        store.assert_satisfied();
    }

    #[test]
    fn test_username_malformed_record() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok("{".to_string()));

        let (cache, logger) = cache_with_logger(store.clone());

        assert_eq!(cache.username(), "");

        let errors = logger.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("could not decode credentials:"));
        store.assert_satisfied();
    }

    #[test]
    fn test_password() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok(RECORD_JSON.to_string()));

        let (cache, logger) = cache_with_logger(store.clone());

        assert_eq!(cache.password(), "123456");
        assert!(logger.errors().is_empty());
        store.assert_satisfied();
    }

    #[test]
    fn test_partial_record_defaults_missing_fields() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok(r#"{"username":"user@example.org"}"#.to_string()));

        let (cache, _) = cache_with_logger(store.clone());

        assert_eq!(cache.username(), "user@example.org");
        assert_eq!(cache.password(), "");
        store.assert_satisfied();
    }

    #[test]
    fn test_load_once() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok(RECORD_JSON.to_string()));

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        // 1st run calls the store.
        assert_eq!(cache.username(), "user@example.org");
        assert_eq!(cache.password(), "123456");

        // 2nd run does not.
        assert_eq!(cache.username(), "user@example.org");
        assert_eq!(cache.password(), "123456");

        store.assert_satisfied();
    }

    #[test]
    fn test_concurrent_reads_load_once() {
        use std::thread;

        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok(RECORD_JSON.to_string()));

        let cache = Arc::new(CredentialCache::new(store.clone(), DEVICE_ID));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    assert_eq!(cache.username(), "user@example.org");
                    assert_eq!(cache.password(), "123456");
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        store.assert_satisfied();
    }

    #[test]
    fn test_update_store_error_leaves_cache_unchanged() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_set(
            DEVICE_ID,
            RECORD_JSON,
            Err(SecretStoreError::Backend("update error".into())),
        );
        // The failed update must not mark the cache loaded.
        store.expect_get(
            DEVICE_ID,
            Err(SecretStoreError::NotFound(DEVICE_ID.to_string())),
        );

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        let err = cache.update("user@example.org", "123456").unwrap_err();
        assert_eq!(err.to_string(), "store error: update error");

        assert_eq!(cache.username(), "");
        store.assert_satisfied();
    }

    #[test]
    fn test_update_success() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_set(DEVICE_ID, RECORD_JSON, Ok(()));

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        cache.update("user@example.org", "123456").unwrap();

        // Reads reflect the update without a store round trip.
        assert_eq!(cache.username(), "user@example.org");
        assert_eq!(cache.password(), "123456");
        store.assert_satisfied();
    }

    #[test]
    fn test_update_replaces_loaded_record() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok(RECORD_JSON.to_string()));
        store.expect_set(
            DEVICE_ID,
            r#"{"username":"john@example.org","password":"654321"}"#,
            Ok(()),
        );

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        assert_eq!(cache.username(), "user@example.org");

        cache.update("john@example.org", "654321").unwrap();

        assert_eq!(cache.username(), "john@example.org");
        assert_eq!(cache.password(), "654321");
        store.assert_satisfied();
    }

    #[test]
    fn test_delete_not_found_is_success() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_delete(
            DEVICE_ID,
            Err(SecretStoreError::NotFound(DEVICE_ID.to_string())),
        );

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        cache.delete().unwrap();
        store.assert_satisfied();
    }

    #[test]
    fn test_delete_store_error() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_delete(DEVICE_ID, Err(SecretStoreError::Backend("delete error".into())));

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        let err = cache.delete().unwrap_err();
        assert_eq!(err.to_string(), "store error: delete error");
        store.assert_satisfied();
    }

    #[test]
    fn test_delete_resets_cache() {
        let store = Arc::new(MockSecretStore::new());
        store.expect_get(DEVICE_ID, Ok(RECORD_JSON.to_string()));
        store.expect_delete(DEVICE_ID, Ok(()));
        store.expect_get(
            DEVICE_ID,
            Err(SecretStoreError::NotFound(DEVICE_ID.to_string())),
        );

        let cache = CredentialCache::new(store.clone(), DEVICE_ID);

        // 1st run calls the store.
        assert_eq!(cache.username(), "user@example.org");
        assert_eq!(cache.password(), "123456");

        cache.delete().unwrap();

        // After the delete the cache queries the store again.
        assert_eq!(cache.username(), "");
        assert_eq!(cache.password(), "");
        store.assert_satisfied();
    }

    #[test]
    fn test_record_json_shape() {
        let record = CredentialRecord {
            username: "user@example.org".to_string(),
            password: "123456".to_string(),
        };

        assert_eq!(serde_json::to_string(&record).unwrap(), RECORD_JSON);
    }
}
