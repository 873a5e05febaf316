//! Scripted secret store for unit tests
//!
//! Provides deterministic, per-call responses without touching a real
//! keychain. Tests queue up the calls they expect, run the code under test,
//! then verify every expectation was consumed.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::traits::{SecretStore, SecretStoreResult};

/// One expected call and its canned outcome
enum Expectation {
    Get {
        key: String,
        result: SecretStoreResult<String>,
    },
    Set {
        key: String,
        value: String,
        result: SecretStoreResult<()>,
    },
    Delete {
        key: String,
        result: SecretStoreResult<()>,
    },
}

impl Expectation {
    fn describe(&self) -> String {
        match self {
            Expectation::Get { key, .. } => format!("get({key:?})"),
            Expectation::Set { key, value, .. } => format!("set({key:?}, {value:?})"),
            Expectation::Delete { key, .. } => format!("delete({key:?})"),
        }
    }
}

/// Secret store that plays back a script of expected calls
///
/// Calls are matched strictly in FIFO order; an unexpected call, a key or
/// value mismatch, or leftover expectations all panic, so a test fails
/// loudly rather than silently diverging from its script.
///
/// # Example
///
/// ```
/// use keystash::secrets::{MockSecretStore, SecretStore, SecretStoreError};
///
/// let store = MockSecretStore::new();
/// store.expect_get("device-1", Err(SecretStoreError::NotFound("device-1".into())));
///
/// assert!(store.get("device-1").unwrap_err().is_not_found());
/// store.assert_satisfied();
/// ```
#[derive(Default)]
pub struct MockSecretStore {
    script: Mutex<VecDeque<Expectation>>,
}

impl MockSecretStore {
    /// Create a mock with an empty script (any call panics)
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect a `get` for `key`, answering with `result`
    pub fn expect_get(&self, key: impl Into<String>, result: SecretStoreResult<String>) {
        self.script.lock().push_back(Expectation::Get {
            key: key.into(),
            result,
        });
    }

    /// Expect a `set` of `value` under `key`, answering with `result`
    pub fn expect_set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        result: SecretStoreResult<()>,
    ) {
        self.script.lock().push_back(Expectation::Set {
            key: key.into(),
            value: value.into(),
            result,
        });
    }

    /// Expect a `delete` for `key`, answering with `result`
    pub fn expect_delete(&self, key: impl Into<String>, result: SecretStoreResult<()>) {
        self.script.lock().push_back(Expectation::Delete {
            key: key.into(),
            result,
        });
    }

    /// Panic unless every queued expectation has been consumed
    pub fn assert_satisfied(&self) {
        let script = self.script.lock();
        if let Some(next) = script.front() {
            panic!(
                "{} expectation(s) not met, next: {}",
                script.len(),
                next.describe()
            );
        }
    }

    fn next(&self, call: &str) -> Expectation {
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected call: {call}"))
    }
}

impl SecretStore for MockSecretStore {
    fn name(&self) -> &str {
        "mock"
    }

    fn get(&self, key: &str) -> SecretStoreResult<String> {
        match self.next(&format!("get({key:?})")) {
            Expectation::Get {
                key: expected,
                result,
            } if expected == key => result,
            other => panic!("expected {}, got get({key:?})", other.describe()),
        }
    }

    fn set(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        match self.next(&format!("set({key:?}, {value:?})")) {
            Expectation::Set {
                key: expected_key,
                value: expected_value,
                result,
            } if expected_key == key && expected_value == value => result,
            other => panic!("expected {}, got set({key:?}, {value:?})", other.describe()),
        }
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        match self.next(&format!("delete({key:?})")) {
            Expectation::Delete {
                key: expected,
                result,
            } if expected == key => result,
            other => panic!("expected {}, got delete({key:?})", other.describe()),
        }
    }
}
