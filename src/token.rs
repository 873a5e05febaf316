//! OAuth token storage for an upstream API client
//!
//! Unlike [`CredentialCache`](crate::CredentialCache), token reads are never
//! cached: every `get` queries the [`SecretStore`], so the client always sees
//! the freshest token at the cost of one store call per read.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secrets::{SecretStore, SecretStoreError};

/// An OAuth access token and its expiry as persisted in the secret store
///
/// Serialized as `{"access_token":"…","expires_at":"<RFC3339>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    #[serde(default)]
    pub access_token: String,
    /// Expiry is emitted at second precision, while any RFC3339 input
    /// (including millisecond precision) is accepted. The asymmetry is a
    /// compatibility artifact of the upstream wire format, kept as is.
    #[serde(with = "rfc3339_seconds", default = "zero_expiry")]
    pub expires_at: DateTime<Utc>,
}

impl Default for OAuthToken {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            expires_at: zero_expiry(),
        }
    }
}

impl OAuthToken {
    /// Whether this is the zero token, i.e. no token has been stored yet
    ///
    /// `get` returns the zero token instead of an error when the store has
    /// no entry, so this is how callers detect absence.
    pub fn is_empty(&self) -> bool {
        self.access_token.is_empty()
    }
}

fn zero_expiry() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// RFC3339 (de)serialization with second-precision output
mod rfc3339_seconds {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Errors returned by the token storage surface
#[derive(Error, Debug)]
pub enum TokenStorageError {
    #[error("could not encode token: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not decode token: {0}")]
    Decode(#[source] serde_json::Error),

    #[error(transparent)]
    Store(#[from] SecretStoreError),
}

/// Token storage capability consumed by the upstream API client
///
/// `get` yields the zero token, not an error, when no token is stored;
/// store and decode failures are returned so the client can tell "no token
/// yet" apart from a broken store.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Fetch the token stored under `key`
    async fn get(&self, key: &str) -> Result<OAuthToken, TokenStorageError>;

    /// Persist `token` under `key`, overwriting any existing token
    async fn set(&self, key: &str, token: OAuthToken) -> Result<(), TokenStorageError>;

    /// Delete the token stored under `key`; deleting a missing token succeeds
    async fn delete(&self, key: &str) -> Result<(), TokenStorageError>;
}

/// [`TokenStorage`] over a [`SecretStore`]
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use keystash::{MemorySecretStore, TokenStore, TokenStorage};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = TokenStore::new(Arc::new(MemorySecretStore::new()));
///
/// // No token stored yet: the zero token, not an error.
/// let token = store.get("account-1").await.unwrap();
/// assert!(token.is_empty());
/// # }
/// ```
pub struct TokenStore {
    store: Arc<dyn SecretStore>,
}

impl TokenStore {
    /// Create a token store over `store`
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TokenStorage for TokenStore {
    async fn get(&self, key: &str) -> Result<OAuthToken, TokenStorageError> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw,
            Err(err) if err.is_not_found() => return Ok(OAuthToken::default()),
            Err(err) => return Err(err.into()),
        };

        serde_json::from_str(&raw).map_err(TokenStorageError::Decode)
    }

    async fn set(&self, key: &str, token: OAuthToken) -> Result<(), TokenStorageError> {
        let data = serde_json::to_string(&token).map_err(TokenStorageError::Encode)?;

        self.store.set(key, &data).map_err(Into::into)
    }

    async fn delete(&self, key: &str) -> Result<(), TokenStorageError> {
        match self.store.delete(key) {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
