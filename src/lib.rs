//! keystash
//!
//! Keychain-backed storage for the credentials and OAuth tokens an upstream
//! API client needs, with a lazy single-load cache on the credential side.
//!
//! The crate sits between an OS-level secret store and application code:
//!
//! - [`secrets`] abstracts the store itself ([`SecretStore`]), with a system
//!   keychain implementation and in-memory/scripted doubles for tests.
//! - [`CredentialCache`] loads a username/password record once, caches it,
//!   and writes updates through to the store before reflecting them.
//! - [`TokenStore`] exposes the [`TokenStorage`] capability an API client
//!   consumes; token reads are deliberately uncached so the client always
//!   sees the freshest token.
//!
//! ```
//! use std::sync::Arc;
//! use keystash::{CredentialCache, MemorySecretStore};
//!
//! let store = Arc::new(MemorySecretStore::new());
//! let cache = CredentialCache::new(store, "device-1");
//!
//! cache.update("user@example.org", "123456").unwrap();
//! assert_eq!(cache.username(), "user@example.org");
//! ```

pub mod credentials;
pub mod logging;
pub mod secrets;
pub mod token;

// Re-export commonly used types
pub use credentials::{CredentialCache, CredentialError, CredentialRecord};
pub use logging::{ConsoleLogger, Logger, NoOpLogger, SharedLogger};
pub use secrets::{
    KeychainSecretStore, MemorySecretStore, MockSecretStore, SecretStore, SecretStoreError,
    SecretStoreResult,
};
pub use token::{OAuthToken, TokenStorage, TokenStorageError, TokenStore};
