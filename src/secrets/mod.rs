//! Secret storage abstractions and implementations
//!
//! This module provides a pluggable secret storage system with:
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `KeychainSecretStore`, `MemorySecretStore`
//! - `MockSecretStore`, a scripted double for unit tests

mod keychain_store;
mod memory_store;
mod mock_store;
mod traits;

pub use keychain_store::KeychainSecretStore;
pub use memory_store::MemorySecretStore;
pub use mock_store::MockSecretStore;
pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
