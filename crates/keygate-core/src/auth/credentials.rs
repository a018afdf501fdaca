//! Credential store seam and its OS keychain implementation.

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use crate::error::StoreError;

/// A fixed (service, account) pair naming one secret in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecretKey {
    pub service: String,
    pub account: String,
}

impl SecretKey {
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            account: account.into(),
        }
    }
}

/// Secure key-value storage for secrets.
///
/// Individual calls are expected to be atomic; nothing here provides
/// multi-key transactions.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns `Ok(None)` when no secret is stored under `key`.
    async fn get(&self, key: &SecretKey) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError>;

    /// Idempotent: deleting a missing secret succeeds.
    async fn delete(&self, key: &SecretKey) -> Result<(), StoreError>;
}

/// Secrets kept in the OS keychain via `keyring`.
pub struct KeyringStore;

impl KeyringStore {
    fn entry(key: &SecretKey) -> Result<Entry, StoreError> {
        Entry::new(&key.service, &key.account).map_err(map_keyring_error)
    }
}

fn map_keyring_error(err: keyring::Error) -> StoreError {
    match err {
        keyring::Error::NoStorageAccess(inner) => StoreError::AccessDenied(inner.to_string()),
        other => StoreError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl SecretStore for KeyringStore {
    async fn get(&self, key: &SecretKey) -> Result<Option<String>, StoreError> {
        match Self::entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(map_keyring_error(e)),
        }
    }

    async fn set(&self, key: &SecretKey, secret: &str) -> Result<(), StoreError> {
        Self::entry(key)?
            .set_password(secret)
            .map_err(map_keyring_error)
    }

    async fn delete(&self, key: &SecretKey) -> Result<(), StoreError> {
        match Self::entry(key)?.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => {
                debug!(account = %key.account, "Nothing to delete in keychain");
                Ok(())
            }
            Err(e) => Err(map_keyring_error(e)),
        }
    }
}
