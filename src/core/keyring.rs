use std::error::Error;
use std::fmt;

use keyring::Entry;
use tracing::debug;

use crate::core::storage::{KeyValueStore, StorageError, AUTH_TOKEN_KEY};

const KEYRING_SERVICE: &str = "fisherman";

/// Describes failures when attempting to access the system keyring.
///
/// Recoverable errors indicate that the credential backend was
/// temporarily unavailable (for example when the keychain service is
/// locked). Permanent errors surface the underlying cause directly.
#[derive(Debug)]
pub enum KeyringAccessError {
    Recoverable(keyring::Error),
    Permanent(keyring::Error),
}

impl KeyringAccessError {
    fn inner(&self) -> &keyring::Error {
        match self {
            KeyringAccessError::Recoverable(err) | KeyringAccessError::Permanent(err) => err,
        }
    }
}

impl From<keyring::Error> for KeyringAccessError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::PlatformFailure(_) | keyring::Error::NoStorageAccess(_) => {
                KeyringAccessError::Recoverable(err)
            }
            other => KeyringAccessError::Permanent(other),
        }
    }
}

impl fmt::Display for KeyringAccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner())
    }
}

impl Error for KeyringAccessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.inner())
    }
}

/// Keeps the bearer token in the OS keyring and every other key in the
/// wrapped store.
pub struct KeyringStore<S> {
    inner: S,
    service: String,
}

impl<S: KeyValueStore> KeyringStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_service(inner, KEYRING_SERVICE)
    }

    pub fn with_service(inner: S, service: impl Into<String>) -> Self {
        Self {
            inner,
            service: service.into(),
        }
    }

    fn is_secret(key: &str) -> bool {
        key == AUTH_TOKEN_KEY
    }

    fn entry(&self, key: &str) -> Result<Entry, StorageError> {
        Entry::new(&self.service, key).map_err(|err| KeyringAccessError::from(err).into())
    }
}

impl<S: KeyValueStore> KeyValueStore for KeyringStore<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !Self::is_secret(key) {
            return self.inner.get(key);
        }
        match self.entry(key)?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(KeyringAccessError::from(err).into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if !Self::is_secret(key) {
            return self.inner.set(key, value);
        }
        debug!(service = %self.service, key, "Storing credential in keyring");
        self.entry(key)?
            .set_password(value)
            .map_err(|err| KeyringAccessError::from(err).into())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if !Self::is_secret(key) {
            return self.inner.remove(key);
        }
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(KeyringAccessError::from(err).into()),
        }
    }
}
