//! Key/value persistence for local storefront state.
//!
//! Session token, user record, cart, and wishlist are each persisted under
//! their own key as a JSON string. The [`Storage`] trait keeps the backend
//! swappable: [`MemoryStorage`] for tests, [`FileStorage`] for a real
//! process (one file per key, the process-local analog of origin-scoped
//! browser storage). No encryption, no expiry, no schema versioning.
//!
//! A corrupt persisted value is never a hard error: [`load_json`] logs a
//! diagnostic and reports the key as absent, so stores initialize empty.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// Persisted-state keys.
pub mod keys {
    /// Key for the session bearer token.
    pub const TOKEN: &str = "lumiere_token";

    /// Key for the persisted user record.
    pub const USER: &str = "lumiere_user";

    /// Key for the cart item collection.
    pub const CART: &str = "lumiere_cart";

    /// Key for the wishlist collection.
    pub const WISHLIST: &str = "lumiere_wishlist";
}

/// Errors that can occur writing to a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend I/O failed.
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized.
    #[error("serialization error for key {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A durable key → JSON-string store.
///
/// Reads are infallible by contract: a backend that cannot produce a value
/// for a key reports it as absent (logging the cause itself).
pub trait Storage {
    /// Read the raw value under `key`, if present.
    fn load(&self, key: &str) -> Option<String>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the backend cannot persist the value.
    fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`; no-op if absent.
    fn remove(&self, key: &str);
}

/// Deserialize the value under `key`, treating corrupt payloads as absent.
pub fn load_json<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Option<T> {
    let raw = storage.load(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%error, key, "corrupt persisted value, treating as absent");
            None
        }
    }
}

/// Serialize `value` and write it under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if serialization or the backend write fails.
pub fn store_json<T: Serialize>(
    storage: &impl Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
        key: key.to_string(),
        source,
    })?;
    storage.store(key, &raw)
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-memory storage backend.
///
/// Clones share the same underlying map, so a test can keep a handle and
/// inspect what a store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// =============================================================================
// FileStorage
// =============================================================================

/// File-backed storage: one `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: Arc<PathBuf>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir: Arc::new(dir) })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Some(raw),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(error) => {
                warn!(%error, key, "failed to read persisted value, treating as absent");
                None
            }
        }
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::write(self.path_for(key), value).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&self, key: &str) {
        let _ = std::fs::remove_file(self.path_for(key));
    }
}
