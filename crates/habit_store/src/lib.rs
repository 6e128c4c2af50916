pub mod file;
pub mod memory;

use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub use crate::file::FileStore;
pub use crate::memory::MemoryStore;

/// Key under which the whole habit collection is stored.
pub const HABITS_KEY: &str = "smart-habits";
/// Key under which the signed-in user is stored.
pub const CURRENT_USER_KEY: &str = "currentUser";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage quota exceeded: {needed} bytes requested, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// String-valued key-value backend, shaped after browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON layer over a [`KeyValueStore`]. Failures never propagate: reads fall
/// back to the caller's default and writes report `false`.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.backend.get(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    tracing::error!(key, %err, "stored value is not valid json");
                    default
                }
            },
            Ok(None) => default,
            Err(err) => {
                tracing::error!(key, %err, "error reading from storage");
                default
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(key, %err, "unable to serialize value for storage");
                return false;
            }
        };
        match self.backend.set(key, &raw) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(key, %err, "error saving to storage");
                false
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        match self.backend.remove(key) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(key, %err, "error removing from storage");
                false
            }
        }
    }

    pub fn clear(&self) -> bool {
        match self.backend.clear() {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%err, "error clearing storage");
                false
            }
        }
    }
}
