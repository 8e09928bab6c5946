use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tokio::sync::RwLock;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 10 * 1024 * 1024;

/// Validated storage key. Keys are stored verbatim, no namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(Cow<'static, str>);

impl StorageKey {
    /// Persisted session record.
    pub const USER: StorageKey = StorageKey(Cow::Borrowed("user"));
    /// Persisted favorites list.
    pub const FAVORITES: StorageKey = StorageKey(Cow::Borrowed("favorites"));

    /// Keys are row ids, not paths: they only need to be non-blank, bounded
    /// and free of control characters.
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();
        let reason = if key.trim().is_empty() {
            Some("key cannot be blank".to_string())
        } else if key.len() > MAX_KEY_LENGTH {
            Some(format!("key exceeds {MAX_KEY_LENGTH} bytes"))
        } else if key.chars().any(char::is_control) {
            Some("key contains control characters".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(KvError::InvalidKey {
                key: key.escape_debug().take(64).collect(),
                reason,
            }),
            None => Ok(Self(Cow::Owned(key))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message} (code: {code:?}, retryable: {retryable})")]
    Storage {
        code: StorageErrorCode,
        message: String,
        retryable: bool,
    },

    #[error("serialization error: {message}")]
    Serialization { message: String, key: Option<String> },

    #[error("stored value for '{key}' is unreadable: {message}")]
    Deserialization { message: String, key: String },
}

impl KvError {
    pub fn is_retryable(&self) -> bool {
        match self {
            KvError::Storage { retryable, .. } => *retryable,
            _ => false,
        }
    }

    pub fn storage(code: StorageErrorCode, message: impl Into<String>) -> Self {
        let retryable = code.is_retryable();
        Self::Storage {
            code,
            message: message.into(),
            retryable,
        }
    }

    fn serialization(key: &StorageKey, err: &serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
            key: Some(key.to_string()),
        }
    }

    fn deserialization(key: &StorageKey, err: &serde_json::Error) -> Self {
        Self::Deserialization {
            message: err.to_string(),
            key: key.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    Unknown,
    ConnectionFailed,
    Corrupted,
    DiskFull,
    PermissionDenied,
    Busy,
    Locked,
    IoError,
}

impl StorageErrorCode {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StorageErrorCode::ConnectionFailed | StorageErrorCode::Busy | StorageErrorCode::Locked
        )
    }
}

/// Durable string-keyed byte storage provided by the platform shell.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, KvError>;

    async fn set(&self, key: &StorageKey, value: Vec<u8>) -> Result<(), KvError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &StorageKey) -> Result<bool, KvError>;

    async fn exists(&self, key: &StorageKey) -> Result<bool, KvError> {
        Ok(self.get(key).await?.is_some())
    }
}

pub(crate) fn check_value_size(value: &[u8]) -> Result<(), KvError> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(KvError::ValueTooLarge {
            size: value.len(),
            max: MAX_VALUE_SIZE,
        });
    }
    Ok(())
}

/// Reads `key` and decodes it as JSON. Absent keys yield `Ok(None)`.
pub async fn load_json<S, T>(store: &S, key: &StorageKey) -> Result<Option<T>, KvError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| KvError::deserialization(key, &e)),
        None => Ok(None),
    }
}

pub async fn save_json<S, T>(store: &S, key: &StorageKey, value: &T) -> Result<(), KvError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let data = serde_json::to_vec(value).map_err(|e| KvError::serialization(key, &e))?;
    store.set(key, data).await
}

/// Process-local store. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.entries.read().await.get(key.as_str()).cloned())
    }

    async fn set(&self, key: &StorageKey, value: Vec<u8>) -> Result<(), KvError> {
        check_value_size(&value)?;
        self.entries
            .write()
            .await
            .insert(key.as_str().to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &StorageKey) -> Result<bool, KvError> {
        Ok(self.entries.write().await.remove(key.as_str()).is_some())
    }
}
