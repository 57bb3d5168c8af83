//! Key/Value Store Traits
//!
//! Defines the core traits for the local persistent tier.

use async_trait::async_trait;
use std::path::PathBuf;

/// Result type for local storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Error types for local storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error during storage operation
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Writing the value would exceed the store's capacity
    #[error("Storage quota exceeded writing {key}: {requested} bytes > {quota} bytes")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total bytes the store would hold after the write
        requested: u64,
        /// Configured capacity
        quota: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic backend error
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Durable string key/value store used for collections, credentials and the mode flag.
///
/// Values are opaque strings; the JSON shape of each entry is owned by the caller.
/// Implementations must leave the previous value intact when a `set` fails.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Get the backend type name (e.g., "file", "memory")
    fn backend_type(&self) -> &'static str;

    /// Check if the store can currently be written
    async fn is_available(&self) -> bool;

    /// Read a value, `None` when the key was never written or was removed
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// List stored keys, optionally filtered by prefix
    async fn keys(&self, prefix: Option<&str>) -> StorageResult<Vec<String>>;

    /// Check if a key exists
    async fn contains(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Extension trait for JSON operations
///
/// Provides convenient methods for serializing/deserializing JSON values.
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    /// Write a JSON-serializable value
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> StorageResult<()> {
        let json =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.set(key, &json).await
    }

    /// Read and deserialize a JSON value
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> StorageResult<Option<T>> {
        match self.get(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StorageError::Deserialization(e.to_string())),
            None => Ok(None),
        }
    }
}

// Blanket implementation for all KeyValueStore implementors
impl<T: KeyValueStore + ?Sized> KeyValueStoreExt for T {}

/// Builder for creating key/value stores from configuration
pub struct StoreBuilder {
    backend_type: String,
    config: std::collections::HashMap<String, String>,
}

impl StoreBuilder {
    /// Create a new builder
    pub fn new(backend_type: &str) -> Self {
        Self {
            backend_type: backend_type.to_string(),
            config: std::collections::HashMap::new(),
        }
    }

    /// Add a configuration option
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.config.insert(key.to_string(), value.to_string());
        self
    }

    /// Set the base path (for file backend)
    pub fn with_base_path(self, path: impl Into<PathBuf>) -> Self {
        self.with_option("base_path", &path.into().to_string_lossy())
    }

    /// Cap the total stored bytes
    pub fn with_quota(self, quota_bytes: u64) -> Self {
        self.with_option("quota_bytes", &quota_bytes.to_string())
    }

    /// Build the key/value store
    pub fn build(self) -> StorageResult<Box<dyn KeyValueStore>> {
        let quota = match self.config.get("quota_bytes") {
            Some(raw) => Some(raw.parse::<u64>().map_err(|_| {
                StorageError::Configuration(format!("Invalid quota_bytes: {}", raw))
            })?),
            None => None,
        };

        match self.backend_type.as_str() {
            "file" | "filesystem" => {
                let base_path = self
                    .config
                    .get("base_path")
                    .ok_or_else(|| StorageError::Configuration("base_path is required".into()))?;
                let mut store = super::FileKeyValueStore::new(base_path)?;
                if let Some(quota) = quota {
                    store = store.with_quota(quota);
                }
                Ok(Box::new(store))
            }
            "memory" => {
                let store = match quota {
                    Some(quota) => super::MemoryKeyValueStore::with_quota(quota),
                    None => super::MemoryKeyValueStore::new(),
                };
                Ok(Box::new(store))
            }
            unknown => Err(StorageError::Configuration(format!(
                "Unknown backend type: {}",
                unknown
            ))),
        }
    }
}
