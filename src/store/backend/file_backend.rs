//! File System Key/Value Store
//!
//! Default durable implementation: one file per key under a base directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::traits::{KeyValueStore, StorageError, StorageResult};

const TEMP_SUFFIX: &str = ".tmp";

/// File system key/value store
///
/// Each key is stored as a file named after the key. Writes go through a
/// temp file + rename so a failed write never leaves a truncated entry.
pub struct FileKeyValueStore {
    base_path: PathBuf,
    quota: Option<u64>,
}

impl FileKeyValueStore {
    /// Create a new file store
    ///
    /// # Arguments
    /// * `base_path` - Base directory for all entries
    pub fn new<P: AsRef<Path>>(base_path: P) -> StorageResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();

        // Create base directory if it doesn't exist (synchronously for constructor)
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            quota: None,
        })
    }

    /// Cap the total bytes held by the store
    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota = Some(quota_bytes);
        self
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a key to a full file path
    fn key_to_path(&self, key: &str) -> PathBuf {
        // Keys are flat; separators and parent references are neutralised
        let sanitized = key.replace("..", "_").replace(&['/', '\\'][..], "_");
        self.base_path.join(sanitized)
    }

    /// Sum of all entry sizes, excluding `skip`
    async fn usage_excluding(&self, skip: &Path) -> StorageResult<u64> {
        let mut total = 0;
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == skip || is_temp_file(&path) {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                total += metadata.len();
            }
        }

        Ok(total)
    }
}

fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(TEMP_SUFFIX))
        .unwrap_or(false)
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn is_available(&self) -> bool {
        fs::metadata(&self.base_path)
            .await
            .map(|m| m.is_dir() && !m.permissions().readonly())
            .unwrap_or(false)
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.key_to_path(key);

        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.key_to_path(key);

        if let Some(quota) = self.quota {
            let requested = self.usage_excluding(&path).await? + value.len() as u64;
            if requested > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    requested,
                    quota,
                });
            }
        }

        let mut temp_name = path.as_os_str().to_owned();
        temp_name.push(TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp_name);

        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(value.as_bytes()).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key);

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()), // Idempotent delete
            Err(e) => Err(e.into()),
        }
    }

    async fn keys(&self, prefix: Option<&str>) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_temp_file(&path) || !entry.file_type().await?.is_file() {
                continue;
            }
            let key = entry.file_name().to_string_lossy().to_string();
            if prefix.map(|p| key.starts_with(p)).unwrap_or(true) {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}
