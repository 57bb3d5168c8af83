//! File-backed object blob store for uploaded media.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::store::{StorageError, StorageResult};

const BLOB_EXTENSION: &str = "blob.json";

/// An uploaded media payload with its declared content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobRecord {
    /// Identifier referenced by the `media` collection
    pub id: String,
    /// Raw bytes, stored base64-encoded on disk
    #[serde(with = "base64_bytes")]
    pub payload: Vec<u8>,
    /// MIME type declared at upload time
    pub content_type: String,
    /// When this payload was written
    pub created_at: DateTime<Utc>,
}

impl BlobRecord {
    /// Render the payload as a `data:` URL usable directly as an image/audio/video source
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            BASE64.encode(&self.payload)
        )
    }

    /// Size of the payload in bytes
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

mod base64_bytes {
    use super::BASE64;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Object blob store
///
/// Kept apart from the key/value tier because media payloads are far larger
/// than collection documents. One file per blob under the base directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    base_path: PathBuf,
}

impl BlobStore {
    /// Create a blob store rooted at `base_path`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_path: P) -> StorageResult<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Get the base path
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn id_to_path(&self, id: &str) -> PathBuf {
        let sanitized = id.replace("..", "_").replace(&['/', '\\'][..], "_");
        self.base_path
            .join(format!("{}.{}", sanitized, BLOB_EXTENSION))
    }

    /// Store a blob, replacing any blob with the same id
    pub async fn put(
        &self,
        id: &str,
        payload: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<BlobRecord> {
        let record = BlobRecord {
            id: id.to_string(),
            payload,
            content_type: content_type.to_string(),
            created_at: Utc::now(),
        };
        let json =
            serde_json::to_vec(&record).map_err(|e| StorageError::Serialization(e.to_string()))?;

        let path = self.id_to_path(id);
        let temp_path = path.with_extension("tmp");

        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(record)
    }

    /// Fetch a blob by id
    pub async fn get(&self, id: &str) -> StorageResult<Option<BlobRecord>> {
        let path = self.id_to_path(id);

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| StorageError::Deserialization(e.to_string()))
    }

    /// All stored blobs, oldest first. Unreadable entries are skipped.
    pub async fn get_all(&self) -> StorageResult<Vec<BlobRecord>> {
        let mut records = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;
        let suffix = format!(".{}", BLOB_EXTENSION);

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !name.ends_with(&suffix) {
                continue;
            }

            let parsed = fs::read(entry.path())
                .await
                .map_err(StorageError::from)
                .and_then(|data| {
                    serde_json::from_slice::<BlobRecord>(&data)
                        .map_err(|e| StorageError::Deserialization(e.to_string()))
                });

            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable blob {}: {}", name, e),
            }
        }

        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Delete a blob. Deleting an unknown id is a no-op.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        match fs::remove_file(self.id_to_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(temp_dir.path()).unwrap();

        blobs
            .put("1718000000000", vec![0xff, 0xd8, 0xff], "image/jpeg")
            .await
            .unwrap();

        let record = blobs.get("1718000000000").await.unwrap().unwrap();
        assert_eq!(record.payload, vec![0xff, 0xd8, 0xff]);
        assert_eq!(record.content_type, "image/jpeg");
        assert_eq!(record.size(), 3);

        blobs.delete("1718000000000").await.unwrap();
        assert!(blobs.get("1718000000000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_put_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(temp_dir.path()).unwrap();

        // A directory in place of the blob file makes the final rename fail
        std::fs::create_dir(temp_dir.path().join("clip.blob.json")).unwrap();

        assert!(blobs.put("clip", b"data".to_vec(), "audio/mpeg").await.is_err());
        assert!(!temp_dir.path().join("clip.blob.tmp").exists());
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_id() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(temp_dir.path()).unwrap();

        blobs.put("a", b"first".to_vec(), "text/plain").await.unwrap();
        blobs.put("a", b"second".to_vec(), "audio/mpeg").await.unwrap();

        let record = blobs.get("a").await.unwrap().unwrap();
        assert_eq!(record.payload, b"second".to_vec());
        assert_eq!(record.content_type, "audio/mpeg");
        assert_eq!(blobs.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(temp_dir.path()).unwrap();

        blobs.delete("never-stored").await.unwrap();

        blobs.put("x", vec![1], "image/png").await.unwrap();
        blobs.delete("x").await.unwrap();
        blobs.delete("x").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_all_skips_corrupt_entries() {
        let temp_dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(temp_dir.path()).unwrap();

        blobs.put("good", vec![1, 2], "image/png").await.unwrap();
        std::fs::write(temp_dir.path().join("bad.blob.json"), b"{oops").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"ignored").unwrap();

        let all = blobs.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "good");
    }

    #[test]
    fn test_data_url() {
        let record = BlobRecord {
            id: "m".to_string(),
            payload: b"hi".to_vec(),
            content_type: "text/plain".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(record.data_url(), "data:text/plain;base64,aGk=");
    }

    #[test]
    fn test_record_serializes_payload_as_base64() {
        let record = BlobRecord {
            id: "m".to_string(),
            payload: b"hi".to_vec(),
            content_type: "text/plain".to_string(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["payload"], "aGk=");
    }
}
