//! The data manager façade.
//!
//! Reads go remote-first and fall back to the local tier; writes land in the
//! local tier synchronously and are pushed to the active remote backend on a
//! spawned task.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::collection::{Collection, Mode, Record, MODE_KEY};
use super::demo;
use super::errors::{DataError, DataResult};
use super::sync::{PendingSync, SyncStatus};
use crate::adapters::{AdapterFactory, BackendAdapter, BackendCredentials, CredentialStore};
use crate::blob::{BlobRecord, BlobStore};
use crate::config::{BackendsConfig, ConfigurationLoader};
use crate::observability::Logger;
use crate::store::{KeyValueStore, StoreBuilder};

/// Settings the manager is constructed with
#[derive(Debug, Clone)]
pub struct DataManagerConfig {
    /// Start in this mode instead of the persisted one
    pub initial_mode: Option<Mode>,
    /// Mode used when none was ever persisted
    pub default_mode: Mode,
    /// UX pacing delay applied in local mode
    pub latency: Duration,
    /// Endpoint settings for adapters built from stored credentials
    pub backends: BackendsConfig,
    /// Build adapters for credentials already in the local store
    pub load_stored_credentials: bool,
}

impl Default for DataManagerConfig {
    fn default() -> Self {
        Self {
            initial_mode: None,
            default_mode: Mode::Local,
            latency: Duration::from_millis(600),
            backends: BackendsConfig::default(),
            load_stored_credentials: true,
        }
    }
}

impl DataManagerConfig {
    /// Derive manager settings from a configuration file
    pub fn from_loader(loader: &ConfigurationLoader) -> DataResult<Self> {
        Ok(Self {
            initial_mode: None,
            default_mode: loader
                .default_mode()
                .map_err(|e| DataError::config(format!("{:#}", e)))?,
            latency: loader.latency(),
            backends: loader.config.backends.clone(),
            load_stored_credentials: true,
        })
    }

    /// Override the local-mode delay
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Start in `mode` regardless of what is persisted
    pub fn with_initial_mode(mut self, mode: Mode) -> Self {
        self.initial_mode = Some(mode);
        self
    }
}

/// A media file handed to [`DataManager::save_media`]
#[derive(Debug, Clone)]
pub struct MediaUpload {
    /// Raw file contents
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/jpeg`
    pub content_type: String,
}

impl MediaUpload {
    /// Wrap file contents and their MIME type
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }
}

/// Reference to a stored media file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMedia {
    /// Blob id to put in the `media` collection
    pub id: String,
    /// `data:` URL of the payload
    pub url: String,
}

/// Builder for [`DataManager`]
pub struct DataManagerBuilder {
    store: Arc<dyn KeyValueStore>,
    blobs: BlobStore,
    config: DataManagerConfig,
    adapters: Vec<Arc<dyn BackendAdapter>>,
    journal: Option<Arc<Logger>>,
}

impl DataManagerBuilder {
    /// Use these settings
    pub fn with_config(mut self, config: DataManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Install an adapter, replacing any built from stored credentials
    pub fn with_adapter(mut self, adapter: Arc<dyn BackendAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Keep a markdown journal of seeding, fallbacks and sync outcomes
    pub fn with_journal(mut self, journal: Arc<Logger>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Resolve the active mode, load adapters and connect the active one
    pub async fn build(self) -> DataManager {
        let credentials = CredentialStore::new(self.store.clone());

        let mut adapters: HashMap<Mode, Arc<dyn BackendAdapter>> = HashMap::new();
        if self.config.load_stored_credentials {
            for adapter in AdapterFactory::load_all(&credentials, &self.config.backends).await {
                adapters.insert(adapter.mode(), adapter);
            }
        }
        for adapter in self.adapters {
            if adapter.mode().is_remote() {
                adapters.insert(adapter.mode(), adapter);
            }
        }

        let mode = match self.config.initial_mode {
            Some(mode) => mode,
            None => persisted_mode(self.store.as_ref())
                .await
                .unwrap_or(self.config.default_mode),
        };

        if let Some(adapter) = adapters.get(&mode) {
            if let Err(e) = adapter.connect().await {
                warn!("Could not connect {} backend: {}", mode, e);
            }
        }

        write_journal(self.journal.as_deref(), |j| {
            j.log_manager_start(mode, self.blobs.base_path())
        });
        info!("Data manager ready in {} mode", mode);

        DataManager {
            store: self.store,
            blobs: self.blobs,
            credentials,
            adapters: RwLock::new(adapters),
            mode: RwLock::new(mode),
            latency: self.config.latency,
            backends: self.config.backends,
            journal: self.journal,
        }
    }
}

async fn persisted_mode(store: &dyn KeyValueStore) -> Option<Mode> {
    match store.get(MODE_KEY).await {
        Ok(Some(value)) => match value.parse::<Mode>() {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!("Ignoring persisted mode: {}", e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Could not read persisted mode: {}", e);
            None
        }
    }
}

fn write_journal(journal: Option<&Logger>, write: impl FnOnce(&Logger) -> anyhow::Result<()>) {
    if let Some(journal) = journal {
        if let Err(e) = write(journal) {
            warn!("Failed to write sync journal: {:#}", e);
        }
    }
}

/// Single entry point for reading and writing collections.
///
/// The active mode decides which remote backend, if any, is authoritative.
/// The local store always holds a primary and a cache-shadow copy of every
/// collection that has been read or written.
pub struct DataManager {
    store: Arc<dyn KeyValueStore>,
    blobs: BlobStore,
    credentials: CredentialStore,
    adapters: RwLock<HashMap<Mode, Arc<dyn BackendAdapter>>>,
    mode: RwLock<Mode>,
    latency: Duration,
    backends: BackendsConfig,
    journal: Option<Arc<Logger>>,
}

impl DataManager {
    /// Start building a manager over a local store and a blob store
    pub fn builder(store: Arc<dyn KeyValueStore>, blobs: BlobStore) -> DataManagerBuilder {
        DataManagerBuilder {
            store,
            blobs,
            config: DataManagerConfig::default(),
            adapters: Vec::new(),
            journal: None,
        }
    }

    /// Open the file-backed stores and journal described by a configuration
    pub async fn open(loader: &ConfigurationLoader) -> DataResult<Self> {
        let mut store = StoreBuilder::new("file").with_base_path(loader.store_dir());
        if let Some(quota) = loader.config.store.quota_bytes {
            store = store.with_quota(quota);
        }
        let store: Arc<dyn KeyValueStore> = Arc::from(store.build()?);
        let blobs = BlobStore::new(loader.media_dir())?;

        let mut builder = Self::builder(store, blobs).with_config(DataManagerConfig::from_loader(loader)?);
        if let Some(log_file) = &loader.config.logging.log_file {
            let journal = Logger::new(
                Some(Path::new(log_file)),
                Some(&loader.config.logging.log_level),
            )
            .map_err(|e| DataError::config(format!("{:#}", e)))?;
            builder = builder.with_journal(Arc::new(journal));
        }

        Ok(builder.build().await)
    }

    /// Currently active mode
    pub async fn get_mode(&self) -> Mode {
        *self.mode.read().await
    }

    /// Persist and activate a mode.
    ///
    /// The outgoing backend is disconnected and the incoming one connected.
    /// A failed connect is logged; reads then fall back to the local tier.
    pub async fn set_mode(&self, mode: Mode) -> DataResult<()> {
        self.store.set(MODE_KEY, mode.as_str()).await?;

        let old = self.get_mode().await;
        if old == mode {
            return Ok(());
        }

        if let Some(adapter) = self.adapter(old).await {
            adapter.disconnect().await;
        }
        if let Some(adapter) = self.adapter(mode).await {
            if let Err(e) = adapter.connect().await {
                warn!("Could not connect {} backend: {}", mode, e);
                write_journal(self.journal.as_deref(), |j| {
                    j.log_error(&e.to_string(), Some("connect"))
                });
            }
        }

        *self.mode.write().await = mode;
        write_journal(self.journal.as_deref(), |j| j.log_mode_change(old, mode));
        info!("Mode changed from {} to {}", old, mode);
        Ok(())
    }

    /// Whether a backend can be used: local always, remote with complete credentials
    pub async fn is_connected(&self, mode: Mode) -> bool {
        if !mode.is_remote() {
            return true;
        }
        self.adapter(mode)
            .await
            .map(|a| a.is_configured())
            .unwrap_or(false)
    }

    /// Install an adapter for its mode, replacing the previous one
    pub async fn install_adapter(&self, adapter: Arc<dyn BackendAdapter>) {
        let mode = adapter.mode();
        if !mode.is_remote() {
            warn!("Ignoring adapter for {} mode", mode);
            return;
        }

        let active = self.get_mode().await == mode;
        let previous = self.adapters.write().await.insert(mode, adapter.clone());

        if active {
            if let Some(previous) = previous {
                previous.disconnect().await;
            }
            if let Err(e) = adapter.connect().await {
                warn!("Could not connect {} backend: {}", mode, e);
            }
        }
    }

    /// Validate credentials and, when the backend answers, store them and
    /// install its adapter. Returns whether the backend is now connected.
    pub async fn connect_backend(&self, credentials: BackendCredentials) -> DataResult<bool> {
        let mode = credentials.mode();

        #[cfg(feature = "remote")]
        let credentials = match credentials {
            BackendCredentials::Drive(drive) if drive.folders.is_none() => {
                let adapter = crate::adapters::DriveAdapter::new(
                    drive,
                    self.backends.drive.clone(),
                    self.backends.request_timeout_seconds,
                )?;
                if !adapter.validate_connection().await {
                    warn!("Drive rejected the access token");
                    return Ok(false);
                }
                adapter.initialize_structure().await?;
                BackendCredentials::Drive(adapter.credentials())
            }
            other => other,
        };

        if !credentials.is_complete() {
            return Err(DataError::IncompleteCredentials { mode });
        }

        let adapter = AdapterFactory::create(&credentials, &self.backends)?;
        if !adapter.validate_connection().await {
            warn!("Could not validate {} credentials", mode);
            return Ok(false);
        }

        self.credentials.save(&credentials).await?;
        self.install_adapter(adapter).await;
        info!("Connected {} backend", mode);
        Ok(true)
    }

    /// Forget a backend's credentials and adapter.
    ///
    /// Disconnecting the active backend switches back to local mode.
    pub async fn disconnect_backend(&self, mode: Mode) -> DataResult<()> {
        if !mode.is_remote() {
            return Ok(());
        }

        if self.get_mode().await == mode {
            self.set_mode(Mode::Local).await?;
        } else if let Some(adapter) = self.adapter(mode).await {
            adapter.disconnect().await;
        }

        self.adapters.write().await.remove(&mode);
        self.credentials.remove(mode).await?;
        info!("Disconnected {} backend", mode);
        Ok(())
    }

    async fn adapter(&self, mode: Mode) -> Option<Arc<dyn BackendAdapter>> {
        if !mode.is_remote() {
            return None;
        }
        self.adapters.read().await.get(&mode).cloned()
    }

    /// Adapter of the active mode when it has complete credentials
    async fn active_adapter(&self, mode: Mode) -> Option<Arc<dyn BackendAdapter>> {
        self.adapter(mode).await.filter(|a| a.is_configured())
    }

    async fn delay(&self, mode: Mode) {
        if mode == Mode::Local && !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    /// Read a collection.
    ///
    /// Order: active remote backend (refreshing the cache shadow), then the
    /// primary local entry, then the cache shadow, then the demo dataset,
    /// which is persisted through the save path. Always yields a vector; it is
    /// empty when the demo dataset could not be stored locally.
    pub async fn get_all(&self, collection: Collection) -> Vec<Record> {
        let mode = self.get_mode().await;
        self.delay(mode).await;

        if let Some(adapter) = self.active_adapter(mode).await {
            match adapter.fetch_collection(collection).await {
                Ok(records) => {
                    self.refresh_cache(collection, &records).await;
                    debug!("Read {} records of {} from {}", records.len(), collection, mode);
                    return records;
                }
                Err(e) => {
                    warn!("{} fetch failed for {}, using cache: {}", mode, collection, e);
                    write_journal(self.journal.as_deref(), |j| {
                        j.log_fetch_fallback(collection, mode, &e.to_string())
                    });
                }
            }
        }

        if let Some(records) = self.read_local(collection).await {
            return records;
        }

        let seed = demo::seed_for(collection);
        info!("Seeding initial demo data for {}", collection);
        write_journal(self.journal.as_deref(), |j| j.log_seed(collection, seed.len()));

        match self.persist(collection, &seed).await {
            Ok(_) => seed,
            Err(e) => {
                error!("Failed to persist demo data for {}: {}", collection, e);
                write_journal(self.journal.as_deref(), |j| {
                    j.log_error(&e.to_string(), Some(&format!("seeding {}", collection)))
                });
                Vec::new()
            }
        }
    }

    async fn refresh_cache(&self, collection: Collection, records: &[Record]) {
        let written = match serde_json::to_string(records) {
            Ok(json) => self.store.set(&collection.cache_key(), &json).await.map_err(DataError::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = written {
            warn!("Could not refresh cache of {}: {}", collection, e);
        }
    }

    /// Primary entry, then cache shadow. Missing, unreadable and non-array
    /// entries are all misses.
    async fn read_local(&self, collection: Collection) -> Option<Vec<Record>> {
        for key in [collection.primary_key(), collection.cache_key()] {
            let raw = match self.store.get(&key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Could not read {}: {}", key, e);
                    continue;
                }
            };

            match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Array(records)) => {
                    debug!("Cache hit for {} ({})", collection, key);
                    return Some(records);
                }
                Ok(_) => error!("Ignoring {}: not an array", key),
                Err(e) => error!("Ignoring corrupt entry {}: {}", key, e),
            }
        }
        None
    }

    /// Replace a collection, pacing the call in local mode
    pub async fn save(&self, collection: Collection, records: &[Record]) -> DataResult<PendingSync> {
        self.save_with_delay(collection, records, true).await
    }

    /// Replace a collection, optionally skipping the local-mode pacing
    pub async fn save_with_delay(
        &self,
        collection: Collection,
        records: &[Record],
        with_delay: bool,
    ) -> DataResult<PendingSync> {
        if with_delay {
            self.delay(self.get_mode().await).await;
        }
        self.persist(collection, records).await
    }

    /// Write both local entries, then start the remote push.
    ///
    /// When the cache write fails the primary entry is restored, so a failed
    /// save leaves the local tier as it was.
    async fn persist(&self, collection: Collection, records: &[Record]) -> DataResult<PendingSync> {
        let json = serde_json::to_string(records)?;
        let primary = collection.primary_key();

        // None when the current value could not be read; it is then not restored
        let previous = match self.store.get(&primary).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Could not read {} before saving: {}", primary, e);
                None
            }
        };
        self.store.set(&primary, &json).await?;

        if let Err(e) = self.store.set(&collection.cache_key(), &json).await {
            let restored = match &previous {
                Some(Some(value)) => self.store.set(&primary, value).await,
                Some(None) => self.store.remove(&primary).await,
                None => {
                    warn!("Keeping new {}: previous value unknown", primary);
                    Ok(())
                }
            };
            if let Err(rollback) = restored {
                error!("Could not restore {} after failed save: {}", primary, rollback);
            }
            write_journal(self.journal.as_deref(), |j| {
                j.log_error(&e.to_string(), Some(&format!("saving {}", collection)))
            });
            return Err(e.into());
        }

        let mode = self.get_mode().await;
        let Some(adapter) = self.active_adapter(mode).await else {
            return Ok(PendingSync::cached_only());
        };

        let records = records.to_vec();
        let journal = self.journal.clone();
        let task = tokio::spawn(async move {
            let status = match adapter.save_collection(collection, &records).await {
                Ok(()) => {
                    info!("Synced {} to {}", collection, mode);
                    SyncStatus::Synced { backend: mode }
                }
                Err(e) => {
                    error!("Failed to sync {} to {}: {}", collection, mode, e);
                    SyncStatus::Failed {
                        backend: mode,
                        reason: e.to_string(),
                    }
                }
            };
            write_journal(journal.as_deref(), |j| j.log_sync(collection, &status));
            status
        });

        Ok(PendingSync::spawned(mode, task))
    }

    /// Store an uploaded media file
    pub async fn save_media(&self, upload: MediaUpload) -> DataResult<SavedMedia> {
        let id = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        let record = self
            .blobs
            .put(&id, upload.bytes, &upload.content_type)
            .await
            .map_err(|e| DataError::blob(format!("storing {}: {}", id, e)))?;
        debug!("Stored media {} ({} bytes)", id, record.size());

        Ok(SavedMedia {
            url: record.data_url(),
            id,
        })
    }

    /// Delete a stored media file. Unknown ids are ignored.
    pub async fn delete_media_file(&self, id: &str) -> DataResult<()> {
        self.blobs
            .delete(id)
            .await
            .map_err(|e| DataError::blob(format!("deleting {}: {}", id, e)))
    }

    /// Every stored media file, paced in local mode
    pub async fn get_media_list(&self) -> DataResult<Vec<BlobRecord>> {
        self.delay(self.get_mode().await).await;
        self.blobs
            .get_all()
            .await
            .map_err(|e| DataError::blob(format!("listing media: {}", e)))
    }

    /// One stored media file
    pub async fn get_media(&self, id: &str) -> DataResult<Option<BlobRecord>> {
        self.blobs
            .get(id)
            .await
            .map_err(|e| DataError::blob(format!("reading {}: {}", id, e)))
    }

    /// Drop a record from the `media` collection, then its blob.
    ///
    /// A failed blob delete is logged and does not undo the record removal.
    pub async fn remove_media_item(&self, id: &str) -> DataResult<PendingSync> {
        let mut records = self.get_all(Collection::Media).await;
        records.retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        let pending = self.save(Collection::Media, &records).await?;

        if let Err(e) = self.blobs.delete(id).await {
            warn!("Could not delete media file {}: {}", id, e);
        }
        Ok(pending)
    }

    /// Value of a settings record, e.g. `daily_abhang`
    pub async fn get_setting(&self, id: &str) -> Option<Value> {
        self.get_all(Collection::Settings)
            .await
            .into_iter()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .and_then(|mut r| r.get_mut("value").map(Value::take))
    }

    /// Insert or replace a settings record
    pub async fn update_setting(&self, id: &str, value: Value) -> DataResult<PendingSync> {
        let mut records = self.get_all(Collection::Settings).await;
        let entry = json!({ "id": id, "value": value });

        match records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
        {
            Some(existing) => *existing = entry,
            None => records.push(entry),
        }
        self.save(Collection::Settings, &records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{CACHE_KEY_PREFIX, PRIMARY_KEY_PREFIX};
    use crate::store::{MemoryKeyValueStore, StorageError, StorageResult};
    use crate::test_utils::MockAdapter;
    use tempfile::TempDir;

    async fn manager(store: Arc<MemoryKeyValueStore>) -> (DataManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let blobs = BlobStore::new(temp_dir.path()).unwrap();
        let manager = DataManager::builder(store, blobs)
            .with_config(DataManagerConfig::default().with_latency(Duration::ZERO))
            .build()
            .await;
        (manager, temp_dir)
    }

    #[tokio::test]
    async fn test_persisted_mode_is_loaded() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(MODE_KEY, "github").await.unwrap();

        let (manager, _dir) = manager(store).await;
        assert_eq!(manager.get_mode().await, Mode::GitHub);
        assert!(!manager.is_connected(Mode::GitHub).await);
        assert!(manager.is_connected(Mode::Local).await);
    }

    #[tokio::test]
    async fn test_garbage_mode_falls_back_to_default() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set(MODE_KEY, "floppy").await.unwrap();

        let (manager, _dir) = manager(store).await;
        assert_eq!(manager.get_mode().await, Mode::Local);
    }

    #[tokio::test]
    async fn test_non_array_primary_falls_through_to_cache() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set("santseva_blogs", r#"{"id":"b1"}"#).await.unwrap();
        store.set("cache_blogs", r#"[{"id":"cached"}]"#).await.unwrap();

        let (manager, _dir) = manager(store).await;
        let blogs = manager.get_all(Collection::Blogs).await;
        assert_eq!(blogs, vec![json!({"id": "cached"})]);
    }

    #[tokio::test]
    async fn test_empty_local_array_is_not_reseeded() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set("santseva_events", "[]").await.unwrap();

        let (manager, _dir) = manager(store).await;
        assert!(manager.get_all(Collection::Events).await.is_empty());
    }

    #[tokio::test]
    async fn test_unstorable_seed_reads_as_empty() {
        let store = Arc::new(MemoryKeyValueStore::new());
        store.set_writes_disabled(true);

        let (manager, _dir) = manager(store.clone()).await;
        let events = manager.get_all(Collection::Events).await;
        assert!(events.is_empty());
        assert!(store.get("santseva_events").await.unwrap().is_none());

        // Once storage recovers the next read seeds normally
        store.set_writes_disabled(false);
        assert_eq!(manager.get_all(Collection::Events).await.len(), 4);
    }

    /// Memory store whose reads of primary entries and writes of cache
    /// entries fail
    struct UnreadablePrimaryStore {
        inner: MemoryKeyValueStore,
    }

    #[async_trait::async_trait]
    impl KeyValueStore for UnreadablePrimaryStore {
        fn backend_type(&self) -> &'static str {
            "unreadable-primary"
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn get(&self, key: &str) -> StorageResult<Option<String>> {
            if key.starts_with(PRIMARY_KEY_PREFIX) {
                return Err(StorageError::Backend(format!("cannot read {}", key)));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if key.starts_with(CACHE_KEY_PREFIX) {
                return Err(StorageError::Backend(format!("cannot write {}", key)));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> StorageResult<()> {
            self.inner.remove(key).await
        }

        async fn keys(&self, prefix: Option<&str>) -> StorageResult<Vec<String>> {
            self.inner.keys(prefix).await
        }
    }

    #[tokio::test]
    async fn test_failed_save_keeps_primary_when_previous_is_unreadable() {
        let inner = MemoryKeyValueStore::new();
        inner.set("santseva_blogs", r#"[{"id":"b1"}]"#).await.unwrap();
        let store = Arc::new(UnreadablePrimaryStore { inner });

        let temp_dir = TempDir::new().unwrap();
        let manager = DataManager::builder(store.clone(), BlobStore::new(temp_dir.path()).unwrap())
            .with_config(DataManagerConfig::default().with_latency(Duration::ZERO))
            .build()
            .await;

        let err = manager
            .save(Collection::Blogs, &[json!({"id": "b2"})])
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Storage(_)));

        let primary = store.inner.get("santseva_blogs").await.unwrap();
        assert_eq!(primary.as_deref(), Some(r#"[{"id":"b2"}]"#));
    }

    #[tokio::test]
    async fn test_install_adapter_ignores_local() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (manager, _dir) = manager(store).await;

        manager
            .install_adapter(Arc::new(MockAdapter::new(Mode::Local)))
            .await;
        assert!(manager.adapter(Mode::Local).await.is_none());
    }

    #[tokio::test]
    async fn test_settings_helpers() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (manager, _dir) = manager(store).await;

        let abhang = manager.get_setting(demo::DAILY_ABHANG_ID).await.unwrap();
        assert_eq!(abhang["id"], "daily_1");

        manager
            .update_setting("site_title", json!("संत सेवा"))
            .await
            .unwrap();
        manager
            .update_setting(demo::DAILY_ABHANG_ID, json!({"id": "daily_2"}))
            .await
            .unwrap();

        let settings = manager.get_all(Collection::Settings).await;
        assert_eq!(settings.len(), 2);
        assert_eq!(manager.get_setting("site_title").await, Some(json!("संत सेवा")));
        assert_eq!(
            manager.get_setting(demo::DAILY_ABHANG_ID).await.unwrap()["id"],
            "daily_2"
        );
        assert_eq!(manager.get_setting("missing").await, None);
    }

    #[tokio::test]
    async fn test_media_round_trip() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (manager, _dir) = manager(store).await;

        let saved = manager
            .save_media(MediaUpload::new(vec![1u8, 2, 3], "image/png"))
            .await
            .unwrap();
        assert_eq!(saved.url, "data:image/png;base64,AQID");

        let media = manager.get_media(&saved.id).await.unwrap().unwrap();
        assert_eq!(media.payload, vec![1, 2, 3]);
        assert_eq!(manager.get_media_list().await.unwrap().len(), 1);

        manager.delete_media_file(&saved.id).await.unwrap();
        assert!(manager.get_media(&saved.id).await.unwrap().is_none());
        manager.delete_media_file(&saved.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_media_failures_are_blob_errors() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (manager, dir) = manager(store).await;
        std::fs::remove_dir_all(dir.path()).unwrap();

        let err = manager
            .save_media(MediaUpload::new(vec![1u8], "image/png"))
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::Blob { .. }));
        assert!(err.to_string().starts_with("Media storage error: storing "));
    }

    #[tokio::test]
    async fn test_remove_media_item() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let (manager, _dir) = manager(store).await;

        let saved = manager
            .save_media(MediaUpload::new(b"RIFF".to_vec(), "audio/wav"))
            .await
            .unwrap();
        let mut media = manager.get_all(Collection::Media).await;
        media.push(json!({"id": saved.id, "type": "audio", "title": "हरिपाठ", "url": saved.url}));
        manager.save(Collection::Media, &media).await.unwrap();

        manager.remove_media_item(&saved.id).await.unwrap();

        let media = manager.get_all(Collection::Media).await;
        assert_eq!(media.len(), 5);
        assert!(manager.get_media(&saved.id).await.unwrap().is_none());
    }
}
