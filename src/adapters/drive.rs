//! Google Drive v3 adapter.
//!
//! Collections are `<collection>.json` files inside an app-owned folder tree:
//!
//! ```text
//! <root>/
//!   <public>/    world-readable collections
//!   <media>/     world-readable media
//!   <private>/   inquiries, subscribers
//! ```
//!
//! The tree is found or created by [`DriveAdapter::initialize_structure`],
//! which also runs from `connect` when the credentials carry no folder ids.

use std::sync::RwLock;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use super::credentials::{DriveCredentials, DriveFolders};
use super::http::{build_client, decode_error, ensure_success, transport_error};
use super::traits::{AdapterError, AdapterResult, BackendAdapter};
use crate::config::DriveSettings;
use crate::data::{Collection, Mode, Record, Visibility};

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const JSON_MIME: &str = "application/json";
const BOUNDARY: &str = "santseva_multipart_boundary";

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    id: String,
}

/// Cloud document backend
pub struct DriveAdapter {
    access_token: String,
    folders: RwLock<Option<DriveFolders>>,
    settings: DriveSettings,
    client: Client,
}

impl DriveAdapter {
    /// Create an adapter with injected credentials
    pub fn new(
        credentials: DriveCredentials,
        settings: DriveSettings,
        timeout_seconds: u64,
    ) -> AdapterResult<Self> {
        Ok(Self {
            access_token: credentials.access_token,
            folders: RwLock::new(credentials.folders),
            settings,
            client: build_client(Mode::Drive, timeout_seconds)?,
        })
    }

    /// Folder tree currently in use
    pub fn folders(&self) -> Option<DriveFolders> {
        self.folders.read().ok().and_then(|f| f.clone())
    }

    /// Credentials including any folder tree discovered since construction
    pub fn credentials(&self) -> DriveCredentials {
        DriveCredentials {
            access_token: self.access_token.clone(),
            folders: self.folders(),
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{}", self.settings.api_base.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.access_token)
    }

    fn folder_for(&self, collection: Collection) -> AdapterResult<String> {
        let folders = self.folders().ok_or_else(|| AdapterError::NotConfigured {
            backend: Mode::Drive,
            message: "Drive structure not initialized".to_string(),
        })?;
        Ok(match collection.visibility() {
            Visibility::Public => folders.public_folder_id,
            Visibility::Private => folders.private_folder_id,
        })
    }

    async fn find_file(
        &self,
        name: &str,
        parent: Option<&str>,
        mime_type: &str,
    ) -> AdapterResult<Option<String>> {
        let query = file_query(name, parent, mime_type);
        let response = self
            .authorized(self.client.get(self.api("/drive/v3/files")))
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name)"),
                ("spaces", "drive"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(Mode::Drive, e))?;
        let response = ensure_success(Mode::Drive, response).await?;

        let list = response
            .json::<FileList>()
            .await
            .map_err(|e| decode_error(Mode::Drive, e))?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_folder(&self, name: &str, parent: Option<&str>) -> AdapterResult<String> {
        let mut metadata = json!({ "name": name, "mimeType": FOLDER_MIME });
        if let Some(parent) = parent {
            metadata["parents"] = json!([parent]);
        }

        let response = self
            .authorized(self.client.post(self.api("/drive/v3/files")))
            .query(&[("fields", "id")])
            .json(&metadata)
            .send()
            .await
            .map_err(|e| transport_error(Mode::Drive, e))?;
        let response = ensure_success(Mode::Drive, response).await?;

        let created = response
            .json::<FileEntry>()
            .await
            .map_err(|e| decode_error(Mode::Drive, e))?;
        info!("Created Drive folder {} ({})", name, created.id);
        Ok(created.id)
    }

    async fn share_publicly(&self, file_id: &str) -> AdapterResult<()> {
        let response = self
            .authorized(
                self.client
                    .post(self.api(&format!("/drive/v3/files/{}/permissions", file_id))),
            )
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| transport_error(Mode::Drive, e))?;
        ensure_success(Mode::Drive, response).await?;
        Ok(())
    }

    async fn ensure_folder(&self, name: &str, parent: Option<&str>, public: bool) -> AdapterResult<String> {
        if let Some(id) = self.find_file(name, parent, FOLDER_MIME).await? {
            return Ok(id);
        }
        let id = self.create_folder(name, parent).await?;
        if public {
            self.share_publicly(&id).await?;
        }
        Ok(id)
    }

    /// Find or create the folder tree and start using it.
    ///
    /// Newly created public and media folders are shared as anyone-reader;
    /// the private folder never is. Existing folders keep their permissions.
    pub async fn initialize_structure(&self) -> AdapterResult<DriveFolders> {
        if self.access_token.trim().is_empty() {
            return Err(AdapterError::NotConfigured {
                backend: Mode::Drive,
                message: "an access token is required".to_string(),
            });
        }

        let s = &self.settings;
        let root = self.ensure_folder(&s.root_folder_name, None, false).await?;
        let public = self
            .ensure_folder(&s.public_folder_name, Some(&root), true)
            .await?;
        let media = self
            .ensure_folder(&s.media_folder_name, Some(&root), true)
            .await?;
        let private = self
            .ensure_folder(&s.private_folder_name, Some(&root), false)
            .await?;

        let folders = DriveFolders {
            root_folder_id: root,
            public_folder_id: public,
            media_folder_id: media,
            private_folder_id: private,
        };
        if let Ok(mut slot) = self.folders.write() {
            *slot = Some(folders.clone());
        }
        Ok(folders)
    }
}

/// Drive search expression for a non-trashed file
pub fn file_query(name: &str, parent: Option<&str>, mime_type: &str) -> String {
    let escape = |s: &str| s.replace('\\', "\\\\").replace('\'', "\\'");
    let mut query = format!("name = '{}' and trashed = false", escape(name));
    if let Some(parent) = parent {
        query.push_str(&format!(" and '{}' in parents", escape(parent)));
    }
    query.push_str(&format!(" and mimeType = '{}'", mime_type));
    query
}

/// `multipart/related` upload body: JSON metadata part, then JSON content part
pub fn multipart_body(metadata: &Value, content: &str) -> String {
    format!(
        "\r\n--{b}\r\nContent-Type: {m}\r\n\r\n{meta}\r\n--{b}\r\nContent-Type: {m}\r\n\r\n{content}\r\n--{b}--",
        b = BOUNDARY,
        m = JSON_MIME,
        meta = metadata,
        content = content,
    )
}

#[async_trait]
impl BackendAdapter for DriveAdapter {
    fn mode(&self) -> Mode {
        Mode::Drive
    }

    fn is_configured(&self) -> bool {
        self.credentials().is_complete()
    }

    async fn connect(&self) -> AdapterResult<()> {
        if self.folders().is_none() {
            self.initialize_structure().await?;
        }
        Ok(())
    }

    async fn validate_connection(&self) -> bool {
        if self.access_token.trim().is_empty() {
            return false;
        }

        let request = self
            .authorized(self.client.get(self.api("/drive/v3/about")))
            .query(&[("fields", "user")]);
        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("Drive validation failed: {}", e);
                false
            }
        }
    }

    async fn fetch_collection(&self, collection: Collection) -> AdapterResult<Vec<Record>> {
        let folder = self.folder_for(collection)?;
        let Some(file_id) = self
            .find_file(&collection.file_name(), Some(&folder), JSON_MIME)
            .await?
        else {
            debug!("{} has no file on Drive yet", collection);
            return Ok(Vec::new());
        };

        let response = self
            .authorized(self.client.get(self.api(&format!("/drive/v3/files/{}", file_id))))
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| transport_error(Mode::Drive, e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = ensure_success(Mode::Drive, response).await?;

        response
            .json::<Vec<Record>>()
            .await
            .map_err(|e| decode_error(Mode::Drive, e))
    }

    async fn save_collection(&self, collection: Collection, records: &[Record]) -> AdapterResult<()> {
        let folder = self.folder_for(collection)?;
        let file_name = collection.file_name();
        let existing = self.find_file(&file_name, Some(&folder), JSON_MIME).await?;

        let mut metadata = json!({ "name": file_name, "mimeType": JSON_MIME });
        if existing.is_none() {
            metadata["parents"] = json!([folder]);
        }
        let content = serde_json::to_string(records).map_err(|e| decode_error(Mode::Drive, e))?;
        let body = multipart_body(&metadata, &content);

        let request = match &existing {
            Some(id) => self
                .client
                .patch(self.api(&format!("/upload/drive/v3/files/{}", id))),
            None => self.client.post(self.api("/upload/drive/v3/files")),
        };
        let response = self
            .authorized(request)
            .query(&[("uploadType", "multipart")])
            .header(
                "Content-Type",
                format!("multipart/related; boundary={}", BOUNDARY),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| transport_error(Mode::Drive, e))?;
        ensure_success(Mode::Drive, response).await?;

        debug!("Uploaded {} records to {}", records.len(), file_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::serve_stub;
    use axum::extract::Path;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn folders() -> DriveFolders {
        DriveFolders {
            root_folder_id: "root".to_string(),
            public_folder_id: "pub".to_string(),
            media_folder_id: "media".to_string(),
            private_folder_id: "priv".to_string(),
        }
    }

    fn adapter(api_base: &str, with_folders: bool) -> DriveAdapter {
        let mut credentials = DriveCredentials::new("ya29.token");
        if with_folders {
            credentials = credentials.with_folders(folders());
        }
        let settings = DriveSettings {
            api_base: api_base.to_string(),
            ..DriveSettings::default()
        };
        DriveAdapter::new(credentials, settings, 2).unwrap()
    }

    #[test]
    fn test_private_collections_use_private_folder() {
        let adapter = adapter("https://www.googleapis.com", true);
        assert_eq!(adapter.folder_for(Collection::Inquiries).unwrap(), "priv");
        assert_eq!(adapter.folder_for(Collection::Subscribers).unwrap(), "priv");
        assert_eq!(adapter.folder_for(Collection::Events).unwrap(), "pub");
    }

    #[test]
    fn test_uninitialized_structure() {
        let adapter = adapter("https://www.googleapis.com", false);
        assert!(!adapter.is_configured());
        assert!(matches!(
            adapter.folder_for(Collection::Events),
            Err(AdapterError::NotConfigured { .. })
        ));
    }

    #[test]
    fn test_file_query_escapes_quotes() {
        assert_eq!(
            file_query("events.json", Some("pub"), JSON_MIME),
            "name = 'events.json' and trashed = false and 'pub' in parents and mimeType = 'application/json'"
        );
        assert!(file_query("it's", None, FOLDER_MIME).contains("name = 'it\\'s'"));
    }

    #[test]
    fn test_multipart_body_layout() {
        let body = multipart_body(&json!({"name": "events.json"}), "[]");
        assert!(body.starts_with(&format!("\r\n--{}\r\n", BOUNDARY)));
        assert!(body.contains("{\"name\":\"events.json\"}"));
        assert!(body.ends_with(&format!("[]\r\n--{}--", BOUNDARY)));
        assert_eq!(body.matches("Content-Type: application/json").count(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_api() {
        let configured = adapter("http://127.0.0.1:9", true);
        assert!(configured.is_configured());
        assert!(!configured.validate_connection().await);
        assert!(matches!(
            configured.fetch_collection(Collection::Events).await,
            Err(AdapterError::Transport { .. })
        ));

        let bare = adapter("http://127.0.0.1:9", false);
        assert!(bare.connect().await.is_err());
        assert!(bare.folders().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_empty_collection() {
        let app = Router::new().route(
            "/drive/v3/files",
            get(|| async { Json(json!({"files": []})) }),
        );
        let stubbed = adapter(&serve_stub(app).await, true);

        let records = stubbed.fetch_collection(Collection::Events).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_existing_file_is_downloaded() {
        let app = Router::new()
            .route(
                "/drive/v3/files",
                get(|| async { Json(json!({"files": [{"id": "file_1", "name": "blogs.json"}]})) }),
            )
            .route(
                "/drive/v3/files/:id",
                get(|Path(id): Path<String>| async move {
                    Json(json!([{"id": "b1", "source": id}]))
                }),
            );
        let stubbed = adapter(&serve_stub(app).await, true);

        let records = stubbed.fetch_collection(Collection::Blogs).await.unwrap();
        assert_eq!(records, vec![json!({"id": "b1", "source": "file_1"})]);
    }

    #[tokio::test]
    async fn test_initialize_structure_creates_and_shares_folders() {
        let created: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let shared = Arc::new(AtomicUsize::new(0));

        let created_log = created.clone();
        let shared_count = shared.clone();
        let app = Router::new()
            .route(
                "/drive/v3/files",
                get(|| async { Json(json!({"files": []})) }).post(move |Json(body): Json<Value>| {
                    let created_log = created_log.clone();
                    async move {
                        let name = body["name"].as_str().unwrap_or_default().to_string();
                        created_log.lock().unwrap().push(name.clone());
                        Json(json!({"id": format!("id_{}", name)}))
                    }
                }),
            )
            .route(
                "/drive/v3/files/:id/permissions",
                post(move || {
                    let shared_count = shared_count.clone();
                    async move {
                        shared_count.fetch_add(1, Ordering::SeqCst);
                        Json(json!({"id": "perm"}))
                    }
                }),
            );
        let stubbed = adapter(&serve_stub(app).await, false);
        assert!(!stubbed.is_configured());

        stubbed.connect().await.unwrap();

        let folders = stubbed.folders().unwrap();
        assert_eq!(folders.root_folder_id, "id_HBP_Kanchan_Shelke_Portfolio_Data");
        assert_eq!(folders.public_folder_id, "id_Inner_Database");
        assert_eq!(folders.media_folder_id, "id_Media_Storage");
        assert_eq!(folders.private_folder_id, "id_Secure_Data");
        assert_eq!(created.lock().unwrap().len(), 4);
        // Public and media folders only
        assert_eq!(shared.load(Ordering::SeqCst), 2);
        assert!(stubbed.is_configured());
    }
}
