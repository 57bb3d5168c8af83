//! GitHub contents API adapter.
//!
//! Each collection is one pretty-printed JSON file at
//! `<data_path>/<collection>.json` on the configured branch. Saves look up the
//! current blob sha first so the PUT updates instead of conflicting.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::credentials::GitHubCredentials;
use super::http::{build_client, decode_error, ensure_success, transport_error};
use super::traits::{AdapterError, AdapterResult, BackendAdapter};
use crate::config::GitHubSettings;
use crate::data::{Collection, Mode, Record};

const ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// Version-controlled repository backend
pub struct GitHubAdapter {
    credentials: GitHubCredentials,
    settings: GitHubSettings,
    client: Client,
}

impl GitHubAdapter {
    /// Create an adapter with injected credentials
    pub fn new(
        credentials: GitHubCredentials,
        settings: GitHubSettings,
        timeout_seconds: u64,
    ) -> AdapterResult<Self> {
        Ok(Self {
            credentials,
            settings,
            client: build_client(Mode::GitHub, timeout_seconds)?,
        })
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.credentials.owner,
            self.credentials.repo
        )
    }

    /// Contents endpoint of a collection file
    pub fn contents_url(&self, collection: Collection) -> String {
        let data_path = self.settings.data_path.trim_matches('/');
        let path = if data_path.is_empty() {
            collection.file_name()
        } else {
            format!("{}/{}", data_path, collection.file_name())
        };
        format!("{}/contents/{}", self.repo_url(), path)
    }

    /// Commit message used when saving a collection
    pub fn commit_message(&self, collection: Collection) -> String {
        self.settings
            .commit_message
            .replace("{collection}", collection.as_str())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Authorization", format!("token {}", self.credentials.token))
            .header("Accept", ACCEPT)
    }

    fn ensure_configured(&self) -> AdapterResult<()> {
        if self.credentials.is_complete() {
            Ok(())
        } else {
            Err(AdapterError::NotConfigured {
                backend: Mode::GitHub,
                message: "token, owner and repository are required".to_string(),
            })
        }
    }

    /// Fetch the current file, `None` when it does not exist yet
    async fn get_contents(&self, collection: Collection) -> AdapterResult<Option<ContentsResponse>> {
        let response = self
            .authorized(self.client.get(self.contents_url(collection)))
            .query(&[("ref", self.credentials.branch.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(Mode::GitHub, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = ensure_success(Mode::GitHub, response).await?;
        let contents = response
            .json::<ContentsResponse>()
            .await
            .map_err(|e| decode_error(Mode::GitHub, e))?;
        Ok(Some(contents))
    }
}

/// Decode a contents-API base64 body (wrapped at 60 columns) into records
pub fn decode_content(content: &str) -> AdapterResult<Vec<Record>> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| decode_error(Mode::GitHub, e))?;
    let text = String::from_utf8(bytes).map_err(|e| decode_error(Mode::GitHub, e))?;
    serde_json::from_str(&text).map_err(|e| decode_error(Mode::GitHub, e))
}

/// Encode records as base64 of their pretty-printed UTF-8 JSON
pub fn encode_content(records: &[Record]) -> AdapterResult<String> {
    let json = serde_json::to_string_pretty(records).map_err(|e| decode_error(Mode::GitHub, e))?;
    Ok(STANDARD.encode(json.as_bytes()))
}

#[async_trait]
impl BackendAdapter for GitHubAdapter {
    fn mode(&self) -> Mode {
        Mode::GitHub
    }

    fn is_configured(&self) -> bool {
        self.credentials.is_complete()
    }

    async fn validate_connection(&self) -> bool {
        if !self.is_configured() {
            return false;
        }

        match self.authorized(self.client.get(self.repo_url())).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("GitHub validation failed: {}", e);
                false
            }
        }
    }

    async fn fetch_collection(&self, collection: Collection) -> AdapterResult<Vec<Record>> {
        self.ensure_configured()?;

        match self.get_contents(collection).await? {
            Some(contents) => decode_content(&contents.content),
            None => {
                debug!("{} has no file in the repository yet", collection);
                Ok(Vec::new())
            }
        }
    }

    async fn save_collection(&self, collection: Collection, records: &[Record]) -> AdapterResult<()> {
        self.ensure_configured()?;

        // A failed lookup is treated as a new file; the PUT reports real conflicts.
        let sha = match self.get_contents(collection).await {
            Ok(existing) => existing.map(|c| c.sha),
            Err(e) => {
                warn!("Could not read current sha of {}: {}", collection, e);
                None
            }
        };

        let body = PutContentsRequest {
            message: self.commit_message(collection),
            content: encode_content(records)?,
            branch: &self.credentials.branch,
            sha,
        };

        let response = self
            .authorized(self.client.put(self.contents_url(collection)))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(Mode::GitHub, e))?;
        ensure_success(Mode::GitHub, response).await?;

        debug!("Committed {} records to {}", records.len(), collection);
        Ok(())
    }
}
