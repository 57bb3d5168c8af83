//! Per-backend connection parameters and their persistence.
//!
//! Each backend keeps one credential record in the local store under
//! `credentials_<mode>`. A complete record is the only thing that makes a
//! backend count as connected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

use crate::data::Mode;
use crate::store::{KeyValueStore, KeyValueStoreExt, StorageResult};

const CREDENTIALS_KEY_PREFIX: &str = "credentials_";

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    }
}

/// GitHub repository coordinates and token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubCredentials {
    /// Personal access token with contents write scope
    pub token: String,
    /// User or organization owning the repository
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch commits go to
    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl GitHubCredentials {
    /// Credentials targeting the `main` branch
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            branch: default_branch(),
        }
    }

    /// Target a different branch
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Token, owner and repository are all present
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty()
            && !self.owner.trim().is_empty()
            && !self.repo.trim().is_empty()
    }
}

impl fmt::Debug for GitHubCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubCredentials")
            .field("token", &redact(&self.token))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .finish()
    }
}

/// Supabase project endpoint and anon key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseCredentials {
    /// e.g. `https://<ref>.supabase.co`
    pub project_url: String,
    /// Public anon API key
    pub anon_key: String,
}

impl SupabaseCredentials {
    /// Credentials for a project
    pub fn new(project_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            anon_key: anon_key.into(),
        }
    }

    /// URL and key are both present
    pub fn is_complete(&self) -> bool {
        !self.project_url.trim().is_empty() && !self.anon_key.trim().is_empty()
    }
}

impl fmt::Debug for SupabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseCredentials")
            .field("project_url", &self.project_url)
            .field("anon_key", &redact(&self.anon_key))
            .finish()
    }
}

/// Folder ids of the Drive folder tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveFolders {
    /// App root folder
    pub root_folder_id: String,
    /// World-readable collections
    pub public_folder_id: String,
    /// World-readable media
    pub media_folder_id: String,
    /// `inquiries` and `subscribers`
    pub private_folder_id: String,
}

/// Google Drive OAuth token plus the folder tree it writes into
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveCredentials {
    /// OAuth access token
    pub access_token: String,
    /// Folder tree; absent until the structure is initialized
    #[serde(default)]
    pub folders: Option<DriveFolders>,
}

impl DriveCredentials {
    /// Token only; the folder tree still has to be initialized
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            folders: None,
        }
    }

    /// Attach an initialized folder tree
    pub fn with_folders(mut self, folders: DriveFolders) -> Self {
        self.folders = Some(folders);
        self
    }

    /// Token and both collection folders are present
    pub fn is_complete(&self) -> bool {
        !self.access_token.trim().is_empty()
            && self
                .folders
                .as_ref()
                .map(|f| !f.public_folder_id.is_empty() && !f.private_folder_id.is_empty())
                .unwrap_or(false)
    }
}

impl fmt::Debug for DriveCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveCredentials")
            .field("access_token", &redact(&self.access_token))
            .field("folders", &self.folders)
            .finish()
    }
}

/// Credential record for one remote backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCredentials {
    /// Google Drive
    Drive(DriveCredentials),
    /// Supabase
    Supabase(SupabaseCredentials),
    /// GitHub
    GitHub(GitHubCredentials),
}

impl BackendCredentials {
    /// Mode these credentials unlock
    pub fn mode(&self) -> Mode {
        match self {
            BackendCredentials::Drive(_) => Mode::Drive,
            BackendCredentials::Supabase(_) => Mode::Supabase,
            BackendCredentials::GitHub(_) => Mode::GitHub,
        }
    }

    /// Whether every required field is present
    pub fn is_complete(&self) -> bool {
        match self {
            BackendCredentials::Drive(c) => c.is_complete(),
            BackendCredentials::Supabase(c) => c.is_complete(),
            BackendCredentials::GitHub(c) => c.is_complete(),
        }
    }
}

/// Local store key of a backend's credential record
pub fn credentials_key(mode: Mode) -> String {
    format!("{}{}", CREDENTIALS_KEY_PREFIX, mode.as_str())
}

/// Reads and writes credential records in the local store
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    /// Keep credential records in `store`
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load a backend's credentials. Unreadable records are treated as absent.
    pub async fn load(&self, mode: Mode) -> StorageResult<Option<BackendCredentials>> {
        let key = credentials_key(mode);

        let loaded = match mode {
            Mode::Local => return Ok(None),
            Mode::Drive => self
                .store
                .get_json::<DriveCredentials>(&key)
                .await
                .map(|c| c.map(BackendCredentials::Drive)),
            Mode::Supabase => self
                .store
                .get_json::<SupabaseCredentials>(&key)
                .await
                .map(|c| c.map(BackendCredentials::Supabase)),
            Mode::GitHub => self
                .store
                .get_json::<GitHubCredentials>(&key)
                .await
                .map(|c| c.map(BackendCredentials::GitHub)),
        };

        match loaded {
            Ok(credentials) => Ok(credentials),
            Err(crate::store::StorageError::Deserialization(e)) => {
                warn!("Ignoring unreadable {} credentials: {}", mode, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Persist a credential record, replacing the previous one
    pub async fn save(&self, credentials: &BackendCredentials) -> StorageResult<()> {
        let key = credentials_key(credentials.mode());
        match credentials {
            BackendCredentials::Drive(c) => self.store.set_json(&key, c).await,
            BackendCredentials::Supabase(c) => self.store.set_json(&key, c).await,
            BackendCredentials::GitHub(c) => self.store.set_json(&key, c).await,
        }
    }

    /// Forget a backend's credentials
    pub async fn remove(&self, mode: Mode) -> StorageResult<()> {
        self.store.remove(&credentials_key(mode)).await
    }

    /// Whether a complete credential record is stored
    pub async fn is_connected(&self, mode: Mode) -> bool {
        matches!(self.load(mode).await, Ok(Some(c)) if c.is_complete())
    }
}
