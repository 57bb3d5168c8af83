//! Santseva Store - multi-backend collection persistence
//!
//! Santseva Store lets an application read and write named collections of
//! JSON records while the authoritative backend is swapped at runtime:
//!
//! - **`store`** - Local persistent key/value store (file-backed or in-memory)
//! - **`blob`** - Object blob store for uploaded media
//! - **`adapters`** - Google Drive, Supabase and GitHub backends plus credentials
//! - **`data`** - Collections, demo seed data and the `DataManager` façade
//! - **`config`** - Configuration and environment loading
//! - **`observability`** - Markdown sync journal
//!
//! # Features
//!
//! The HTTP adapters are compiled with the default `remote` feature. Without
//! it the crate is local-only:
//!
//! ```toml
//! [dependencies]
//! santseva-store = { version = "0.3", default-features = false }
//! ```
//!
//! # Example: Opening a manager from configuration
//!
//! ```ignore
//! use santseva_store::config::{ConfigurationLoader, EnvironmentLoader};
//! use santseva_store::data::{Collection, DataManager, Mode};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let loader = ConfigurationLoader::new(Some(Path::new("config/santseva.toml")))?
//!     .with_environment(&env);
//! let manager = DataManager::open(&loader).await?;
//!
//! let events = manager.get_all(Collection::Events).await;
//! manager.set_mode(Mode::GitHub).await?;
//! ```
//!
//! # Example: Connecting a backend
//!
//! ```ignore
//! use santseva_store::adapters::{BackendCredentials, GitHubCredentials};
//!
//! let credentials = GitHubCredentials::new(token, "owner", "site-content");
//! if manager.connect_backend(BackendCredentials::GitHub(credentials)).await? {
//!     manager.set_mode(Mode::GitHub).await?;
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management
pub mod config;

/// Sync journal
pub mod observability;

/// Local persistent key/value store
pub mod store;

/// Object blob store for media
pub mod blob;

/// Remote backend adapters
pub mod adapters;

/// Collections and the data manager
pub mod data;

/// Mocks for exercising the data manager without a network
pub mod test_utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::{
        AdapterError, AdapterResult, BackendAdapter, BackendCredentials, DriveCredentials,
        GitHubCredentials, SupabaseCredentials,
    };
    pub use crate::blob::{BlobRecord, BlobStore};
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};
    pub use crate::data::{
        Collection, DataError, DataManager, DataManagerConfig, DataResult, MediaUpload, Mode,
        PendingSync, Record, SyncStatus,
    };
    pub use crate::observability::Logger;
    pub use crate::store::{
        FileKeyValueStore, KeyValueStore, KeyValueStoreExt, MemoryKeyValueStore, StorageError,
        StorageResult,
    };
}
