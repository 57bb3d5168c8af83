//! Collections and the data manager façade.
//!
//! # Architecture
//!
//! ```text
//! get_all(c)                              save(c, records)
//!     │                                        │
//!     ▼                                        ▼
//! active adapter ──ok──▶ cache_<c>      santseva_<c> + cache_<c>
//!     │ err / none                             │
//!     ▼                                        ▼
//! santseva_<c> ▶ cache_<c> ▶ demo seed   spawned push ▶ PendingSync
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use santseva_store::blob::BlobStore;
//! use santseva_store::data::{Collection, DataManager};
//! use santseva_store::store::FileKeyValueStore;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let store = Arc::new(FileKeyValueStore::new("/path/to/store")?);
//!     let blobs = BlobStore::new("/path/to/media")?;
//!     let manager = DataManager::builder(store, blobs).build().await;
//!
//!     let mut events = manager.get_all(Collection::Events).await;
//!     events.retain(|e| e["status"] != "Cancelled");
//!     let status = manager.save(Collection::Events, &events).await?.wait().await;
//!     println!("{}", status);
//!     Ok(())
//! }
//! ```

mod collection;
pub mod demo;
mod errors;
mod manager;
mod sync;

pub use collection::{
    Collection, Mode, Record, Visibility, CACHE_KEY_PREFIX, MODE_KEY, PRIMARY_KEY_PREFIX,
};
pub use errors::{DataError, DataResult};
pub use manager::{DataManager, DataManagerBuilder, DataManagerConfig, MediaUpload, SavedMedia};
pub use sync::{PendingSync, SyncStatus};
