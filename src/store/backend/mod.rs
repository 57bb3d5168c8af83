//! Key/Value Store Backends
//!
//! Trait-based abstraction over the local persistent tier. The file backend is
//! the durable default; the memory backend serves tests and previews.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │     DataManager     │
//! │  (collections API)  │
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │    KeyValueStore    │  <-- Trait
//! │      (async)        │
//! └──────────┬──────────┘
//!            │
//!     ┌──────┴──────┐
//!     │             │
//! ┌───▼───┐   ┌─────▼─────┐
//! │ File  │   │  Memory   │
//! │ Store │   │   Store   │
//! └───────┘   └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use santseva_store::store::{FileKeyValueStore, KeyValueStore};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let store = FileKeyValueStore::new("/path/to/storage")?;
//!
//!     store.set("db_mode", "local").await?;
//!     let mode = store.get("db_mode").await?;
//!
//!     Ok(())
//! }
//! ```

mod file_backend;
mod memory_backend;
mod traits;

pub use file_backend::*;
pub use memory_backend::*;
pub use traits::*;
