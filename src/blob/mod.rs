//! Object blob store for uploaded media files.
//!
//! Media payloads (images, audio, video) are too large for the key/value tier,
//! so they live here keyed by a generated id. A `media` collection record
//! references a blob by that id; deleting the record deletes the blob on a
//! best-effort basis.
//!
//! ```rust,no_run
//! use santseva_store::blob::BlobStore;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let blobs = BlobStore::new("/path/to/media")?;
//!     blobs.put("1718000000000", vec![0x89, 0x50], "image/png").await?;
//!     if let Some(blob) = blobs.get("1718000000000").await? {
//!         println!("{}", blob.data_url());
//!     }
//!     blobs.delete("1718000000000").await?;
//!     Ok(())
//! }
//! ```

mod store;

pub use store::{BlobRecord, BlobStore};
