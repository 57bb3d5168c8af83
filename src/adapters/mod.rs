//! Remote backend adapters.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │     DataManager      │
//! └──────────┬───────────┘
//!            │ Arc<dyn BackendAdapter>
//!  ┌─────────┼──────────────┬───────────────┐
//!  ▼         ▼              ▼               ▼
//! Drive   Supabase        GitHub       (test mocks)
//! ```
//!
//! Adapters receive their credentials at construction. The
//! [`CredentialStore`] persists credential records in the local store and the
//! [`AdapterFactory`] turns them back into adapters.

mod credentials;
mod factory;
mod traits;

#[cfg(feature = "remote")]
mod drive;
#[cfg(feature = "remote")]
mod github;
#[cfg(feature = "remote")]
mod http;
#[cfg(feature = "remote")]
mod supabase;

pub use credentials::{
    credentials_key, BackendCredentials, CredentialStore, DriveCredentials, DriveFolders,
    GitHubCredentials, SupabaseCredentials,
};
pub use factory::AdapterFactory;
pub use traits::{AdapterError, AdapterResult, BackendAdapter};

#[cfg(feature = "remote")]
pub use drive::{file_query, multipart_body, DriveAdapter};
#[cfg(feature = "remote")]
pub use github::{decode_content, encode_content, GitHubAdapter};
#[cfg(feature = "remote")]
pub use supabase::{records_from_rows, SupabaseAdapter};
