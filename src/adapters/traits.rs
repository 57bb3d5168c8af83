//! Backend Adapter Traits
//!
//! Defines the contract every remote backend implements.

use async_trait::async_trait;

use crate::data::{Collection, Mode, Record};

/// Result type for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Error types for remote backend operations
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Credentials are missing or incomplete
    #[error("{backend} is not configured: {message}")]
    NotConfigured {
        /// Backend that raised the error
        backend: Mode,
        /// What is missing
        message: String,
    },

    /// The request never produced a response (DNS, TLS, timeout, refused)
    #[error("{backend} request failed: {message}")]
    Transport {
        /// Backend that raised the error
        backend: Mode,
        /// Underlying client error
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("{backend} returned HTTP {status}: {message}")]
    Status {
        /// Backend that raised the error
        backend: Mode,
        /// HTTP status code
        status: u16,
        /// Message from the response body, or the status reason
        message: String,
    },

    /// The response body was not the expected shape
    #[error("{backend} response could not be decoded: {message}")]
    Decode {
        /// Backend that raised the error
        backend: Mode,
        /// Decoder error
        message: String,
    },
}

impl AdapterError {
    /// Backend that produced the error
    pub fn backend(&self) -> Mode {
        match self {
            AdapterError::NotConfigured { backend, .. }
            | AdapterError::Transport { backend, .. }
            | AdapterError::Status { backend, .. }
            | AdapterError::Decode { backend, .. } => *backend,
        }
    }

    /// Authentication or authorization was rejected
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            AdapterError::Status {
                status: 401 | 403,
                ..
            }
        )
    }
}

/// A remote backend holding each collection as one JSON document.
///
/// Every save replaces the whole collection; there are no row-level writes.
/// Credentials are injected at construction time.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// The mode this adapter serves
    fn mode(&self) -> Mode;

    /// Whether the injected credentials are complete
    fn is_configured(&self) -> bool;

    /// Lifecycle hook run when this backend becomes the active mode
    async fn connect(&self) -> AdapterResult<()> {
        Ok(())
    }

    /// Lifecycle hook run when another mode replaces this backend
    async fn disconnect(&self) {}

    /// Lightweight reachability/auth check, used when credentials are first entered
    async fn validate_connection(&self) -> bool;

    /// Read a collection.
    ///
    /// Returns an empty vector when the remote location does not exist yet;
    /// errors are reserved for connectivity, auth and decoding failures.
    async fn fetch_collection(&self, collection: Collection) -> AdapterResult<Vec<Record>>;

    /// Replace a collection with `records`
    async fn save_collection(&self, collection: Collection, records: &[Record])
        -> AdapterResult<()>;
}
