//! Error types for the data manager

use thiserror::Error;

use super::collection::Mode;
use crate::adapters::AdapterError;
use crate::store::StorageError;

/// Result type for data manager operations
pub type DataResult<T> = Result<T, DataError>;

/// Error types surfaced by the data manager
#[derive(Error, Debug)]
pub enum DataError {
    /// The local key/value store rejected a read or write
    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),

    /// A remote backend call failed
    #[error("Remote backend error: {0}")]
    Adapter(#[from] AdapterError),

    /// Records could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The media blob store failed
    #[error("Media storage error: {message}")]
    Blob {
        /// Failed operation and cause
        message: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong
        message: String,
    },

    /// Credentials lack a required field
    #[error("Credentials for {mode} are incomplete")]
    IncompleteCredentials {
        /// Backend the credentials are for
        mode: Mode,
    },

    /// A mode name that is not one of local, drive, supabase, github
    #[error("Unknown mode: {name}")]
    UnknownMode {
        /// The rejected name
        name: String,
    },

    /// A collection name outside the fixed set
    #[error("Unknown collection: {name}")]
    UnknownCollection {
        /// The rejected name
        name: String,
    },
}

impl DataError {
    /// Create a media storage error
    pub fn blob<S: Into<String>>(message: S) -> Self {
        Self::Blob {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable (user can potentially fix it)
    pub fn is_recoverable(&self) -> bool {
        match self {
            DataError::Storage(e) => matches!(e, StorageError::QuotaExceeded { .. }),
            DataError::Adapter(e) => e.is_auth_failure(),
            DataError::Config { .. }
            | DataError::IncompleteCredentials { .. }
            | DataError::UnknownMode { .. }
            | DataError::UnknownCollection { .. } => true,
            _ => false,
        }
    }

    /// Get a user-friendly error message with recovery suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            DataError::Storage(StorageError::QuotaExceeded { quota, .. }) => {
                format!(
                    "Local storage is full ({} bytes). Remove unused media to free up space.",
                    quota
                )
            }
            DataError::Adapter(e) if e.is_auth_failure() => {
                format!(
                    "{} rejected the stored credentials. Reconnect the backend with a fresh token.",
                    e.backend()
                )
            }
            DataError::IncompleteCredentials { mode } => {
                format!("Some required {} settings are missing. Fill in every field and try again.", mode)
            }
            DataError::Config { message } => {
                format!("Configuration error: {}. Please check santseva.toml.", message)
            }
            _ => self.to_string(),
        }
    }
}
