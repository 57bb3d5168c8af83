//! Outcome of the background push that follows a local save.

use std::fmt;

use tokio::task::JoinHandle;

use super::collection::Mode;

/// What happened to a collection after it reached the local store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No active, configured remote backend; the local write is all there is
    CachedOnly,
    /// The remote backend accepted the whole collection
    Synced {
        /// Backend that accepted the write
        backend: Mode,
    },
    /// The remote backend rejected the write or was unreachable
    Failed {
        /// Backend that was written to
        backend: Mode,
        /// Error reported by the adapter
        reason: String,
    },
}

impl SyncStatus {
    /// Whether the data reached the active remote backend
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced { .. })
    }

    /// Whether the remote push failed
    pub fn is_failed(&self) -> bool {
        matches!(self, SyncStatus::Failed { .. })
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::CachedOnly => write!(f, "cached locally"),
            SyncStatus::Synced { backend } => write!(f, "synced to {}", backend),
            SyncStatus::Failed { backend, reason } => {
                write!(f, "sync to {} failed: {}", backend, reason)
            }
        }
    }
}

/// Handle on a save's remote push.
///
/// Dropping it leaves the push running in the background.
#[derive(Debug)]
pub struct PendingSync {
    backend: Option<Mode>,
    task: Option<JoinHandle<SyncStatus>>,
}

impl PendingSync {
    /// A save with nothing to push
    pub fn cached_only() -> Self {
        Self {
            backend: None,
            task: None,
        }
    }

    /// A push already running on `task`
    pub fn spawned(backend: Mode, task: JoinHandle<SyncStatus>) -> Self {
        Self {
            backend: Some(backend),
            task: Some(task),
        }
    }

    /// Whether a remote push was started
    pub fn is_remote(&self) -> bool {
        self.task.is_some()
    }

    /// Remote backend being pushed to
    pub fn backend(&self) -> Option<Mode> {
        self.backend
    }

    /// Wait for the push to finish
    pub async fn wait(self) -> SyncStatus {
        match (self.backend, self.task) {
            (Some(backend), Some(task)) => match task.await {
                Ok(status) => status,
                Err(e) => SyncStatus::Failed {
                    backend,
                    reason: format!("sync task aborted: {}", e),
                },
            },
            _ => SyncStatus::CachedOnly,
        }
    }
}
