//! Adapter factory for turning stored credentials into live adapters.

use std::sync::Arc;

use tracing::debug;

use super::credentials::{BackendCredentials, CredentialStore};
use super::traits::{AdapterError, AdapterResult, BackendAdapter};
use crate::config::BackendsConfig;
use crate::data::Mode;

/// Factory for creating remote backend adapters
pub struct AdapterFactory;

impl AdapterFactory {
    /// Create the adapter matching a credential record
    #[cfg(feature = "remote")]
    pub fn create(
        credentials: &BackendCredentials,
        config: &BackendsConfig,
    ) -> AdapterResult<Arc<dyn BackendAdapter>> {
        use super::{DriveAdapter, GitHubAdapter, SupabaseAdapter};

        if !credentials.is_complete() && credentials.mode() != Mode::Drive {
            return Err(AdapterError::NotConfigured {
                backend: credentials.mode(),
                message: "credentials are incomplete".to_string(),
            });
        }

        let timeout = config.request_timeout_seconds;
        let adapter: Arc<dyn BackendAdapter> = match credentials {
            BackendCredentials::GitHub(c) => Arc::new(GitHubAdapter::new(
                c.clone(),
                config.github.clone(),
                timeout,
            )?),
            BackendCredentials::Supabase(c) => Arc::new(SupabaseAdapter::new(
                c.clone(),
                config.supabase.clone(),
                timeout,
            )?),
            // Drive folders may still be missing; connect() initializes them
            BackendCredentials::Drive(c) => {
                Arc::new(DriveAdapter::new(c.clone(), config.drive.clone(), timeout)?)
            }
        };
        Ok(adapter)
    }

    /// Without the `remote` feature no HTTP adapters are compiled in
    #[cfg(not(feature = "remote"))]
    pub fn create(
        credentials: &BackendCredentials,
        _config: &BackendsConfig,
    ) -> AdapterResult<Arc<dyn BackendAdapter>> {
        Err(AdapterError::NotConfigured {
            backend: credentials.mode(),
            message: "built without the `remote` feature".to_string(),
        })
    }

    /// Build adapters for every backend with stored credentials.
    ///
    /// Backends whose credentials cannot produce an adapter are skipped.
    pub async fn load_all(
        store: &CredentialStore,
        config: &BackendsConfig,
    ) -> Vec<Arc<dyn BackendAdapter>> {
        let mut adapters = Vec::new();

        for mode in Mode::ALL.into_iter().filter(Mode::is_remote) {
            let credentials = match store.load(mode).await {
                Ok(Some(credentials)) => credentials,
                Ok(None) => continue,
                Err(e) => {
                    debug!("Could not read {} credentials: {}", mode, e);
                    continue;
                }
            };

            match Self::create(&credentials, config) {
                Ok(adapter) => adapters.push(adapter),
                Err(e) => debug!("Skipping {} adapter: {}", mode, e),
            }
        }

        adapters
    }
}
