//! Environment variable loading and management.
//!
//! Only host-level overrides live here. Backend credentials are never read
//! from the environment; they are stored through the credential store.

use std::env;
use std::path::Path;

/// Overrides the configured data directory
pub const DATA_DIR_VAR: &str = "SANTSEVA_DATA_DIR";
/// Overrides the configured fallback mode
pub const DB_MODE_VAR: &str = "SANTSEVA_DB_MODE";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Nothing is loaded unless a path is given.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!("Failed to load .env file {}: {}", path.display(), e);
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file this loader was created with
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// Data directory override
    pub fn data_dir(&self) -> Option<String> {
        non_empty_var(DATA_DIR_VAR)
    }

    /// Fallback mode override
    pub fn db_mode(&self) -> Option<String> {
        non_empty_var(DB_MODE_VAR)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}
