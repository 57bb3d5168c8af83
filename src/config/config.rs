//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::environment::EnvironmentLoader;
use crate::data::Mode;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// `[store]` section
    pub store: StoreConfig,
    /// `[logging]` section
    pub logging: LoggingConfig,
    /// `[backends]` section
    #[serde(default)]
    pub backends: BackendsConfig,
}

/// Local tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root directory; the key/value store and media blobs live underneath
    pub data_dir: String,
    /// Mode used when none was ever persisted
    #[serde(default = "default_mode")]
    pub default_mode: String,
    /// Artificial latency applied in local mode, in milliseconds
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// Optional cap on the bytes held by the key/value store
    pub quota_bytes: Option<u64>,
}

fn default_mode() -> String {
    "local".to_string()
}

fn default_latency_ms() -> u64 {
    600
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Markdown sync journal; no journal is written when absent
    pub log_file: Option<String>,
    /// `ERROR` limits the journal to failures
    pub log_level: String,
}

/// Non-secret endpoint settings for the remote backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// `[backends.github]`
    #[serde(default)]
    pub github: GitHubSettings,
    /// `[backends.supabase]`
    #[serde(default)]
    pub supabase: SupabaseSettings,
    /// `[backends.drive]`
    #[serde(default)]
    pub drive: DriveSettings,
    /// Per-request timeout applied by the HTTP client
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            github: GitHubSettings::default(),
            supabase: SupabaseSettings::default(),
            drive: DriveSettings::default(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// GitHub contents API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// REST API root
    pub api_base: String,
    /// Directory inside the repository holding `<collection>.json`
    pub data_path: String,
    /// Commit message; `{collection}` is replaced by the collection name
    pub commit_message: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            data_path: "data".to_string(),
            commit_message: "Update {collection} via Admin Dashboard".to_string(),
        }
    }
}

/// Supabase PostgREST settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    /// Table with `collection_name`, `data` and `updated_at` columns
    pub table: String,
}

impl Default for SupabaseSettings {
    fn default() -> Self {
        Self {
            table: "app_data".to_string(),
        }
    }
}

/// Google Drive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    /// REST API root
    pub api_base: String,
    /// App root folder, created in My Drive
    pub root_folder_name: String,
    /// Public collections folder under the root
    pub public_folder_name: String,
    /// Public media folder under the root
    pub media_folder_name: String,
    /// Private collections folder under the root
    pub private_folder_name: String,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            api_base: "https://www.googleapis.com".to_string(),
            root_folder_name: "HBP_Kanchan_Shelke_Portfolio_Data".to_string(),
            public_folder_name: "Inner_Database".to_string(),
            media_folder_name: "Media_Storage".to_string(),
            private_folder_name: "Secure_Data".to_string(),
        }
    }
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    /// File the configuration was read from, or would be
    pub config_path: PathBuf,
    /// Parsed configuration
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses `config/santseva.toml`
    ///   when present and the built-in defaults otherwise.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("config/santseva.toml"));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            Self::get_default_config()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: PathBuf::from("config/santseva.toml"),
            config,
        }
    }

    /// Apply `SANTSEVA_*` environment overrides on top of the file values.
    pub fn with_environment(mut self, env: &EnvironmentLoader) -> Self {
        if let Some(dir) = env.data_dir() {
            self.config.store.data_dir = dir;
        }
        if let Some(mode) = env.db_mode() {
            self.config.store.default_mode = mode;
        }
        self
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get default configuration.
    fn get_default_config() -> Configuration {
        Configuration {
            store: StoreConfig {
                data_dir: ".santseva".to_string(),
                default_mode: default_mode(),
                latency_ms: default_latency_ms(),
                quota_bytes: None,
            },
            logging: LoggingConfig {
                log_file: None,
                log_level: "INFO".to_string(),
            },
            backends: BackendsConfig::default(),
        }
    }

    /// Root data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.store.data_dir)
    }

    /// Directory of the key/value store
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir().join("store")
    }

    /// Directory of the media blob store
    pub fn media_dir(&self) -> PathBuf {
        self.data_dir().join("media")
    }

    /// Local-mode UX pacing delay
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.config.store.latency_ms)
    }

    /// Parsed fallback mode
    pub fn default_mode(&self) -> Result<Mode> {
        self.config
            .store
            .default_mode
            .parse::<Mode>()
            .with_context(|| {
                format!(
                    "Invalid store.default_mode: {}",
                    self.config.store.default_mode
                )
            })
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "store.data_dir" => Some(self.config.store.data_dir.clone()),
            "store.default_mode" => Some(self.config.store.default_mode.clone()),
            "logging.log_file" => self.config.logging.log_file.clone(),
            "logging.log_level" => Some(self.config.logging.log_level.clone()),
            "backends.github.api_base" => Some(self.config.backends.github.api_base.clone()),
            "backends.github.data_path" => Some(self.config.backends.github.data_path.clone()),
            "backends.supabase.table" => Some(self.config.backends.supabase.table.clone()),
            "backends.drive.api_base" => Some(self.config.backends.drive.api_base.clone()),
            _ => None,
        }
    }

    /// Get numeric configuration value.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        match key {
            "store.latency_ms" => Some(self.config.store.latency_ms),
            "store.quota_bytes" => self.config.store.quota_bytes,
            "backends.request_timeout_seconds" => {
                Some(self.config.backends.request_timeout_seconds)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigurationLoader::get_default_config();
        assert_eq!(config.store.data_dir, ".santseva");
        assert_eq!(config.store.default_mode, "local");
        assert_eq!(config.store.latency_ms, 600);
        assert!(config.store.quota_bytes.is_none());
        assert!(config.logging.log_file.is_none());
        assert_eq!(config.backends.supabase.table, "app_data");
        assert_eq!(config.backends.github.data_path, "data");
        assert_eq!(config.backends.request_timeout_seconds, 30);
    }

    #[test]
    fn test_get_methods() {
        let loader = ConfigurationLoader::new(Some(Path::new("/nonexistent/santseva.toml"))).unwrap();
        assert_eq!(loader.get_string("store.default_mode"), Some("local".to_string()));
        assert_eq!(loader.get_u64("store.latency_ms"), Some(600));
        assert_eq!(loader.get_u64("store.quota_bytes"), None);
        assert_eq!(
            loader.get_string("backends.github.api_base"),
            Some("https://api.github.com".to_string())
        );
        assert_eq!(loader.get_string("unknown.key"), None);
        assert_eq!(loader.default_mode().unwrap(), Mode::Local);
        assert_eq!(loader.latency(), Duration::from_millis(600));
    }

    #[test]
    fn test_directories_derive_from_data_dir() {
        let mut config = ConfigurationLoader::get_default_config();
        config.store.data_dir = "/var/lib/santseva".to_string();
        let loader = ConfigurationLoader::from_config(config);

        assert_eq!(loader.store_dir(), PathBuf::from("/var/lib/santseva/store"));
        assert_eq!(loader.media_dir(), PathBuf::from("/var/lib/santseva/media"));
    }

    #[test]
    fn test_config_from_toml() {
        use tempfile::NamedTempFile;

        let toml_content = r#"
[store]
data_dir = "/tmp/santseva-test"
default_mode = "github"
latency_ms = 0
quota_bytes = 5242880

[logging]
log_file = "/tmp/santseva-test/sync.md"
log_level = "DEBUG"

[backends.github]
api_base = "https://github.example.com/api/v3"

[backends.supabase]
table = "portfolio_data"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        let loader = ConfigurationLoader::new(Some(temp_file.path())).unwrap();
        assert_eq!(loader.default_mode().unwrap(), Mode::GitHub);
        assert_eq!(loader.latency(), Duration::ZERO);
        assert_eq!(loader.get_u64("store.quota_bytes"), Some(5242880));
        assert_eq!(
            loader.config.backends.github.api_base,
            "https://github.example.com/api/v3"
        );
        // Unspecified fields inside a present table keep their defaults
        assert_eq!(loader.config.backends.github.data_path, "data");
        assert_eq!(loader.config.backends.supabase.table, "portfolio_data");
        assert_eq!(loader.config.backends.drive.public_folder_name, "Inner_Database");
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        use tempfile::NamedTempFile;

        let toml_content = r#"
[store]
data_dir = "data"

[logging]
log_level = "INFO"
"#;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), toml_content).unwrap();

        let loader = ConfigurationLoader::new(Some(temp_file.path())).unwrap();
        assert_eq!(loader.config.store.latency_ms, 600);
        assert_eq!(loader.default_mode().unwrap(), Mode::Local);
        assert_eq!(loader.config.backends.request_timeout_seconds, 30);
    }

    #[test]
    fn test_invalid_mode_is_reported() {
        let mut config = ConfigurationLoader::get_default_config();
        config.store.default_mode = "floppy".to_string();
        let loader = ConfigurationLoader::from_config(config);

        let err = loader.default_mode().unwrap_err();
        assert!(err.to_string().contains("floppy"));
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        use tempfile::NamedTempFile;

        let temp_file = NamedTempFile::new().unwrap();
        fs::write(temp_file.path(), "[store\ndata_dir = ").unwrap();

        assert!(ConfigurationLoader::new(Some(temp_file.path())).is_err());
    }
}
