//! Configuration management.
//!
//! This module provides configuration loading through TOML files and
//! host-level overrides via environment variables and `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use santseva_store::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(None);
//! let loader = ConfigurationLoader::new(Some(Path::new("config/santseva.toml")))
//!     .unwrap()
//!     .with_environment(&env);
//!
//! println!("Data dir: {}", loader.data_dir().display());
//! println!("Latency: {:?}", loader.latency());
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    BackendsConfig, Configuration, ConfigurationLoader, DriveSettings, GitHubSettings,
    LoggingConfig, StoreConfig, SupabaseSettings,
};
pub use self::environment::EnvironmentLoader;
