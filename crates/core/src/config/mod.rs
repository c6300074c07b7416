//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for
//! layered configuration loading from multiple sources:
//!
//! 1. Environment variables (HAVEN_*)
//! 2. TOML config file (if HAVEN_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (HAVEN_*)
/// 2. TOML config file (if HAVEN_CONFIG_FILE set)
/// 3. Built-in defaults
///
/// The version string names the current cache generation; deploying a
/// new version and activating triggers the sweep that discards every
/// prior generation's stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Prefix for all store names owned by this engine.
    ///
    /// Set via HAVEN_NAMESPACE environment variable.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Version tag naming the current cache generation.
    ///
    /// Set via HAVEN_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Path to the SQLite cache database.
    ///
    /// Set via HAVEN_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin of the hosting page, used for same-origin classification
    /// and for resolving site-relative precache routes.
    ///
    /// Set via HAVEN_PAGE_ORIGIN environment variable.
    #[serde(default = "default_page_origin")]
    pub page_origin: String,

    /// User-Agent string for network fetches.
    ///
    /// Set via HAVEN_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Network fetch timeout in milliseconds.
    ///
    /// Set via HAVEN_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Entry cap for the bounded third-party image store.
    ///
    /// Set via HAVEN_MAX_IMAGE_ENTRIES environment variable.
    #[serde(default = "default_max_image_entries")]
    pub max_image_entries: usize,

    /// Site-relative routes warmed into the precache store at install.
    ///
    /// Set via HAVEN_PRECACHE_ROUTES environment variable.
    #[serde(default = "default_precache_routes")]
    pub precache_routes: Vec<String>,
}

fn default_namespace() -> String {
    "haven".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./haven-cache.sqlite")
}

fn default_page_origin() -> String {
    "http://localhost:8080".into()
}

fn default_user_agent() -> String {
    "haven/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_image_entries() -> usize {
    50
}

fn default_precache_routes() -> Vec<String> {
    vec!["/".into()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            version: default_version(),
            db_path: default_db_path(),
            page_origin: default_page_origin(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_image_entries: default_max_image_entries(),
            precache_routes: default_precache_routes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `HAVEN_`
    /// 2. TOML file from `HAVEN_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HAVEN_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HAVEN_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
