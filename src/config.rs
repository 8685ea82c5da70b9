//! Configuration module for the file access service.

use serde::Deserialize;
use std::path::Path;

use crate::{FileAccessError, Result};

/// Environment variable seeding the rotating upload token.
pub const UPLOAD_TOKEN_ENV: &str = "FILE_ACCESS_UPLOAD_TOKEN";

/// Environment variable seeding the static super token.
pub const SUPER_TOKEN_ENV: &str = "FILE_ACCESS_SUPER_TOKEN";

/// Environment variable overriding the storage root.
pub const STORAGE_ROOT_ENV: &str = "FILE_ACCESS_STORAGE_ROOT";

/// Environment variable overriding the listen port.
pub const PORT_ENV: &str = "FILE_ACCESS_PORT";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory all file operations are confined to.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_root() -> String {
    "storage/files".to_string()
}

fn default_max_upload_size() -> u64 {
    512
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Static asset configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    /// Path to the favicon served at `/favicon.ico`.
    #[serde(default = "default_favicon_path")]
    pub favicon: String,
}

fn default_favicon_path() -> String {
    "static/favicon.ico".to_string()
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            favicon: default_favicon_path(),
        }
    }
}

/// Token seed configuration.
///
/// Seeds are optional. Whatever is supplied is normalized to the fixed token
/// lengths at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokensConfig {
    /// Seed for the rotating upload token.
    #[serde(default)]
    pub upload_seed: Option<String>,
    /// Seed for the static super token.
    #[serde(default)]
    pub super_seed: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Optional path to a log file mirrored from the console.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Static asset configuration.
    #[serde(default)]
    pub static_files: StaticConfig,
    /// Token seeds.
    #[serde(default)]
    pub tokens: TokensConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FileAccessError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FileAccessError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILE_ACCESS_UPLOAD_TOKEN`: seed for the upload token
    /// - `FILE_ACCESS_SUPER_TOKEN`: seed for the super token
    /// - `FILE_ACCESS_STORAGE_ROOT`: storage root directory
    /// - `FILE_ACCESS_PORT`: listen port
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = non_empty_env(UPLOAD_TOKEN_ENV) {
            self.tokens.upload_seed = Some(seed);
        }
        if let Some(seed) = non_empty_env(SUPER_TOKEN_ENV) {
            self.tokens.super_seed = Some(seed);
        }
        if let Some(root) = non_empty_env(STORAGE_ROOT_ENV) {
            self.storage.root = root;
        }
        if let Some(port) = non_empty_env(PORT_ENV) {
            match port.parse() {
                Ok(port) => self.server.port = port,
                // Logging is not initialized yet when overrides are applied
                Err(_) => eprintln!("Ignoring invalid {PORT_ENV}: {port:?}"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.storage.root.trim().is_empty() {
            return Err(FileAccessError::Config(
                "storage.root cannot be empty".to_string(),
            ));
        }
        if self.storage.max_upload_size_mb == 0 {
            return Err(FileAccessError::Config(
                "storage.max_upload_size_mb must be greater than 0".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(FileAccessError::Config(
                "server.host cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
