//! Configuration module
//!
//! `AppConfig` is read from a TOML file. Every section and field has a
//! default, so an empty file (or no file at all) yields a runnable setup.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! shutdown_timeout = 30
//!
//! [database]
//! url = "sqlite://./rental.db?mode=rwc"
//! max_connections = 5
//!
//! [logging]
//! level = "info"
//! format = "pretty"   # or "json"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::DatabaseConfig;

/// Environment variable that replaces `database.url`
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_database_url() -> String {
    DatabaseConfig::default().url
}

fn default_max_connections() -> u32 {
    DatabaseConfig::default().max_connections
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&DatabaseSettings> for DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            url: settings.url.clone(),
            max_connections: settings.max_connections,
        }
    }
}

impl AppConfig {
    /// Read and parse `path`, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env();
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// `DATABASE_URL` wins over the file.
    pub fn apply_env(&mut self) {
        self.override_database_url(std::env::var(DATABASE_URL_ENV).ok());
    }

    fn override_database_url(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.database.url = url;
        }
    }
}

/// `<config dir>/rental-service/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("rental-service"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.server.address(), "0.0.0.0:8000");
        assert_eq!(config.server.shutdown_timeout, 30);
        assert_eq!(config.database.url, "sqlite://./rental.db?mode=rwc");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::parse(
            r#"
            [server]
            port = 9090

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(AppConfig::parse("[server\nport = 1").is_err());
        assert!(AppConfig::parse("[server]\nport = \"eighty\"").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn database_url_override_ignores_blank_values() {
        let mut config = AppConfig::default();
        config.override_database_url(Some("  ".into()));
        assert_eq!(config.database.url, "sqlite://./rental.db?mode=rwc");

        config.override_database_url(Some("sqlite::memory:".into()));
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(DatabaseConfig::from(&config.database).url, "sqlite::memory:");
    }

    #[test]
    fn default_path_ends_with_service_dir() {
        let path = default_config_path();
        assert!(path.ends_with("rental-service/config.toml") || path.ends_with("config.toml"));
    }
}
