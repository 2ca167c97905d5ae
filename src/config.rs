//! Configuration module for the Drive catalog.

use serde::Deserialize;
use std::path::Path;

use crate::web::router::HEALTH_PATH;
use crate::{CatalogError, Result};

/// Environment variable holding the default root folder id.
pub const ENV_FOLDER_ID: &str = "GOOGLE_DRIVE_FOLDER_ID";

/// Environment variable holding the credentials JSON blob.
pub const ENV_CREDENTIALS_JSON: &str = "GOOGLE_CREDENTIALS_JSON";

/// Environment variable holding a path to a credentials JSON file.
pub const ENV_CREDENTIALS_FILE: &str = "GOOGLE_CREDENTIALS_FILE";

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Path the catalog endpoint is mounted on.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_endpoint() -> String {
    "/api".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            endpoint: default_endpoint(),
        }
    }
}

/// Catalog configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Default root folder id (overridable per request with `folderId`).
    #[serde(default)]
    pub root_folder_id: String,
    /// Google credentials JSON (service account or authorized user).
    #[serde(default)]
    pub credentials_json: String,
    /// Path to a credentials JSON file, used when `credentials_json` is empty.
    #[serde(default)]
    pub credentials_file: String,
    /// Recognize video files and emit `videoUrls`.
    #[serde(default = "default_true")]
    pub include_videos: bool,
    /// Accept `metadata.docx` as a metadata source.
    #[serde(default = "default_true")]
    pub docx_metadata: bool,
    /// Executable used to convert document metadata to plain text.
    #[serde(default = "default_converter")]
    pub converter: String,
}

fn default_true() -> bool {
    true
}

fn default_converter() -> String {
    "pandoc".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root_folder_id: String::new(),
            credentials_json: String::new(),
            credentials_file: String::new(),
            include_videos: true,
            docx_metadata: true,
            converter: default_converter(),
        }
    }
}

impl CatalogConfig {
    /// Configured root folder id, if any.
    pub fn root_folder_id(&self) -> Option<&str> {
        Some(self.root_folder_id.as_str()).filter(|s| !s.is_empty())
    }

    /// Configured credentials JSON, if any.
    pub fn credentials(&self) -> Option<&str> {
        Some(self.credentials_json.as_str()).filter(|s| !s.trim().is_empty())
    }
}

/// Google Drive API client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveConfig {
    /// Base URL of the Drive v3 REST API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Maximum number of entries returned by one listing call.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Total request timeout in seconds.
    #[serde(default = "default_total_timeout")]
    pub total_timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_page_size() -> u32 {
    1000
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_total_timeout() -> u64 {
    30
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            connect_timeout_secs: default_connect_timeout(),
            total_timeout_secs: default_total_timeout(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line, including the current span's fields.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Path to the log file. Empty logs to the console only.
    #[serde(default)]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Catalog configuration.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Drive API configuration.
    #[serde(default)]
    pub drive: DriveConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CatalogError::Io)?;
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
        toml::from_str(s).map_err(|e| CatalogError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `GOOGLE_DRIVE_FOLDER_ID`: default root folder id
    /// - `GOOGLE_CREDENTIALS_JSON`: credentials JSON blob
    /// - `GOOGLE_CREDENTIALS_FILE`: path to a credentials JSON file
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(folder_id) = non_empty_env(ENV_FOLDER_ID) {
            self.catalog.root_folder_id = folder_id;
        }
        if let Some(credentials) = non_empty_env(ENV_CREDENTIALS_JSON) {
            self.catalog.credentials_json = credentials;
        }
        if let Some(path) = non_empty_env(ENV_CREDENTIALS_FILE) {
            self.catalog.credentials_file = path;
        }
    }

    /// Read `credentials_file` into `credentials_json` when no inline JSON is set.
    pub fn resolve_credentials(&mut self) -> Result<()> {
        if self.catalog.credentials().is_none() && !self.catalog.credentials_file.is_empty() {
            self.catalog.credentials_json =
                std::fs::read_to_string(&self.catalog.credentials_file)?;
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.server.endpoint.starts_with('/') {
            return Err(CatalogError::Config(format!(
                "server.endpoint must start with '/': {}",
                self.server.endpoint
            )));
        }
        if self.server.endpoint == HEALTH_PATH {
            return Err(CatalogError::Config(format!(
                "server.endpoint must not be {HEALTH_PATH}"
            )));
        }
        if self.drive.page_size == 0 || self.drive.page_size > 1000 {
            return Err(CatalogError::Config(format!(
                "drive.page_size must be between 1 and 1000, got {}",
                self.drive.page_size
            )));
        }
        if self.catalog.docx_metadata && self.catalog.converter.trim().is_empty() {
            return Err(CatalogError::Config(
                "catalog.converter must be set when docx_metadata is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.endpoint, "/api");

        assert!(config.catalog.root_folder_id().is_none());
        assert!(config.catalog.credentials().is_none());
        assert!(config.catalog.include_videos);
        assert!(config.catalog.docx_metadata);
        assert_eq!(config.catalog.converter, "pandoc");

        assert_eq!(
            config.drive.api_base_url,
            "https://www.googleapis.com/drive/v3"
        );
        assert_eq!(config.drive.page_size, 1000);
        assert_eq!(config.drive.connect_timeout_secs, 10);
        assert_eq!(config.drive.total_timeout_secs, 30);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.logging.file.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
endpoint = "/api/items"

[catalog]
root_folder_id = "root-123"
credentials_json = "{}"
include_videos = false
docx_metadata = false
converter = "/usr/local/bin/pandoc"

[drive]
api_base_url = "http://localhost:9000/drive/v3"
page_size = 200
connect_timeout_secs = 5
total_timeout_secs = 15

[logging]
level = "debug"
format = "json"
file = "logs/catalog.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.endpoint, "/api/items");

        assert_eq!(config.catalog.root_folder_id(), Some("root-123"));
        assert_eq!(config.catalog.credentials(), Some("{}"));
        assert!(!config.catalog.include_videos);
        assert!(!config.catalog.docx_metadata);
        assert_eq!(config.catalog.converter, "/usr/local/bin/pandoc");

        assert_eq!(config.drive.api_base_url, "http://localhost:9000/drive/v3");
        assert_eq!(config.drive.page_size, 200);
        assert_eq!(config.drive.connect_timeout_secs, 5);
        assert_eq!(config.drive.total_timeout_secs, 15);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file, "logs/catalog.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[catalog]
root_folder_id = "partial"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.catalog.root_folder_id(), Some("partial"));
        assert!(config.catalog.include_videos);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.drive.page_size, 1000);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.endpoint, "/api");
        assert!(config.catalog.root_folder_id().is_none());
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(CatalogError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");
        assert!(matches!(result, Err(CatalogError::Io(_))));
    }

    #[test]
    fn test_blank_credentials_are_absent() {
        let mut config = Config::default();
        config.catalog.credentials_json = "   \n".to_string();
        assert!(config.catalog.credentials().is_none());
    }

    #[test]
    fn test_apply_env_overrides() {
        let original_folder = std::env::var(ENV_FOLDER_ID).ok();
        let original_credentials = std::env::var(ENV_CREDENTIALS_JSON).ok();

        std::env::set_var(ENV_FOLDER_ID, "env-folder");
        std::env::set_var(ENV_CREDENTIALS_JSON, "");

        let mut config = Config::default();
        config.catalog.credentials_json = "from-file".to_string();
        config.apply_env_overrides();

        assert_eq!(config.catalog.root_folder_id(), Some("env-folder"));
        // Empty values do not override
        assert_eq!(config.catalog.credentials(), Some("from-file"));

        match original_folder {
            Some(val) => std::env::set_var(ENV_FOLDER_ID, val),
            None => std::env::remove_var(ENV_FOLDER_ID),
        }
        match original_credentials {
            Some(val) => std::env::set_var(ENV_CREDENTIALS_JSON, val),
            None => std::env::remove_var(ENV_CREDENTIALS_JSON),
        }
    }

    #[test]
    fn test_resolve_credentials_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"type":"service_account"}"#).unwrap();

        let mut config = Config::default();
        config.catalog.credentials_file = path.to_string_lossy().into_owned();
        config.resolve_credentials().unwrap();

        assert_eq!(
            config.catalog.credentials(),
            Some(r#"{"type":"service_account"}"#)
        );
    }

    #[test]
    fn test_resolve_credentials_inline_wins() {
        let mut config = Config::default();
        config.catalog.credentials_json = "inline".to_string();
        config.catalog.credentials_file = "does/not/exist.json".to_string();

        assert!(config.resolve_credentials().is_ok());
        assert_eq!(config.catalog.credentials(), Some("inline"));
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.server.endpoint = "api".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.drive.page_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.endpoint = "/health".to_string();
        match config.validate() {
            Err(CatalogError::Config(msg)) => assert!(msg.contains("/health")),
            other => panic!("Expected Config error, got {other:?}"),
        }

        let mut config = Config::default();
        config.catalog.converter = String::new();
        assert!(config.validate().is_err());
        config.catalog.docx_metadata = false;
        assert!(config.validate().is_ok());
    }
}
