//! Configuration management
//!
//! This module handles loading and parsing configuration for the federation portal.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Admin authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Document upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// SMTP configuration for contact notifications
    #[serde(default)]
    pub smtp: SmtpConfig,
    /// Telegram channel news sync
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/fsp_portal.db".to_string()
}

/// Admin authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Session lifetime in days
    #[serde(default = "default_session_days")]
    pub session_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_days: default_session_days(),
        }
    }
}

fn default_session_days() -> i64 {
    7
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploaded documents are stored
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 50MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads/documents")
}

fn default_max_file_size() -> u64 {
    50 * 1024 * 1024
}

impl UploadConfig {
    /// Request body limit for the multipart upload route.
    ///
    /// Leaves headroom for the form fields around the file itself.
    pub fn body_limit(&self) -> usize {
        (self.max_file_size as usize).saturating_add(1024 * 1024)
    }
}

/// SMTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Mailbox that receives contact form notifications
    #[serde(default = "default_contact_email")]
    pub contact_email: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            contact_email: default_contact_email(),
        }
    }
}

impl SmtpConfig {
    /// Notifications are only sent when credentials are present
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_contact_email() -> String {
    "chuvashia@fsp-russia.ru".to_string()
}

/// Telegram channel sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Whether the background sync runs at all
    #[serde(default = "default_telegram_enabled")]
    pub enabled: bool,
    /// Public channel name (t.me/s/<channel>)
    #[serde(default = "default_telegram_channel")]
    pub channel: String,
    /// Seconds between sync runs
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
    /// Maximum number of posts taken from one page fetch
    #[serde(default = "default_sync_limit")]
    pub post_limit: usize,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: default_telegram_enabled(),
            channel: default_telegram_channel(),
            sync_interval_secs: default_sync_interval(),
            post_limit: default_sync_limit(),
        }
    }
}

fn default_telegram_enabled() -> bool {
    true
}

fn default_telegram_channel() -> String {
    "fspchuv".to_string()
}

fn default_sync_interval() -> u64 {
    3600
}

fn default_sync_limit() -> usize {
    30
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern `FSP_<SECTION>_<KEY>`:
    /// - FSP_SERVER_HOST, FSP_SERVER_PORT, FSP_SERVER_CORS_ORIGIN
    /// - FSP_DATABASE_URL
    /// - FSP_AUTH_SESSION_DAYS
    /// - FSP_UPLOAD_PATH, FSP_UPLOAD_MAX_FILE_SIZE
    /// - FSP_SMTP_HOST, FSP_SMTP_PORT, FSP_SMTP_USERNAME, FSP_SMTP_PASSWORD
    /// - FSP_CONTACT_EMAIL
    /// - FSP_TELEGRAM_CHANNEL, FSP_TELEGRAM_ENABLED
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.session_days <= 0 {
            return Err(ConfigError::ValidationError(
                "auth.session_days must be positive".to_string(),
            ));
        }
        if self.telegram.sync_interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "telegram.sync_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("FSP_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("FSP_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("FSP_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("FSP_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(days) = std::env::var("FSP_AUTH_SESSION_DAYS") {
            if let Ok(days) = days.parse::<i64>() {
                self.auth.session_days = days;
            }
        }

        if let Ok(path) = std::env::var("FSP_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("FSP_UPLOAD_MAX_FILE_SIZE") {
            if let Ok(size) = size.parse::<u64>() {
                self.upload.max_file_size = size;
            }
        }

        if let Ok(host) = std::env::var("FSP_SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Ok(port) = std::env::var("FSP_SMTP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.smtp.port = port;
            }
        }
        if let Ok(username) = std::env::var("FSP_SMTP_USERNAME") {
            self.smtp.username = username;
        }
        if let Ok(password) = std::env::var("FSP_SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        if let Ok(email) = std::env::var("FSP_CONTACT_EMAIL") {
            self.smtp.contact_email = email;
        }

        if let Ok(channel) = std::env::var("FSP_TELEGRAM_CHANNEL") {
            self.telegram.channel = channel;
        }
        if let Ok(enabled) = std::env::var("FSP_TELEGRAM_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.telegram.enabled = true,
                "0" | "false" | "no" => self.telegram.enabled = false,
                _ => {}
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
