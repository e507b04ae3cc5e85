//! Configuration management
//!
//! YAML-based configuration with support for:
//! - Environment variable overrides (prefixed with LABTRACK_)
//! - Multiple configuration file locations
//! - Default values for all settings

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
            alerts: AlertsConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5090
}

fn default_workers() -> usize {
    num_cpus::get()
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://data/labtrack.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

/// Authentication configuration
///
/// Tokens are issued by the external identity provider; this server only
/// validates them against the shared secret.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Directory for log files; console-only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            log_prefix: default_log_prefix(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_prefix() -> String {
    "labtrack".to_string()
}

/// Log output format
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Alert generation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AlertsConfig {
    /// A chemical is low on stock when current <= initial * this ratio
    #[serde(default = "default_low_stock_ratio")]
    pub low_stock_ratio: f64,
    /// Days ahead to warn about expiring chemicals
    #[serde(default = "default_expiration_window_days")]
    pub expiration_window_days: i64,
    /// Days ahead to warn about equipment maintenance
    #[serde(default = "default_maintenance_window_days")]
    pub maintenance_window_days: i64,
    /// Cron expression for the in-process sweep (seconds field included)
    #[serde(default = "default_sweep_cron")]
    pub sweep_cron: String,
    /// Disable to run the sweep exclusively via the CLI binary or the API
    #[serde(default = "default_sweep_enabled")]
    pub sweep_enabled: bool,
    /// Reject usage logs that would drive current_quantity below zero.
    /// Off by default: the legacy behavior allows negative inventory.
    #[serde(default)]
    pub enforce_non_negative_stock: bool,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            low_stock_ratio: default_low_stock_ratio(),
            expiration_window_days: default_expiration_window_days(),
            maintenance_window_days: default_maintenance_window_days(),
            sweep_cron: default_sweep_cron(),
            sweep_enabled: default_sweep_enabled(),
            enforce_non_negative_stock: false,
        }
    }
}

fn default_low_stock_ratio() -> f64 {
    0.1
}

fn default_expiration_window_days() -> i64 {
    90
}

fn default_maintenance_window_days() -> i64 {
    7
}

fn default_sweep_cron() -> String {
    // Daily at 08:00
    "0 0 8 * * *".to_string()
}

fn default_sweep_enabled() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables (prefixed with LABTRACK_)
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("LABTRACK_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = if let Some(ref path) = config_path {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                serde_norway::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            PathBuf::from("/etc/labtrack/config.yaml"),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("LABTRACK_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("LABTRACK_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("LABTRACK_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("LABTRACK_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(level) = std::env::var("LABTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LABTRACK_LOG_FORMAT") {
            if format.eq_ignore_ascii_case("json") {
                self.logging.format = LogFormat::Json;
            } else if format.eq_ignore_ascii_case("pretty") {
                self.logging.format = LogFormat::Pretty;
            }
        }
        if let Ok(cron) = std::env::var("LABTRACK_SWEEP_CRON") {
            self.alerts.sweep_cron = cron;
        }
        if let Ok(enabled) = std::env::var("LABTRACK_SWEEP_ENABLED") {
            self.alerts.sweep_enabled = enabled.eq_ignore_ascii_case("true");
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            bail!("auth.jwt_secret must be set (or LABTRACK_JWT_SECRET)");
        }
        if self.alerts.low_stock_ratio < 0.0 || self.alerts.low_stock_ratio > 1.0 {
            bail!("alerts.low_stock_ratio must be between 0 and 1");
        }
        if self.alerts.expiration_window_days < 0 || self.alerts.maintenance_window_days < 0 {
            bail!("alert windows must not be negative");
        }
        Ok(())
    }
}
