//! # Application Configuration
//!
//! Settings for the database, the stock policy, notifications and logging.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TEAHOUSE_DB_PATH=/srv/teahouse.db                                  │
//! │     TEAHOUSE_STOCK_POLICY=strict                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, else $TEAHOUSE_CONFIG, else                       │
//! │     ~/.config/teahouse-pos/teahouse.toml (Linux)                       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/teahouse/teahouse.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [inventory]
//! stock_policy = "permissive"  # permissive | strict
//!
//! [notifications]
//! enabled = true
//! timeout_ms = 2000
//!
//! [logging]
//! filter = "info,teahouse=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::ledger::StockPolicy;
use crate::logging::DEFAULT_LOG_FILTER;
use crate::pool::DbConfig;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Created on first start.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long an order waits for another order's write lock.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "teahouse", "pos")
        .map(|dirs| dirs.data_dir().join("teahouse.db"))
        .unwrap_or_else(|| PathBuf::from("teahouse.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_busy_timeout() -> u64 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventorySettings {
    #[serde(default)]
    pub stock_policy: StockPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Upper bound on one notifier call after commit.
    #[serde(default = "default_notify_timeout")]
    pub timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_notify_timeout() -> u64 {
    2_000
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            enabled: true,
            timeout_ms: default_notify_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directives. `RUST_LOG` still wins.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// App Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path`, else `TEAHOUSE_CONFIG`, else the
    ///    platform config dir
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| std::env::var_os("TEAHOUSE_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Writes the configuration to `config_path` or the default location.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::Invalid("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        info!(?path, "Config saved");
        Ok(path)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.notifications.enabled && self.notifications.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "notifications.timeout_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `TEAHOUSE_*` overrides read through `lookup`. Values that
    /// do not parse are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("TEAHOUSE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("TEAHOUSE_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid TEAHOUSE_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(policy) = lookup("TEAHOUSE_STOCK_POLICY") {
            match policy.parse() {
                Ok(parsed) => {
                    debug!(policy = %policy, "Overriding stock policy from environment");
                    self.inventory.stock_policy = parsed;
                }
                Err(e) => warn!(error = %e, "Ignoring TEAHOUSE_STOCK_POLICY"),
            }
        }

        if let Some(enabled) = lookup("TEAHOUSE_NOTIFICATIONS") {
            match enabled.trim().to_lowercase().as_str() {
                "1" | "true" | "on" | "yes" => self.notifications.enabled = true,
                "0" | "false" | "off" | "no" => self.notifications.enabled = false,
                _ => warn!(value = %enabled, "Ignoring invalid TEAHOUSE_NOTIFICATIONS"),
            }
        }

        if let Some(filter) = lookup("TEAHOUSE_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "teahouse", "pos")
            .map(|dirs| dirs.config_dir().join("teahouse.toml"))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.inventory.stock_policy
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notifications.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.stock_policy(), StockPolicy::Permissive);
        assert_eq!(config.database.max_connections, 5);
        assert!(config.notifications.enabled);
        assert_eq!(config.notify_timeout(), Duration::from_secs(2));
        assert_eq!(config.logging.filter, DEFAULT_LOG_FILTER);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            path = "/tmp/shop.db"

            [inventory]
            stock_policy = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert_eq!(config.stock_policy(), StockPolicy::Strict);
        assert!(config.notifications.enabled);

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(db.busy_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let result = AppConfig::from_toml("[inventory]\nstock_policy = \"lenient\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("TEAHOUSE_DB_PATH", "/srv/teahouse.db"),
            ("TEAHOUSE_DB_MAX_CONNECTIONS", "not-a-number"),
            ("TEAHOUSE_STOCK_POLICY", "STRICT"),
            ("TEAHOUSE_NOTIFICATIONS", "off"),
            ("TEAHOUSE_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/srv/teahouse.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.stock_policy(), StockPolicy::Strict);
        assert!(!config.notifications.enabled);
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_validation() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.notifications.timeout_ms = 0;
        assert!(config.validate().is_err());
        config.notifications.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teahouse.toml");

        let mut config = AppConfig::default();
        config.inventory.stock_policy = StockPolicy::Strict;
        config.database.path = dir.path().join("shop.db");
        config.save(Some(path.clone())).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[inventory]"));
        assert!(text.contains("stock_policy = \"strict\""));

        let loaded = AppConfig::from_toml(&text).unwrap();
        assert_eq!(loaded.stock_policy(), StockPolicy::Strict);
        assert_eq!(loaded.database.path, dir.path().join("shop.db"));
    }
}
