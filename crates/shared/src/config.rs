//! Application configuration management.

use std::path::PathBuf;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Budget evaluation configuration.
    #[serde(default)]
    pub budget: BudgetConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON snapshot the store loads from and saves to.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Persist the snapshot after every mutation.
    #[serde(default = "default_autosave")]
    pub autosave: bool,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/tally.json")
}

fn default_autosave() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            autosave: default_autosave(),
        }
    }
}

/// Budget evaluation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// IANA timezone whose calendar months bound the evaluation period.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl BudgetConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the name is not a known IANA timezone.
    pub fn timezone(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", self.timezone)))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=info,tally_core=info,tally_store=info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_sources() {
        temp_env::with_vars_unset(
            [
                "TALLY__STORE__SNAPSHOT_PATH",
                "TALLY__STORE__AUTOSAVE",
                "TALLY__BUDGET__TIMEZONE",
                "TALLY__LOG__JSON",
                "RUN_MODE",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.store.snapshot_path, PathBuf::from("data/tally.json"));
                assert!(config.store.autosave);
                assert_eq!(config.budget.timezone, "UTC");
                assert!(!config.log.json);
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("TALLY__STORE__SNAPSHOT_PATH", Some("/tmp/other.json")),
                ("TALLY__STORE__AUTOSAVE", Some("false")),
                ("TALLY__BUDGET__TIMEZONE", Some("Asia/Jakarta")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.store.snapshot_path, PathBuf::from("/tmp/other.json"));
                assert!(!config.store.autosave);
                assert_eq!(config.budget.timezone().unwrap(), chrono_tz::Asia::Jakarta);
            },
        );
    }

    #[test]
    fn test_unknown_timezone_is_validation_error() {
        let budget = BudgetConfig {
            timezone: "Mars/Olympus".to_string(),
        };
        let err = budget.timezone().unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
