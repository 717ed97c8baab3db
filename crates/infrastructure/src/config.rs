//! Application configuration
//!
//! Loaded from an optional TOML file plus `TRIALCAL_`-prefixed environment
//! variables; every section has serde defaults so an empty config is valid.

use std::str::FromStr;

use application::services::{ExpansionConfig, WorkingDayPolicy};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Calendar and expansion configuration
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `path` (optional TOML file) and environment
    /// variables prefixed with `TRIALCAL_`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if the file exists but cannot be
    /// parsed, or if deserialization fails.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("TRIALCAL").separator("__"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Whether to run migrations on startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_path() -> String {
    "trialcal.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

const fn default_true() -> bool {
    true
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            run_migrations: true,
        }
    }
}

/// Calendar and expansion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Weekday names excluded from the working week
    #[serde(default = "default_excluded_weekdays")]
    pub excluded_weekdays: Vec<String>,

    /// Shift occurrences on non-working days to the next working day
    #[serde(default = "default_true")]
    pub shift_to_working_day: bool,

    /// Reject reminder windows starting before this date
    #[serde(default)]
    pub study_start: Option<NaiveDate>,
}

fn default_excluded_weekdays() -> Vec<String> {
    vec!["saturday".to_string(), "sunday".to_string()]
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            excluded_weekdays: default_excluded_weekdays(),
            shift_to_working_day: true,
            study_start: None,
        }
    }
}

impl CalendarConfig {
    /// Build the working-day policy from the configured weekday names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on an unrecognized weekday name.
    pub fn working_day_policy(&self) -> Result<WorkingDayPolicy, ConfigError> {
        let mut excluded = Vec::with_capacity(self.excluded_weekdays.len());
        for name in &self.excluded_weekdays {
            let weekday = Weekday::from_str(name)
                .map_err(|_| ConfigError::Invalid(format!("unknown weekday: {name}")))?;
            excluded.push(weekday);
        }
        Ok(WorkingDayPolicy::new(excluded))
    }

    /// Build the expansion configuration
    #[must_use]
    pub const fn expansion_config(&self) -> ExpansionConfig {
        ExpansionConfig {
            shift_to_working_day: self.shift_to_working_day,
            study_start: self.study_start,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g. "info", "trialcal=debug,rusqlite=warn")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}
