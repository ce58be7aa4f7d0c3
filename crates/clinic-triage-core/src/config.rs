//! Layered configuration using Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `./clinic-triage.toml` or an explicit file
//! 3. `CLINIC_TRIAGE_*` environment variables

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::DEFAULT_SERVICE_MINUTES;

/// Default local config file name.
pub const CONFIG_FILE: &str = "clinic-triage.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TriageConfig {
    pub queue: QueueConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Wait estimation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Assumed minutes per patient when throughput is not yet measurable
    pub default_service_minutes: f64,
    /// Trailing window for measured throughput
    pub throughput_window_minutes: u32,
    /// Completions needed inside the window before measured throughput is used
    pub throughput_min_samples: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            default_service_minutes: DEFAULT_SERVICE_MINUTES,
            throughput_window_minutes: 60,
            throughput_min_samples: 5,
        }
    }
}

/// Journal settings. No path means in-memory only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub database_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TriageConfig {
    /// Check semantic constraints; collects every problem instead of failing fast.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut errors = Vec::new();

        let minutes = self.queue.default_service_minutes;
        if !minutes.is_finite() || minutes <= 0.0 {
            errors.push(format!(
                "queue.default_service_minutes must be positive, got {}",
                minutes
            ));
        }

        if self.queue.throughput_window_minutes == 0 {
            errors.push("queue.throughput_window_minutes must be at least 1".to_string());
        }

        if let Some(path) = &self.storage.database_path {
            if path.trim().is_empty() {
                errors.push("storage.database_path must not be empty when set".to_string());
            }
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            errors.push(format!(
                "logging.level `{}` is not one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}

/// Load from defaults, `./clinic-triage.toml`, and environment.
pub fn load_config() -> ConfigResult<TriageConfig> {
    let config: TriageConfig = Figment::new()
        .merge(Serialized::defaults(TriageConfig::default()))
        .merge(Toml::file(CONFIG_FILE))
        .merge(env_provider())
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Load from a TOML string over defaults (no file or env lookup).
pub fn load_config_from_str(toml_content: &str) -> ConfigResult<TriageConfig> {
    let config: TriageConfig = Figment::new()
        .merge(Serialized::defaults(TriageConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Load from a specific file with environment overrides.
pub fn load_config_from_path(path: &Path) -> ConfigResult<TriageConfig> {
    let config: TriageConfig = Figment::new()
        .merge(Serialized::defaults(TriageConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()?;
    config.validate()?;
    Ok(config)
}

/// Map `CLINIC_TRIAGE_<SECTION>_<KEY>` to `section.key`.
///
/// Section names are mapped explicitly because keys themselves contain underscores.
fn env_provider() -> Env {
    Env::prefixed("CLINIC_TRIAGE_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("queue_", "queue.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
