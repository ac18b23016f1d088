// Configuration management with layered configuration (file, env)

use crate::hasher::{DEFAULT_COST, DEFAULT_MIN_COST};
use crate::record::{Algorithm, PRIMITIVE_MAX_COST, PRIMITIVE_MIN_COST};
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `PASSHASH__HASHER__DEFAULT_COST=12`
pub const ENV_PREFIX: &str = "PASSHASH";

/// Main settings structure containing all configuration options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hasher: HasherSettings,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherSettings {
    /// Cost used when the caller does not pick one
    pub default_cost: u32,
    /// Lowest cost `hash` accepts
    pub min_cost: u32,
    /// Revision written into new records
    pub algorithm: Algorithm,
}

impl Default for HasherSettings {
    fn default() -> Self {
        Self {
            default_cost: DEFAULT_COST,
            min_cost: DEFAULT_MIN_COST,
            algorithm: Algorithm::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Layered sources: `default.toml` → `local.toml` → `PASSHASH__*` env vars
///
/// Exposed so binaries can deserialize their own settings type from the same
/// layers.
pub fn layered_builder<P: AsRef<Path>>(
    config_dir: P,
) -> ConfigBuilder<config::builder::DefaultState> {
    let config_dir = config_dir.as_ref();

    Config::builder()
        .add_source(File::from(config_dir.join("default.toml")).required(false))
        // Local overrides (not committed to git)
        .add_source(File::from(config_dir.join("local.toml")).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
}

impl Settings {
    /// Load configuration from `./config`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from_path<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        layered_builder(config_dir).build()?.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), String> {
        self.hasher.validate()?;

        if self.observability.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }
}

impl HasherSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_cost < PRIMITIVE_MIN_COST {
            return Err(format!(
                "Hasher min_cost must be at least {}",
                PRIMITIVE_MIN_COST
            ));
        }
        if self.min_cost > PRIMITIVE_MAX_COST {
            return Err(format!(
                "Hasher min_cost must be at most {}",
                PRIMITIVE_MAX_COST
            ));
        }
        if self.default_cost < self.min_cost {
            return Err(format!(
                "Hasher default_cost {} is below min_cost {}",
                self.default_cost, self.min_cost
            ));
        }
        if self.default_cost > PRIMITIVE_MAX_COST {
            return Err(format!(
                "Hasher default_cost must be at most {}",
                PRIMITIVE_MAX_COST
            ));
        }

        Ok(())
    }
}
