// src/config/loader.rs
//! Layered configuration loader
//!
//! Precedence, lowest first: built-in defaults, each existing config file in
//! discovery order, then `VENT_*` environment variables.

use crate::config::{constants::paths, SimulatorConfig};
use crate::utils::validation::ValidationError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Inconsistent configuration: {}", .0.join("; "))]
    Inconsistent(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Merges defaults, config files and environment overrides
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
    env_prefix: String,
    current_config: SimulatorConfig,
}

impl ConfigLoader {
    /// Loader over the standard search paths
    pub fn new() -> Self {
        Self::with_paths(Self::discover_config_paths())
    }

    /// Loader over explicit paths, later paths taking precedence
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
            env_prefix: paths::ENV_PREFIX.to_string(),
            current_config: SimulatorConfig::default(),
        }
    }

    /// Append one more file on top of the discovered ones
    pub fn add_path<P: Into<PathBuf>>(&mut self, path: P) {
        self.config_paths.push(path.into());
    }

    /// Override the environment prefix (tests use a private prefix)
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Load, merge and validate
    pub fn load(&mut self) -> Result<SimulatorConfig, ConfigError> {
        let config = self.load_and_merge_configs()?;
        info!(profile = ?config.profile, "configuration loaded");
        self.current_config = config.clone();
        Ok(config)
    }

    /// Last successfully loaded configuration
    pub fn current(&self) -> &SimulatorConfig {
        &self.current_config
    }

    pub fn config_paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    /// Validate one file on top of the defaults without loading it
    pub fn validate_config_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let mut merged = Self::defaults_value()?;
        Self::merge_toml_values(&mut merged, Self::load_config_file(path)?);
        Self::finish(merged).map(|_| ())
    }

    /// Export the current configuration as TOML
    pub fn export_config<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let toml_content = toml::to_string_pretty(&self.current_config)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    fn load_and_merge_configs(&self) -> Result<SimulatorConfig, ConfigError> {
        let mut merged_config = Self::defaults_value()?;

        for config_path in &self.config_paths {
            match Self::load_config_file(config_path) {
                Ok(file_config) => {
                    debug!(path = %config_path.display(), "merging config file");
                    Self::merge_toml_values(&mut merged_config, file_config);
                }
                // Missing search-path entries are optional
                Err(ConfigError::FileNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        self.apply_environment_overrides(&mut merged_config, std::env::vars());
        Self::finish(merged_config)
    }

    fn defaults_value() -> Result<toml::Value, ConfigError> {
        Ok(toml::Value::try_from(SimulatorConfig::default())?)
    }

    fn finish(merged: toml::Value) -> Result<SimulatorConfig, ConfigError> {
        let config: SimulatorConfig = merged.try_into()?;
        config.validate()?;
        config
            .validate_consistency()
            .map_err(ConfigError::Inconsistent)?;
        Ok(config)
    }

    fn load_config_file<P: AsRef<Path>>(path: P) -> Result<toml::Value, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: toml::Value = toml::from_str(&content)?;

        Ok(config)
    }

    fn merge_toml_values(base: &mut toml::Value, overlay: toml::Value) {
        match (base, overlay) {
            (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
                for (key, value) in overlay_table {
                    if let Some(base_value) = base_table.get_mut(&key) {
                        Self::merge_toml_values(base_value, value);
                    } else {
                        base_table.insert(key, value);
                    }
                }
            }
            (base_value, overlay_value) => {
                *base_value = overlay_value;
            }
        }
    }

    /// `VENT_VENTILATOR_PEEP=8` sets `ventilator.peep`. Underscores are
    /// matched against existing table names, so
    /// `VENT_MONITORING_ALARM_LIMITS_PIP_MAX` reaches
    /// `monitoring.alarm_limits.pip_max` and `VENT_PROFILE` sets a
    /// top-level key.
    fn apply_environment_overrides<I>(&self, config: &mut toml::Value, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let toml::Value::Table(root) = config else {
            return;
        };

        for (key, value) in vars {
            let Some(name) = key.strip_prefix(&self.env_prefix) else {
                continue;
            };
            debug!(variable = %key, "environment override");
            Self::set_override(root, &name.to_lowercase(), Self::parse_env_value(&value));
        }
    }

    fn set_override(table: &mut toml::value::Table, name: &str, value: toml::Value) {
        let nested = name
            .match_indices('_')
            .map(|(i, _)| (&name[..i], &name[i + 1..]))
            .find(|(prefix, _)| matches!(table.get(*prefix), Some(toml::Value::Table(_))));

        match nested {
            Some((prefix, rest)) => {
                if let Some(toml::Value::Table(inner)) = table.get_mut(prefix) {
                    Self::set_override(inner, rest, value);
                }
            }
            None => {
                table.insert(name.to_string(), value);
            }
        }
    }

    fn parse_env_value(value: &str) -> toml::Value {
        if let Ok(int_val) = value.parse::<i64>() {
            toml::Value::Integer(int_val)
        } else if let Ok(float_val) = value.parse::<f64>() {
            toml::Value::Float(float_val)
        } else if let Ok(bool_val) = value.parse::<bool>() {
            toml::Value::Boolean(bool_val)
        } else {
            toml::Value::String(value.to_string())
        }
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(paths::SYSTEM_CONFIG_PATH)];

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(paths::USER_CONFIG_DIR).join("config.toml"));
        }

        paths.push(PathBuf::from(paths::DEFAULT_CONFIG_FILE));
        paths.push(PathBuf::from(paths::LOCAL_CONFIG_FILE));

        paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn home_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var_os("USERPROFILE").map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var_os("HOME").map(PathBuf::from)
        }
    }
}
