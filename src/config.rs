//! Configuration management for storage-folder
//!
//! Layers an optional `folder.toml` with `FOLDER_*` environment overrides.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::storage::{CreationCollisionOption, DEFAULT_MAX_NAME_LENGTH};

const CONFIG_NAME: &str = "folder";
const ENV_PREFIX: &str = "FOLDER";
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Which backend the root folder is opened on
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Directory tree on local disk
    Local,
    /// Ephemeral in-process tree
    Memory,
}

/// Complete storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: BackendKind,

    /// Root directory of the local backend, label of the memory root
    pub root: String,

    /// Create the local root when it is missing
    pub create_root: bool,

    /// Longest accepted item name, in bytes
    pub max_name_length: usize,

    /// Retries for transient permission failures on local disk
    pub io_retries: usize,

    /// Default filter for env_logger, `RUST_LOG` still wins
    pub log_level: String,

    /// Collision option used by the CLI when a command names none
    pub default_collision: CreationCollisionOption,
}

/// Limits handed to every backend handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendLimits {
    pub max_name_length: usize,
    pub io_retries: usize,
}

impl Default for BackendLimits {
    fn default() -> Self {
        Self {
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            io_retries: 3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let limits = BackendLimits::default();
        Self {
            backend: BackendKind::Local,
            root: "./storage_root".to_string(),
            create_root: true,
            max_name_length: limits.max_name_length,
            io_retries: limits.io_retries,
            log_level: "info".to_string(),
            default_collision: CreationCollisionOption::FailIfExists,
        }
    }
}

impl StorageConfig {
    /// Load configuration from `folder.toml` (if present) with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::build(File::with_name(CONFIG_NAME).required(false))
    }

    /// Load configuration from an explicit TOML file with environment overrides
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let name = path.to_string_lossy();
        Self::build(File::new(&name, FileFormat::Toml).required(true))
    }

    fn build<T>(file: T) -> Result<Self, config::ConfigError>
    where
        T: config::Source + Send + Sync + 'static,
    {
        let defaults = StorageConfig::default();
        let settings = Config::builder()
            .set_default("backend", "local")?
            .set_default("root", defaults.root.as_str())?
            .set_default("create_root", defaults.create_root)?
            .set_default("max_name_length", defaults.max_name_length as i64)?
            .set_default("io_retries", defaults.io_retries as i64)?
            .set_default("log_level", defaults.log_level.as_str())?
            .set_default("default_collision", "fail_if_exists")?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: StorageConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.backend == BackendKind::Local && self.root.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "root cannot be empty for the local backend".into(),
            ));
        }

        if self.max_name_length == 0 {
            return Err(config::ConfigError::Message(
                "max_name_length must be greater than 0".into(),
            ));
        }

        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(config::ConfigError::Message(format!(
                "log_level must be one of {:?}",
                LOG_LEVELS
            )));
        }

        Ok(())
    }

    /// Get root as PathBuf
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    pub fn limits(&self) -> BackendLimits {
        BackendLimits {
            max_name_length: self.max_name_length,
            io_retries: self.io_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = StorageConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits(), BackendLimits::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StorageConfig::default();
        config.max_name_length = 0;
        assert!(config.validate().is_err());

        let mut config = StorageConfig::default();
        config.root = "  ".into();
        assert!(config.validate().is_err());

        let mut config = StorageConfig::default();
        config.log_level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_root_allowed_for_memory_backend() {
        let mut config = StorageConfig::default();
        config.backend = BackendKind::Memory;
        config.root = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "backend = \"memory\"\n\
             root = \"scratch\"\n\
             max_name_length = 64\n\
             default_collision = \"generate_unique_name\""
        )
        .unwrap();

        let config = StorageConfig::load_from(file.path()).unwrap();
        assert_eq!(config.backend, BackendKind::Memory);
        assert_eq!(config.root, "scratch");
        assert_eq!(config.max_name_length, 64);
        assert_eq!(config.io_retries, 3);
        assert_eq!(
            config.default_collision,
            CreationCollisionOption::GenerateUniqueName
        );
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = StorageConfig::load_from(Path::new("/definitely/not/here.toml"));
        assert!(result.is_err());
    }
}
