// ReadFocus configuration loader
// Loads, saves and resets the extension configuration.
// The configuration is a JSON file at the platform-specific config path.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::platform;
use crate::types::config::ExtensionConfig;
use crate::types::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Trait defining the configuration loader interface.
pub trait ConfigLoaderTrait {
    fn load(&mut self) -> Result<ExtensionConfig, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn get_config(&self) -> &ExtensionConfig;
    fn update(&mut self, config: ExtensionConfig) -> Result<(), ConfigError>;
    fn reset(&mut self) -> Result<(), ConfigError>;
    fn get_config_path(&self) -> &Path;
}

pub struct ConfigLoader {
    config_path: PathBuf,
    config: ExtensionConfig,
}

impl ConfigLoader {
    /// Creates a loader for `path_override`, or `config.json` in the platform config dir.
    pub fn new(path_override: Option<PathBuf>) -> Self {
        let config_path =
            path_override.unwrap_or_else(|| platform::get_config_dir().join(CONFIG_FILE_NAME));
        Self {
            config_path,
            config: ExtensionConfig::default(),
        }
    }
}

impl ConfigLoaderTrait for ConfigLoader {
    /// Missing file means defaults. A malformed file is an error.
    fn load(&mut self) -> Result<ExtensionConfig, ConfigError> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            self.config = ExtensionConfig::default();
            return Ok(self.config.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::Io(format!("Failed to read config file: {}", e)))?;
        self.config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config file: {}", e)))?;
        debug!(path = %self.config_path.display(), "Loaded config");
        Ok(self.config.clone())
    }

    fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Io(format!("Failed to create config directory: {}", e))
            })?;
        }
        let json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        fs::write(&self.config_path, json)
            .map_err(|e| ConfigError::Io(format!("Failed to write config file: {}", e)))
    }

    fn get_config(&self) -> &ExtensionConfig {
        &self.config
    }

    /// Replaces the whole configuration and saves it.
    fn update(&mut self, config: ExtensionConfig) -> Result<(), ConfigError> {
        self.config = config;
        self.save()
    }

    fn reset(&mut self) -> Result<(), ConfigError> {
        self.config = ExtensionConfig::default();
        self.save()
    }

    fn get_config_path(&self) -> &Path {
        &self.config_path
    }
}
