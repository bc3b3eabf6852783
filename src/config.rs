use std::path::Path;

use crate::error::ConfigError;
use crate::hooks::SaverConfig;
use crate::policy::TabularConfig;
use crate::training::TrainingConfig;

/// Progress display settings.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub enabled: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        ProgressConfig { enabled: true }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub training: TrainingConfig,
    pub progress: ProgressConfig,
    pub checkpoint: SaverConfig,
    pub policy: TabularConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.training.env_name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "training.env_name must not be empty".into(),
            ));
        }
        if self.training.total_timesteps == 0 {
            return Err(ConfigError::Validation(
                "training.total_timesteps must be > 0".into(),
            ));
        }
        if self.training.n_envs == 0 {
            return Err(ConfigError::Validation(
                "training.n_envs must be >= 1".into(),
            ));
        }

        self.checkpoint.validate()?;

        if self.policy.learning_rate <= 0.0 {
            return Err(ConfigError::Validation(
                "policy.learning_rate must be > 0".into(),
            ));
        }
        if self.policy.gamma < 0.0 || self.policy.gamma > 1.0 {
            return Err(ConfigError::Validation(
                "policy.gamma must be in [0, 1]".into(),
            ));
        }
        if self.policy.epsilon < 0.0 || self.policy.epsilon > 1.0 {
            return Err(ConfigError::Validation(
                "policy.epsilon must be in [0, 1]".into(),
            ));
        }

        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}
