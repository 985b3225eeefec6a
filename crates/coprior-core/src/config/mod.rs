//! Configuration management for coprior.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults; every struct is `#[serde(default)]` so partial files work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for coprior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Training dataset files
    pub datasets: DatasetsConfig,

    /// Dataloader flags carried through to the merge
    pub dataloader: DataloaderConfig,

    /// Model-side flags that shape dataset preparation
    pub model: ModelConfig,

    /// Prior output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories (XDG on Linux, Application
    /// Support on macOS). Falls back to ~/.coprior/config.toml if directory
    /// detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("io", "coprior", "coprior")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".coprior").join("config.toml")
            })
    }

    /// Resolved training dataset paths (with ~ expansion).
    pub fn train_paths(&self) -> Vec<PathBuf> {
        self.datasets.train.iter().map(|p| expand(p)).collect()
    }

    /// Resolved proposal file paths (with ~ expansion).
    pub fn proposal_paths(&self) -> Vec<PathBuf> {
        self.datasets
            .proposal_files_train
            .iter()
            .map(|p| expand(p))
            .collect()
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.datasets.train.is_empty());
        assert!(config.dataloader.filter_empty_annotations);
        assert!(!config.model.load_proposals);
        assert_eq!(config.output.format, "json");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[datasets]"));
        assert!(toml.contains("[dataloader]"));
        assert!(toml.contains("[model]"));
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[datasets]\ntrain = [\"/data/coco/train.json\"]\n\n[model]\nkeypoint_on = true\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.datasets.train, vec!["/data/coco/train.json"]);
        assert!(config.model.keypoint_on);
        // Untouched sections keep their defaults
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_train_paths_expand_tilde() {
        let mut config = Config::default();
        config.datasets.train = vec!["~/data/train.json".to_string()];
        let paths = config.train_paths();
        assert!(!paths[0].to_string_lossy().starts_with('~'));
    }
}
