use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::plot::palette::Theme;
use crate::session::derived::MAX_PRECISION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Color theme for the UI and both plots ("light" or "dark").
    pub theme: Theme,
    /// Maximum number of cached plots; 0 keeps all of them.
    pub cache_capacity: usize,
    /// Quiet period after the last keystroke before replotting.
    pub debounce_ms: u64,
    /// Decimal places for derived values.
    pub precision: usize,
    /// Height in terminal rows for plot images.
    pub plot_height: u16,
    pub export_width: u32,
    pub export_height: u32,
    /// Directory for exported images; the working directory when unset.
    pub export_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            cache_capacity: 0,
            debounce_ms: 300,
            precision: 4,
            plot_height: 20,
            export_width: 1200,
            export_height: 900,
            export_dir: None,
        }
    }
}

impl Config {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Path to the config file.
pub fn config_path() -> Option<PathBuf> {
    Some(super::config_dir()?.join("config.toml"))
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: Config = toml::from_str(&content)?;
    config.precision = config.precision.min(MAX_PRECISION);
    Ok(config)
}

/// Load config from disk, returning defaults if the file is missing or invalid.
/// A missing file is created with the defaults.
pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match load_config_from(&path) {
        Ok(config) => config,
        Err(ConfigError::Read { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            let config = Config::default();
            if let Err(e) = save_config_to(&path, &config) {
                warn!("{}", e);
            }
            config
        }
        Err(e) => {
            warn!("using default config: {}", e);
            Config::default()
        }
    }
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let content = format!("# gradscope configuration\n\n{}", toml::to_string_pretty(config)?);
    std::fs::write(path, content).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote config to {}", path.display());
    Ok(())
}

/// Persist `config` to the platform config directory.
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    match config_path() {
        Some(path) => save_config_to(&path, config),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            theme: Theme::Light,
            cache_capacity: 64,
            export_dir: Some(PathBuf::from("/tmp/plots")),
            ..Config::default()
        };
        save_config_to(&path, &config).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = \"light\"\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.cache_capacity, 0);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "theme = \"sepia\"\n").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_precision_is_capped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "precision = 40\n").unwrap();
        assert_eq!(load_config_from(&path).unwrap().precision, MAX_PRECISION);

        std::fs::write(&path, "precision = 9223372036854775807\n").unwrap();
        assert_eq!(load_config_from(&path).unwrap().precision, MAX_PRECISION);
    }
}
