//! Loader configuration file
//!
//! One TOML file, `config.toml` under the platform config directory, or the
//! path given with `-c` / `LOGOCACHE_CONFIG`. A missing file means defaults;
//! a file that fails to parse is an error rather than a silent fallback.
//! Relative paths inside the file (`placeholders.assets_dir`) are resolved
//! against the directory holding it.

pub mod schema;

pub use schema::Config;

use crate::error::{LogoError, LogoResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes the loader's config file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Use an explicit config file instead of the platform default
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// `<config dir>/logocache/config.toml`, or `./logocache/config.toml`
    /// on platforms without a config directory
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("logocache")
            .join("config.toml")
    }

    /// Read the config file, or defaults when there is none
    pub async fn load(&self) -> LogoResult<Config> {
        let exists = fs::try_exists(&self.config_path).await.map_err(|e| {
            LogoError::io(format!("checking {}", self.config_path.display()), e)
        })?;
        if !exists {
            debug!(
                "No config at {}, using built-in fetch and placeholder defaults",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    pub async fn load_from_file(&self, path: &Path) -> LogoResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| LogoError::io(format!("reading config from {}", path.display()), e))?;

        let mut config: Config = toml::from_str(&content).map_err(|e| LogoError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let (Some(dir), Some(base)) = (config.placeholders.assets_dir.as_mut(), path.parent()) {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }

        Ok(config)
    }

    /// Write `config` as TOML, creating the parent directory if needed
    pub async fn save(&self, config: &Config) -> LogoResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| LogoError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            LogoError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Wrote loader config to {}", self.config_path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
