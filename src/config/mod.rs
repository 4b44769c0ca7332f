//! Configuration management for sdpcache

pub mod schema;

pub use schema::Config;

use crate::error::{SdpError, SdpResult};
use crate::relaxation::ExternalSolver;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "SDPCACHE_CONFIG";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sdpcache")
            .join("config.toml")
    }

    /// Get the default artifact directory
    pub fn default_output_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sdpcache")
            .join("artifacts")
    }

    /// Load configuration, using defaults if the file does not exist
    pub fn load(&self) -> SdpResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(&self, path: &Path) -> SdpResult<Config> {
        let content = fs::read_to_string(path)
            .map_err(|e| SdpError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| SdpError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub fn save(&self, config: &Config) -> SdpResult<()> {
        self.ensure_config_dir()?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).map_err(|e| {
            SdpError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    fn ensure_config_dir(&self) -> SdpResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| SdpError::ConfigDirCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Artifact directory: explicit override, then config, then platform default.
    /// `None` when persistence is disabled and nothing was passed explicitly.
    pub fn output_dir(&self, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(dir) = explicit {
            return Some(dir.to_path_buf());
        }
        if !self.store.enabled {
            return None;
        }
        Some(
            self.store
                .output_dir
                .clone()
                .unwrap_or_else(ConfigManager::default_output_dir),
        )
    }

    /// Solver process from the `[solver]` section, if a command is set
    pub fn external_solver(&self) -> Option<ExternalSolver> {
        self.solver.command.as_ref().map(|command| {
            ExternalSolver::new(&self.solver.name, command, self.solver.args.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().unwrap();
        assert_eq!(config.general.log_format, "text");
        assert!(config.external_solver().is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.solver.command = Some("sdp-solve".to_string());
        config.store.output_dir = Some(temp.path().join("artifacts"));

        manager.save(&config).unwrap();
        let loaded = manager.load().unwrap();

        assert_eq!(loaded.solver.command.as_deref(), Some("sdp-solve"));
        assert_eq!(loaded.output_dir(None), Some(temp.path().join("artifacts")));
        assert_eq!(loaded.external_solver().unwrap().name(), "external");
    }

    #[test]
    fn invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[store\nenabled = ").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().unwrap_err();
        match err {
            SdpError::ConfigInvalid { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn output_dir_precedence() {
        let mut config = Config::default();
        let explicit = PathBuf::from("/tmp/explicit");
        assert_eq!(config.output_dir(Some(&explicit)), Some(explicit.clone()));
        assert_eq!(config.output_dir(None), Some(ConfigManager::default_output_dir()));

        config.store.enabled = false;
        assert_eq!(config.output_dir(None), None);
        assert_eq!(config.output_dir(Some(&explicit)), Some(explicit));
    }
}
