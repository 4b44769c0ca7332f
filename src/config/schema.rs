//! Configuration schema for sdpcache
//!
//! Configuration is stored at `~/.config/sdpcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Artifact store settings
    pub store: StoreConfig,

    /// External solver settings
    pub solver: SolverConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Where relaxations and observable data are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Persist relaxations between runs
    pub enabled: bool,

    /// Output directory (platform data directory if unset)
    pub output_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: None,
        }
    }
}

/// Solver program invoked by `run`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Display name used in logs
    pub name: String,

    /// Executable reading a relaxation on stdin and printing a solution
    pub command: Option<String>,

    /// Extra arguments
    pub args: Vec<String>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            name: "external".to_string(),
            command: None,
            args: Vec::new(),
        }
    }
}
