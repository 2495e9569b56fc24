//! Toolshed configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main toolshed configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage locations
    pub storage: StorageConfig,

    /// Execution limits
    pub exec: ExecConfig,
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must load or the call fails. Otherwise the first
    /// readable candidate wins: project-local `.toolshed.yml`, then
    /// `~/.config/toolshed/toolshed.yml`, then built-in defaults. An
    /// unreadable candidate is skipped with a warning rather than masking
    /// the ones after it.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let candidates = [
            Some(PathBuf::from(".toolshed.yml")),
            dirs::config_dir().map(|dir| dir.join("toolshed").join("toolshed.yml")),
        ];

        for candidate in candidates.into_iter().flatten() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Storage locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for the registry, history, artifacts, and clones
    #[serde(rename = "base-dir")]
    pub base_dir: PathBuf,
}

impl StorageConfig {
    pub fn registry_path(&self) -> PathBuf {
        self.base_dir.join("registry.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.base_dir.join("history.json")
    }

    /// Output directory holding artifacts and ephemeral temp files
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("toolshed");
        Self { base_dir }
    }
}

/// Execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Per-invocation timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl ExecConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self { timeout_secs: 300 }
    }
}
