//! Persistent configuration for erlix.
//!
//! Loads/saves a TOML config at `~/.erlix/config.toml`.

use crate::ErlixError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level erlix configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErlixConfig {
    pub paths: PathsConfig,
    pub indexing: IndexingConfig,
}

impl ErlixConfig {
    /// Load configuration from the given path.
    pub fn load(path: &Path) -> Result<Self, ErlixError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ErlixError::Config(e.to_string()))
    }

    /// Save configuration to the given path.
    pub fn save(&self, path: &Path) -> Result<(), ErlixError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ErlixError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from the default path, or return defaults if the file doesn't exist.
    pub fn load_or_default() -> Self {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path).unwrap_or_default()
        } else {
            Self::default()
        }
    }

    /// Default config path: `~/.erlix/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".erlix")
            .join("config.toml")
    }
}

/// Project layout: where source units live and which subtrees to skip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Application source roots, in resolution order.
    pub app_dirs: Vec<PathBuf>,
    /// Dependency roots (e.g., a `deps/` or `_build/default/lib` tree).
    pub deps_dirs: Vec<PathBuf>,
    /// Root of the OTP installation, for standard-library indexing.
    pub otp_dir: Option<PathBuf>,
    /// Directory names excluded from walks wherever they appear.
    pub exclude_dirs: Vec<String>,
}

impl PathsConfig {
    /// Ordered search roots for single-file resolution: application roots
    /// first, then dependencies, then OTP.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        let mut roots = self.app_dirs.clone();
        roots.extend(self.deps_dirs.iter().cloned());
        if let Some(otp) = &self.otp_dir {
            roots.push(otp.clone());
        }
        roots
    }
}

/// Indexing pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Number of concurrent worker-pool executors.
    pub pool_size: usize,
    /// Whether bulk indexing covers dependency roots.
    pub index_deps: bool,
    /// Whether bulk indexing covers the OTP tree.
    pub index_otp: bool,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            pool_size: 10,
            index_deps: true,
            index_otp: false,
        }
    }
}
