//! Configuration file support for bindpack.
//!
//! bindpack reads two optional configuration files:
//! - Global: `~/.bindpack/config.toml` - User-wide defaults
//! - Project: `.bindpack/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default runtime search path written by the relocatable staging mode.
pub const ORIGIN_RPATH: &str = "$ORIGIN";

/// Default staging directory, relative to the project root.
pub const DEFAULT_STAGING_DIR: &str = "build/lib";

/// bindpack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External tool locations
    pub tools: ToolsConfig,

    /// Staging settings
    pub stage: StageConfig,
}

/// External tool locations. Bare names are looked up in PATH.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Make program (default: `make`)
    pub make: Option<PathBuf>,

    /// ELF patching tool (default: `patchelf`)
    pub patchelf: Option<PathBuf>,

    /// Interpreter queried for version and library directory (default: `python3`)
    pub python: Option<PathBuf>,
}

/// Staging-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Staging directory, relative to the project root
    pub dir: Option<PathBuf>,

    /// Rewrite the runtime search path of staged objects (default: false)
    pub relocatable: Option<bool>,

    /// Search path written in relocatable mode
    pub rpath: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.tools.make.is_some() {
            self.tools.make = other.tools.make;
        }
        if other.tools.patchelf.is_some() {
            self.tools.patchelf = other.tools.patchelf;
        }
        if other.tools.python.is_some() {
            self.tools.python = other.tools.python;
        }

        if other.stage.dir.is_some() {
            self.stage.dir = other.stage.dir;
        }
        if other.stage.relocatable.is_some() {
            self.stage.relocatable = other.stage.relocatable;
        }
        if other.stage.rpath.is_some() {
            self.stage.rpath = other.stage.rpath;
        }
    }

    pub fn make(&self) -> PathBuf {
        self.tools
            .make
            .clone()
            .unwrap_or_else(|| PathBuf::from("make"))
    }

    pub fn patchelf(&self) -> PathBuf {
        self.tools
            .patchelf
            .clone()
            .unwrap_or_else(|| PathBuf::from("patchelf"))
    }

    pub fn python(&self) -> PathBuf {
        self.tools
            .python
            .clone()
            .unwrap_or_else(|| PathBuf::from("python3"))
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.stage
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR))
    }

    pub fn relocatable(&self) -> bool {
        self.stage.relocatable.unwrap_or(false)
    }

    pub fn rpath(&self) -> String {
        self.stage
            .rpath
            .clone()
            .unwrap_or_else(|| ORIGIN_RPATH.to_string())
    }
}

/// Get the global bindpack config directory (~/.bindpack).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".bindpack"))
}

/// Get the project config path (.bindpack/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".bindpack").join("config.toml")
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.bindpack/config.toml)
/// 2. Global config (~/.bindpack/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}
