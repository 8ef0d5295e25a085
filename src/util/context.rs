//! Global context for bindpack operations.
//!
//! Provides centralized access to configuration and paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::manifest::{ManifestError, MANIFEST_NAME};
use crate::util::config::{load_config, project_config_path, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global bindpack data (~/.bindpack/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = crate::util::config::global_config_dir()
            .unwrap_or_else(|| PathBuf::from(".bindpack"));

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    ///
    /// A relative `cwd` is taken from the process working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = ctx.cwd.join(cwd);
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the bindpack home directory (~/.bindpack/).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Load the merged global + project configuration for a project root.
    pub fn load_config(&self, project_root: &Path) -> Config {
        load_config(&self.config_path(), &project_config_path(project_root))
    }

    /// Find `Bindpack.toml` starting from cwd and searching upward.
    pub fn find_manifest(&self) -> Result<PathBuf, ManifestError> {
        let mut current = self.cwd.clone();
        loop {
            let candidate = current.join(MANIFEST_NAME);
            if candidate.is_file() {
                return Ok(candidate);
            }
            if !current.pop() {
                return Err(ManifestError::NotFound {
                    dir: self.cwd.clone(),
                });
            }
        }
    }
}
