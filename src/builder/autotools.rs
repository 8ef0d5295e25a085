//! Autotools adapter for projects with a generated binding subdirectory.
//!
//! The pipeline is strictly linear: ensure a configure script exists,
//! configure with the binding target enabled, then build. Building tries the
//! binding subdirectory alone first and falls back to the whole project when
//! that make run fails.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::builder::errors::{BuildError, Step};
use crate::builder::run_tool;
use crate::core::interpreter::Interpreter;
use crate::core::manifest::PackageManifest;
use crate::core::platform::PlatformTag;
use crate::util::process::{resolve_tool, Executor, ProcessBuilder};

/// Which build invocation produced the outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPath {
    /// Only the binding subdirectory was rebuilt
    Fast,
    /// The fast path failed and the whole project was built
    Full,
}

/// Autotools build adapter.
pub struct AutotoolsBuilder<'a> {
    manifest: &'a PackageManifest,
    executor: &'a dyn Executor,
    make: PathBuf,
    inherited: BTreeMap<String, String>,
}

impl<'a> AutotoolsBuilder<'a> {
    /// Create a new Autotools builder.
    pub fn new(manifest: &'a PackageManifest, executor: &'a dyn Executor) -> Self {
        AutotoolsBuilder {
            manifest,
            executor,
            make: PathBuf::from("make"),
            inherited: inherited_env(),
        }
    }

    /// Set the make program.
    pub fn make(mut self, make: impl AsRef<Path>) -> Self {
        self.make = resolve_tool(make.as_ref());
        self
    }

    /// Replace the environment configure overrides are merged with.
    pub fn inherited_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.inherited = env;
        self
    }

    fn root(&self) -> &Path {
        &self.manifest.root
    }

    pub fn configure_script(&self) -> PathBuf {
        self.root().join(&self.manifest.build.configure)
    }

    pub fn bootstrap_script(&self) -> PathBuf {
        self.root().join(&self.manifest.build.bootstrap)
    }

    /// Run the bootstrap script if no configure script exists.
    ///
    /// Returns whether bootstrap ran.
    pub fn ensure_configured(&self) -> Result<bool, BuildError> {
        let configure = self.configure_script();
        if configure.exists() {
            tracing::debug!("found {}, skipping bootstrap", configure.display());
            return Ok(false);
        }

        let cmd = ProcessBuilder::new(self.bootstrap_script()).cwd(self.root());
        run_tool(self.executor, Step::Bootstrap, &cmd)?;

        if !configure.exists() {
            return Err(BuildError::MissingConfigure { path: configure });
        }
        Ok(true)
    }

    /// The configure invocation for `interpreter` on `platform`.
    ///
    /// The interpreter version reaches configure through the child's
    /// environment only.
    pub fn configure_command(&self, interpreter: &Interpreter, platform: &PlatformTag) -> ProcessBuilder {
        let build = &self.manifest.build;

        ProcessBuilder::new(self.configure_script())
            .cwd(self.root())
            .arg(&build.binding_flag)
            .arg(format!("{}={}", build.libs_var, interpreter.libdir.display()))
            .args(
                build
                    .platform_overrides
                    .extra_args_inheriting(platform, |var| self.inherited.get(var).cloned()),
            )
            .env(&build.version_env, &interpreter.version)
    }

    /// Run configure. A non-zero exit is fatal.
    pub fn configure(&self, interpreter: &Interpreter, platform: &PlatformTag) -> Result<(), BuildError> {
        let cmd = self.configure_command(interpreter, platform);
        run_tool(self.executor, Step::Configure, &cmd)?;
        Ok(())
    }

    /// Build the binding subdirectory, falling back to a full build when the
    /// subdirectory build exits unsuccessfully.
    ///
    /// Only [`BuildError::ToolFailed`] triggers the fallback; any other
    /// error is returned as-is.
    pub fn build(&self) -> Result<BuildPath, BuildError> {
        let binding_dir = self.root().join(&self.manifest.build.binding_dir);
        let fast = ProcessBuilder::new(&self.make).arg("-C").arg(&binding_dir);

        match run_tool(self.executor, Step::FastBuild, &fast) {
            Ok(_) => Ok(BuildPath::Fast),
            Err(err) if err.is_tool_failure() => {
                tracing::warn!("{}; building the whole project instead", err_summary(&err));
                let full = ProcessBuilder::new(&self.make).arg("-C").arg(self.root());
                run_tool(self.executor, Step::FullBuild, &full)?;
                Ok(BuildPath::Full)
            }
            Err(err) => Err(err),
        }
    }
}

/// The current process environment, skipping non-UTF-8 entries.
fn inherited_env() -> BTreeMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

/// First line of an error, for log output.
fn err_summary(err: &BuildError) -> String {
    err.to_string().lines().next().unwrap_or_default().to_string()
}
