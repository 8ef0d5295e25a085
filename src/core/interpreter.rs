//! The target interpreter whose bindings are being packaged.
//!
//! Configure needs the interpreter's version and library directory. Both can
//! be given explicitly; whatever is missing is read from the interpreter's
//! `sysconfig` in a single run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::platform::PlatformTag;
use crate::util::process::{resolve_tool, Executor, ProcessBuilder};

/// Prints version, LIBDIR and SOABI on separate lines.
pub const SYSCONFIG_SCRIPT: &str = "import sysconfig\n\
print(sysconfig.get_python_version())\n\
print(sysconfig.get_config_var('LIBDIR') or '')\n\
print(sysconfig.get_config_var('SOABI') or '')\n";

/// Interpreter facts passed to the native configure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    /// `major.minor` version, e.g. `3.11`
    pub version: String,

    /// Directory holding the interpreter's runtime library
    pub libdir: PathBuf,

    /// ABI tag, e.g. `cpython-311-x86_64-linux-gnu`
    pub soabi: Option<String>,
}

/// Explicit values that take precedence over probing.
#[derive(Debug, Clone, Default)]
pub struct InterpreterOverrides {
    pub version: Option<String>,
    pub libdir: Option<PathBuf>,
}

impl Interpreter {
    /// Parse the output of [`SYSCONFIG_SCRIPT`].
    pub fn parse_sysconfig_output(stdout: &str) -> Result<Self> {
        let mut lines = stdout.lines().map(str::trim);

        let version = lines.next().unwrap_or_default();
        if version.is_empty() {
            bail!("interpreter printed no version");
        }
        let libdir = lines.next().unwrap_or_default();
        if libdir.is_empty() {
            bail!("interpreter has no LIBDIR configured");
        }
        let soabi = lines
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Interpreter {
            version: version.to_string(),
            libdir: PathBuf::from(libdir),
            soabi,
        })
    }

    /// Run `python` once and read its sysconfig.
    pub fn query(executor: &dyn Executor, python: &Path) -> Result<Self> {
        let cmd = ProcessBuilder::new(resolve_tool(python))
            .arg("-c")
            .arg(SYSCONFIG_SCRIPT);

        tracing::debug!("querying interpreter `{}`", python.display());
        let output = executor
            .run(&cmd)
            .with_context(|| format!("failed to run interpreter `{}`", python.display()))?;
        if !output.success() {
            bail!(
                "interpreter `{}` exited with {:?}\n{}",
                python.display(),
                output.code,
                output.stderr_lossy()
            );
        }

        Self::parse_sysconfig_output(&output.stdout_lossy())
    }

    /// Use the overrides, querying only when one of them is missing.
    pub fn resolve(
        executor: &dyn Executor,
        python: &Path,
        overrides: &InterpreterOverrides,
    ) -> Result<Self> {
        if let (Some(version), Some(libdir)) = (&overrides.version, &overrides.libdir) {
            return Ok(Interpreter {
                version: version.clone(),
                libdir: libdir.clone(),
                soabi: None,
            });
        }

        let queried = Self::query(executor, python)?;
        Ok(Interpreter {
            version: overrides.version.clone().unwrap_or(queried.version),
            libdir: overrides.libdir.clone().unwrap_or(queried.libdir),
            soabi: queried.soabi,
        })
    }

    /// Platform tag to evaluate overrides against: the explicit tag, else
    /// the interpreter's ABI tag, else the host.
    pub fn platform_tag(&self, explicit: Option<&PlatformTag>) -> PlatformTag {
        if let Some(tag) = explicit {
            return tag.clone();
        }
        match self.soabi {
            Some(ref soabi) => PlatformTag::new(soabi.clone()),
            None => PlatformTag::host(),
        }
    }
}
