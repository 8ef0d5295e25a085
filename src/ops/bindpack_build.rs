//! The `build` operation: configure, build, and stage binding artifacts.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::{AutotoolsBuilder, BuildPath, StageOptions, StagedFile, Stager};
use crate::core::interpreter::{Interpreter, InterpreterOverrides};
use crate::core::manifest::PackageManifest;
use crate::core::platform::PlatformTag;
use crate::util::config::Config;
use crate::util::process::Executor;

/// Options for the build operation. Unset values fall back to config.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Rewrite the search path of staged files
    pub relocatable: bool,

    /// Staging directory; relative paths are taken from the project root
    pub staging_dir: Option<PathBuf>,

    /// Platform tag used for the configure override table
    pub platform_tag: Option<PlatformTag>,

    /// Explicit interpreter facts
    pub interpreter: InterpreterOverrides,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub package: String,
    pub platform: PlatformTag,
    /// Whether the bootstrap script had to generate configure
    pub bootstrapped: bool,
    pub build_path: BuildPath,
    pub staging_dir: PathBuf,
    pub relocatable: bool,
    pub files: Vec<StagedFile>,
}

/// Resolve the staging directory for `manifest`.
pub fn staging_dir(manifest: &PackageManifest, config: &Config, explicit: Option<&Path>) -> PathBuf {
    let dir = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.staging_dir());
    if dir.is_absolute() {
        dir
    } else {
        manifest.root.join(dir)
    }
}

/// Run the packaging pipeline.
///
/// ensure-config -> configure -> build (fast, else full) -> stage. Any
/// failure before staging aborts without touching the staging directory.
pub fn build(
    manifest: &PackageManifest,
    config: &Config,
    opts: &BuildOptions,
    executor: &dyn Executor,
) -> Result<BuildReport> {
    let builder = AutotoolsBuilder::new(manifest, executor).make(config.make());

    let bootstrapped = builder.ensure_configured()?;

    let interpreter = Interpreter::resolve(executor, &config.python(), &opts.interpreter)
        .context("failed to determine the target interpreter")?;
    let platform = interpreter.platform_tag(opts.platform_tag.as_ref());
    tracing::info!(
        "Configuring {} for interpreter {} on {}",
        manifest.package.name,
        interpreter.version,
        platform
    );

    builder.configure(&interpreter, &platform)?;
    let build_path = builder.build()?;

    let relocatable = opts.relocatable || config.relocatable();
    let stage_opts = StageOptions::new(staging_dir(manifest, config, opts.staging_dir.as_deref()))
        .with_relocatable(relocatable)
        .with_rpath(config.rpath())
        .with_patchelf(config.patchelf());
    let stager = Stager::new(executor, stage_opts);
    let files = stager.stage_all(manifest)?;

    if files.is_empty() {
        tracing::warn!("build succeeded but no artifacts matched any search directory");
    }
    tracing::info!(
        "Staged {} file(s) into {}",
        files.len(),
        stager.options().staging_dir.display()
    );

    Ok(BuildReport {
        package: manifest.package.name.clone(),
        platform,
        bootstrapped,
        build_path,
        staging_dir: stager.options().staging_dir.clone(),
        relocatable,
        files,
    })
}
