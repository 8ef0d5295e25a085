//! Staging of compiled extension artifacts.
//!
//! Every file matching an extension's pattern in each of its search
//! directories is copied flat into the staging directory. In relocatable
//! mode each copy has its runtime search path rewritten right after it lands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::builder::errors::{BuildError, Step};
use crate::builder::run_tool;
use crate::core::manifest::{ExtensionDescriptor, PackageManifest};
use crate::util::config::ORIGIN_RPATH;
use crate::util::fs::{copy_into, ensure_dir, matching_files};
use crate::util::hash::sha256_file;
use crate::util::process::{resolve_tool, Executor, ProcessBuilder};

/// Options for staging artifacts.
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Destination directory for staged artifacts
    pub staging_dir: PathBuf,

    /// Rewrite the runtime search path of each staged file
    pub relocatable: bool,

    /// Search path written in relocatable mode
    pub rpath: String,

    /// ELF patching tool
    pub patchelf: PathBuf,
}

impl StageOptions {
    /// Create baseline (non-relocatable) options for a staging directory.
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        StageOptions {
            staging_dir: staging_dir.into(),
            relocatable: false,
            rpath: ORIGIN_RPATH.to_string(),
            patchelf: PathBuf::from("patchelf"),
        }
    }

    /// Set relocatable mode.
    pub fn with_relocatable(mut self, relocatable: bool) -> Self {
        self.relocatable = relocatable;
        self
    }

    /// Set the search path written in relocatable mode.
    pub fn with_rpath(mut self, rpath: impl Into<String>) -> Self {
        self.rpath = rpath.into();
        self
    }

    /// Set the patchelf program.
    pub fn with_patchelf(mut self, patchelf: impl AsRef<Path>) -> Self {
        self.patchelf = resolve_tool(patchelf.as_ref());
        self
    }
}

/// A file placed in the staging directory.
#[derive(Debug, Clone, Serialize)]
pub struct StagedFile {
    /// Extension the file was staged for
    pub extension: String,

    /// Where the build left it
    pub source: PathBuf,

    /// Where it was copied to
    pub destination: PathBuf,

    /// Size in bytes after staging
    pub size: u64,

    /// SHA256 of the staged file
    pub sha256: String,

    /// Whether the runtime search path was rewritten
    pub rpath_rewritten: bool,
}

/// Copies build outputs into the staging directory.
pub struct Stager<'a> {
    executor: &'a dyn Executor,
    opts: StageOptions,
}

impl<'a> Stager<'a> {
    pub fn new(executor: &'a dyn Executor, opts: StageOptions) -> Self {
        Stager { executor, opts }
    }

    pub fn options(&self) -> &StageOptions {
        &self.opts
    }

    /// Stage every declared extension of `manifest`.
    ///
    /// Fails before copying anything if the staging directory is one of the
    /// search directories.
    pub fn stage_all(&self, manifest: &PackageManifest) -> Result<Vec<StagedFile>> {
        ensure_dir(&self.opts.staging_dir)?;
        self.check_disjoint(manifest)?;

        let mut staged = Vec::new();
        for ext in &manifest.extensions {
            staged.extend(self.stage_extension(manifest, ext)?);
        }
        Ok(staged)
    }

    fn check_disjoint(&self, manifest: &PackageManifest) -> Result<(), BuildError> {
        let staging = normalize(&self.opts.staging_dir);
        for ext in &manifest.extensions {
            if manifest
                .search_dirs(ext)
                .iter()
                .any(|dir| normalize(dir) == staging)
            {
                return Err(BuildError::StagingIsSearchDir {
                    staging_dir: self.opts.staging_dir.clone(),
                    extension: ext.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Stage the outputs of one extension into the existing staging dir.
    fn stage_extension(
        &self,
        manifest: &PackageManifest,
        ext: &ExtensionDescriptor,
    ) -> Result<Vec<StagedFile>> {
        let mut staged: Vec<StagedFile> = Vec::new();
        for dir in manifest.search_dirs(ext) {
            if !dir.is_dir() {
                tracing::warn!(
                    "search directory for `{}` does not exist: {}",
                    ext.name,
                    dir.display()
                );
                continue;
            }

            let matches = matching_files(&dir, &ext.pattern)?;
            tracing::debug!(
                "{} file(s) matching `{}` in {}",
                matches.len(),
                ext.pattern,
                dir.display()
            );

            for source in matches {
                let Some(file) = self.stage_file(&ext.name, &source)? else {
                    continue;
                };
                if staged.iter().any(|s| s.destination == file.destination) {
                    tracing::warn!(
                        "{} overwrote an earlier staged file of the same name",
                        source.display()
                    );
                    staged.retain(|s| s.destination != file.destination);
                }
                staged.push(file);
            }
        }

        Ok(staged)
    }

    /// Copy one file and, in relocatable mode, rewrite its search path.
    ///
    /// Returns `None` when the source already is the staged file, e.g. a
    /// build output symlinked into the staging directory.
    fn stage_file(&self, extension: &str, source: &Path) -> Result<Option<StagedFile>> {
        let staging_dir = &self.opts.staging_dir;

        if let Some(name) = source.file_name() {
            let destination = staging_dir.join(name);
            if destination.exists() && normalize(&destination) == normalize(source) {
                tracing::warn!(
                    "{} resolves to its own staging destination, leaving it untouched",
                    source.display()
                );
                return Ok(None);
            }
        }

        // Symlinks are followed: the copy is a regular file.
        let destination = copy_into(source, staging_dir).map_err(|err| BuildError::Stage {
            source_path: source.to_path_buf(),
            staging_dir: staging_dir.clone(),
            source: err,
        })?;
        tracing::debug!("Copied {} -> {}", source.display(), destination.display());

        if self.opts.relocatable {
            self.rewrite_rpath(&destination)?;
        }

        let size = std::fs::metadata(&destination)
            .with_context(|| format!("failed to stat {}", destination.display()))?
            .len();

        Ok(Some(StagedFile {
            extension: extension.to_string(),
            source: source.to_path_buf(),
            sha256: sha256_file(&destination)?,
            destination,
            size,
            rpath_rewritten: self.opts.relocatable,
        }))
    }

    /// Set the runtime search path of a staged file.
    ///
    /// A self-relative path lets the loader resolve dependencies next to the
    /// file, so anything placed in that directory at load time is trusted.
    pub fn rewrite_rpath(&self, lib_path: &Path) -> Result<(), BuildError> {
        let cmd = ProcessBuilder::new(&self.opts.patchelf)
            .arg("--set-rpath")
            .arg(&self.opts.rpath)
            .arg(lib_path);

        run_tool(self.executor, Step::RpathRewrite, &cmd)?;
        tracing::debug!("Set RPATH to {} for {}", self.opts.rpath, lib_path.display());
        Ok(())
    }
}

/// Canonical form of `path`, or `path` itself when it does not exist.
fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
