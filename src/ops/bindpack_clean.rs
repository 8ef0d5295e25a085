//! The `clean` operation: remove the staging directory.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::manifest::PackageManifest;
use crate::ops::bindpack_build::staging_dir;
use crate::util::config::Config;
use crate::util::fs::remove_dir_all_if_exists;

/// Remove the staging directory. Returns the removed path, or `None` if
/// there was nothing to remove.
///
/// Refuses, before deleting anything, a directory that is the project root,
/// one of its ancestors, or a directory holding build outputs.
pub fn clean(
    manifest: &PackageManifest,
    config: &Config,
    explicit: Option<&Path>,
) -> Result<Option<PathBuf>> {
    let dir = staging_dir(manifest, config, explicit);
    if !dir.exists() {
        tracing::debug!("nothing to clean at {}", dir.display());
        return Ok(None);
    }

    check_removable(manifest, &dir)?;
    remove_dir_all_if_exists(&dir)?;
    tracing::info!("Removed {}", dir.display());
    Ok(Some(dir))
}

/// Ensure removing `dir` cannot take the project or its build outputs with it.
fn check_removable(manifest: &PackageManifest, dir: &Path) -> Result<()> {
    let canonical = dir
        .canonicalize()
        .with_context(|| format!("failed to resolve staging directory: {}", dir.display()))?;

    if manifest.root.starts_with(&canonical) {
        bail!(
            "refusing to remove `{}`: it contains the project at `{}`",
            canonical.display(),
            manifest.root.display()
        );
    }

    for ext in &manifest.extensions {
        for search_dir in manifest.search_dirs(ext) {
            let search_dir = search_dir.canonicalize().unwrap_or(search_dir);
            if search_dir.starts_with(&canonical) {
                bail!(
                    "refusing to remove `{}`: it contains build outputs of `{}` in `{}`",
                    canonical.display(),
                    ext.name,
                    search_dir.display()
                );
            }
        }
    }

    Ok(())
}
