//! Command implementations

pub mod build;
pub mod clean;
pub mod completions;
pub mod metadata;

use anyhow::Result;

use crate::cli::GlobalArgs;
use bindpack::core::PackageManifest;
use bindpack::util::{Config, GlobalContext};

/// Locate and load the project manifest and its merged configuration.
pub fn load_project(global: &GlobalArgs) -> Result<(PackageManifest, Config)> {
    let ctx = match global.manifest_dir {
        Some(ref dir) => GlobalContext::with_cwd(dir.clone())?,
        None => GlobalContext::new()?,
    };

    let manifest_path = ctx.find_manifest()?;
    let manifest = PackageManifest::load(&manifest_path)?;
    let config = ctx.load_config(&manifest.root);

    Ok((manifest, config))
}
