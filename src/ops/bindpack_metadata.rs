//! The `metadata` operation: resolve the declared packaging metadata.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::core::manifest::{ExtensionDescriptor, PackageManifest};

/// Packaging metadata with the version resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMetadata {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    pub module: String,
    pub module_dir: PathBuf,
    pub extensions: Vec<ExtensionDescriptor>,
}

/// Resolve `manifest`'s metadata, deriving the version if needed.
pub fn metadata(manifest: &PackageManifest) -> Result<ResolvedMetadata> {
    let package = &manifest.package;

    Ok(ResolvedMetadata {
        name: package.name.clone(),
        version: manifest.version()?,
        url: package.url.clone(),
        author: package.author.clone(),
        author_email: package.author_email.clone(),
        description: package.description.clone(),
        long_description: manifest.long_description()?,
        module: package.module.clone(),
        module_dir: manifest.module_dir(),
        extensions: manifest.extensions.clone(),
    })
}
