//! Bindpack.toml manifest parsing and schema.
//!
//! The manifest declares the packaging metadata of a project: what the
//! package is called, where its version comes from, which importable module
//! it ships, and which compiled extension artifacts get staged. The `[build]`
//! section describes how the project's Autotools build is driven.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::platform::PlatformTable;
use crate::util::scm::scm_version;

/// Manifest file name, looked up at the project root.
pub const MANIFEST_NAME: &str = "Bindpack.toml";

/// Default shared-object file name pattern.
pub const SHARED_OBJECT_PATTERN: &str = "*.so*";

/// Errors locating or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("could not find `Bindpack.toml` in `{}` or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },

    #[error("failed to parse manifest at `{}`", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid manifest: {0}")]
    Invalid(String),
}

/// The `[package]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageMetadata {
    /// Distribution name
    pub name: String,

    /// Static version; derived from source control when absent
    #[serde(default)]
    pub version: Option<Version>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub author_email: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Long description file, relative to the project root
    #[serde(default)]
    pub readme: Option<PathBuf>,

    /// The single importable module shipped by the package
    pub module: String,

    /// Directory holding the module's sources, relative to the project root
    pub module_dir: PathBuf,
}

/// A compiled binding artifact and the directories its outputs land in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtensionDescriptor {
    pub name: String,

    /// Build output directories, relative to the project root
    pub search_dirs: Vec<PathBuf>,

    /// File name pattern selecting shared objects
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

fn default_pattern() -> String {
    SHARED_OBJECT_PATTERN.to_string()
}

impl ExtensionDescriptor {
    pub fn new(name: impl Into<String>, search_dirs: Vec<PathBuf>) -> Self {
        ExtensionDescriptor {
            name: name.into(),
            search_dirs,
            pattern: default_pattern(),
        }
    }
}

/// The `[build]` section: how the Autotools build is driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSection {
    /// Script that generates `configure`, relative to the project root
    pub bootstrap: PathBuf,

    /// Configure script, relative to the project root
    pub configure: PathBuf,

    /// Flag that enables the binding target
    pub binding_flag: String,

    /// Subdirectory built on the fast path
    pub binding_dir: PathBuf,

    /// Configure variable receiving the interpreter's library directory
    pub libs_var: String,

    /// Environment variable carrying the interpreter version to configure
    pub version_env: String,

    /// Extra configure arguments keyed on the platform tag
    pub platform_overrides: PlatformTable,
}

impl Default for BuildSection {
    fn default() -> Self {
        BuildSection {
            bootstrap: PathBuf::from("reconf"),
            configure: PathBuf::from("configure"),
            binding_flag: "--with-python".to_string(),
            binding_dir: PathBuf::from("swig/python"),
            libs_var: "PYTHON_LIBS".to_string(),
            version_env: "PYTHON_VERSION".to_string(),
            platform_overrides: PlatformTable::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ManifestToml {
    package: PackageMetadata,

    #[serde(default, rename = "extension")]
    extensions: Vec<ExtensionDescriptor>,

    #[serde(default)]
    build: BuildSection,
}

/// A loaded and validated manifest.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    /// Absolute project root (the manifest's directory)
    pub root: PathBuf,
    pub package: PackageMetadata,
    pub extensions: Vec<ExtensionDescriptor>,
    pub build: BuildSection,
}

impl PackageManifest {
    /// Load a manifest from a `Bindpack.toml` path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let root = root
            .canonicalize()
            .with_context(|| format!("failed to resolve project root: {}", root.display()))?;

        Ok(Self::parse(&contents, path, root)?)
    }

    /// Parse manifest text for a project rooted at `root`.
    pub fn parse(contents: &str, path: &Path, root: PathBuf) -> Result<Self, ManifestError> {
        let raw: ManifestToml = toml::from_str(contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = PackageManifest {
            root,
            package: raw.package,
            extensions: raw.extensions,
            build: raw.build,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.package.name.trim().is_empty() {
            return Err(ManifestError::Invalid("package.name is empty".into()));
        }
        if self.package.module.trim().is_empty() {
            return Err(ManifestError::Invalid("package.module is empty".into()));
        }
        if self.extensions.is_empty() {
            return Err(ManifestError::Invalid(
                "at least one [[extension]] must be declared".into(),
            ));
        }
        for ext in &self.extensions {
            if ext.search_dirs.is_empty() {
                return Err(ManifestError::Invalid(format!(
                    "extension `{}` has no search-dirs",
                    ext.name
                )));
            }
            if glob::Pattern::new(&ext.pattern).is_err() {
                return Err(ManifestError::Invalid(format!(
                    "extension `{}` has an invalid pattern `{}`",
                    ext.name, ext.pattern
                )));
            }
        }
        Ok(())
    }

    /// Resolve an extension's search directories against the project root.
    pub fn search_dirs(&self, ext: &ExtensionDescriptor) -> Vec<PathBuf> {
        ext.search_dirs.iter().map(|d| self.root.join(d)).collect()
    }

    pub fn module_dir(&self) -> PathBuf {
        self.root.join(&self.package.module_dir)
    }

    /// The package version: the static one if declared, else derived from
    /// the repository state.
    pub fn version(&self) -> Result<String> {
        if let Some(ref version) = self.package.version {
            return Ok(version.to_string());
        }
        let version = scm_version(&self.root).context(
            "could not derive the version from source control; set `package.version`",
        )?;
        Ok(version.to_string())
    }

    /// Read the long description from the readme, if one is declared.
    pub fn long_description(&self) -> Result<Option<String>> {
        match self.package.readme {
            Some(ref readme) => {
                let path = self.root.join(readme);
                crate::util::fs::read_to_string(&path).map(Some)
            }
            None => Ok(None),
        }
    }
}
