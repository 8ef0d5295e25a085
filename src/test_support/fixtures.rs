//! Test fixtures for common test scenarios.
//!
//! Builds on-disk Autotools project layouts: a manifest, an optional
//! configure script, and build output directories pre-populated the way a
//! finished `make` would leave them.

use std::path::{Path, PathBuf};

use crate::core::manifest::{PackageManifest, MANIFEST_NAME};

/// Fixture for an Autotools project with a binding subdirectory.
#[derive(Debug, Clone)]
pub struct ProjectFixture {
    /// Bindpack.toml content.
    pub manifest: String,
    /// Whether a `configure` script already exists.
    pub configured: bool,
    /// Build outputs (path relative to project root -> content).
    pub outputs: Vec<(PathBuf, String)>,
}

impl ProjectFixture {
    /// A gensio-like project: one extension searched in
    /// `swig/python/.libs` and `lib/.libs`.
    pub fn gensio() -> Self {
        ProjectFixture {
            manifest: r#"[package]
name = "gensio"
version = "2.8.0"
description = "stream and packet I/O framework"
module = "gensio"
module-dir = "swig/python"

[[extension]]
name = "gensio"
search-dirs = ["swig/python/.libs", "lib/.libs"]
"#
            .to_string(),
            configured: true,
            outputs: Vec::new(),
        }
    }

    /// Set whether the configure script exists.
    pub fn configured(mut self, configured: bool) -> Self {
        self.configured = configured;
        self
    }

    /// Add a build output file.
    pub fn output(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.outputs.push((path.into(), content.into()));
        self
    }

    /// The usual libtool output of a gensio build: binding module, core
    /// library with its versioned names, and non-shared-object noise.
    pub fn with_typical_outputs(self) -> Self {
        self.output("swig/python/.libs/_gensio.so", "binding")
            .output("swig/python/.libs/_gensio.la", "libtool archive")
            .output("swig/python/.libs/gensio_wrap.o", "object")
            .output("lib/.libs/libgensio.so", "core")
            .output("lib/.libs/libgensio.so.0", "core")
            .output("lib/.libs/libgensio.so.0.0.0", "core")
            .output("lib/.libs/libgensio.a", "static")
    }

    /// Write the fixture into `root`.
    pub fn write(&self, root: &Path) {
        std::fs::create_dir_all(root).unwrap();
        std::fs::write(root.join(MANIFEST_NAME), &self.manifest).unwrap();
        if self.configured {
            std::fs::write(root.join("configure"), "#!/bin/sh\n").unwrap();
        }
        for (rel, content) in &self.outputs {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    /// Write the fixture and load its manifest.
    pub fn load(&self, root: &Path) -> PackageManifest {
        self.write(root);
        PackageManifest::load(&root.join(MANIFEST_NAME)).unwrap()
    }
}

/// File names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
