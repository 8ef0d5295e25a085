//! bindpack - Packages Autotools-built language bindings
//!
//! Drives a project's existing Autotools build with its binding target
//! enabled, then stages the compiled shared objects for distribution,
//! optionally rewriting their runtime search path to be self-relative.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for bindpack unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides a recording [`util::process::Executor`] and on-disk project
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{ExtensionDescriptor, PackageManifest, PlatformTag};
pub use util::context::GlobalContext;
