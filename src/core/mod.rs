//! Core types: the package manifest, platform tags, and the target interpreter.

pub mod interpreter;
pub mod manifest;
pub mod platform;

pub use interpreter::{Interpreter, InterpreterOverrides};
pub use manifest::{ExtensionDescriptor, PackageManifest, PackageMetadata};
pub use platform::{PlatformRule, PlatformTable, PlatformTag};
