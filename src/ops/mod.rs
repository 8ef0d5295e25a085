//! High-level operations behind the CLI commands.

pub mod bindpack_build;
pub mod bindpack_clean;
pub mod bindpack_metadata;

pub use bindpack_build::{build, BuildOptions, BuildReport};
pub use bindpack_clean::clean;
pub use bindpack_metadata::{metadata, ResolvedMetadata};
