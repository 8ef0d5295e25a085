//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use bindpack::util::shell::{ColorChoice, Shell};

/// bindpack - Packages Autotools-built language bindings
#[derive(Parser)]
#[command(name = "bindpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// Build the output shell; `json` suppresses human output.
    pub fn shell(&self, json: bool) -> Shell {
        Shell::from_flags(self.quiet, self.verbose, self.color, json)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure, build, and stage the binding artifacts
    Build(BuildArgs),

    /// Show the packaging metadata with the resolved version
    Metadata(MetadataArgs),

    /// Remove the staging directory
    Clean(CleanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Rewrite the runtime search path of staged files to be self-relative
    #[arg(long)]
    pub relocatable: bool,

    /// Staging directory (relative to the project root)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Platform tag used to select configure overrides
    #[arg(long, value_name = "TAG", env = "BINDPACK_PLATFORM_TAG")]
    pub platform_tag: Option<String>,

    /// Interpreter version passed to configure (skips probing when paired with --python-libdir)
    #[arg(long, value_name = "VERSION")]
    pub python_version: Option<String>,

    /// Interpreter library directory passed to configure
    #[arg(long, value_name = "DIR")]
    pub python_libdir: Option<PathBuf>,

    /// Print the build report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct MetadataArgs {
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Staging directory (relative to the project root)
    #[arg(long, value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: CompletionShell,
}
