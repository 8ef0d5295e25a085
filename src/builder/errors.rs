//! Build pipeline error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline step an external command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Bootstrap,
    Configure,
    FastBuild,
    FullBuild,
    RpathRewrite,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Bootstrap => "bootstrap",
            Step::Configure => "configure",
            Step::FastBuild => "binding build",
            Step::FullBuild => "full build",
            Step::RpathRewrite => "rpath rewrite",
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised by a pipeline step.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The tool could not be started at all.
    #[error("{step} failed: could not run `{command}`")]
    Spawn {
        step: Step,
        command: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{step} failed: `{command}` exited with {}\n{stderr}", display_code(.code))]
    ToolFailed {
        step: Step,
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Bootstrap succeeded but left no configure script behind.
    #[error("bootstrap succeeded but `{}` does not exist", .path.display())]
    MissingConfigure { path: PathBuf },

    /// The staging directory is one of the directories artifacts are
    /// collected from.
    #[error(
        "staging directory `{}` is also a search directory of extension `{extension}`",
        .staging_dir.display()
    )]
    StagingIsSearchDir {
        staging_dir: PathBuf,
        extension: String,
    },

    /// A matched artifact could not be staged.
    #[error("failed to stage `{}` into `{}`", .source_path.display(), .staging_dir.display())]
    Stage {
        source_path: PathBuf,
        staging_dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Whether this is the recoverable class: the tool ran and failed.
    pub fn is_tool_failure(&self) -> bool {
        matches!(self, BuildError::ToolFailed { .. })
    }

    pub fn step(&self) -> Option<Step> {
        match self {
            BuildError::Spawn { step, .. } | BuildError::ToolFailed { step, .. } => Some(*step),
            BuildError::MissingConfigure { .. } => Some(Step::Bootstrap),
            BuildError::StagingIsSearchDir { .. } | BuildError::Stage { .. } => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}
