//! Drives the external Autotools build and stages its outputs.

pub mod autotools;
pub mod errors;
pub mod stage;

pub use autotools::{AutotoolsBuilder, BuildPath};
pub use errors::{BuildError, Step};
pub use stage::{StageOptions, StagedFile, Stager};

use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

/// Run one external command for `step`, requiring a zero exit.
pub(crate) fn run_tool(
    executor: &dyn Executor,
    step: Step,
    cmd: &ProcessBuilder,
) -> Result<ProcessOutput, BuildError> {
    let command = cmd.display_command();
    tracing::info!("Running {}: {}", step, command);

    let output = executor.run(cmd).map_err(|source| BuildError::Spawn {
        step,
        command: command.clone(),
        source,
    })?;

    if !output.success() {
        return Err(BuildError::ToolFailed {
            step,
            command,
            code: output.code,
            stderr: output.stderr_lossy(),
        });
    }

    Ok(output)
}
