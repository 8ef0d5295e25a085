//! `bindpack build` command

use std::time::Instant;

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalArgs};
use bindpack::builder::BuildPath;
use bindpack::core::{InterpreterOverrides, PlatformTag};
use bindpack::ops::{build, BuildOptions};
use bindpack::util::process::SystemExecutor;
use bindpack::util::shell::{format_duration, Status};

pub fn execute(global: &GlobalArgs, args: BuildArgs) -> Result<()> {
    let shell = global.shell(args.json);
    let (manifest, config) = super::load_project(global)?;

    let opts = BuildOptions {
        relocatable: args.relocatable,
        staging_dir: args.staging_dir,
        platform_tag: args.platform_tag.map(PlatformTag::new),
        interpreter: InterpreterOverrides {
            version: args.python_version,
            libdir: args.python_libdir,
        },
    };

    let start = Instant::now();
    shell.status(
        Status::Building,
        format!("{} ({})", manifest.package.name, manifest.root.display()),
    );

    let report = build(&manifest, &config, &opts, &SystemExecutor)?;

    if shell.is_json() {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for file in &report.files {
        if shell.is_verbose() {
            shell.status(
                Status::Staged,
                format!(
                    "{} ({} bytes, sha256 {})",
                    file.destination.display(),
                    file.size,
                    file.sha256
                ),
            );
        } else {
            shell.status(Status::Staged, file.destination.display());
        }
    }
    if report.files.is_empty() {
        shell.warn("no artifacts matched any search directory");
    }

    let path = match report.build_path {
        BuildPath::Fast => "binding",
        BuildPath::Full => "full",
    };
    shell.status(
        Status::Finished,
        format!(
            "`{}` for {} ({} file(s), {} build) in {}",
            report.package,
            report.platform,
            report.files.len(),
            path,
            format_duration(start.elapsed())
        ),
    );

    Ok(())
}
