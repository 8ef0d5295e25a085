//! `bindpack clean` command

use anyhow::Result;

use crate::cli::{CleanArgs, GlobalArgs};
use bindpack::ops::clean;
use bindpack::util::shell::Status;

pub fn execute(global: &GlobalArgs, args: CleanArgs) -> Result<()> {
    let shell = global.shell(false);
    let (manifest, config) = super::load_project(global)?;

    match clean(&manifest, &config, args.staging_dir.as_deref())? {
        Some(dir) => shell.status(Status::Removed, dir.display()),
        None => shell.status(Status::Skipped, "nothing to clean"),
    }

    Ok(())
}
