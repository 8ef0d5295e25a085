//! `bindpack metadata` command

use anyhow::Result;

use crate::cli::{GlobalArgs, MetadataArgs};
use bindpack::ops::metadata;

pub fn execute(global: &GlobalArgs, args: MetadataArgs) -> Result<()> {
    let (manifest, _config) = super::load_project(global)?;
    let meta = metadata(&manifest)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }

    println!("name: {}", meta.name);
    println!("version: {}", meta.version);
    if let Some(ref description) = meta.description {
        println!("description: {}", description);
    }
    if let Some(ref url) = meta.url {
        println!("url: {}", url);
    }
    match (&meta.author, &meta.author_email) {
        (Some(author), Some(email)) => println!("author: {} <{}>", author, email),
        (Some(author), None) => println!("author: {}", author),
        (None, Some(email)) => println!("author: <{}>", email),
        (None, None) => {}
    }
    println!("module: {} ({})", meta.module, meta.module_dir.display());
    for ext in &meta.extensions {
        let dirs: Vec<String> = ext
            .search_dirs
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        println!("extension: {} [{}] in {}", ext.name, ext.pattern, dirs.join(", "));
    }

    Ok(())
}
