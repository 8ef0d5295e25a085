//! bindpack CLI - packages Autotools-built language bindings

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = cli.global.shell(false);

    if let Err(e) = run(cli) {
        shell.error(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Set up logging; RUST_LOG wins when set
    let default_filter = if cli.global.verbose {
        "bindpack=debug"
    } else if cli.global.quiet {
        "bindpack=error"
    } else {
        "bindpack=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Execute command
    match cli.command {
        Commands::Build(args) => commands::build::execute(&cli.global, args),
        Commands::Metadata(args) => commands::metadata::execute(&cli.global, args),
        Commands::Clean(args) => commands::clean::execute(&cli.global, args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
