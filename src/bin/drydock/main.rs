//! Drydock CLI - orchestrate multi-product native builds

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("drydock=debug")
    } else {
        EnvFilter::new("drydock=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let global = commands::GlobalArgs {
        verbose: cli.verbose,
        color: !cli.no_color,
        config: cli.config,
    };

    // Execute command
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(&global, args),
        Commands::Build(args) => commands::build::execute(&global, args),
        Commands::Products => commands::products::execute(),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
