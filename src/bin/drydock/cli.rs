//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Drydock - a dependency-ordered orchestrator for multi-product native builds
#[derive(Parser)]
#[command(name = "drydock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this project configuration instead of searching for drydock.toml
    #[arg(long, global = true, env = "DRYDOCK_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the execution plan
    Plan(PlanArgs),

    /// Build, test and install products in plan order
    Build(BuildArgs),

    /// List registered products
    Products,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for `drydock plan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlanFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Targets to plan for (defaults to host and cross-compile targets)
    #[arg(long)]
    pub target: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = PlanFormat::Text)]
    pub format: PlanFormat,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Targets to build (defaults to host and cross-compile targets)
    #[arg(long)]
    pub target: Vec<String>,

    /// CMake build variant (Debug, Release, RelWithDebInfo, MinSizeRel)
    #[arg(long)]
    pub variant: Option<String>,

    /// Enable building a product (repeatable)
    #[arg(short, long)]
    pub product: Vec<String>,

    /// Run test phases
    #[arg(long)]
    pub test: bool,

    /// Run install phases for every product
    #[arg(long)]
    pub install: bool,

    /// Number of parallel jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Show which phases would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for build messages (human, json)
    #[arg(long, default_value = "human")]
    pub message_format: String,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
