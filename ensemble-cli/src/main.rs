//! Ensemble — agent configuration bundle deployment CLI.
//!
//! # Usage
//!
//! ```text
//! ensemble init [--source URL|PATH] [--branch B] [--backup | --merge | --force]
//!               [--dry-run] [--agents-only | --commands-only | --skills-only] [--select]
//! ensemble update [COMPONENT] [--dry-run] [--force] [--source ...] [--branch ...]
//! ensemble status [--json] [--files]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, status::StatusArgs, update::UpdateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ensemble",
    version,
    about = "Deploy agent configuration bundles into a project's .claude directory",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deploy a bundle into the current project for the first time.
    Init(InitArgs),

    /// Re-deploy from the previously recorded source, preserving additions.
    Update(UpdateArgs),

    /// Show the persisted deployment record.
    Status(StatusArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Update(args) => args.run(),
        Commands::Status(args) => args.run(),
    }
}
