//! HEXBOARD CLI - Command-line interface
//!
//! Commands:
//! - generate: Build a hexagon-shaped grid and save it as JSON
//! - inspect: Summarize a saved grid
//! - pick: Resolve a world position to a cell
//! - path: Find a path between two cells

mod generate;
mod inspect;
mod path_cmd;
mod pick;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexboard")]
#[command(about = "HEXBOARD cube-coordinate grid tools")]
struct Cli {
    /// Random seed for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a hexagon-shaped grid
    Generate(generate::GenerateArgs),
    /// Summarize a saved grid
    Inspect(inspect::InspectArgs),
    /// Resolve a world position to a cell
    Pick(pick::PickArgs),
    /// Find a path between two cells
    Path(path_cmd::PathArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => generate::run(args, cli.seed),
        Commands::Inspect(args) => inspect::run(args),
        Commands::Pick(args) => pick::run(args),
        Commands::Path(args) => path_cmd::run(args),
    }
}
