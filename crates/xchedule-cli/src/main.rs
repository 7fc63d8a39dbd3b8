//! xchedule CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "xchedule")]
#[command(about = "Build event trees from schedule configuration", long_about = None)]
struct Cli {
    /// Directory searched for referenced event files
    /// [default: directory of the root file]
    #[arg(long, global = true, env = "XCHEDULE_WORKSPACE")]
    workspace: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an event tree and print it
    Show {
        /// Root event file (yaml, json, toml or kdl)
        path: PathBuf,
    },
    /// Check that an event tree builds
    Validate {
        /// Root event file (yaml, json, toml or kdl)
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { path } => {
            commands::show(&path, cli.workspace)?;
        }
        Commands::Validate { path } => {
            commands::validate(&path, cli.workspace)?;
        }
    }

    Ok(())
}
