pub mod file;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "yelp-harvest")]
#[command(about = "Collects restaurant listings from the Yelp Fusion API")]
pub struct Cli {
    /// Directory for all generated files (ledger, grid state, snapshots)
    #[arg(long, default_value = "./data")]
    pub output_dir: PathBuf,

    /// Optional TOML config file overriding the built-in Maryland defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the resumable grid-based collection
    Grid,
    /// Generate a fresh grid state file
    InitGrid {
        /// Overwrite an existing grid file, discarding resume progress
        #[arg(long)]
        force: bool,

        /// Override the configured number of grid rows
        #[arg(long)]
        rows: Option<u32>,

        /// Override the configured number of grid columns
        #[arg(long)]
        cols: Option<u32>,
    },
    /// Run the city-list collection
    Locations,
    /// Print statistics over the collected ledger
    Summary,
}
