//! CLI argument definitions using clap
//!
//! Commands:
//! - tourbase serve --config <path> [--port <port>] [--seed <fixture>]
//! - tourbase validate --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tourbase - a REST API for tours, reviews, and bookings
#[derive(Parser, Debug)]
#[command(name = "tourbase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./tourbase.toml")]
        config: PathBuf,

        /// Port to bind to (overrides the config file)
        #[arg(long)]
        port: Option<u16>,

        /// Seed the store from a JSON fixture file before serving
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Load and validate the configuration, then exit
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./tourbase.toml")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
