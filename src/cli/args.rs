//! CLI argument definitions using clap
//!
//! Commands:
//! - proforma serve [--config <path>] [--port <port>]
//! - proforma create [--config <path>] --file <path>
//! - proforma list [--config <path>]
//! - proforma get [--config <path>] <id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Proforma - versioned record keeping for proforma documents
#[derive(Parser, Debug)]
#[command(name = "proforma")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (optional)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to bind, overriding config and environment
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store a document read from a JSON file ("-" for stdin)
    Create {
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        file: PathBuf,
    },

    /// Print summaries of every stored document
    List {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the latest version of a document
    Get {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Business identifier, e.g. an invoice number
        id: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
