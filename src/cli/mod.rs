//! CLI module for the proforma store
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - create: Store a document from a JSON file
//! - list: Print document summaries
//! - get: Print the latest version of a document

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{create, get, list, load_config, load_config_with, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_document, write_json};
