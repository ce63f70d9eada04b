//! Proforma CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, and exits non-zero on
//! failure. All logic lives in `cli`.

use proforma::cli;
use proforma::observability::Logger;

fn main() {
    if let Err(e) = cli::run() {
        Logger::fatal(e.code_str(), &[("message", e.message())]);
        std::process::exit(1);
    }
}
