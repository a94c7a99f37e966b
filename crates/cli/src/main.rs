//! Benchcharts CLI entry point.

use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    match benchcharts_cli::run() {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
