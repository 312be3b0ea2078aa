//! # mgit CLI
//!
//! This is the binary entry point for the `mgit` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Executing the appropriate command based on the parsed arguments.
//! - Turning the aggregated report into the process exit code.
//!
//! The core logic lives in the `mgit` library crate, so the binary stays a
//! thin wrapper around it.

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    cli.execute()
}
