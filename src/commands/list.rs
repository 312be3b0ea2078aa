//! # List Command Implementation
//!
//! Prints the repositories discovery finds, in report order, without running
//! git at all. Handy for checking skip patterns.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use mgit::discovery;
use mgit::report::NO_REPOSITORIES;

use super::{Context, ReportFormat};

/// List discovered repositories
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print absolute paths instead of paths relative to the root
    #[arg(long)]
    pub absolute: bool,
}

/// Execute the `list` command.
pub fn execute(args: ListArgs, ctx: &Context) -> Result<ExitCode> {
    let settings = ctx.settings()?;
    let repositories = discovery::discover(&settings.root, &settings.skip)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match ctx.format {
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &repositories)?;
            writeln!(out)?;
        }
        ReportFormat::Text if repositories.is_empty() => {
            writeln!(out, "{}", NO_REPOSITORIES)?;
        }
        ReportFormat::Text => {
            for repository in &repositories {
                let path = if args.absolute {
                    repository.path.display()
                } else {
                    repository.relative_path.display()
                };
                writeln!(out, "{}\t{}", repository.name, path)?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
