//! # Commit Command Implementation
//!
//! Commits pending changes in every repository that has any.
//!
//! ## Chained commits
//!
//! With `--chain`, repositories are committed one after another in report
//! order and every commit after the first records the previous one:
//!
//! ```text
//! Chained-From: <previous-repository>@<previous-commit-id>
//! ```
//!
//! `--link-file` additionally writes `<repository> <commit-id>` lines for every
//! repository committed in this run.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use log::info;

use mgit::chain::CommitOptions;

use super::Context;

/// Commit pending changes, optionally chaining the commits together
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Commit message
    #[arg(short, long, required = true, value_name = "MSG")]
    pub message: String,

    /// Stage all modifications, including untracked files, before committing
    #[arg(short, long)]
    pub add: bool,

    /// Amend the previous commit instead of creating a new one
    #[arg(long)]
    pub amend: bool,

    /// Commit sequentially, linking each commit to the previous repository's
    #[arg(long)]
    pub chain: bool,

    /// Write `<repository> <commit-id>` lines for the new commits to this file
    #[arg(long, value_name = "PATH")]
    pub link_file: Option<PathBuf>,
}

/// Execute the `commit` command.
pub fn execute(args: CommitArgs, ctx: &Context) -> Result<ExitCode> {
    let options = CommitOptions {
        message: args.message,
        add: args.add,
        amend: args.amend,
        chain: args.chain,
        link_file: args.link_file,
    };
    // Fail on a blank message before discovery
    options.validate()?;

    let workspace = ctx.workspace()?;
    let outcome = workspace.commit(&options, &mut io::stderr())?;
    info!("{} repositories committed", outcome.links.len());
    let code = ctx.emit(&outcome.report)?;

    // Commits are already made: report them before failing on the link file
    if let Some(err) = outcome.link_file_error {
        return Err(err.into());
    }
    Ok(code)
}
