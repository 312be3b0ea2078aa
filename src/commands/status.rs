//! # Status Command Implementation
//!
//! Runs `git status --short --branch` in every repository. With `--dirty`,
//! repositories without local modifications are left out of the report; they
//! still count toward the exit code if their status query failed.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use mgit::operation::Operation;

use super::Context;

/// Show the working tree status of every repository
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Only show repositories with local modifications
    #[arg(long)]
    pub dirty: bool,

    /// Extra arguments passed to `git status`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs, ctx: &Context) -> Result<ExitCode> {
    ctx.run(Operation::Status {
        args: args.args,
        dirty_only: args.dirty,
    })
}
