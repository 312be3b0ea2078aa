//! # Diff Command Implementation
//!
//! Runs `git diff` in every repository. `--dirty` hides repositories whose
//! diff output is empty.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use mgit::operation::Operation;

use super::Context;

/// Show changes in every repository
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Only show repositories with a non-empty diff
    #[arg(long)]
    pub dirty: bool,

    /// Extra arguments passed to `git diff`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs, ctx: &Context) -> Result<ExitCode> {
    ctx.run(Operation::Diff {
        args: args.args,
        dirty_only: args.dirty,
    })
}
