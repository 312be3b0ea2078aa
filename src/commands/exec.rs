//! # Exec Command Implementation
//!
//! Passes an arbitrary argument vector to git in every repository:
//!
//! ```bash
//! mgit exec -- fetch --prune
//! mgit -j 8 exec -- gc --auto
//! ```
//!
//! The command may change repository state, so `--dry-run` prints it instead
//! of running it.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use mgit::operation::Operation;

use super::Context;

/// Run an arbitrary git command in every repository
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Arguments passed to git
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "ARGS"
    )]
    pub args: Vec<String>,
}

/// Execute the `exec` command.
pub fn execute(args: ExecArgs, ctx: &Context) -> Result<ExitCode> {
    ctx.run(Operation::Exec { args: args.args })
}
