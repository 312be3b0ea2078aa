//! # Log Command Implementation

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use mgit::operation::Operation;

use super::Context;

/// Show commit logs of every repository
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Extra arguments passed to `git log` (e.g. `-- -n 3 --oneline`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Execute the `log` command.
pub fn execute(args: LogArgs, ctx: &Context) -> Result<ExitCode> {
    ctx.run(Operation::Log { args: args.args })
}
