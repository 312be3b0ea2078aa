//! # Checkout Command Implementation
//!
//! Checks out the same reference in every repository. A reference missing from
//! some repositories is reported per repository with an `ERROR` line but does
//! not fail the invocation unless `--strict` is given.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use mgit::operation::Operation;

use super::Context;

/// Check out a branch or reference in every repository
#[derive(Args, Debug)]
pub struct CheckoutArgs {
    /// Branch, tag or commit to check out
    #[arg(value_name = "REF")]
    pub reference: String,

    /// Create the branch before checking it out
    #[arg(short = 'b', long = "create")]
    pub create: bool,

    /// Exit non-zero if any repository fails to check out
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `checkout` command.
pub fn execute(args: CheckoutArgs, ctx: &Context) -> Result<ExitCode> {
    ctx.run(Operation::Checkout {
        reference: args.reference,
        create: args.create,
        strict: args.strict,
    })
}
