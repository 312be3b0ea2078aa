//! Operations that fan out identically to every repository.
//!
//! Commit is not here: it needs per-repository state and ordering and lives in
//! [`crate::chain`].

use crate::error::{Error, Result};
use crate::executor::ExecutionResult;
use crate::git::{self, WorkingTreeStatus};
use crate::report::FailurePolicy;

/// Decides whether a successful result shows local modifications.
pub type DirtyFilter = fn(&ExecutionResult) -> bool;

/// A repository-independent operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `git status --short --branch`, optionally showing only dirty repositories.
    Status { args: Vec<String>, dirty_only: bool },
    /// `git log` with extra arguments.
    Log { args: Vec<String> },
    /// `git diff`, optionally showing only repositories with a non-empty diff.
    Diff { args: Vec<String>, dirty_only: bool },
    /// Arbitrary git subcommand.
    Exec { args: Vec<String> },
    /// `git checkout [-b] <reference>`.
    Checkout {
        reference: String,
        create: bool,
        strict: bool,
    },
}

impl Operation {
    /// Reject malformed operations before any repository is touched.
    pub fn validate(&self) -> Result<()> {
        match self {
            Operation::Exec { args } if args.is_empty() => Err(Error::MissingArgument {
                name: "git arguments for exec".to_string(),
            }),
            Operation::Checkout { reference, .. } if reference.trim().is_empty() => {
                Err(Error::MissingArgument {
                    name: "<REF>".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Argument vector passed to the tool for each repository.
    pub fn argv(&self) -> Vec<String> {
        let with = |base: &[&str], extra: &[String]| -> Vec<String> {
            base.iter()
                .map(|s| s.to_string())
                .chain(extra.iter().cloned())
                .collect()
        };
        match self {
            Operation::Status { args, .. } => with(&["status", "--short", "--branch"], args),
            Operation::Log { args } => with(&["log"], args),
            Operation::Diff { args, .. } => with(&["diff"], args),
            Operation::Exec { args } => args.clone(),
            Operation::Checkout {
                reference, create, ..
            } => git::checkout(reference, *create),
        }
    }

    /// Whether the operation may change repository state, and therefore
    /// honors dry-run.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Operation::Exec { .. } | Operation::Checkout { .. })
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        match self {
            Operation::Checkout { strict: false, .. } => FailurePolicy::Lenient,
            _ => FailurePolicy::Strict,
        }
    }

    /// Predicate used by the dirty-only filter, when it is requested.
    pub fn dirty_filter(&self) -> Option<DirtyFilter> {
        match self {
            Operation::Status {
                dirty_only: true, ..
            } => Some(status_is_dirty as DirtyFilter),
            Operation::Diff {
                dirty_only: true, ..
            } => Some(diff_is_dirty as DirtyFilter),
            _ => None,
        }
    }
}

fn status_is_dirty(result: &ExecutionResult) -> bool {
    WorkingTreeStatus::parse(&result.stdout).is_dirty()
}

fn diff_is_dirty(result: &ExecutionResult) -> bool {
    !result.stdout.trim().is_empty()
}
