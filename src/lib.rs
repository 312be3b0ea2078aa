//! # mgit Library
//!
//! This library discovers git repositories nested under a directory and runs
//! the same git operation in each of them, with a bounded number of
//! concurrent invocations, collecting everything into one deterministic
//! report. It backs the `mgit` command-line tool but can be driven directly.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::io;
//! use std::path::PathBuf;
//!
//! use mgit::config::{ConfigFile, Overrides, Settings};
//! use mgit::operation::Operation;
//! use mgit::workspace::Workspace;
//!
//! let settings = Settings::resolve(
//!     PathBuf::from("/src"),
//!     ConfigFile::default(),
//!     Overrides { jobs: Some(4), ..Overrides::default() },
//! )
//! .unwrap();
//!
//! let workspace = Workspace::open(&settings, false).unwrap();
//! let report = workspace
//!     .run(&Operation::Log { args: vec!["-n".into(), "1".into()] }, &mut io::stderr())
//!     .unwrap();
//! println!("exit code {}", report.overall_exit_code);
//! ```
//!
//! ## Core Concepts
//!
//! - **Discovery (`discovery`)**: A single walk of the directory tree that
//!   stops at every directory containing `.git` and never enters skipped
//!   directories (dependency and build folders by default).
//! - **Execution (`executor`)**: The git executable behind a small [`Tool`]
//!   trait, with a dry-run stand-in that prints what would run.
//! - **Dispatch (`dispatch`)**: A fixed-size worker pool that runs one request
//!   per repository and returns results in request order.
//! - **Commit chaining (`chain`)**: Sequential commits where each message
//!   carries a `Chained-From: <repo>@<commit>` trailer pointing at the commit
//!   made just before it in a sibling repository.
//! - **Reporting (`report`)**: `project: <name>` blocks in canonical order and
//!   an overall exit code derived from the per-repository outcomes.
//!
//! [`Tool`]: executor::Tool

pub mod chain;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod git;
pub mod operation;
pub mod output;
pub mod report;
pub mod workspace;

#[cfg(test)]
mod testing;

#[cfg(test)]
mod dispatch_proptest;
