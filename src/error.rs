//! # Error Handling
//!
//! This module defines the centralized error type for the `mgit` library. It
//! uses `thiserror` to describe every failure that is allowed to escape a
//! library call.
//!
//! Note what is *not* here: a repository whose `git` invocation exits with a
//! non-zero status is not an error. That outcome is recorded as data in an
//! [`ExecutionResult`](crate::executor::ExecutionResult) and surfaces through
//! the report. Only two families of problems propagate as `Error`:
//!
//! - **Environment faults**: the external tool cannot be located or launched
//!   (`ToolNotFound`, `ToolLaunch`), or the worker pool cannot be built.
//! - **Invocation faults**: the caller asked for something malformed, such as
//!   a commit without a message or a concurrency bound of zero.
//!
//! Configuration and link-file problems are reported with the path involved so
//! the user can find the offending file.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for mgit operations
#[derive(Error, Debug)]
pub enum Error {
    /// The external version-control executable could not be found.
    #[error("{tool} not found: {message}")]
    ToolNotFound { tool: String, message: String },

    /// The executable exists but could not be spawned.
    #[error("Failed to launch {tool}: {message}")]
    ToolLaunch { tool: String, message: String },

    /// A required input was not supplied.
    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },

    /// The concurrency bound must be at least one.
    #[error("Invalid job count {value}: at least one job is required")]
    InvalidJobs { value: usize },

    /// The configuration file could not be parsed.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// The link file could not be written.
    #[error("Failed to write link file {}: {message}", path.display())]
    LinkFile { path: PathBuf, message: String },

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {message}")]
    ThreadPool { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl Error {
    /// Whether this error means the tool itself is unusable, as opposed to a
    /// problem with one particular invocation.
    pub fn is_environment_fault(&self) -> bool {
        matches!(self, Error::ToolNotFound { .. } | Error::ToolLaunch { .. })
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
