//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `mgit`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct with the command-specific arguments, derived using `clap`.
//! - An `execute` function that takes the parsed `Args` plus the shared
//!   [`Context`] built from the global flags, and returns the exit code.
//!
//! Commands that fan out over repositories open a [`Workspace`] through the
//! context and hand the resulting report back to [`Context::emit`].

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::ValueEnum;
use ::log::debug;

use mgit::config::{self, Overrides, Settings};
use mgit::operation::Operation;
use mgit::output::OutputConfig;
use mgit::report::Report;
use mgit::workspace::Workspace;

pub mod checkout;
pub mod commit;
pub mod completions;
pub mod diff;
pub mod exec;
pub mod list;
pub mod log;
pub mod status;

/// How the report is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum ReportFormat {
    /// One `project: <name>` block per repository
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Global options shared by every command.
#[derive(Debug)]
pub struct Context {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub dry_run: bool,
    pub format: ReportFormat,
    pub output: OutputConfig,
}

impl Context {
    /// Load configuration files and merge them with the command line.
    pub fn settings(&self) -> Result<Settings> {
        let file = config::load(self.config.as_deref(), &self.root)?;
        let settings = Settings::resolve(self.root.clone(), file, self.overrides.clone())?;
        debug!(
            "Resolved settings: root={} jobs={} tool={}",
            settings.root.display(),
            settings.jobs,
            settings.tool
        );
        Ok(settings)
    }

    /// Probe the tool and discover repositories.
    pub fn workspace(&self) -> Result<Workspace> {
        let settings = self.settings()?;
        Ok(Workspace::open(&settings, self.dry_run)?)
    }

    /// Run a fan-out operation and print its report.
    pub fn run(&self, operation: Operation) -> Result<ExitCode> {
        // Malformed operations fail before the tool is probed or the tree walked
        operation.validate()?;
        let workspace = self.workspace()?;
        let report = workspace.run(&operation, &mut io::stderr())?;
        self.emit(&report)
    }

    /// Print the report and convert its exit code.
    pub fn emit(&self, report: &Report) -> Result<ExitCode> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.format {
            ReportFormat::Text => {
                report.render_text(&mut out, &mut io::stderr(), &self.output)?
            }
            ReportFormat::Json => {
                report.render_diagnostics(&mut io::stderr(), &self.output)?;
                report.render_json(&mut out)?
            }
        }
        out.flush()?;
        Ok(ExitCode::from(report.overall_exit_code as u8))
    }
}
