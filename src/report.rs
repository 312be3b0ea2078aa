//! # Report Aggregation
//!
//! Collects per-repository outcomes, in canonical repository order, into one
//! [`Report`] and renders it.
//!
//! ## Exit code
//!
//! `overall_exit_code` is 0 when every executed repository succeeded and 1 as
//! soon as one failed. It is computed when the report is built, so filters
//! applied afterwards (dirty-only) never change it. Operations with a lenient
//! [`FailurePolicy`] still print their failures but keep the exit code at 0.
//!
//! ## Streams
//!
//! The report body goes to the primary stream. Every failed repository also
//! gets an `ERROR project <name>: ...` line on the diagnostic stream, so
//! scripts can watch stderr without parsing the report.

use std::io::{self, Write};

use serde::Serialize;

use crate::discovery::RepositoryDescriptor;
use crate::executor::ExecutionResult;
use crate::output::OutputConfig;

/// Notice printed when no repository was discovered.
pub const NO_REPOSITORIES: &str = "No repositories found";

/// Notice printed when a commit found nothing to record anywhere.
pub const NO_CHANGES: &str = "No repositories with changes";

/// How per-repository failures affect the overall exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Any failure makes the invocation fail.
    #[default]
    Strict,
    /// Failures are reported per repository but the invocation succeeds.
    Lenient,
}

/// One repository's line in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReportEntry {
    /// The tool ran (or was simulated) for this repository.
    Executed(ExecutionResult),
    /// Deliberately left alone; neither success nor failure.
    Skipped {
        repository: RepositoryDescriptor,
        reason: String,
    },
    /// Never reached because an earlier step of a chain failed.
    NotAttempted {
        repository: RepositoryDescriptor,
        reason: String,
    },
}

impl ReportEntry {
    pub fn repository(&self) -> &RepositoryDescriptor {
        match self {
            ReportEntry::Executed(result) => &result.repository,
            ReportEntry::Skipped { repository, .. } => repository,
            ReportEntry::NotAttempted { repository, .. } => repository,
        }
    }

    pub fn failed(&self) -> bool {
        matches!(self, ReportEntry::Executed(result) if result.failed)
    }
}

/// Combined outcome of one invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(rename = "results")]
    pub entries: Vec<ReportEntry>,
    pub overall_exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// Blocks hidden by the dirty-only filter.
    #[serde(skip_serializing_if = "is_zero")]
    pub suppressed: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl Report {
    /// Build a report from entries already in canonical order.
    pub fn build(entries: Vec<ReportEntry>, policy: FailurePolicy) -> Self {
        let any_failed = entries.iter().any(ReportEntry::failed);
        let overall_exit_code = match policy {
            FailurePolicy::Strict if any_failed => 1,
            _ => 0,
        };
        Self {
            entries,
            overall_exit_code,
            notice: None,
            suppressed: 0,
        }
    }

    /// Build a report from executed results only.
    pub fn from_results(results: Vec<ExecutionResult>, policy: FailurePolicy) -> Self {
        Self::build(
            results.into_iter().map(ReportEntry::Executed).collect(),
            policy,
        )
    }

    /// A successful report that carries only a notice.
    pub fn notice(text: &str) -> Self {
        Self {
            entries: Vec::new(),
            overall_exit_code: 0,
            notice: Some(text.to_string()),
            suppressed: 0,
        }
    }

    /// The executed results, in canonical order.
    pub fn results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Executed(result) => Some(result),
            _ => None,
        })
    }

    /// Hide successful blocks whose repository shows no local modification.
    ///
    /// Failed results are always kept. The exit code is left untouched.
    pub fn retain_dirty<F>(&mut self, is_dirty: F)
    where
        F: Fn(&ExecutionResult) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|entry| match entry {
            ReportEntry::Executed(result) => result.failed || is_dirty(result),
            _ => true,
        });
        self.suppressed += before - self.entries.len();
    }

    /// Render the human-readable report.
    pub fn render_text(
        &self,
        out: &mut dyn Write,
        diag: &mut dyn Write,
        style: &OutputConfig,
    ) -> io::Result<()> {
        for entry in &self.entries {
            let label = entry.repository().label();
            writeln!(out, "{}", style.header(&label))?;

            match entry {
                ReportEntry::Executed(result) => {
                    write_block(out, &result.stdout)?;
                    if result.failed {
                        write_block(out, &result.stderr)?;
                    }
                }
                ReportEntry::Skipped { reason, .. } => {
                    writeln!(out, "{}", style.dim(&format!("skipped: {}", reason)))?;
                }
                ReportEntry::NotAttempted { reason, .. } => {
                    writeln!(out, "{}", style.dim(&format!("not attempted: {}", reason)))?;
                }
            }
            writeln!(out)?;
        }

        if let Some(notice) = &self.notice {
            writeln!(out, "{}", notice)?;
        }
        self.render_diagnostics(diag, style)
    }

    /// Write one `ERROR project <label>: <reason>` line per failed repository.
    pub fn render_diagnostics(&self, diag: &mut dyn Write, style: &OutputConfig) -> io::Result<()> {
        for result in self.results().filter(|r| r.failed) {
            let reason = result
                .stderr
                .lines()
                .find(|line| !line.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("exit code {}", result.exit_code));
            writeln!(
                diag,
                "{} project {}: {}",
                style.error("ERROR"),
                result.repository.label(),
                reason
            )?;
        }
        Ok(())
    }

    /// Render the report as pretty-printed JSON.
    pub fn render_json(&self, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)
    }
}

fn write_block(out: &mut dyn Write, text: &str) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    out.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}
