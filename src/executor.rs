//! # Command Execution
//!
//! This module runs one external tool invocation against one repository.
//!
//! ## Design
//!
//! The external tool is hidden behind the [`Tool`] trait, which has a single
//! capability: run an argument vector in a working directory and hand back
//! the exit code and both output streams. Two implementations exist:
//!
//! - **`ProcessTool`**: spawns the real executable (normally `git`).
//! - **`DryRunTool`**: spawns nothing and describes what would have run.
//!
//! [`Executor`] holds both and picks one per request from the request's
//! `dry_run` flag, so callers never branch on dry-run themselves. Tests swap in
//! their own `Tool` to simulate repositories without touching the disk.
//!
//! A non-zero exit status is data, not an error: it ends up in
//! [`ExecutionResult::failed`]. The only errors raised here are environment
//! faults, when the executable cannot be found or spawned.

use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use serde::Serialize;

use crate::discovery::RepositoryDescriptor;
use crate::error::{Error, Result};

/// Marker included in the output of every simulated invocation.
pub const DRY_RUN_MARKER: &str = "DRY RUN";

/// Exit code recorded for a repository whose invocation hit an environment
/// fault.
pub const FAULT_EXIT_CODE: i32 = 127;

/// Raw output of one tool invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// The external version-control tool.
pub trait Tool: Send + Sync {
    /// Name of the executable, used in messages.
    fn program(&self) -> &str;

    /// Run `argv` with `cwd` as the working directory.
    fn run(&self, argv: &[String], cwd: &Path) -> Result<ToolOutput>;
}

/// Spawns the real executable.
#[derive(Debug, Clone)]
pub struct ProcessTool {
    program: String,
}

impl ProcessTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Tool for ProcessTool {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, argv: &[String], cwd: &Path) -> Result<ToolOutput> {
        let output = Command::new(&self.program)
            .args(argv)
            .current_dir(cwd)
            .stdin(Stdio::null())
            // Parallel jobs must never block on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::ToolNotFound {
                    tool: self.program.clone(),
                    message: e.to_string(),
                },
                _ => Error::ToolLaunch {
                    tool: self.program.clone(),
                    message: e.to_string(),
                },
            })?;

        Ok(ToolOutput {
            // Killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Describes the invocation instead of performing it.
#[derive(Debug, Clone)]
pub struct DryRunTool {
    program: String,
}

impl DryRunTool {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Tool for DryRunTool {
    fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, argv: &[String], _cwd: &Path) -> Result<ToolOutput> {
        Ok(ToolOutput {
            exit_code: 0,
            stdout: format!(
                "[{}] {}\n",
                DRY_RUN_MARKER,
                render_command(&self.program, argv)
            ),
            stderr: String::new(),
        })
    }
}

/// Render a command line for display, quoting arguments that need it.
pub fn render_command(program: &str, argv: &[String]) -> String {
    let mut parts = vec![program.to_string()];
    for arg in argv {
        let plain = !arg.is_empty()
            && arg
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_./:=@+,%^".contains(c));
        if plain {
            parts.push(arg.clone());
        } else {
            parts.push(format!("'{}'", arg.replace('\'', r"'\''")));
        }
    }
    parts.join(" ")
}

/// One invocation against one repository.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub repository: RepositoryDescriptor,
    pub argv: Vec<String>,
    pub dry_run: bool,
}

impl ExecutionRequest {
    pub fn new(repository: RepositoryDescriptor, argv: Vec<String>, dry_run: bool) -> Self {
        Self {
            repository,
            argv,
            dry_run,
        }
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub repository: RepositoryDescriptor,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub failed: bool,
}

impl ExecutionResult {
    pub fn new(repository: RepositoryDescriptor, output: ToolOutput, duration: Duration) -> Self {
        Self {
            repository,
            failed: output.exit_code != 0,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
            duration_ms: duration.as_millis() as u64,
        }
    }

    /// Record an environment fault as a failed result for one repository.
    pub fn from_fault(repository: RepositoryDescriptor, error: &Error) -> Self {
        Self {
            repository,
            exit_code: FAULT_EXIT_CODE,
            stdout: String::new(),
            stderr: format!("{}\n", error),
            duration_ms: 0,
            failed: true,
        }
    }
}

/// Runs requests against either the live tool or the dry-run stand-in.
#[derive(Clone)]
pub struct Executor {
    live: Arc<dyn Tool>,
    dry: Arc<dyn Tool>,
}

impl Executor {
    pub fn new(live: Arc<dyn Tool>) -> Self {
        let dry = Arc::new(DryRunTool::new(live.program()));
        Self { live, dry }
    }

    /// Executor backed by the real executable.
    pub fn process(program: impl Into<String>) -> Self {
        Self::new(Arc::new(ProcessTool::new(program)))
    }

    pub fn program(&self) -> &str {
        self.live.program()
    }

    fn tool_for(&self, dry_run: bool) -> &dyn Tool {
        if dry_run {
            self.dry.as_ref()
        } else {
            self.live.as_ref()
        }
    }

    /// Check that the live tool can be launched at all.
    ///
    /// Returns the first line of its version output.
    pub fn probe(&self, cwd: &Path) -> Result<String> {
        let output = self.live.run(&["--version".to_string()], cwd)?;
        Ok(output.stdout.lines().next().unwrap_or_default().to_string())
    }

    /// Execute one request.
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult> {
        let tool = self.tool_for(request.dry_run);
        debug!(
            "Running `{}` in {}",
            render_command(tool.program(), &request.argv),
            request.repository.path.display()
        );

        let start = Instant::now();
        let output = tool.run(&request.argv, &request.repository.path)?;
        let duration = start.elapsed();

        debug!(
            "{} exited with {} after {}ms",
            request.repository.name,
            output.exit_code,
            duration.as_millis()
        );
        Ok(ExecutionResult::new(
            request.repository.clone(),
            output,
            duration,
        ))
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("program", &self.live.program())
            .finish()
    }
}
