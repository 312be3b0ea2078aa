//! A discovered set of repositories and the machinery to operate on them.

use std::io::Write;

use log::{debug, error, info};

use crate::chain::{CommitCoordinator, CommitOptions, CommitOutcome};
use crate::config::Settings;
use crate::discovery::{self, RepositoryDescriptor};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::executor::{ExecutionRequest, Executor};
use crate::operation::Operation;
use crate::report::{Report, NO_REPOSITORIES};

/// Repositories under one root plus the executor and dispatcher driving them.
#[derive(Debug)]
pub struct Workspace {
    repositories: Vec<RepositoryDescriptor>,
    executor: Executor,
    dispatcher: Dispatcher,
    dry_run: bool,
}

impl Workspace {
    /// Probe the configured tool, then discover repositories under the root.
    ///
    /// A tool that cannot be launched is fatal here, before any repository
    /// is touched.
    pub fn open(settings: &Settings, dry_run: bool) -> Result<Self> {
        let executor = Executor::process(settings.tool.clone());
        Self::with_executor(settings, executor, dry_run)
    }

    /// Like [`Workspace::open`] with a caller-supplied executor.
    pub fn with_executor(settings: &Settings, executor: Executor, dry_run: bool) -> Result<Self> {
        let version = executor.probe(&settings.root).map_err(|e| {
            if e.is_environment_fault() {
                error!(
                    "Cannot run `{}`; set --git or MGIT_GIT to a working git executable",
                    executor.program()
                );
            }
            e
        })?;
        debug!("Using {}", version);

        let repositories = discovery::discover(&settings.root, &settings.skip)?;
        info!(
            "Found {} repositories under {}",
            repositories.len(),
            settings.root.display()
        );

        Ok(Self {
            repositories,
            executor,
            dispatcher: Dispatcher::new(settings.jobs)?,
            dry_run,
        })
    }

    /// Discovered repositories in canonical order.
    pub fn repositories(&self) -> &[RepositoryDescriptor] {
        &self.repositories
    }

    /// Fan an operation out to every repository and aggregate the results.
    pub fn run(&self, operation: &Operation, diag: &mut dyn Write) -> Result<Report> {
        operation.validate()?;
        if self.repositories.is_empty() {
            return Ok(Report::notice(NO_REPOSITORIES));
        }

        let dry_run = self.dry_run && operation.is_mutating();
        let argv = operation.argv();
        let requests: Vec<ExecutionRequest> = self
            .repositories
            .iter()
            .map(|repository| ExecutionRequest::new(repository.clone(), argv.clone(), dry_run))
            .collect();

        let results = self.dispatcher.run(&self.executor, &requests, diag)?;
        let mut report = Report::from_results(results, operation.failure_policy());
        if let Some(is_dirty) = operation.dirty_filter() {
            report.retain_dirty(is_dirty);
        }
        Ok(report)
    }

    /// Commit pending changes, independently or as a chain.
    pub fn commit(&self, options: &CommitOptions, diag: &mut dyn Write) -> Result<CommitOutcome> {
        options.validate()?;
        if self.repositories.is_empty() {
            return Ok(CommitOutcome {
                report: Report::notice(NO_REPOSITORIES),
                links: Vec::new(),
                link_file_error: None,
            });
        }
        CommitCoordinator::new(&self.executor, &self.dispatcher, self.dry_run).commit(
            &self.repositories,
            options,
            diag,
        )
    }
}
