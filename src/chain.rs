//! # Commit Coordination
//!
//! Commits pending changes across repositories in one of two topologies.
//!
//! ## Independent mode
//!
//! Every repository is committed on its own, in parallel through the
//! [`Dispatcher`]: status queries, optional staging, commits and commit-id
//! lookups each run as one bounded batch.
//!
//! ## Chain mode
//!
//! Repositories are committed strictly one after another in canonical order.
//! Each commit after the first carries a trailer naming the previous
//! repository and the commit it just produced:
//!
//! ```text
//! Update shared schema
//!
//! Chained-From: api@3f1c0e2b9d7a4c51e8f06b2a9d3c7e1f4b5a6c8d
//! ```
//!
//! Because each message depends on the commit id created one step earlier,
//! this mode never uses the worker pool. The first failure stops the chain:
//! commits already made stay in place and every later repository is reported
//! as not attempted.
//!
//! ## Shared rules
//!
//! - Repositories with nothing to commit are skipped. If that is true for all
//!   of them the report is the neutral "No repositories with changes" notice.
//! - Dry-run simulates staging and committing. Status and `rev-parse` queries
//!   still run since they are read-only.
//! - With a link file configured, one `<name> <commit-id>` line per committed
//!   repository is written after the last commit, replacing earlier content.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::discovery::RepositoryDescriptor;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::executor::{ExecutionRequest, ExecutionResult, Executor};
use crate::git::{self, WorkingTreeStatus};
use crate::report::{FailurePolicy, Report, ReportEntry, NO_CHANGES};

const NO_PENDING_CHANGES: &str = "no pending changes";

/// What to commit and how.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    pub message: String,
    /// Stage every modification (including untracked files) first.
    pub add: bool,
    pub amend: bool,
    pub chain: bool,
    pub link_file: Option<PathBuf>,
}

impl CommitOptions {
    pub fn validate(&self) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(Error::MissingArgument {
                name: "--message".to_string(),
            });
        }
        Ok(())
    }
}

/// A commit produced for one repository, and what it was chained from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainLink {
    pub repository: RepositoryDescriptor,
    /// `None` only when the commit was simulated by a dry run.
    pub commit_id: Option<String>,
    pub chained_from_repository: Option<String>,
    pub chained_from_commit_id: Option<String>,
}

/// Result of a commit run.
#[derive(Debug)]
pub struct CommitOutcome {
    pub report: Report,
    pub links: Vec<ChainLink>,
    /// Set when the commits went through but the link file could not be
    /// written. The report is still complete.
    pub link_file_error: Option<Error>,
}

/// Drives commits through the executor.
pub struct CommitCoordinator<'a> {
    executor: &'a Executor,
    dispatcher: &'a Dispatcher,
    dry_run: bool,
}

impl<'a> CommitCoordinator<'a> {
    pub fn new(executor: &'a Executor, dispatcher: &'a Dispatcher, dry_run: bool) -> Self {
        Self {
            executor,
            dispatcher,
            dry_run,
        }
    }

    /// Commit across `repositories`, which must be in canonical order.
    pub fn commit(
        &self,
        repositories: &[RepositoryDescriptor],
        options: &CommitOptions,
        diag: &mut dyn Write,
    ) -> Result<CommitOutcome> {
        options.validate()?;

        let (entries, links) = if options.chain {
            self.commit_chained(repositories, options)?
        } else {
            self.commit_independent(repositories, options, diag)?
        };

        let nothing_to_do = entries
            .iter()
            .all(|entry| matches!(entry, ReportEntry::Skipped { .. }));
        let report = if nothing_to_do {
            Report::notice(NO_CHANGES)
        } else {
            Report::build(entries, FailurePolicy::Strict)
        };

        let mut link_file_error = None;
        if let Some(path) = &options.link_file {
            if self.dry_run {
                info!("Dry run: not writing link file {}", path.display());
            } else if let Err(e) = write_link_file(path, &links) {
                link_file_error = Some(e);
            }
        }

        Ok(CommitOutcome {
            report,
            links,
            link_file_error,
        })
    }

    /// Run one command on the calling thread. Launch faults become failed
    /// results, as they do in the dispatcher.
    fn run(&self, repository: &RepositoryDescriptor, argv: Vec<String>, mutating: bool) -> ExecutionResult {
        let request = ExecutionRequest::new(repository.clone(), argv, mutating && self.dry_run);
        self.executor.execute(&request).unwrap_or_else(|e| {
            warn!("{}: {}", repository.name, e);
            ExecutionResult::from_fault(repository.clone(), &e)
        })
    }

    /// Read the id of the commit that was just made.
    ///
    /// `None` when `rev-parse` failed or printed something that is not a
    /// commit id.
    fn resolve_head(
        &self,
        repository: &RepositoryDescriptor,
    ) -> Result<(ExecutionResult, Option<String>)> {
        let head = self.run(repository, git::rev_parse_head(), false);
        let id = if head.failed {
            None
        } else {
            git::parse_commit_id(&head.stdout)?
        };
        if id.is_none() {
            warn!("{}: could not read the new commit id", repository.name);
        }
        Ok((head, id))
    }

    fn commit_chained(
        &self,
        repositories: &[RepositoryDescriptor],
        options: &CommitOptions,
    ) -> Result<(Vec<ReportEntry>, Vec<ChainLink>)> {
        let mut entries = Vec::with_capacity(repositories.len());
        let mut links: Vec<ChainLink> = Vec::new();
        let mut aborted_at: Option<String> = None;

        for repository in repositories {
            if let Some(failed) = &aborted_at {
                entries.push(ReportEntry::NotAttempted {
                    repository: repository.clone(),
                    reason: format!("chain stopped after failure in {}", failed),
                });
                continue;
            }

            let status = self.run(repository, git::status_porcelain(), false);
            if status.failed {
                aborted_at = Some(repository.name.clone());
                entries.push(ReportEntry::Executed(status));
                continue;
            }
            if !WorkingTreeStatus::parse(&status.stdout).has_pending(options.add) {
                entries.push(ReportEntry::Skipped {
                    repository: repository.clone(),
                    reason: NO_PENDING_CHANGES.to_string(),
                });
                continue;
            }

            if options.add {
                let added = self.run(repository, git::add_all(), true);
                if added.failed {
                    aborted_at = Some(repository.name.clone());
                    entries.push(ReportEntry::Executed(added));
                    continue;
                }
            }

            let previous = links.last();
            let trailer = previous.map(|link| {
                git::chain_trailer(&link.repository.name, link.commit_id.as_deref())
            });
            let message = git::compose_message(&options.message, trailer.as_deref());

            let committed = self.run(repository, git::commit(&message, options.amend), true);
            if committed.failed {
                aborted_at = Some(repository.name.clone());
                entries.push(ReportEntry::Executed(committed));
                continue;
            }

            let commit_id = if self.dry_run {
                None
            } else {
                match self.resolve_head(repository)? {
                    (_, Some(id)) => Some(id),
                    (head, None) => {
                        aborted_at = Some(repository.name.clone());
                        entries.push(ReportEntry::Executed(unresolved_commit(committed, &head)));
                        continue;
                    }
                }
            };

            let link = ChainLink {
                repository: repository.clone(),
                commit_id,
                chained_from_repository: previous.map(|l| l.repository.name.clone()),
                chained_from_commit_id: previous.and_then(|l| l.commit_id.clone()),
            };
            info!(
                "Committed {} ({}){}",
                repository.name,
                link.commit_id.as_deref().unwrap_or(git::DRY_RUN_COMMIT_PLACEHOLDER),
                trailer.map(|t| format!(" with {}", t)).unwrap_or_default()
            );
            links.push(link);
            entries.push(ReportEntry::Executed(committed));
        }

        Ok((entries, links))
    }

    fn commit_independent(
        &self,
        repositories: &[RepositoryDescriptor],
        options: &CommitOptions,
        diag: &mut dyn Write,
    ) -> Result<(Vec<ReportEntry>, Vec<ChainLink>)> {
        let mut slots: Vec<Option<ReportEntry>> = vec![None; repositories.len()];

        // Positions of repositories still moving through the pipeline
        let mut active: Vec<usize> = Vec::new();
        let statuses = self.batch(repositories, &(0..repositories.len()).collect::<Vec<_>>(), |_| git::status_porcelain(), false, diag)?;
        for (position, status) in statuses {
            if status.failed {
                slots[position] = Some(ReportEntry::Executed(status));
            } else if WorkingTreeStatus::parse(&status.stdout).has_pending(options.add) {
                active.push(position);
            } else {
                slots[position] = Some(ReportEntry::Skipped {
                    repository: repositories[position].clone(),
                    reason: NO_PENDING_CHANGES.to_string(),
                });
            }
        }

        if options.add {
            let added = self.batch(repositories, &active, |_| git::add_all(), true, diag)?;
            active.clear();
            for (position, result) in added {
                if result.failed {
                    slots[position] = Some(ReportEntry::Executed(result));
                } else {
                    active.push(position);
                }
            }
        }

        let commits = self.batch(
            repositories,
            &active,
            |_| git::commit(&options.message, options.amend),
            true,
            diag,
        )?;
        active.clear();
        for (position, result) in commits {
            let failed = result.failed;
            slots[position] = Some(ReportEntry::Executed(result));
            if !failed {
                active.push(position);
            }
        }

        let mut links = Vec::new();
        if self.dry_run {
            links.extend(active.iter().map(|&position| ChainLink {
                repository: repositories[position].clone(),
                commit_id: None,
                chained_from_repository: None,
                chained_from_commit_id: None,
            }));
        } else {
            let heads = self.batch(repositories, &active, |_| git::rev_parse_head(), false, diag)?;
            for (position, head) in heads {
                let repository = &repositories[position];
                let commit_id = if head.failed {
                    None
                } else {
                    git::parse_commit_id(&head.stdout)?
                };
                match commit_id {
                    Some(id) => links.push(ChainLink {
                        repository: repository.clone(),
                        commit_id: Some(id),
                        chained_from_repository: None,
                        chained_from_commit_id: None,
                    }),
                    None => {
                        warn!("{}: could not read the new commit id", repository.name);
                        if let Some(ReportEntry::Executed(committed)) = slots[position].take() {
                            slots[position] =
                                Some(ReportEntry::Executed(unresolved_commit(committed, &head)));
                        }
                    }
                }
            }
        }

        Ok((slots.into_iter().flatten().collect(), links))
    }

    /// Run one command per selected position through the dispatcher.
    ///
    /// Returns `(position, result)` pairs in the order of `positions`.
    fn batch<F>(
        &self,
        repositories: &[RepositoryDescriptor],
        positions: &[usize],
        argv: F,
        mutating: bool,
        diag: &mut dyn Write,
    ) -> Result<Vec<(usize, ExecutionResult)>>
    where
        F: Fn(&RepositoryDescriptor) -> Vec<String>,
    {
        if positions.is_empty() {
            return Ok(Vec::new());
        }
        let requests: Vec<ExecutionRequest> = positions
            .iter()
            .map(|&position| {
                let repository = &repositories[position];
                ExecutionRequest::new(repository.clone(), argv(repository), mutating && self.dry_run)
            })
            .collect();
        let results = self.dispatcher.run(self.executor, &requests, diag)?;
        Ok(positions.iter().copied().zip(results).collect())
    }
}

/// Mark a commit whose id could not be read back as failed.
///
/// The commit exists, but without its id it can neither be chained from nor
/// listed in the link file.
fn unresolved_commit(committed: ExecutionResult, head: &ExecutionResult) -> ExecutionResult {
    let detail = if head.failed {
        head.stderr.trim().to_string()
    } else {
        format!("unexpected output {:?}", head.stdout.trim())
    };
    ExecutionResult {
        exit_code: if committed.exit_code == 0 { 1 } else { committed.exit_code },
        stderr: format!(
            "error: could not read the new commit id ({})\n{}",
            detail, committed.stderr
        ),
        failed: true,
        ..committed
    }
}

/// Write `<name> <commit-id>` lines for every link with a known commit id.
pub fn write_link_file(path: &Path, links: &[ChainLink]) -> Result<()> {
    let mut content = String::new();
    for link in links {
        if let Some(id) = &link.commit_id {
            content.push_str(&format!("{} {}\n", link.repository.name, id));
        }
    }
    fs::write(path, content).map_err(|e| Error::LinkFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    info!("Wrote link file {}", path.display());
    Ok(())
}
