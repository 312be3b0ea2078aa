//! Argument vectors and output parsing for the git commands mgit issues.
//!
//! Everything here is pure: building argv lists, reading porcelain status,
//! extracting commit ids and composing chained commit messages. Running the
//! commands is the executor's job.

use regex::Regex;

use crate::defaults::CHAIN_TRAILER_KEY;
use crate::error::Result;

/// Placeholder used in a trailer when the previous commit was only simulated.
pub const DRY_RUN_COMMIT_PLACEHOLDER: &str = "<dry-run>";

fn argv(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// `git status --porcelain`
pub fn status_porcelain() -> Vec<String> {
    argv(&["status", "--porcelain"])
}

/// `git add -A`
pub fn add_all() -> Vec<String> {
    argv(&["add", "-A"])
}

/// `git commit [--amend] -m <message>`
pub fn commit(message: &str, amend: bool) -> Vec<String> {
    let mut args = argv(&["commit"]);
    if amend {
        args.push("--amend".to_string());
    }
    args.push("-m".to_string());
    args.push(message.to_string());
    args
}

/// `git rev-parse HEAD`
pub fn rev_parse_head() -> Vec<String> {
    argv(&["rev-parse", "HEAD"])
}

/// `git checkout [-b] <reference>`
pub fn checkout(reference: &str, create: bool) -> Vec<String> {
    let mut args = argv(&["checkout"]);
    if create {
        args.push("-b".to_string());
    }
    args.push(reference.to_string());
    args
}

/// Counts of entries in a porcelain status listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkingTreeStatus {
    pub staged: usize,
    pub unstaged: usize,
    pub untracked: usize,
}

impl WorkingTreeStatus {
    /// Parse `git status --porcelain` (v1) or `--short` output.
    ///
    /// Branch header lines (`## main`) and ignored entries (`!!`) are not
    /// counted.
    pub fn parse(porcelain: &str) -> Self {
        let mut status = WorkingTreeStatus::default();
        for line in porcelain.lines() {
            if line.starts_with("##") || line.starts_with("!!") || line.len() < 2 {
                continue;
            }
            if line.starts_with("??") {
                status.untracked += 1;
                continue;
            }
            let mut columns = line.chars();
            let index = columns.next().unwrap_or(' ');
            let worktree = columns.next().unwrap_or(' ');
            if index != ' ' {
                status.staged += 1;
            }
            if worktree != ' ' {
                status.unstaged += 1;
            }
        }
        status
    }

    /// Any local modification at all.
    pub fn is_dirty(&self) -> bool {
        self.staged + self.unstaged + self.untracked > 0
    }

    /// Whether a commit would record something.
    ///
    /// With `stage_all` every modification will be staged first, so any
    /// modification counts. Otherwise only what is already staged does.
    pub fn has_pending(&self, stage_all: bool) -> bool {
        if stage_all {
            self.is_dirty()
        } else {
            self.staged > 0
        }
    }
}

/// Extract a full commit id from `rev-parse` output.
///
/// Accepts SHA-1 (40 hex digits) and SHA-256 (64 hex digits) object names.
pub fn parse_commit_id(output: &str) -> Result<Option<String>> {
    let pattern = Regex::new(r"^(?:[0-9a-f]{64}|[0-9a-f]{40})$")?;
    Ok(output
        .lines()
        .map(str::trim)
        .find(|line| pattern.is_match(line))
        .map(str::to_string))
}

/// Trailer linking a commit to the previous repository's commit.
pub fn chain_trailer(previous_repository: &str, previous_commit: Option<&str>) -> String {
    format!(
        "{}: {}@{}",
        CHAIN_TRAILER_KEY,
        previous_repository,
        previous_commit.unwrap_or(DRY_RUN_COMMIT_PLACEHOLDER)
    )
}

/// Append a trailer to a commit message, separated by a blank line so git
/// recognizes it as a trailer block.
pub fn compose_message(message: &str, trailer: Option<&str>) -> String {
    match trailer {
        Some(trailer) => format!("{}\n\n{}", message.trim_end(), trailer),
        None => message.to_string(),
    }
}

/// Read the chain trailer back out of a commit message.
///
/// Returns the previous repository name and commit id.
pub fn parse_chain_trailer(message: &str) -> Result<Option<(String, String)>> {
    let pattern = Regex::new(&format!(
        r"(?m)^{}:\s*(\S+)@([0-9a-f]{{64}}|[0-9a-f]{{40}})\s*$",
        regex::escape(CHAIN_TRAILER_KEY)
    ))?;
    Ok(pattern
        .captures(message)
        .map(|caps| (caps[1].to_string(), caps[2].to_string())))
}
