//! In-process stand-ins for the external tool, shared by unit tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::discovery::RepositoryDescriptor;
use crate::error::{Error, Result};
use crate::executor::{Tool, ToolOutput};

/// Descriptors `repo-00`, `repo-01`, ... rooted under `/fake`.
pub fn repositories(count: usize) -> Vec<RepositoryDescriptor> {
    (0..count)
        .map(|i| {
            let name = format!("repo-{:02}", i);
            RepositoryDescriptor {
                path: PathBuf::from("/fake").join(&name),
                relative_path: PathBuf::from(&name),
                name,
                discovery_order: i,
            }
        })
        .collect()
}

fn repo_name(cwd: &Path) -> String {
    cwd.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn repo_index(cwd: &Path) -> usize {
    repo_name(cwd)
        .rsplit('-')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

enum DelayMode {
    Uniform(Duration),
    Reversed(Duration),
    Explicit(Vec<Duration>),
}

/// Sleeps per repository, echoes the repository name and tracks how many
/// invocations overlap.
pub struct DelayTool {
    mode: DelayMode,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl DelayTool {
    fn with_mode(mode: DelayMode) -> Self {
        Self {
            mode,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn uniform(delay: Duration) -> Self {
        Self::with_mode(DelayMode::Uniform(delay))
    }

    /// Lower indices sleep longer.
    pub fn reversed(unit: Duration) -> Self {
        Self::with_mode(DelayMode::Reversed(unit))
    }

    pub fn explicit(delays: Vec<Duration>) -> Self {
        Self::with_mode(DelayMode::Explicit(delays))
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Tool for DelayTool {
    fn program(&self) -> &str {
        "git"
    }

    fn run(&self, _argv: &[String], cwd: &Path) -> Result<ToolOutput> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let index = repo_index(cwd);
        let delay = match &self.mode {
            DelayMode::Uniform(d) => *d,
            DelayMode::Reversed(unit) => *unit * 20u32.saturating_sub(index as u32),
            DelayMode::Explicit(delays) => delays.get(index).copied().unwrap_or_default(),
        };
        thread::sleep(delay);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(ToolOutput {
            exit_code: 0,
            stdout: format!("{}\n", repo_name(cwd)),
            stderr: String::new(),
        })
    }
}

/// Fails to launch for one repository, succeeds for the rest.
pub struct FaultyTool {
    failing: String,
}

impl FaultyTool {
    pub fn failing_on(name: &str) -> Self {
        Self {
            failing: name.to_string(),
        }
    }
}

impl Tool for FaultyTool {
    fn program(&self) -> &str {
        "git"
    }

    fn run(&self, _argv: &[String], cwd: &Path) -> Result<ToolOutput> {
        if repo_name(cwd) == self.failing {
            return Err(Error::ToolNotFound {
                tool: "git".to_string(),
                message: "simulated".to_string(),
            });
        }
        Ok(ToolOutput::default())
    }
}

/// Simulated state of one repository.
#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
    /// `(commit id, message)`, oldest first.
    pub commits: Vec<(String, String)>,
    pub branches: Vec<String>,
    pub fail_commit: bool,
    /// Replaces the `rev-parse HEAD` output.
    pub head_output: Option<String>,
}

/// A small git simulator covering the commands mgit issues.
#[derive(Default)]
pub struct FakeGit {
    repos: Mutex<HashMap<String, FakeRepo>>,
    counter: AtomicUsize,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(self, name: &str, repo: FakeRepo) -> Self {
        self.repos.lock().unwrap().insert(name.to_string(), repo);
        self
    }

    pub fn repo(&self, name: &str) -> FakeRepo {
        self.repos
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Every `(repository, argv)` received, in call order.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }

    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{:040x}", n * 0x1f3d5b79)
    }
}

fn ok(stdout: String) -> ToolOutput {
    ToolOutput {
        exit_code: 0,
        stdout,
        stderr: String::new(),
    }
}

fn fail(code: i32, stderr: &str) -> ToolOutput {
    ToolOutput {
        exit_code: code,
        stdout: String::new(),
        stderr: format!("{}\n", stderr),
    }
}

impl Tool for FakeGit {
    fn program(&self) -> &str {
        "git"
    }

    fn run(&self, argv: &[String], cwd: &Path) -> Result<ToolOutput> {
        let name = repo_name(cwd);
        self.calls.lock().unwrap().push((name.clone(), argv.to_vec()));

        let args: Vec<&str> = argv.iter().map(String::as_str).collect();
        if args == ["--version"] {
            return Ok(ok("git version 2.99.0 (fake)\n".to_string()));
        }

        let mut repos = self.repos.lock().unwrap();
        let repo = repos.entry(name).or_default();

        let output = match args.as_slice() {
            ["status", "--porcelain"] => {
                let mut out = String::new();
                for f in &repo.staged {
                    out.push_str(&format!("M  {}\n", f));
                }
                for f in &repo.unstaged {
                    out.push_str(&format!(" M {}\n", f));
                }
                for f in &repo.untracked {
                    out.push_str(&format!("?? {}\n", f));
                }
                ok(out)
            }
            ["add", "-A"] => {
                let mut moved = std::mem::take(&mut repo.unstaged);
                moved.append(&mut repo.untracked);
                repo.staged.append(&mut moved);
                ok(String::new())
            }
            ["commit", rest @ ..] => {
                let amend = rest.first() == Some(&"--amend");
                let message = rest.last().copied().unwrap_or_default().to_string();
                if repo.fail_commit {
                    fail(1, "error: simulated commit failure")
                } else if repo.staged.is_empty() && !amend {
                    ToolOutput {
                        exit_code: 1,
                        stdout: "nothing to commit, working tree clean\n".to_string(),
                        stderr: String::new(),
                    }
                } else {
                    let id = self.next_id();
                    if amend {
                        repo.commits.pop();
                    }
                    repo.commits.push((id.clone(), message.clone()));
                    repo.staged.clear();
                    ok(format!(
                        "[main {}] {}\n",
                        &id[..7],
                        message.lines().next().unwrap_or_default()
                    ))
                }
            }
            ["rev-parse", "HEAD"] if repo.head_output.is_some() => {
                ok(repo.head_output.clone().unwrap_or_default())
            }
            ["rev-parse", "HEAD"] => match repo.commits.last() {
                Some((id, _)) => ok(format!("{}\n", id)),
                None => fail(128, "fatal: ambiguous argument 'HEAD'"),
            },
            ["checkout", rest @ ..] => {
                let create = rest.first() == Some(&"-b");
                let reference = rest.last().copied().unwrap_or_default().to_string();
                if create || repo.branches.contains(&reference) {
                    if create {
                        repo.branches.push(reference.clone());
                    }
                    ToolOutput {
                        exit_code: 0,
                        stdout: String::new(),
                        stderr: format!("Switched to branch '{}'\n", reference),
                    }
                } else {
                    fail(
                        1,
                        &format!(
                            "error: pathspec '{}' did not match any file(s) known to git",
                            reference
                        ),
                    )
                }
            }
            ["status", "--short", "--branch", ..] => {
                let mut out = "## main\n".to_string();
                for f in repo.staged.iter().chain(&repo.unstaged) {
                    out.push_str(&format!(" M {}\n", f));
                }
                for f in &repo.untracked {
                    out.push_str(&format!("?? {}\n", f));
                }
                ok(out)
            }
            other => ok(format!("{}\n", other.join(" "))),
        };
        Ok(output)
    }
}
