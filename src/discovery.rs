//! # Repository Discovery
//!
//! Walks a directory tree and collects every repository root beneath it.
//!
//! ## Rules
//!
//! - A directory is a repository root when it directly contains the `.git`
//!   marker. The marker may be a directory or a file (linked worktrees and
//!   submodules use a file).
//! - The walk never descends into a repository root, so nested repositories
//!   are not reported separately.
//! - Directories whose name matches a skip pattern are pruned together with
//!   their whole subtree, at any depth.
//! - Symbolic links are never followed. A symlinked directory is a leaf,
//!   which guarantees the walk terminates.
//!
//! The result is fully materialized and sorted by path relative to the root
//! before it is returned. That order is the canonical presentation order used
//! by every later stage, and each descriptor records its position in it.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::defaults::REPOSITORY_MARKER;
use crate::error::Result;

/// One discovered repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescriptor {
    /// Last path segment of the repository directory.
    pub name: String,
    /// Absolute path of the repository directory.
    pub path: PathBuf,
    /// Path relative to the discovery root (`.` for the root itself).
    pub relative_path: PathBuf,
    /// Position in the canonical order.
    pub discovery_order: usize,
}

impl RepositoryDescriptor {
    /// Label used in report headers.
    ///
    /// Repositories nested below the top level carry their relative path so
    /// that two repositories sharing a name stay distinguishable.
    pub fn label(&self) -> String {
        if self.relative_path == Path::new(&self.name) || self.relative_path == Path::new(".") {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.relative_path.display())
        }
    }
}

/// Directory-name patterns excluded from discovery.
///
/// Built once from configuration and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct SkipPatterns {
    entries: Vec<String>,
    patterns: Vec<Pattern>,
}

impl SkipPatterns {
    /// Compile skip entries. Each entry is a glob matched against a single
    /// directory name, so plain names match literally.
    pub fn new<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut skip = SkipPatterns::default();
        for entry in entries {
            if skip.entries.contains(&entry) {
                continue;
            }
            skip.patterns.push(Pattern::new(&entry)?);
            skip.entries.push(entry);
        }
        Ok(skip)
    }

    /// Whether a directory with this name is excluded.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    /// The raw entries, in the order they were supplied.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

fn is_repository_root(dir: &Path) -> bool {
    fs::symlink_metadata(dir.join(REPOSITORY_MARKER)).is_ok()
}

/// Discover all repositories under `root`.
pub fn discover(root: &Path, skip: &SkipPatterns) -> Result<Vec<RepositoryDescriptor>> {
    let root = fs::canonicalize(root)?;
    let mut roots = Vec::new();

    let mut walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable path during discovery: {}", err);
                continue;
            }
        };

        // Symlinks report their own type here, so linked directories stay leaves
        if !entry.file_type().is_dir() {
            continue;
        }

        if entry.depth() > 0 {
            let name = entry.file_name().to_string_lossy();
            if name == REPOSITORY_MARKER || skip.matches(&name) {
                debug!("Skipping directory {}", entry.path().display());
                walker.skip_current_dir();
                continue;
            }
        }

        if is_repository_root(entry.path()) {
            debug!("Found repository at {}", entry.path().display());
            roots.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }

    let mut repositories: Vec<(PathBuf, PathBuf)> = roots
        .into_iter()
        .map(|path| {
            let relative = match path.strip_prefix(&root) {
                Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
                _ => PathBuf::from("."),
            };
            (relative, path)
        })
        .collect();
    repositories.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(repositories
        .into_iter()
        .enumerate()
        .map(|(discovery_order, (relative_path, path))| RepositoryDescriptor {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            path,
            relative_path,
            discovery_order,
        })
        .collect())
}
