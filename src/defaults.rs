//! Default values for mgit configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Name of the metadata entry that marks a directory as a repository root.
pub const REPOSITORY_MARKER: &str = ".git";

/// Executable invoked for every repository operation.
pub const DEFAULT_TOOL: &str = "git";

/// Number of repositories processed concurrently when nothing else is set.
pub const DEFAULT_JOBS: usize = 1;

/// Per-directory configuration file looked up in the discovery root.
pub const DEFAULT_CONFIG_FILENAME: &str = ".mgit.yaml";

/// Trailer key linking a commit to the previous repository's commit.
pub const CHAIN_TRAILER_KEY: &str = "Chained-From";

/// Directory names never descended into during discovery.
///
/// User-supplied entries are appended to this list, never substituted for it.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",  // Node.js dependencies
    "target",        // Rust/Java build output
    "build",         // Generic build output
    "dist",          // Distribution builds
    "vendor",        // Vendored dependencies
    "venv",          // Python virtual environment
    ".venv",         // Python virtual environment
    "__pycache__",   // Python bytecode
    ".tox",          // Tox environments
    ".mypy_cache",   // MyPy cache
    ".pytest_cache", // Pytest cache
    ".gradle",       // Gradle cache
    ".idea",         // IntelliJ IDEA
    ".vscode",       // VS Code
];

/// Returns the path of the user-wide configuration file.
///
/// Uses the platform-appropriate config directory:
/// - Linux: `~/.config/mgit/config.yaml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/mgit/config.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\mgit\config.yaml`
///
/// Returns `None` when the platform config directory cannot be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mgit").join("config.yaml"))
}
