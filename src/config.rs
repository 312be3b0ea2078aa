//! # Configuration Loading and Resolution
//!
//! mgit reads optional YAML configuration files and resolves them together
//! with command-line flags and environment variables into one immutable
//! [`Settings`] value that is handed to the rest of the library.
//!
//! ## Sources
//!
//! In order of increasing precedence:
//!
//! 1. Built-in defaults (see [`crate::defaults`]).
//! 2. The user-wide file at `<config_dir>/mgit/config.yaml`.
//! 3. The `.mgit.yaml` file in the discovery root, or the file named by
//!    `--config` / `MGIT_CONFIG`.
//! 4. Command-line flags and their environment variables.
//!
//! `skip_dirs` entries accumulate across every layer: defaults are never
//! dropped, files and flags only append. `jobs` and `git` are replaced by the
//! highest layer that sets them.
//!
//! ## Format
//!
//! ```yaml
//! skip_dirs:
//!   - third_party
//!   - "*.bak"
//! jobs: 8
//! git: /usr/local/bin/git
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_CONFIG_FILENAME, DEFAULT_JOBS, DEFAULT_TOOL, DEFAULT_SKIP_DIRS};
use crate::discovery::SkipPatterns;
use crate::error::{Error, Result};

/// Contents of one configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Extra directory-name patterns excluded from discovery.
    #[serde(default)]
    pub skip_dirs: Vec<String>,
    /// Concurrency bound.
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Path or name of the version-control executable.
    #[serde(default)]
    pub git: Option<String>,
}

impl ConfigFile {
    /// Stack `over` on top of `self`.
    pub fn layer(mut self, over: ConfigFile) -> ConfigFile {
        self.skip_dirs.extend(over.skip_dirs);
        ConfigFile {
            skip_dirs: self.skip_dirs,
            jobs: over.jobs.or(self.jobs),
            git: over.git.or(self.git),
        }
    }
}

/// Parse configuration from a YAML string.
///
/// An empty document, or one holding only comments, yields the default
/// configuration.
pub fn parse(yaml_content: &str) -> Result<ConfigFile> {
    let is_blank = yaml_content
        .lines()
        .all(|line| line.trim().is_empty() || line.trim_start().starts_with('#'));
    if is_blank {
        return Ok(ConfigFile::default());
    }

    serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some("supported keys are `skip_dirs`, `jobs` and `git`".to_string()),
    })
}

/// Load and parse a configuration file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Load the layered configuration for a discovery root.
///
/// An explicitly requested file must exist. The implicit files are optional.
pub fn load(explicit: Option<&Path>, root: &Path) -> Result<ConfigFile> {
    let mut config = ConfigFile::default();

    if let Some(user_path) = crate::defaults::user_config_path() {
        if user_path.is_file() {
            debug!("Loading user configuration from {}", user_path.display());
            config = config.layer(from_file(&user_path)?);
        }
    }

    match explicit {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            config = config.layer(from_file(path)?);
        }
        None => {
            let local = root.join(DEFAULT_CONFIG_FILENAME);
            if local.is_file() {
                debug!("Loading configuration from {}", local.display());
                config = config.layer(from_file(&local)?);
            }
        }
    }

    Ok(config)
}

/// Values supplied on the command line or through environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub jobs: Option<usize>,
    pub git: Option<String>,
    pub skip_dirs: Vec<String>,
}

/// Fully resolved, immutable settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub jobs: usize,
    pub tool: String,
    pub skip: SkipPatterns,
}

impl Settings {
    /// Resolve file configuration and overrides into settings.
    pub fn resolve(root: PathBuf, file: ConfigFile, overrides: Overrides) -> Result<Settings> {
        let jobs = overrides.jobs.or(file.jobs).unwrap_or(DEFAULT_JOBS);
        if jobs == 0 {
            return Err(Error::InvalidJobs { value: jobs });
        }

        let tool = overrides
            .git
            .or(file.git)
            .unwrap_or_else(|| DEFAULT_TOOL.to_string());

        let skip = SkipPatterns::new(
            DEFAULT_SKIP_DIRS
                .iter()
                .map(|s| s.to_string())
                .chain(file.skip_dirs)
                .chain(overrides.skip_dirs),
        )?;

        Ok(Settings {
            root,
            jobs,
            tool,
            skip,
        })
    }
}
