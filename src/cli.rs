//! CLI argument parsing and command dispatch

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mgit::config::Overrides;
use mgit::output::{ColorWhen, OutputConfig};

use crate::commands::{self, Context, ReportFormat};

/// mgit - Run git across every repository under a directory
#[derive(Parser, Debug)]
#[command(name = "mgit")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Directory to search for repositories (defaults to the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Number of repositories to process in parallel
    #[arg(short, long, global = true, value_name = "N", env = "MGIT_JOBS")]
    jobs: Option<usize>,

    /// Show what mutating commands would run without running them
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Additional directory name or glob to skip during discovery (repeatable)
    #[arg(long = "skip-dir", global = true, value_name = "PATTERN")]
    skip_dirs: Vec<String>,

    /// Path to the git executable
    #[arg(long, global = true, value_name = "PATH", env = "MGIT_GIT")]
    git: Option<String>,

    /// Configuration file (defaults to .mgit.yaml in the root directory)
    #[arg(long, global = true, value_name = "FILE", env = "MGIT_CONFIG")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: ReportFormat,

    /// When to color repository headers
    #[arg(long, global = true, value_enum, value_name = "WHEN", default_value_t = ColorWhen::Auto)]
    color: ColorWhen,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the working tree status of every repository
    Status(commands::status::StatusArgs),

    /// Show commit logs of every repository
    Log(commands::log::LogArgs),

    /// Show changes in every repository
    Diff(commands::diff::DiffArgs),

    /// Run an arbitrary git command in every repository
    Exec(commands::exec::ExecArgs),

    /// Check out a branch or reference in every repository
    Checkout(commands::checkout::CheckoutArgs),

    /// Commit pending changes, optionally chaining the commits together
    Commit(commands::commit::CommitArgs),

    /// List discovered repositories
    List(commands::list::ListArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<ExitCode> {
        init_logging(&self.log_level);

        let root = match self.root {
            Some(root) => root,
            None => std::env::current_dir()?,
        };
        let ctx = Context {
            root,
            config: self.config,
            overrides: Overrides {
                jobs: self.jobs,
                git: self.git,
                skip_dirs: self.skip_dirs,
            },
            dry_run: self.dry_run,
            format: self.format,
            output: OutputConfig::new(self.color),
        };

        match self.command {
            Commands::Status(args) => commands::status::execute(args, &ctx),
            Commands::Log(args) => commands::log::execute(args, &ctx),
            Commands::Diff(args) => commands::diff::execute(args, &ctx),
            Commands::Exec(args) => commands::exec::execute(args, &ctx),
            Commands::Checkout(args) => commands::checkout::execute(args, &ctx),
            Commands::Commit(args) => commands::commit::execute(args, &ctx),
            Commands::List(args) => commands::list::execute(args, &ctx),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Route `log` output through env_logger on stderr. `RUST_LOG` wins over the
/// `--log-level` flag when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
