//! Command-line interface for duecite.
//!
//! The binary works on collector snapshots written by instrumented
//! programs. It never loads units itself.
//!
//! # Commands
//!
//! - `summary` - Print the report for a snapshot, as text or BibTeX
//! - `add` - Load the entries of a `.bib` file into a snapshot
//! - `injections` - List the built-in registration modules and their records
//!
//! # Example
//!
//! ```bash
//! # Run an instrumented program, then look at what it used
//! DUECITE_ENABLE=yes ./analysis
//! duecite summary
//!
//! # BibTeX for everything, ready for a paper
//! duecite summary --format bibtex --tags '*' > refs.bib
//!
//! # What would be cited for scipy
//! duecite injections --unit scipy
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only report errors
//! - `--config` - Path to a config file instead of `~/.duecite/config.toml`

mod add;
mod injections;
mod summary;

use crate::config::DueConfig;
use crate::constants::DEFAULT_LOG_LEVEL;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration for CLI execution.
///
/// Holds what the global flags decide, so commands and tests can be run
/// without touching the process environment.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter; `None` defers to `RUST_LOG`, then to `warn`.
    pub log_level: Option<String>,

    /// Config file to use instead of the default location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the stderr log subscriber.
    ///
    /// Safe to call more than once; only the first subscriber is kept.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Settings for this invocation.
    ///
    /// An explicit `--config` file must exist; environment overrides apply
    /// on top of it as usual.
    pub fn load_due_config(&self) -> Result<DueConfig> {
        match &self.config_path {
            Some(path) => {
                let mut config = DueConfig::load_from(path)?;
                config.apply_env(|name| std::env::var(name).ok());
                Ok(config)
            }
            None => DueConfig::load(),
        }
    }
}

/// Inspect and maintain citations collected by duecite.
#[derive(Parser)]
#[command(
    name = "duecite",
    about = "Inspect citations collected from instrumented programs",
    version,
    author,
    long_about = "duecite records which references a program actually relied on while it ran. \
                  This tool reports on the collected snapshots."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the citation report for a snapshot.
    ///
    /// See [`summary::SummaryCommand`].
    Summary(summary::SummaryCommand),

    /// Load entries from a BibTeX file into a snapshot.
    ///
    /// See [`add::AddCommand`].
    Add(add::AddCommand),

    /// List built-in registration modules.
    ///
    /// See [`injections::InjectionsCommand`].
    Injections(injections::InjectionsCommand),
}

impl Cli {
    /// Execute with the configuration given by the global flags.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        let due_config = config.load_due_config()?;

        match self.command {
            Commands::Summary(cmd) => cmd.execute(&due_config).await,
            Commands::Add(cmd) => cmd.execute(&due_config),
            Commands::Injections(cmd) => cmd.execute(),
        }
    }
}
