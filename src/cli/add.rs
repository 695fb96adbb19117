//! Load entries from a BibTeX file into a snapshot.
//!
//! Entries added this way are available to key-only citations made by
//! later runs that restore the snapshot.

use crate::collector::Collector;
use crate::config::DueConfig;
use crate::io::{load_collector, save_collector};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

/// Command to add BibTeX entries to a snapshot.
#[derive(Args)]
pub struct AddCommand {
    /// BibTeX file to load
    bibtex: PathBuf,

    /// Snapshot file (defaults to the configured one, `.duecite.json`)
    #[arg(short, long)]
    filename: Option<PathBuf>,
}

impl AddCommand {
    pub fn execute(&self, config: &DueConfig) -> Result<()> {
        let path = self.filename.clone().unwrap_or_else(|| config.filename.clone());
        let mut collector = if path.exists() {
            load_collector(&path).with_context(|| format!("Failed to load citations from {}", path.display()))?
        } else {
            Collector::new()
        };

        let added = collector
            .try_load(&self.bibtex)
            .with_context(|| format!("Failed to load entries from {}", self.bibtex.display()))?;
        save_collector(&collector, &path)?;

        println!(
            "{}",
            format!("Added {} entries from {} to {}", added, self.bibtex.display(), path.display()).green()
        );
        Ok(())
    }
}
