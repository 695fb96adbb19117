//! Print the report for a collector snapshot.

use crate::config::DueConfig;
use crate::constants::ENV_ENABLE;
use crate::io::doi::prefetch;
use crate::io::{BibTeXOutput, DoiCache, ReportOptions, Style, TextOutput, load_collector};
use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

/// Command to print the citation report for a snapshot.
#[derive(Args)]
pub struct SummaryCommand {
    /// Snapshot file (defaults to the configured one, `.duecite.json`)
    #[arg(short, long)]
    filename: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    format: SummaryFormat,

    /// Comma separated tags to report, `*` for all
    #[arg(long, value_delimiter = ',')]
    tags: Option<Vec<String>>,

    /// Report packages even if nothing inside them was cited
    #[arg(long)]
    all: bool,

    /// Bibliography style for the text report (harvard1, apa)
    #[arg(long)]
    style: Option<String>,

    /// Do not fetch BibTeX for DOIs missing from the cache
    #[arg(long)]
    offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SummaryFormat {
    Text,
    Bibtex,
}

impl SummaryCommand {
    pub async fn execute(&self, config: &DueConfig) -> Result<()> {
        let path = self.filename.clone().unwrap_or_else(|| config.filename.clone());
        if !path.exists() {
            bail!("No citations collected at {}. Run a program with {}=yes first", path.display(), ENV_ENABLE);
        }
        let collector =
            load_collector(&path).with_context(|| format!("Failed to load citations from {}", path.display()))?;
        debug!("Loaded {}", collector);

        let options = self.report_options(config);
        let cache = DoiCache::new(&config.cache_dir);
        if !self.offline {
            let fetched = prefetch(collector.entries().values(), &cache).await;
            debug!("Fetched {} DOI records into {}", fetched, cache.dir().display());
        }

        let stdout = std::io::stdout();
        match self.format {
            SummaryFormat::Text => TextOutput::new(stdout.lock(), options).with_cache(cache).dump(&collector),
            SummaryFormat::Bibtex => BibTeXOutput::new(stdout.lock(), options).with_cache(cache).dump(&collector),
        }
    }

    fn report_options(&self, config: &DueConfig) -> ReportOptions {
        let mut options = ReportOptions::from_config(config);
        if let Some(tags) = &self.tags {
            let tags: Vec<String> =
                tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
            if !tags.is_empty() {
                options.tags = tags;
            }
        }
        options.all |= self.all;
        if let Some(style) = &self.style {
            options.style = Style::resolve(style);
        }
        options
    }
}
