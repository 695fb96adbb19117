//! Citation reports.
//!
//! [`collate`] selects the citations worth reporting and groups them by
//! level: packages (`numpy`), modules (`scipy.cluster.hierarchy`) and
//! objects (`scipy.cluster.hierarchy:linkage`). A package citation is only
//! reported if it credits the whole package, if something inside the package
//! was cited as well, or if everything was asked for. That way merely
//! loading a package does not put it in the report.
//!
//! [`TextOutput`] and [`BibTeXOutput`] write collated reports.
//! [`CollectorSummary`] dispatches to the outputs named in the
//! configuration, including the JSON snapshot.

use crate::citation::{Citation, path_contains};
use crate::collector::Collector;
use crate::config::DueConfig;
use crate::core::DueError;
use crate::entries::{Entry, EntryKind};
use crate::io::doi::DoiCache;
use crate::io::render::{Style, text_rendering};
use crate::io::store::save_collector;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// Citations grouped by path, per level.
#[derive(Debug, Default)]
pub struct Collated<'a> {
    pub packages: BTreeMap<String, Vec<&'a Citation>>,
    pub modules: BTreeMap<String, Vec<&'a Citation>>,
    pub objects: BTreeMap<String, Vec<&'a Citation>>,
}

impl<'a> Collated<'a> {
    /// All groups, ordered by path so a package precedes its contents.
    pub fn by_path(&self) -> BTreeMap<&str, &[&'a Citation]> {
        self.packages
            .iter()
            .chain(&self.modules)
            .chain(&self.objects)
            .map(|(path, citations)| (path.as_str(), citations.as_slice()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.modules.is_empty() && self.objects.is_empty()
    }
}

/// Select and group the citations of `collector` for a report.
///
/// With `tags` of `["*"]` every citation is kept; otherwise only those
/// sharing a tag with `tags`.
pub fn collate<'a>(collector: &'a Collector, tags: &[String], all: bool) -> Collated<'a> {
    let wanted: BTreeSet<&str> = tags.iter().map(String::as_str).collect();
    let keep_all_tags = wanted.len() == 1 && wanted.contains("*");

    let mut collated = Collated::default();
    for ((path, _), citation) in collector.citations() {
        if !keep_all_tags && !citation.tags().iter().any(|tag| wanted.contains(tag.as_str())) {
            continue;
        }

        let level = if path.contains(':') {
            &mut collated.objects
        } else if path.contains('.') {
            &mut collated.modules
        } else {
            &mut collated.packages
        };
        level.entry(path.clone()).or_default().push(citation);
    }

    if !all {
        let inner: Vec<&String> = collated.modules.keys().chain(collated.objects.keys()).collect();
        collated.packages.retain(|package, citations| {
            let keep = citations.iter().any(|c| c.cites_module())
                || inner.iter().any(|path| path_contains(package, path));
            if !keep {
                debug!("Dropping package {} with nothing cited inside it", package);
            }
            keep
        });
    }

    collated
}

/// What a report includes and how it renders references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    pub tags: Vec<String>,
    pub all: bool,
    pub style: Style,
}

impl ReportOptions {
    pub fn from_config(config: &DueConfig) -> Self {
        Self {
            tags: config.report_tags.clone(),
            all: config.report_all,
            style: Style::resolve(&config.style),
        }
    }
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::from_config(&DueConfig::default())
    }
}

/// Numbered text report followed by statistics and the reference list.
pub struct TextOutput<W: Write> {
    out: W,
    options: ReportOptions,
    cache: Option<DoiCache>,
}

impl<W: Write> TextOutput<W> {
    pub fn new(out: W, options: ReportOptions) -> Self {
        Self {
            out,
            options,
            cache: None,
        }
    }

    /// Render DOI entries from cached BibTeX records.
    #[must_use]
    pub fn with_cache(mut self, cache: DoiCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn dump(&mut self, collector: &Collector) -> Result<()> {
        let collated = collate(collector, &self.options.tags, self.options.all);
        let groups = collated.by_path();

        // Reference numbers in order of first appearance
        let mut numbers: BTreeMap<&str, usize> = BTreeMap::new();
        let mut ordered: Vec<&Entry> = Vec::new();
        for citation in groups.values().flat_map(|citations| citations.iter()) {
            let key = citation.entry().key();
            if !numbers.contains_key(key) {
                numbers.insert(key, numbers.len() + 1);
                ordered.push(citation.entry());
            }
        }

        write!(self.out, "\nDueCite Report:\n")?;
        for (path, citations) in &groups {
            if path.contains(':') || path.contains('.') {
                write!(self.out, "  ")?;
            }
            writeln!(self.out, "{}", format_group(path, citations, &numbers))?;
        }

        for (count, kind) in [
            (collated.packages.len(), "package"),
            (collated.modules.len(), "module"),
            (collated.objects.len(), "function"),
        ] {
            let plural = if count == 1 { "" } else { "s" };
            write!(self.out, "\n{count} {kind}{plural} cited")?;
        }

        if !groups.is_empty() {
            write!(self.out, "\n\nReferences\n{}\n", "-".repeat(10))?;
            for (number, entry) in ordered.iter().enumerate() {
                let rendered = text_rendering(entry, self.options.style, self.cache.as_ref());
                write!(self.out, "\n[{}] {}", number + 1, rendered)?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

fn format_group(path: &str, citations: &[&Citation], numbers: &BTreeMap<&str, usize>) -> String {
    let descriptions: BTreeSet<&str> = citations.iter().filter_map(|c| c.description()).collect();
    let versions: BTreeSet<&str> = citations.iter().filter_map(|c| c.version()).collect();
    let references: Vec<String> = citations
        .iter()
        .filter_map(|c| numbers.get(c.entry().key()))
        .map(ToString::to_string)
        .collect();

    let descriptions = descriptions.into_iter().collect::<Vec<_>>().join(", ");
    let mut line = format!("- {descriptions} / {path}");
    if !versions.is_empty() {
        line.push_str(&format!(" (v {})", versions.into_iter().collect::<Vec<_>>().join(", ")));
    }
    line.push_str(&format!(" [{}]", references.join(", ")));
    line
}

/// Distinct BibTeX records of the reported citations.
///
/// DOI entries are written from the cache; entries without a BibTeX form
/// are skipped with a warning.
pub struct BibTeXOutput<W: Write> {
    out: W,
    options: ReportOptions,
    cache: Option<DoiCache>,
}

impl<W: Write> BibTeXOutput<W> {
    pub fn new(out: W, options: ReportOptions) -> Self {
        Self {
            out,
            options,
            cache: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: DoiCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn dump(&mut self, collector: &Collector) -> Result<()> {
        let collated = collate(collector, &self.options.tags, self.options.all);

        let mut seen = BTreeSet::new();
        for citation in collated.by_path().values().flat_map(|citations| citations.iter()) {
            let entry = citation.entry();
            if !seen.insert(entry.key()) {
                continue;
            }

            let bibtex = match entry.kind() {
                EntryKind::Bibtex => Some(entry.raw().to_string()),
                EntryKind::Doi => self.cache.as_ref().and_then(|cache| cache.get(entry.raw())),
                EntryKind::Text | EntryKind::Url => None,
            };
            match bibtex {
                Some(bibtex) => writeln!(self.out, "{}", bibtex.trim())?,
                None => warn!("Failed to generate bibtex for {}", entry),
            }
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Destinations a summary can be dumped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
    /// The collector snapshot file
    Json,
}

impl FromStr for OutputKind {
    type Err = DueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "json" => Ok(Self::Json),
            other => Err(DueError::UnsupportedOutput {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Writes a collector to every configured output.
#[derive(Debug, Clone)]
pub struct CollectorSummary {
    outputs: Vec<OutputKind>,
    filename: PathBuf,
    options: ReportOptions,
    cache: DoiCache,
}

impl CollectorSummary {
    /// Build the summary from configuration.
    ///
    /// Fails with [`DueError::UnsupportedOutput`] for an unknown output name.
    pub fn from_config(config: &DueConfig) -> Result<Self, DueError> {
        let outputs = config.outputs.iter().map(|name| name.parse::<OutputKind>()).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            outputs,
            filename: config.filename.clone(),
            options: ReportOptions::from_config(config),
            cache: DoiCache::new(&config.cache_dir),
        })
    }

    pub fn outputs(&self) -> &[OutputKind] {
        &self.outputs
    }

    pub fn dump(&self, collector: &Collector) -> Result<()> {
        for output in &self.outputs {
            debug!("Dumping citations to {}", output);
            match output {
                OutputKind::Stdout => TextOutput::new(std::io::stdout().lock(), self.options.clone())
                    .with_cache(self.cache.clone())
                    .dump(collector)?,
                OutputKind::Stderr => TextOutput::new(std::io::stderr().lock(), self.options.clone())
                    .with_cache(self.cache.clone())
                    .dump(collector)?,
                OutputKind::Json => save_collector(collector, &self.filename)
                    .with_context(|| format!("Failed to write {}", self.filename.display()))?,
            }
        }
        Ok(())
    }
}
