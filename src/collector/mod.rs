//! The citation collector.
//!
//! A [`Collector`] owns two tables: known entries by key, and citations by
//! `(path, entry key)`. Both only grow. Entries are added with
//! [`Collector::add`] or loaded from a `.bib` file; citations are recorded by
//! [`Collector::cite`], or by calling a member wrapped with a [`Wrapper`].
//!
//! Instrumented code usually holds a [`CollectorHandle`], a shared handle
//! that wrapped members keep a clone of. [`InactiveCollector`] offers the
//! same operations as no-ops, and both implement [`CitationCollector`].
//!
//! # Examples
//!
//! ```rust
//! use duecite::citation::CiteOptions;
//! use duecite::collector::Collector;
//! use duecite::entries::Entry;
//!
//! let mut collector = Collector::new();
//! collector.add(Entry::bibtex("@misc{XXX0, title={Demo}}").unwrap());
//!
//! for _ in 0..3 {
//!     collector.cite("XXX0", &CiteOptions::at("demo"));
//! }
//!
//! let citation = collector.citation("demo", "xxx0").unwrap();
//! assert_eq!(citation.count(), 3);
//! ```

mod conditions;

pub use conditions::{Conditions, Trigger};

use crate::citation::{Citation, CitationKey, CiteOptions};
use crate::core::{DueError, never_fail};
use crate::entries::{Entry, EntryRef, bibtex};
use crate::runtime::{CallArgs, Member};
use crate::version::external_versions;
use std::cell::{RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// Entry and citation tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collector {
    entries: BTreeMap<String, Entry>,
    citations: BTreeMap<CitationKey, Citation>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a collector from stored entries and citations.
    ///
    /// Entries referenced by citations but missing from `entries` are added.
    pub fn from_parts(
        entries: impl IntoIterator<Item = Entry>,
        citations: impl IntoIterator<Item = Citation>,
    ) -> Self {
        let mut collector = Self::new();
        collector.add_all(entries);
        for citation in citations {
            let entry = citation.entry().clone();
            collector.entries.entry(entry.key().to_string()).or_insert(entry);
            collector.citations.insert(citation.key(), citation);
        }
        collector
    }

    /// Insert an entry under its key, replacing any entry with the same key.
    pub fn add(&mut self, entry: Entry) {
        trace!("Adding entry {}", entry.key());
        self.entries.insert(entry.key().to_string(), entry);
    }

    pub fn add_all(&mut self, entries: impl IntoIterator<Item = Entry>) {
        for entry in entries {
            self.add(entry);
        }
    }

    /// Load entries from a reference file, returning how many were added.
    ///
    /// Only BibTeX (`.bib`) files are supported. Records that fail to parse
    /// are skipped with a warning, unless none of the file's records parse.
    pub fn try_load(&mut self, source: &Path) -> Result<usize, DueError> {
        let source_str = source.to_str().ok_or_else(|| DueError::InvalidSource {
            source_path: source.display().to_string(),
        })?;

        let is_bib = source.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("bib"));
        if !is_bib {
            return Err(DueError::UnsupportedFormat {
                source_path: source_str.to_string(),
            });
        }

        debug!("Loading {}", source_str);
        let content = std::fs::read_to_string(source)?;
        let mut entries = Vec::new();
        let mut first_error = None;
        for record in bibtex::split_entries(&content) {
            match Entry::bibtex(&record) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    warn!("Skipping unreadable record in {}: {}", source_str, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        // Nothing readable at all is an error, not an empty file
        if let (true, Some(e)) = (entries.is_empty(), first_error) {
            return Err(e);
        }

        let count = entries.len();
        self.add_all(entries);
        Ok(count)
    }

    /// [`try_load`](Self::try_load) under the never-fail policy.
    pub fn load(&mut self, source: &Path) -> Option<usize> {
        never_fail("Collector::load", || self.try_load(source))
    }

    /// Record one use of an entry at `options.path`.
    ///
    /// A passed [`Entry`] is added first; a key must name a known entry.
    /// The citation's count is incremented and its version filled in from
    /// `options` or, failing that, from the version registry entry of the
    /// path's top-level package.
    pub fn try_cite(
        &mut self,
        entry: impl Into<EntryRef>,
        options: &CiteOptions,
    ) -> Result<Citation, DueError> {
        let path = match options.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => return Err(DueError::MissingPath),
        };

        let entry = match entry.into() {
            EntryRef::Entry(entry) => {
                self.add(entry.clone());
                entry
            }
            EntryRef::Key(key) => {
                let key = key.to_lowercase();
                self.entries.get(&key).cloned().ok_or(DueError::EntryNotFound {
                    key,
                })?
            }
        };

        let key = (path, entry.key().to_string());
        if !self.citations.contains_key(&key) {
            let citation = Citation::new(entry, options)?;
            self.citations.insert(key.clone(), citation);
        }

        let citation = self.citations.get_mut(&key).ok_or(DueError::MissingPath)?;
        citation.record_use();

        if citation.version().is_none() {
            let version = options.version.clone().or_else(|| {
                let package = citation.package().to_string();
                external_versions(|v| v.get(&package))
                    .filter(|version| !version.is_unknown())
                    .map(|version| version.to_string())
            });
            if let Some(version) = version {
                citation.set_version(version);
            }
        }

        Ok(citation.clone())
    }

    /// [`try_cite`](Self::try_cite) under the never-fail policy.
    pub fn cite(&mut self, entry: impl Into<EntryRef>, options: &CiteOptions) -> Option<Citation> {
        never_fail("Collector::cite", || self.try_cite(entry, options))
    }

    pub fn entries(&self) -> &BTreeMap<String, Entry> {
        &self.entries
    }

    pub fn citations(&self) -> &BTreeMap<CitationKey, Citation> {
        &self.citations
    }

    /// Look up an entry by key, ignoring case.
    pub fn entry(&self, key: &str) -> Option<&Entry> {
        self.entries.get(&key.to_lowercase())
    }

    pub fn citation(&self, path: &str, key: &str) -> Option<&Citation> {
        self.citations.get(&(path.to_string(), key.to_lowercase()))
    }

    /// One representative citation per entry key, first seen in path order.
    pub fn citations_by_entry(&self) -> BTreeMap<String, &Citation> {
        let mut by_entry = BTreeMap::new();
        for ((_, key), citation) in &self.citations {
            by_entry.entry(key.clone()).or_insert(citation);
        }
        by_entry
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.citations.is_empty()
    }
}

impl fmt::Display for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collector {} entries, {} citations", self.entries.len(), self.citations.len())
    }
}

/// Uniform interface over live and inactive collectors.
pub trait CitationCollector {
    /// Whether citations are actually being recorded.
    fn is_active(&self) -> bool;

    fn add(&self, entry: Entry);

    fn load(&self, source: &Path) -> Option<usize>;

    fn cite(&self, entry: EntryRef, options: &CiteOptions) -> Option<Citation>;

    /// A wrapper that cites `entry` whenever a member it is applied to runs.
    fn wrap(&self, entry: EntryRef, options: CiteOptions) -> Wrapper;
}

/// Shared handle on a live [`Collector`].
///
/// Clones share the same tables. Borrows are never held across calls into
/// wrapped members.
#[derive(Debug, Clone, Default)]
pub struct CollectorHandle(Rc<RefCell<Collector>>);

impl CollectorHandle {
    pub fn new(collector: Collector) -> Self {
        Self(Rc::new(RefCell::new(collector)))
    }

    /// Exclusive access for an instrumentation call, or `CollectorBusy`
    /// when the collector is already borrowed further up the stack.
    fn borrow_for(&self, operation: &str) -> Result<RefMut<'_, Collector>, DueError> {
        self.0.try_borrow_mut().map_err(|_| DueError::CollectorBusy {
            operation: operation.to_string(),
        })
    }

    pub fn add(&self, entry: Entry) {
        never_fail("Collector::add", || self.borrow_for("add").map(|mut c| c.add(entry)));
    }

    pub fn add_all(&self, entries: impl IntoIterator<Item = Entry>) {
        never_fail("Collector::add_all", || self.borrow_for("add_all").map(|mut c| c.add_all(entries)));
    }

    pub fn try_cite(&self, entry: impl Into<EntryRef>, options: &CiteOptions) -> Result<Citation, DueError> {
        self.borrow_for("cite")?.try_cite(entry, options)
    }

    pub fn cite(&self, entry: impl Into<EntryRef>, options: &CiteOptions) -> Option<Citation> {
        let entry = entry.into();
        never_fail("Collector::cite", || self.try_cite(entry, options))
    }

    /// A wrapper citing `entry` with `options` on every call.
    ///
    /// When `options` has no path, the wrapped member's `unit:name` is used.
    pub fn wrap(&self, entry: impl Into<EntryRef>, options: CiteOptions) -> Wrapper {
        Wrapper {
            target: Some(WrapTarget {
                collector: self.clone(),
                entry: entry.into(),
                options,
            }),
        }
    }

    /// Run `f` with shared access to the collector.
    pub fn with<R>(&self, f: impl FnOnce(&Collector) -> R) -> R {
        f(&self.0.borrow())
    }

    /// Run `f` with exclusive access to the collector.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut Collector) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// A copy of the collector's current state.
    pub fn snapshot(&self) -> Collector {
        self.0.borrow().clone()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl CitationCollector for CollectorHandle {
    fn is_active(&self) -> bool {
        true
    }

    fn add(&self, entry: Entry) {
        CollectorHandle::add(self, entry);
    }

    fn load(&self, source: &Path) -> Option<usize> {
        never_fail("Collector::load", || self.borrow_for("load")?.try_load(source))
    }

    fn cite(&self, entry: EntryRef, options: &CiteOptions) -> Option<Citation> {
        CollectorHandle::cite(self, entry, options)
    }

    fn wrap(&self, entry: EntryRef, options: CiteOptions) -> Wrapper {
        CollectorHandle::wrap(self, entry, options)
    }
}

/// Collector used while citation collection is disabled.
///
/// Every operation succeeds and records nothing; `wrap` returns members
/// unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct InactiveCollector;

impl CitationCollector for InactiveCollector {
    fn is_active(&self) -> bool {
        false
    }

    fn add(&self, _entry: Entry) {}

    fn load(&self, _source: &Path) -> Option<usize> {
        None
    }

    fn cite(&self, _entry: EntryRef, _options: &CiteOptions) -> Option<Citation> {
        None
    }

    fn wrap(&self, _entry: EntryRef, _options: CiteOptions) -> Wrapper {
        Wrapper::identity()
    }
}

#[derive(Debug, Clone)]
struct WrapTarget {
    collector: CollectorHandle,
    entry: EntryRef,
    options: CiteOptions,
}

/// Applies citation triggers to members.
#[derive(Debug, Clone, Default)]
pub struct Wrapper {
    target: Option<WrapTarget>,
}

impl Wrapper {
    /// A wrapper that leaves members untouched.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.target.is_none()
    }

    /// Wrap `member` so each call cites before delegating.
    ///
    /// The result keeps the member's unit, name and doc. The original body is
    /// called with the same arguments and its result, including errors, is
    /// returned unchanged. Calls whose arguments fail the configured
    /// conditions do not cite.
    pub fn apply(&self, member: Member) -> Member {
        let Some(target) = self.target.clone() else {
            return member;
        };

        let WrapTarget {
            collector,
            entry,
            mut options,
        } = target;
        if options.path.is_none() {
            options.path = Some(format!("{}:{}", member.unit(), member.name()));
        }

        let inner = member.func();
        member.rewrapped(Rc::new(move |args: &CallArgs| {
            let cites = options.conditions.as_ref().is_none_or(|conditions| conditions.matches(args));
            if cites {
                collector.cite(entry.clone(), &options);
            }
            inner(args)
        }))
    }
}
