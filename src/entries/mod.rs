//! Bibliographic entries.
//!
//! An [`Entry`] is an immutable record of one reference: its kind, the raw
//! text it was created from and the key it is filed under in the collector.
//! Keys are always lowercase so `"XXX0"` and `"xxx0"` address the same entry.
//!
//! # Examples
//!
//! ```rust
//! use duecite::entries::{Entry, EntryKind};
//!
//! let entry = Entry::bibtex("@article{Hunter2007, title={Matplotlib}}").unwrap();
//! assert_eq!(entry.key(), "hunter2007");
//! assert_eq!(entry.kind(), EntryKind::Bibtex);
//!
//! let doi = Entry::doi("10.1109/MCSE.2007.55");
//! assert_eq!(doi.key(), "10.1109/mcse.2007.55");
//! ```

pub mod bibtex;

use crate::core::DueError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of reference kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A complete BibTeX record
    Bibtex,
    /// A DOI, resolved to BibTeX when rendered
    Doi,
    /// Free text rendered as-is
    Text,
    /// A link
    Url,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bibtex => "BibTeX",
            Self::Doi => "Doi",
            Self::Text => "Text",
            Self::Url => "Url",
        };
        f.write_str(name)
    }
}

/// An immutable bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    kind: EntryKind,
    raw: String,
    key: String,
}

impl Entry {
    /// Create a BibTeX entry, keyed by the citation key in its header.
    pub fn bibtex(raw: impl AsRef<str>) -> Result<Self, DueError> {
        let raw = raw.as_ref().trim().to_string();
        let (_, key) = bibtex::parse_header(&raw)?;
        Ok(Self::with_kind(EntryKind::Bibtex, raw, &key))
    }

    /// Create a BibTeX entry filed under `key` instead of the parsed one.
    ///
    /// The header must still be well formed.
    pub fn bibtex_with_key(raw: impl AsRef<str>, key: &str) -> Result<Self, DueError> {
        let entry = Self::bibtex(raw)?;
        tracing::debug!("Replacing parsed key {} for BibTeX with the provided {}", entry.key, key);
        Ok(entry.with_key(key))
    }

    /// Create a DOI entry.
    pub fn doi(doi: impl Into<String>) -> Self {
        let raw = doi.into();
        let key = raw.clone();
        Self::with_kind(EntryKind::Doi, raw, &key)
    }

    /// Create a free-text entry.
    pub fn text(text: impl Into<String>) -> Self {
        let raw = text.into();
        let key = raw.clone();
        Self::with_kind(EntryKind::Text, raw, &key)
    }

    /// Create a URL entry.
    pub fn url(url: impl Into<String>) -> Self {
        let raw = url.into();
        let key = raw.clone();
        Self::with_kind(EntryKind::Url, raw, &key)
    }

    fn with_kind(kind: EntryKind, raw: String, key: &str) -> Self {
        Self {
            kind,
            raw,
            key: key.to_lowercase(),
        }
    }

    /// Replace the key this entry is filed under.
    #[must_use]
    pub fn with_key(mut self, key: &str) -> Self {
        self.key = key.to_lowercase();
        self
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The DOI, for DOI entries.
    pub fn as_doi(&self) -> Option<&str> {
        (self.kind == EntryKind::Doi).then_some(self.raw.as_str())
    }

    /// The raw text of the entry.
    pub fn format(&self) -> String {
        self.raw.clone()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}, key={:?})", self.kind, self.raw, self.key)
    }
}

/// Either the key of an entry already known to a collector, or an entry.
///
/// Passing an entry adds it to the collector before citing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRef {
    Key(String),
    Entry(Entry),
}

impl EntryRef {
    /// The lowercase key this reference resolves to.
    pub fn key(&self) -> String {
        match self {
            Self::Key(key) => key.to_lowercase(),
            Self::Entry(entry) => entry.key().to_string(),
        }
    }
}

impl From<Entry> for EntryRef {
    fn from(entry: Entry) -> Self {
        Self::Entry(entry)
    }
}

impl From<&Entry> for EntryRef {
    fn from(entry: &Entry) -> Self {
        Self::Entry(entry.clone())
    }
}

impl From<&str> for EntryRef {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for EntryRef {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}
