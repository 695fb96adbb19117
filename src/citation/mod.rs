//! Citations: records of where an entry was used.
//!
//! A [`Citation`] binds one [`Entry`] to one structural path of the form
//! `unit[.subunit]*[:member[.member]*]`. The part before `:` names the
//! loadable unit, the part after it a member chain inside that unit. A
//! citation is identified by `(path, entry key)`, so the same reference cited
//! from two places gets two independent counters.
//!
//! # Examples
//!
//! ```rust
//! use duecite::citation::{Citation, CiteOptions};
//! use duecite::entries::Entry;
//!
//! let entry = Entry::text("Some paper");
//! let module = Citation::new(entry.clone(), &CiteOptions::at("pkg")).unwrap();
//! let method = Citation::new(entry, &CiteOptions::at("pkg.sub:Obj.method")).unwrap();
//!
//! assert_eq!(method.unit(), "pkg.sub");
//! assert_eq!(method.package(), "pkg");
//! assert_eq!(method.member(), Some("Obj.method"));
//! assert!(module.contains(&method));
//! assert!(!method.contains(&module));
//! ```

use crate::collector::Conditions;
use crate::core::DueError;
use crate::entries::Entry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Tag given to citations created without explicit tags.
pub const DEFAULT_TAG: &str = "implementation";

/// Identity of a citation in the collector: `(path, entry key)`.
pub type CitationKey = (String, String);

/// Options accepted by `cite`, `wrap` and injector registrations.
#[derive(Debug, Clone, Default)]
pub struct CiteOptions {
    /// Structural path; `wrap` and the injector fill in a default
    pub path: Option<String>,
    /// What the cited work provides at this location
    pub description: Option<String>,
    /// Version of the package, if known to the caller
    pub version: Option<String>,
    /// Cite the whole unit even though the path names a member
    pub cite_module: bool,
    /// Tags; `None` means `["implementation"]`
    pub tags: Option<BTreeSet<String>>,
    /// Conditions on call arguments, used by `wrap`
    pub conditions: Option<Conditions>,
}

impl CiteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with only a path set.
    pub fn at(path: impl Into<String>) -> Self {
        Self::new().path(path)
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn cite_module(mut self, cite_module: bool) -> Self {
        self.cite_module = cite_module;
        self
    }

    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }
}

/// A record that an entry was used at a structural path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    entry: Entry,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default)]
    cite_module: bool,
    #[serde(default)]
    tags: BTreeSet<String>,
    #[serde(default)]
    count: u64,
}

impl Citation {
    /// Create a citation with a zero count.
    ///
    /// Fails with [`DueError::MissingPath`] if `options` carries no path.
    pub fn new(entry: Entry, options: &CiteOptions) -> Result<Self, DueError> {
        let path = match options.path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => return Err(DueError::MissingPath),
        };

        let tags = options
            .tags
            .clone()
            .unwrap_or_else(|| BTreeSet::from([DEFAULT_TAG.to_string()]));

        Ok(Self {
            entry,
            path,
            description: options.description.clone(),
            version: options.version.clone(),
            cite_module: options.cite_module,
            tags,
            count: 0,
        })
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn key(&self) -> CitationKey {
        (self.path.clone(), self.entry.key().to_string())
    }

    /// The unit chain before `:`.
    pub fn unit(&self) -> &str {
        self.path.split(':').next().unwrap_or_default()
    }

    /// The first dot-segment of the unit.
    pub fn package(&self) -> &str {
        self.unit().split('.').next().unwrap_or_default()
    }

    /// The member chain after `:`, if any.
    pub fn member(&self) -> Option<&str> {
        self.path.split_once(':').map(|(_, member)| member)
    }

    /// Whether this citation credits a whole unit.
    pub fn cites_module(&self) -> bool {
        self.cite_module || !self.path.contains(':')
    }

    /// Whether `other` is located inside this citation's path.
    pub fn contains(&self, other: &Citation) -> bool {
        path_contains(&self.path, &other.path)
    }

    pub(crate) fn record_use(&mut self) {
        self.count += 1;
    }

    pub(crate) fn set_version(&mut self, version: String) {
        self.version = Some(version);
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Citation({}, path={:?}", self.entry, self.path)?;
        if let Some(description) = &self.description {
            write!(f, ", description={description:?}")?;
        }
        if let Some(version) = &self.version {
            write!(f, ", version={version:?}")?;
        }
        if self.cite_module {
            f.write_str(", cite_module=true")?;
        }
        write!(f, ")")
    }
}

/// Containment between two structural paths.
///
/// A unit path (no `:`) contains itself, its sub-units (`top.`) and its
/// members (`top:`). A member path contains only strict sub-members (`top.`).
pub fn path_contains(top: &str, sub: &str) -> bool {
    if top.contains(':') {
        sub.strip_prefix(top).is_some_and(|rest| rest.starts_with('.'))
    } else {
        sub == top
            || sub
                .strip_prefix(top)
                .is_some_and(|rest| rest.starts_with('.') || rest.starts_with(':'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(path: &str) -> Citation {
        Citation::new(Entry::text("ref"), &CiteOptions::at(path)).unwrap()
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let err = Citation::new(Entry::text("ref"), &CiteOptions::new()).unwrap_err();
        assert!(matches!(err, DueError::MissingPath));

        let err = Citation::new(Entry::text("ref"), &CiteOptions::at("  ")).unwrap_err();
        assert!(matches!(err, DueError::MissingPath));
    }

    #[test]
    fn test_defaults() {
        let c = citation("pkg.sub:func");
        assert_eq!(c.count(), 0);
        assert_eq!(c.tags().iter().collect::<Vec<_>>(), vec!["implementation"]);
        assert_eq!(c.key(), ("pkg.sub:func".to_string(), "ref".to_string()));
        assert!(!c.cites_module());
        assert!(citation("pkg.sub").cites_module());
        let explicit = Citation::new(Entry::text("ref"), &CiteOptions::at("pkg:f").cite_module(true)).unwrap();
        assert!(explicit.cites_module());
    }

    #[test]
    fn test_accessors() {
        let c = citation("pkg.sub:Obj.method");
        assert_eq!(c.unit(), "pkg.sub");
        assert_eq!(c.package(), "pkg");
        assert_eq!(c.member(), Some("Obj.method"));

        let c = citation("pkg");
        assert_eq!(c.unit(), "pkg");
        assert_eq!(c.package(), "pkg");
        assert_eq!(c.member(), None);
    }

    #[test]
    fn test_containment() {
        let pkg = citation("pkg");
        let sub = citation("pkg.sub");
        let method = citation("pkg.sub:Obj.method");
        let other = citation("pkg2:Obj.method");

        assert!(pkg.contains(&pkg));
        assert!(pkg.contains(&sub));
        assert!(pkg.contains(&method));
        assert!(!pkg.contains(&other));
        assert!(!sub.contains(&pkg));
        assert!(sub.contains(&method));
    }

    #[test]
    fn test_member_containment() {
        assert!(path_contains("pkg:Obj", "pkg:Obj.method"));
        assert!(!path_contains("pkg:Obj", "pkg:Obj"));
        assert!(!path_contains("pkg:Obj", "pkg:Object"));
        assert!(!path_contains("pkg", "pkg2"));
    }
}
