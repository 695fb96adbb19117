//! Version parsing and comparison.
//!
//! Package versions in the wild are often not semantic versions (`1.2`,
//! `0.19.dev0`, `2.0rc1`). [`KnownVersion`] keeps strict semver where it
//! parses and falls back to a loose, component-wise comparison otherwise.
//! A version that could not be determined at all is [`KnownVersion::Unknown`],
//! which never compares.

use regex::Regex;
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A package version as recorded in the version registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnownVersion {
    /// A strict semantic version
    Semver(Version),
    /// Any other version string, compared component by component
    Loose(String),
    /// A package whose version could not be determined
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Component {
    Num(u64),
    Alpha(String),
}

impl KnownVersion {
    /// Parse a version string, stripping `v`, `version-` and `release-` prefixes.
    ///
    /// An empty string yields [`KnownVersion::Unknown`].
    pub fn parse(version_str: &str) -> Self {
        let trimmed = version_str.trim();
        let clean_version = if let Some(stripped) = trimmed.strip_prefix("version-") {
            stripped
        } else if let Some(stripped) = trimmed.strip_prefix("release-") {
            stripped
        } else if let Some(stripped) = trimmed.strip_prefix('v') {
            stripped
        } else {
            trimmed
        };

        if clean_version.is_empty() {
            return Self::Unknown;
        }

        match Version::parse(clean_version) {
            Ok(version) => Self::Semver(version),
            Err(_) => Self::Loose(clean_version.to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Compare two versions; `None` when either side is unknown.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Unknown, _) | (_, Self::Unknown) => None,
            (Self::Semver(a), Self::Semver(b)) => Some(a.cmp(b)),
            (a, b) => Some(a.components().cmp(&b.components())),
        }
    }

    fn components(&self) -> Vec<Component> {
        let text = self.to_string();
        let Ok(re) = Regex::new(r"\d+|[a-zA-Z]+") else {
            return Vec::new();
        };
        re.find_iter(&text)
            .map(|m| match m.as_str().parse::<u64>() {
                Ok(n) => Component::Num(n),
                Err(_) => Component::Alpha(m.as_str().to_lowercase()),
            })
            .collect()
    }
}

impl fmt::Display for KnownVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Semver(version) => write!(f, "{version}"),
            Self::Loose(version) => f.write_str(version),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// Range of package versions a citation applies to.
///
/// `min` is inclusive, `max` exclusive. A version that is unknown is
/// always admitted, since there is nothing to compare against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionBounds {
    pub min: Option<String>,
    pub max: Option<String>,
}

impl VersionBounds {
    /// Bounds that admit every version.
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_min(mut self, min: &str) -> Self {
        self.min = Some(min.to_string());
        self
    }

    #[must_use]
    pub fn with_max(mut self, max: &str) -> Self {
        self.max = Some(max.to_string());
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Whether `version` lies within the bounds.
    pub fn admits(&self, version: &KnownVersion) -> bool {
        if let Some(min) = &self.min
            && version.compare(&KnownVersion::parse(min)) == Some(Ordering::Less)
        {
            return false;
        }
        if let Some(max) = &self.max
            && matches!(
                version.compare(&KnownVersion::parse(max)),
                Some(Ordering::Greater | Ordering::Equal)
            )
        {
            return false;
        }
        true
    }
}

impl fmt::Display for VersionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min, &self.max) {
            (None, None) => f.write_str("*"),
            (Some(min), None) => write!(f, ">={min}"),
            (None, Some(max)) => write!(f, "<{max}"),
            (Some(min), Some(max)) => write!(f, ">={min}, <{max}"),
        }
    }
}
