//! Registry of known package versions.
//!
//! The collector uses this registry to fill in the version of the package a
//! citation was made from. It is static: versions get in through explicit
//! [`ExternalVersions::register`] calls, or when a unit declaring a version is
//! defined in a [`Runtime`](crate::runtime::Runtime). Loaded units are never
//! inspected.
//!
//! The process-wide registry lives in a thread-local and is reached through
//! [`external_versions`].
//!
//! ```rust
//! use duecite::version::{external_versions, KnownVersion};
//!
//! external_versions(|v| v.register("numpy", "1.26.4"));
//! let numpy = external_versions(|v| v.get("numpy"));
//! assert_eq!(numpy.map(|v| v.to_string()), Some("1.26.4".to_string()));
//! ```

pub mod comparison;

pub use comparison::{KnownVersion, VersionBounds};

use std::cell::RefCell;
use std::collections::BTreeMap;

/// Name-to-version table for external packages.
#[derive(Debug, Clone, Default)]
pub struct ExternalVersions {
    versions: BTreeMap<String, KnownVersion>,
}

impl ExternalVersions {
    /// A registry seeded with this crate's own version.
    pub fn new() -> Self {
        let mut versions = Self::default();
        versions.register(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        versions
    }

    /// Record the version of `name`; an empty string records it as unknown.
    ///
    /// Names are case-insensitive.
    pub fn register(&mut self, name: &str, version: &str) {
        self.versions.insert(name.to_lowercase(), KnownVersion::parse(version));
    }

    pub fn get(&self, name: &str) -> Option<KnownVersion> {
        self.versions.get(&name.to_lowercase()).cloned()
    }
}

thread_local! {
    static EXTERNAL_VERSIONS: RefCell<ExternalVersions> = RefCell::new(ExternalVersions::new());
}

/// Run `f` against this thread's version registry.
pub fn external_versions<R>(f: impl FnOnce(&mut ExternalVersions) -> R) -> R {
    EXTERNAL_VERSIONS.with(|versions| f(&mut versions.borrow_mut()))
}
