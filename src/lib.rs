//! duecite - lazily injected citation collection.
//!
//! duecite records which references a program actually relied on while it
//! ran. Libraries and applications cite works for the code paths that
//! implement them; citations are only recorded when those paths run, so the
//! final report lists what was used rather than everything that could have
//! been.
//!
//! # Architecture Overview
//!
//! - **Entries** ([`entries`]): immutable references (BibTeX, DOI, text, URL)
//!   filed under a lowercase key.
//! - **Citations** ([`citation`]): an entry used at a structural path such as
//!   `scipy.cluster.hierarchy:linkage`, with tags and a use count.
//! - **Collector** ([`collector`]): the store of entries and citations, plus
//!   wrappers that cite whenever a member is called.
//! - **Runtime** ([`runtime`]): units that are loaded by name through a
//!   replaceable importer, each with callable members.
//! - **Injector** ([`injections`]): intercepts unit loading and attaches
//!   registered citations to units and members as they are loaded. The
//!   registrations for well-known packages live in
//!   [`injections::builtin`] and only run when their package is loaded.
//! - **Switch** ([`switch`]): the per-thread on/off switch between the live
//!   collector and an inactive one, driven by `DUECITE_ENABLE`.
//! - **I/O** ([`io`]): JSON snapshots, text and BibTeX reports, DOI lookups.
//!
//! # Example
//!
//! ```rust
//! use duecite::citation::CiteOptions;
//! use duecite::collector::CollectorHandle;
//! use duecite::entries::Entry;
//! use duecite::injections::Injector;
//! use duecite::runtime::{Runtime, UnitSpec};
//! use serde_json::json;
//!
//! let mut rt = Runtime::new();
//! rt.define(UnitSpec::new("stats").version("2.1.0").member("mean", |_| Ok(json!(0.5))));
//!
//! let collector = CollectorHandle::default();
//! let injector = Injector::with_modules(collector.clone(), Vec::new());
//! injector.register(
//!     "stats",
//!     Some("mean"),
//!     Entry::text("Gauss, C.F. Theoria motus."),
//!     CiteOptions::new().description("Arithmetic mean"),
//! );
//! injector.activate(&mut rt, false).unwrap();
//!
//! rt.import("stats").unwrap();
//! assert!(collector.with(|c| c.citations().is_empty()));
//!
//! rt.call("stats", "mean", &Default::default()).unwrap();
//! let citation = collector.with(|c| c.citation("stats:mean", "gauss, c.f. theoria motus.").cloned());
//! assert_eq!(citation.map(|c| c.count()), Some(1));
//! ```
//!
//! # Configuration
//!
//! See [`config`] for the config file and the `DUECITE_*` variables.

pub mod citation;
pub mod cli;
pub mod collector;
pub mod config;
pub mod constants;
pub mod core;
pub mod entries;
pub mod injections;
pub mod io;
pub mod runtime;
pub mod switch;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
