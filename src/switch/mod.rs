//! The process-wide switch between live and inactive collection.
//!
//! Instrumented code cites through [`due`], which dispatches to a live
//! [`CollectorHandle`] or to an [`InactiveCollector`] depending on whether
//! collection is enabled. Turning collection on for the first time also
//! creates the [`Injector`] for the live collector; [`DueSwitch::attach`]
//! installs it on a runtime.
//!
//! ```rust
//! use duecite::citation::CiteOptions;
//! use duecite::collector::{CitationCollector, CollectorHandle, InactiveCollector};
//! use duecite::entries::Entry;
//! use duecite::switch::DueSwitch;
//!
//! let mut switch = DueSwitch::new(InactiveCollector, CollectorHandle::default(), false);
//! switch.cite(Entry::text("ignored").into(), &CiteOptions::at("demo"));
//! assert!(switch.live().with(|c| c.is_empty()));
//!
//! switch.activate(true);
//! switch.cite(Entry::text("kept").into(), &CiteOptions::at("demo"));
//! assert!(switch.live().with(|c| c.citation("demo", "kept").is_some()));
//! ```

use crate::citation::{Citation, CiteOptions};
use crate::collector::{CitationCollector, CollectorHandle, InactiveCollector, Wrapper};
use crate::config::DueConfig;
use crate::core::never_fail;
use crate::entries::{Entry, EntryRef};
use crate::injections::Injector;
use crate::io::{CollectorSummary, load_collector};
use crate::runtime::Runtime;
use std::cell::RefCell;
use std::path::Path;
use tracing::{debug, warn};

/// Dispatches collector operations to the live or the inactive collector.
///
/// Once activated, the switch keeps its injector even if deactivated
/// again; members it already wrapped stay wrapped.
pub struct DueSwitch {
    inactive: InactiveCollector,
    live: CollectorHandle,
    active: bool,
    injector: Option<Injector>,
    config: DueConfig,
}

impl DueSwitch {
    pub fn new(inactive: InactiveCollector, live: CollectorHandle, activate: bool) -> Self {
        let mut switch = Self {
            inactive,
            live,
            active: false,
            injector: None,
            config: DueConfig::default(),
        };
        switch.activate(activate);
        switch
    }

    /// A switch for `config`: enabled per `config.enable`, with the live
    /// collector restored from the snapshot file when there is one.
    pub fn from_config(config: DueConfig) -> Self {
        let live = load_live_collector(&config.filename);
        let enable = config.enable;
        let mut switch = Self::new(InactiveCollector, live, false).with_config(config);
        switch.activate(enable);
        switch
    }

    /// Use `config` for [`dump`](Self::dump).
    #[must_use]
    pub fn with_config(mut self, config: DueConfig) -> Self {
        self.config = config;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &DueConfig {
        &self.config
    }

    /// The live collector, whether or not it is the current target.
    pub fn live(&self) -> &CollectorHandle {
        &self.live
    }

    /// The injector, created on first activation.
    pub fn injector(&self) -> Option<&Injector> {
        self.injector.as_ref()
    }

    /// The collector operations currently dispatch to.
    pub fn collector(&self) -> &dyn CitationCollector {
        if self.active { &self.live } else { &self.inactive }
    }

    /// Switch collection on or off.
    pub fn activate(&mut self, activate: bool) {
        if self.active != activate {
            debug!("Switching citation collection {}", if activate { "on" } else { "off" });
            self.active = activate;
        }

        if activate && self.injector.is_none() {
            debug!("Preparing injector for the live collector");
            self.injector = Some(Injector::new(self.live.clone()));
        }
    }

    /// Install the injector on `runtime`, processing units already loaded.
    ///
    /// Does nothing while collection has never been activated.
    pub fn attach(&self, runtime: &mut Runtime) {
        let Some(injector) = &self.injector else {
            debug!("Citation collection is not active, not attaching the injector");
            return;
        };
        never_fail("DueSwitch::attach", || injector.activate(runtime, true));
    }

    /// Write the live collector to the configured outputs.
    pub fn dump(&self) {
        never_fail("DueSwitch::dump", || {
            let summary = CollectorSummary::from_config(&self.config)?;
            summary.dump(&self.live.snapshot())
        });
    }
}

impl CitationCollector for DueSwitch {
    fn is_active(&self) -> bool {
        self.active
    }

    fn add(&self, entry: Entry) {
        self.collector().add(entry);
    }

    fn load(&self, source: &Path) -> Option<usize> {
        self.collector().load(source)
    }

    fn cite(&self, entry: EntryRef, options: &CiteOptions) -> Option<Citation> {
        self.collector().cite(entry, options)
    }

    fn wrap(&self, entry: EntryRef, options: CiteOptions) -> Wrapper {
        self.collector().wrap(entry, options)
    }
}

fn load_live_collector(path: &Path) -> CollectorHandle {
    if !path.exists() {
        return CollectorHandle::default();
    }

    match load_collector(path) {
        Ok(collector) => CollectorHandle::new(collector),
        Err(e) => {
            warn!(
                "Failed to load previously collected {}: {}. Starting with an empty collector",
                path.display(),
                e
            );
            CollectorHandle::default()
        }
    }
}

fn switch_from_env() -> DueSwitch {
    let config = DueConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load duecite configuration: {:#}. Using defaults", e);
        let mut config = DueConfig::default();
        config.apply_env(|name| std::env::var(name).ok());
        config
    });
    DueSwitch::from_config(config)
}

thread_local! {
    static DUE: RefCell<DueSwitch> = RefCell::new(switch_from_env());
}

/// Run `f` against this thread's switch.
///
/// The switch is created on first use from [`DueConfig::load`].
/// Calling `due` again from inside `f` panics.
pub fn due<R>(f: impl FnOnce(&mut DueSwitch) -> R) -> R {
    DUE.with(|switch| f(&mut switch.borrow_mut()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::Collector;
    use crate::io::save_collector;
    use crate::runtime::UnitSpec;
    use tempfile::TempDir;

    #[test]
    fn test_inactive_switch_records_nothing() {
        let switch = DueSwitch::new(InactiveCollector, CollectorHandle::default(), false);
        assert!(!switch.is_active());
        assert!(switch.injector().is_none());
        assert!(!switch.collector().is_active());

        switch.add(Entry::text("a"));
        assert!(switch.cite(Entry::text("a").into(), &CiteOptions::at("demo")).is_none());
        assert!(switch.live().with(Collector::is_empty));
    }

    #[test]
    fn test_activation_creates_one_injector() {
        let mut switch = DueSwitch::new(InactiveCollector, CollectorHandle::default(), true);
        let first: *const Injector = switch.injector().unwrap();

        switch.activate(true);
        switch.activate(false);
        assert!(!switch.is_active());
        switch.activate(true);

        let second: *const Injector = switch.injector().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(switch.injector().unwrap().collector().ptr_eq(switch.live()));
    }

    #[test]
    fn test_attach_cites_builtin_references() {
        let switch = DueSwitch::new(InactiveCollector, CollectorHandle::default(), true);
        let mut rt = Runtime::new();
        rt.define(UnitSpec::new("numpy").version("1.26.4"));

        switch.attach(&mut rt);
        assert!(rt.importer().is_intercepting());
        rt.import("numpy").unwrap();

        let citation = switch.live().with(|c| c.citation("numpy", "van2011numpy").cloned()).unwrap();
        assert_eq!(citation.version(), Some("1.26.4"));
        assert!(citation.cites_module());
    }

    #[test]
    fn test_attach_while_inactive_is_noop() {
        let switch = DueSwitch::new(InactiveCollector, CollectorHandle::default(), false);
        let mut rt = Runtime::new();
        switch.attach(&mut rt);
        assert!(!rt.importer().is_intercepting());
    }

    #[test]
    fn test_from_config_restores_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".duecite.json");
        let mut stored = Collector::new();
        stored.cite(Entry::text("kept"), &CiteOptions::at("demo"));
        save_collector(&stored, &path).unwrap();

        let switch = DueSwitch::from_config(DueConfig {
            enable: true,
            filename: path,
            ..DueConfig::default()
        });
        assert!(switch.is_active());
        assert_eq!(switch.live().snapshot(), stored);
    }

    #[test]
    fn test_corrupt_snapshot_falls_back_to_empty_live_collector() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".duecite.json");
        std::fs::write(&path, "{ broken").unwrap();

        let switch = DueSwitch::from_config(DueConfig {
            enable: true,
            filename: path,
            ..DueConfig::default()
        });
        assert!(switch.is_active());
        assert!(switch.live().with(Collector::is_empty));

        switch.cite(Entry::text("fresh").into(), &CiteOptions::at("demo"));
        assert!(switch.live().with(|c| c.citation("demo", "fresh").is_some()));
    }

    #[test]
    fn test_dump_writes_snapshot() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join(".duecite.json");
        let switch = DueSwitch::new(InactiveCollector, CollectorHandle::default(), true).with_config(DueConfig {
            outputs: vec!["json".to_string()],
            filename: path.clone(),
            ..DueConfig::default()
        });

        switch.cite(Entry::text("dumped").into(), &CiteOptions::at("demo"));
        switch.dump();

        let loaded = load_collector(&path).unwrap();
        assert!(loaded.citation("demo", "dumped").is_some());
    }
}
