//! The injector: attaches citations to units when they are loaded.
//!
//! Registrations name a unit, optionally a member inside it, and the entry
//! to cite. Nothing happens until the unit is loaded. [`Injector::activate`]
//! installs an [`InterceptingImporter`] in front of the runtime's importer;
//! each unit newly loaded through it is then [processed](Injector::process)
//! exactly once:
//!
//! 1. the unit's lazy registration module runs, if one is pending;
//! 2. every member record wraps the member so calls to it cite the entry;
//! 3. every whole-unit record adds the entry and cites it at the unit.
//!
//! Loads nest: loading one unit can load others, and a registration module
//! for `scipy` registers records for `scipy.cluster.hierarchy`. So units
//! newly seen during a load are queued, and the queue is only drained once
//! the outermost load has returned, shallowest units first. While the queue
//! drains, or for a unit already processed or queued, the importer forwards
//! straight to the importer it replaced.

use super::InjectionModule;
use crate::citation::CiteOptions;
use crate::collector::CollectorHandle;
use crate::core::{DueError, allow_fail};
use crate::entries::{Entry, EntryRef};
use crate::runtime::{Importer, Runtime};
use crate::version::{VersionBounds, external_versions};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

/// A pending citation for a unit or one of its members.
#[derive(Debug, Clone)]
pub struct InjectionRecord {
    pub entry: Entry,
    pub options: CiteOptions,
    pub bounds: VersionBounds,
}

type RecordTable = BTreeMap<String, BTreeMap<Option<String>, Vec<InjectionRecord>>>;

#[derive(Default)]
struct InjectorState {
    entry_records: RecordTable,
    delayed_injections: BTreeMap<String, &'static InjectionModule>,
    processed: BTreeSet<String>,
    queue: BTreeSet<String>,
    import_level: usize,
    processing_queue: bool,
    orig_importer: Option<Rc<dyn Importer>>,
}

/// Lazily attaches citations to units of a [`Runtime`].
///
/// Cloning gives another handle on the same state; registration modules
/// receive a shared reference.
#[derive(Clone)]
pub struct Injector {
    collector: CollectorHandle,
    modules: Rc<Vec<&'static InjectionModule>>,
    state: Rc<RefCell<InjectorState>>,
    raise_module_errors: bool,
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Injector")
            .field("modules", &self.modules.iter().map(|m| m.name).collect::<Vec<_>>())
            .field("records", &state.entry_records.keys().collect::<Vec<_>>())
            .field("processed", &state.processed)
            .field("active", &state.orig_importer.is_some())
            .finish()
    }
}

impl Injector {
    /// An injector using every discovered registration module.
    pub fn new(collector: CollectorHandle) -> Self {
        Self::with_modules(collector, super::modules_for_injection())
    }

    /// An injector using only `modules`.
    pub fn with_modules(collector: CollectorHandle, modules: Vec<&'static InjectionModule>) -> Self {
        Self {
            collector,
            modules: Rc::new(modules),
            state: Rc::new(RefCell::new(InjectorState::default())),
            raise_module_errors: allow_fail(),
        }
    }

    /// Surface the registration module's own error instead of
    /// [`DueError::InjectionModuleFailed`]. Defaults to `DUECITE_ALLOW_FAIL`.
    #[must_use]
    pub fn raise_module_errors(mut self, raise: bool) -> Self {
        self.raise_module_errors = raise;
        self
    }

    pub fn collector(&self) -> &CollectorHandle {
        &self.collector
    }

    pub fn modules(&self) -> &[&'static InjectionModule] {
        &self.modules
    }

    /// Register `entry` for `unit`, or for `member` within it.
    ///
    /// The citation path defaults to `unit` or `unit:member`. Nothing is
    /// loaded; the record waits until the unit is processed.
    pub fn register(&self, unit: &str, member: Option<&str>, entry: Entry, options: CiteOptions) {
        self.register_within(unit, member, entry, VersionBounds::any(), options);
    }

    /// Like [`register`](Self::register), limited to unit versions in `bounds`.
    pub fn register_within(
        &self,
        unit: &str,
        member: Option<&str>,
        entry: Entry,
        bounds: VersionBounds,
        mut options: CiteOptions,
    ) {
        if options.path.is_none() {
            options.path = Some(match member {
                Some(member) => format!("{unit}:{member}"),
                None => unit.to_string(),
            });
        }

        trace!("Registering {} for {}:{}", entry.key(), unit, member.unwrap_or_default());
        self.state
            .borrow_mut()
            .entry_records
            .entry(unit.to_string())
            .or_default()
            .entry(member.map(str::to_string))
            .or_default()
            .push(InjectionRecord {
                entry,
                options,
                bounds,
            });
    }

    /// All pending records as `(unit, member, record)`.
    pub fn records(&self) -> Vec<(String, Option<String>, InjectionRecord)> {
        let state = self.state.borrow();
        state
            .entry_records
            .iter()
            .flat_map(|(unit, members)| {
                members.iter().flat_map(move |(member, records)| {
                    records.iter().map(move |record| (unit.clone(), member.clone(), record.clone()))
                })
            })
            .collect()
    }

    /// Whether this injector's importer is installed.
    pub fn is_active(&self) -> bool {
        self.state.borrow().orig_importer.is_some()
    }

    pub fn is_processed(&self, unit: &str) -> bool {
        self.state.borrow().processed.contains(unit)
    }

    /// Units whose registration module has not run yet.
    pub fn pending_injections(&self) -> Vec<String> {
        self.state.borrow().delayed_injections.keys().cloned().collect()
    }

    /// Install interception on `runtime`.
    ///
    /// A runtime that already intercepts is left alone with a warning. With
    /// `retrospect`, units loaded before activation are processed first.
    pub fn activate(&self, runtime: &mut Runtime, retrospect: bool) -> anyhow::Result<()> {
        if runtime.importer().is_intercepting() {
            warn!("Seems that we are activating the injector twice. No harm is done but shouldn't happen");
            return Ok(());
        }

        self.populate_delayed_injections();

        if retrospect {
            let mut loaded = runtime.loaded_units();
            loaded.sort_by_key(|unit| depth_key(unit));
            for unit in loaded {
                if !self.is_processed(&unit) {
                    self.process(runtime, &unit)?;
                }
            }
        }

        debug!("Installing intercepting importer");
        let importer = Rc::new(InterceptingImporter {
            injector: self.clone(),
        });
        let previous = runtime.set_importer(importer);
        self.state.borrow_mut().orig_importer = Some(previous);
        Ok(())
    }

    /// Restore the importer that was in place before [`activate`](Self::activate).
    ///
    /// Members already wrapped stay wrapped.
    pub fn deactivate(&self, runtime: &mut Runtime) {
        let previous = self.state.borrow_mut().orig_importer.take();
        match previous {
            Some(previous) => {
                debug!("Restoring original importer");
                runtime.set_importer(previous);
            }
            None => warn!("Injector was not activated, so there is no importer to restore"),
        }
    }

    fn populate_delayed_injections(&self) {
        let mut state = self.state.borrow_mut();
        for module in self.modules.iter() {
            if !state.processed.contains(module.unit) {
                state.delayed_injections.insert(module.unit.to_string(), module);
            }
        }
    }

    fn run_injection_module(&self, module: &InjectionModule) -> anyhow::Result<()> {
        debug!("Processing delayed injection {} for {}", module.name, module.unit);
        match (module.inject)(self) {
            Ok(()) => Ok(()),
            Err(e) if self.raise_module_errors => Err(e),
            Err(e) => Err(DueError::InjectionModuleFailed {
                module: module.name.to_string(),
                reason: format!("{e:#}"),
            }
            .into()),
        }
    }

    /// Process a unit once: run its pending registration module, then apply
    /// its records.
    ///
    /// Only a failing registration module is an error. Members that cannot
    /// be found are skipped with a warning.
    pub fn process(&self, runtime: &mut Runtime, unit: &str) -> anyhow::Result<()> {
        let delayed = {
            let mut state = self.state.borrow_mut();
            state.processed.insert(unit.to_string());
            state.delayed_injections.remove(unit)
        };

        if let Some(module) = delayed {
            self.run_injection_module(module)?;
        }

        if !self.state.borrow().entry_records.contains_key(unit) {
            return Ok(());
        }
        debug!("Request to process known to injector unit {}", unit);

        if !runtime.is_loaded(unit) {
            warn!("Failed to access unit {} among loaded units", unit);
            return Ok(());
        }

        let records = self.state.borrow_mut().entry_records.remove(unit).unwrap_or_default();
        let unit_version = external_versions(|v| v.get(top_level(unit)));

        for (member, records) in records {
            let applicable: Vec<InjectionRecord> = records
                .into_iter()
                .filter(|record| {
                    let admitted = unit_version.as_ref().is_none_or(|v| record.bounds.admits(v));
                    if !admitted {
                        debug!(
                            "Skipping {} for {}: version outside {}",
                            record.entry.key(),
                            unit,
                            record.bounds
                        );
                    }
                    admitted
                })
                .collect();

            match member {
                Some(member_name) => self.wrap_member(runtime, unit, &member_name, applicable),
                None => {
                    for record in applicable {
                        self.collector.add(record.entry.clone());
                        self.collector.cite(EntryRef::Key(record.entry.key().to_string()), &record.options);
                    }
                }
            }
        }

        Ok(())
    }

    fn wrap_member(&self, runtime: &mut Runtime, unit: &str, member_name: &str, records: Vec<InjectionRecord>) {
        if records.is_empty() {
            return;
        }

        let mut member = match runtime.member(unit, member_name) {
            Ok(member) => member,
            Err(e) => {
                warn!("Could not find {} in unit {}: {}", member_name, unit, e);
                return;
            }
        };

        for record in records {
            self.collector.add(record.entry.clone());
            let key = EntryRef::Key(record.entry.key().to_string());
            member = self.collector.wrap(key, record.options).apply(member);
        }

        if let Err(e) = runtime.replace_member(unit, member) {
            warn!("Failed to install wrapped {} in unit {}: {}", member_name, unit, e);
        }
    }

    fn handle_fresh_imports(&self, runtime: &Runtime, before: &BTreeSet<String>, name: &str) {
        let mut state = self.state.borrow_mut();
        let fresh: Vec<String> =
            runtime.loaded_units().into_iter().filter(|unit| !before.contains(unit)).collect();

        let mut candidates: BTreeSet<String> = BTreeSet::new();
        for unit in fresh.iter().map(String::as_str).chain(std::iter::once(name)) {
            let top = top_level(unit);
            if runtime.is_loaded(top) {
                candidates.insert(top.to_string());
            }
            if runtime.is_loaded(unit) {
                candidates.insert(unit.to_string());
            }
        }

        for unit in candidates {
            if !state.processed.contains(&unit) && !state.queue.contains(&unit) {
                trace!("Queueing {} for processing", unit);
                state.queue.insert(unit);
            }
        }
    }

    fn process_queue(&self, runtime: &mut Runtime) -> anyhow::Result<()> {
        self.state.borrow_mut().processing_queue = true;

        let result = loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let next = state.queue.iter().min_by_key(|unit| depth_key(unit)).cloned();
                if let Some(unit) = &next {
                    state.queue.remove(unit);
                }
                next
            };

            let Some(unit) = next else {
                break Ok(());
            };
            if self.is_processed(&unit) {
                continue;
            }
            if let Err(e) = self.process(runtime, &unit) {
                self.state.borrow_mut().queue.clear();
                break Err(e);
            }
        };

        self.state.borrow_mut().processing_queue = false;
        result
    }
}

/// Importer installed by [`Injector::activate`].
pub struct InterceptingImporter {
    injector: Injector,
}

impl Importer for InterceptingImporter {
    fn import(&self, runtime: &mut Runtime, name: &str) -> anyhow::Result<()> {
        let (short_circuit, original) = {
            let state = self.injector.state.borrow();
            (
                state.processing_queue || state.processed.contains(name) || state.queue.contains(name),
                state.orig_importer.clone(),
            )
        };

        let Some(original) = original else {
            return runtime.load_unit(name);
        };
        if short_circuit {
            return original.import(runtime, name);
        }

        let before: BTreeSet<String> = runtime.loaded_units().into_iter().collect();
        self.injector.state.borrow_mut().import_level += 1;
        trace!("Importing {} through the injector", name);

        let result = original.import(runtime, name);
        self.injector.handle_fresh_imports(runtime, &before, name);

        let level = {
            let mut state = self.injector.state.borrow_mut();
            state.import_level -= 1;
            state.import_level
        };

        if level == 0 {
            self.injector.process_queue(runtime)?;
        }
        result
    }

    fn is_intercepting(&self) -> bool {
        true
    }
}

fn top_level(unit: &str) -> &str {
    unit.split('.').next().unwrap_or(unit)
}

fn depth_key(unit: &str) -> (usize, String) {
    (unit.matches('.').count(), unit.to_string())
}
