//! Lazy citation injection into loaded units.
//!
//! Registration modules describe which entries to cite for a unit and its
//! members. Each one is an [`InjectionModule`] submitted with
//! [`inventory::submit!`], keyed by the top-level unit whose load triggers
//! it. The [`Injector`] runs a module the first time its unit is processed,
//! so the references of packages that are never loaded cost nothing.
//!
//! ```rust,ignore
//! inventory::submit! {
//!     InjectionModule { name: "builtin::numpy", unit: "numpy", inject }
//! }
//!
//! fn inject(injector: &Injector) -> anyhow::Result<()> {
//!     injector.register("numpy", None, Entry::doi("10.1109/MCSE.2011.37"), CiteOptions::new());
//!     Ok(())
//! }
//! ```

pub mod builtin;
mod injector;

pub use injector::{InjectionRecord, Injector, InterceptingImporter};

/// A registration module for one top-level unit.
///
/// `inject` only sees the [`Injector`], so a module registers records and
/// cannot load units itself. Units a package needs at load time belong in
/// its [`UnitSpec::requires`](crate::runtime::UnitSpec::requires). As a
/// result no load reaches the [`InterceptingImporter`] while its queue is
/// being drained.
#[derive(Debug)]
pub struct InjectionModule {
    /// Name used in logs and errors
    pub name: &'static str,
    /// Unit whose processing runs the module
    pub unit: &'static str,
    /// Registers records on the injector
    pub inject: fn(&Injector) -> anyhow::Result<()>,
}

inventory::collect!(InjectionModule);

/// All submitted registration modules, sorted by name.
pub fn modules_for_injection() -> Vec<&'static InjectionModule> {
    let mut modules: Vec<_> = inventory::iter::<InjectionModule>.into_iter().collect();
    modules.sort_by_key(|module| module.name);
    modules
}
