//! The unit-loading mechanism citations get injected into.
//!
//! A [`Runtime`] holds three things:
//! - the *available* unit definitions ([`UnitSpec`]), registered with
//!   [`Runtime::define`];
//! - the *loaded* units ([`Unit`]), each with its table of callable
//!   [`Member`]s;
//! - the *importer*, a replaceable [`Importer`] that every load request made
//!   through [`Runtime::import`] goes through.
//!
//! Host code calls members through [`Runtime::call`], which always consults
//! the loaded-unit table. Replacing a member there with a wrapped version is
//! how citations get attached to code the host did not write.
//!
//! Loading `a.b.c` loads `a` and `a.b` first with the primitive loader. A
//! unit that [`requires`](UnitSpec::requires) other units imports them
//! through the importer after it is inserted, the way a module body imports
//! its dependencies. If one of those imports fails, the unit is removed again.

use crate::core::DueError;
use crate::version::external_versions;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Signature of a member's implementation.
pub type MemberFn = Rc<dyn Fn(&CallArgs) -> anyhow::Result<Value>>;

/// Arguments of a member call: positional values and keyword values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keyword: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments made of positional values only.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keyword: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn arg(mut self, value: Value) -> Self {
        self.positional.push(value);
        self
    }

    #[must_use]
    pub fn kwarg(mut self, name: &str, value: Value) -> Self {
        self.keyword.insert(name.to_string(), value);
        self
    }

    /// The argument bound to `name`, or else the one at `position`.
    pub fn lookup(&self, position: Option<usize>, name: Option<&str>) -> Option<&Value> {
        name.and_then(|name| self.keyword.get(name))
            .or_else(|| position.and_then(|position| self.positional.get(position)))
    }
}

/// A callable inside a loaded unit.
#[derive(Clone)]
pub struct Member {
    unit: String,
    name: String,
    doc: Option<String>,
    func: MemberFn,
    wrap_depth: usize,
}

impl Member {
    pub fn new<F>(unit: &str, name: &str, func: F) -> Self
    where
        F: Fn(&CallArgs) -> anyhow::Result<Value> + 'static,
    {
        Self {
            unit: unit.to_string(),
            name: name.to_string(),
            doc: None,
            func: Rc::new(func),
            wrap_depth: 0,
        }
    }

    #[must_use]
    pub fn with_doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    /// A member with this one's unit, name and doc but a new body.
    ///
    /// Used by wrappers, which must look like the member they wrap.
    pub fn rewrapped(&self, func: MemberFn) -> Self {
        Self {
            unit: self.unit.clone(),
            name: self.name.clone(),
            doc: self.doc.clone(),
            func,
            wrap_depth: self.wrap_depth + 1,
        }
    }

    /// The unit the member was declared in.
    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// How many wrappers are stacked on the original body.
    pub fn wrap_depth(&self) -> usize {
        self.wrap_depth
    }

    pub fn call(&self, args: &CallArgs) -> anyhow::Result<Value> {
        (self.func)(args)
    }

    pub(crate) fn func(&self) -> MemberFn {
        Rc::clone(&self.func)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("unit", &self.unit)
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("wrap_depth", &self.wrap_depth)
            .finish_non_exhaustive()
    }
}

/// Definition of a unit that can be loaded.
#[derive(Debug, Clone)]
pub struct UnitSpec {
    name: String,
    version: Option<String>,
    members: Vec<Member>,
    requires: Vec<String>,
}

impl UnitSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            members: Vec::new(),
            requires: Vec::new(),
        }
    }

    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Add a member implemented by `func`.
    #[must_use]
    pub fn member<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&CallArgs) -> anyhow::Result<Value> + 'static,
    {
        let member = Member::new(&self.name, name, func);
        self.members.push(member);
        self
    }

    /// Add a member with documentation.
    #[must_use]
    pub fn documented_member<F>(mut self, name: &str, doc: &str, func: F) -> Self
    where
        F: Fn(&CallArgs) -> anyhow::Result<Value> + 'static,
    {
        let member = Member::new(&self.name, name, func).with_doc(doc);
        self.members.push(member);
        self
    }

    /// Units imported (through the importer) when this one loads.
    #[must_use]
    pub fn requires(mut self, unit: &str) -> Self {
        self.requires.push(unit.to_string());
        self
    }
}

/// A loaded unit: the member table calls are dispatched through.
#[derive(Debug, Clone)]
pub struct Unit {
    members: BTreeMap<String, Member>,
}

impl Unit {
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }
}

/// Entry point for load requests.
///
/// The runtime starts with [`BaseImporter`]. Anything that wants to observe
/// loads installs its own importer with [`Runtime::set_importer`] and
/// forwards to the previous one.
pub trait Importer {
    fn import(&self, runtime: &mut Runtime, name: &str) -> anyhow::Result<()>;

    /// Whether this importer intercepts loads on behalf of an injector.
    fn is_intercepting(&self) -> bool {
        false
    }
}

/// Importer that just loads the unit.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseImporter;

impl Importer for BaseImporter {
    fn import(&self, runtime: &mut Runtime, name: &str) -> anyhow::Result<()> {
        runtime.load_unit(name)
    }
}

pub struct Runtime {
    available: BTreeMap<String, UnitSpec>,
    loaded: BTreeMap<String, Unit>,
    importer: Rc<dyn Importer>,
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("available", &self.available.keys().collect::<Vec<_>>())
            .field("loaded", &self.loaded.keys().collect::<Vec<_>>())
            .field("intercepting", &self.importer.is_intercepting())
            .finish()
    }
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            available: BTreeMap::new(),
            loaded: BTreeMap::new(),
            importer: Rc::new(BaseImporter),
        }
    }

    /// Make a unit available for loading.
    ///
    /// A declared version is recorded in the version registry, the way an
    /// installed package's metadata would be.
    pub fn define(&mut self, spec: UnitSpec) -> &mut Self {
        if let Some(version) = &spec.version {
            external_versions(|v| v.register(&spec.name, version));
        }
        self.available.insert(spec.name.clone(), spec);
        self
    }

    /// Load `name` through the installed importer.
    pub fn import(&mut self, name: &str) -> anyhow::Result<()> {
        let importer = Rc::clone(&self.importer);
        importer.import(self, name)
    }

    /// Load `name` without going through the importer.
    ///
    /// Parents are loaded first; a unit already loaded is left alone.
    pub fn load_unit(&mut self, name: &str) -> anyhow::Result<()> {
        if self.loaded.contains_key(name) {
            return Ok(());
        }

        if let Some((parent, _)) = name.rsplit_once('.') {
            self.load_unit(parent)?;
        }

        let spec = self.available.get(name).cloned().ok_or_else(|| DueError::UnitNotFound {
            unit: name.to_string(),
        })?;

        trace!("Loading unit {}", name);
        let members = spec.members.iter().map(|m| (m.name.clone(), m.clone())).collect();
        self.loaded.insert(
            name.to_string(),
            Unit {
                members,
            },
        );

        for required in &spec.requires {
            if let Err(e) = self.import(required) {
                debug!("Loading {} failed while importing {}: {}", name, required, e);
                self.unload(name);
                return Err(e);
            }
        }

        Ok(())
    }

    /// Install `importer`, returning the one it replaces.
    pub fn set_importer(&mut self, importer: Rc<dyn Importer>) -> Rc<dyn Importer> {
        std::mem::replace(&mut self.importer, importer)
    }

    pub fn importer(&self) -> Rc<dyn Importer> {
        Rc::clone(&self.importer)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains_key(name)
    }

    /// Names of all loaded units, sorted.
    pub fn loaded_units(&self) -> Vec<String> {
        self.loaded.keys().cloned().collect()
    }

    pub fn unit(&self, name: &str) -> Option<&Unit> {
        self.loaded.get(name)
    }

    /// Resolve a member of a loaded unit.
    pub fn member(&self, unit: &str, name: &str) -> Result<Member, DueError> {
        let loaded = self.unit(unit).ok_or_else(|| DueError::UnitNotFound {
            unit: unit.to_string(),
        })?;
        loaded.member(name).cloned().ok_or_else(|| DueError::MemberNotFound {
            unit: unit.to_string(),
            member: name.to_string(),
        })
    }

    /// Replace a member of a loaded unit, returning the previous one.
    pub fn replace_member(&mut self, unit: &str, member: Member) -> Result<Member, DueError> {
        let loaded = self.loaded.get_mut(unit).ok_or_else(|| DueError::UnitNotFound {
            unit: unit.to_string(),
        })?;
        let previous = loaded.members.get_mut(&member.name).ok_or_else(|| DueError::MemberNotFound {
            unit: unit.to_string(),
            member: member.name.clone(),
        })?;
        Ok(std::mem::replace(previous, member))
    }

    /// Call a member of a loaded unit.
    pub fn call(&self, unit: &str, member: &str, args: &CallArgs) -> anyhow::Result<Value> {
        self.member(unit, member)?.call(args)
    }

    /// Drop a loaded unit and all of its sub-units.
    pub fn unload(&mut self, name: &str) {
        let prefix = format!("{name}.");
        self.loaded.retain(|loaded, _| loaded != name && !loaded.starts_with(&prefix));
    }
}
