//! Test fixtures for creating sample data
//!
//! BibTeX files, collectors and a small runtime of units modelled on a
//! scientific package with a clustering sub-module.

use crate::citation::CiteOptions;
use crate::collector::{Collector, Conditions};
use crate::constants::DC_DEFAULT;
use crate::entries::Entry;
use crate::injections::{InjectionModule, Injector};
use crate::runtime::{CallArgs, Runtime, UnitSpec};
use crate::version::VersionBounds;
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// The NumPy reference, used across tests.
pub const NUMPY_BIBTEX: &str = r"@article{van2011numpy,
    title={The NumPy array: a structure for efficient numerical computation},
    author={Van Der Walt, Stefan and Colbert, S Chris and Varoquaux, Gael},
    journal={Computing in Science \& Engineering},
    volume={13},
    number={2},
    pages={22--30},
    year={2011}
}";

/// Test fixture for creating sample `.bib` files
#[derive(Clone, Debug)]
pub struct BibFixture {
    pub content: String,
    pub name: String,
}

impl BibFixture {
    /// Two well-formed records
    pub fn sample() -> Self {
        Self {
            name: "refs.bib".to_string(),
            content: format!(
                "{NUMPY_BIBTEX}\n\n{}",
                r"@book{jain1988algorithms,
    title={Algorithms for clustering data},
    author={Jain, Anil K and Dubes, Richard C},
    year={1988},
    publisher={Prentice-Hall, Inc.}
}"
            ),
        }
    }

    /// A record without a citation key
    pub fn missing_key() -> Self {
        Self {
            name: "broken.bib".to_string(),
            content: "@article{title={No key here}, year={2020}}".to_string(),
        }
    }

    /// The sample records behind a header comment containing an `@`
    pub fn with_stray_at() -> Self {
        Self {
            name: "annotated.bib".to_string(),
            content: format!("% maintained by someone@example.org\n{}", Self::sample().content),
        }
    }

    /// Write the fixture into `dir`, returning the file path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.name);
        fs::write(&path, &self.content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// A collector with a package citation, a module citation and an object
/// citation, the object cited twice.
pub fn sample_collector() -> Collector {
    let mut collector = Collector::new();
    collector.cite(
        Entry::bibtex(NUMPY_BIBTEX).unwrap_or_else(|e| panic!("fixture BibTeX is invalid: {e}")),
        &CiteOptions::at("demo").description("Array computing").cite_module(true),
    );
    collector.cite(
        Entry::doi("10.1109/72.761722"),
        &CiteOptions::at("demo.cluster").description("Clustering").tags(["edu"]),
    );
    for _ in 0..2 {
        collector.cite(
            Entry::text("Ward, J.H. Hierarchical grouping to optimize an objective function."),
            &CiteOptions::at("demo.cluster:linkage").description("Ward linkage").tags(["implementation"]),
        );
    }
    collector
}

fn linkage(args: &CallArgs) -> Result<Value> {
    let method = args.lookup(Some(1), Some("method")).and_then(Value::as_str).unwrap_or("single");
    Ok(json!({ "method": method }))
}

/// A runtime with:
///
/// - `demo` 1.0.0
/// - `demo.cluster` with `linkage(data, method="single")`
/// - `demo.plot`, which requires `demo.cluster` when it loads
/// - `other` 3.2.1, unrelated to `demo`
pub fn demo_runtime() -> Runtime {
    let mut rt = Runtime::new();
    rt.define(UnitSpec::new("demo").version("1.0.0"))
        .define(
            UnitSpec::new("demo.cluster")
                .documented_member("linkage", "Hierarchical clustering", linkage)
                .member("cut", |_| Ok(Value::Null)),
        )
        .define(UnitSpec::new("demo.plot").requires("demo.cluster").member("show", |_| Ok(Value::Bool(true))))
        .define(UnitSpec::new("other").version("3.2.1"));
    rt
}

fn inject_demo(injector: &Injector) -> Result<()> {
    injector.register(
        "demo",
        None,
        Entry::bibtex(NUMPY_BIBTEX)?,
        CiteOptions::new().description("Array computing").cite_module(true),
    );
    injector.register_within(
        "demo.cluster",
        Some("linkage"),
        Entry::text("Ward, J.H. Hierarchical grouping to optimize an objective function."),
        VersionBounds::any().with_min("0.5"),
        CiteOptions::new()
            .description("Ward linkage")
            .conditions(Conditions::new().on(1, "method", ["ward"])),
    );
    injector.register_within(
        "demo.cluster",
        Some("linkage"),
        Entry::text("Sibson, R. SLINK: an optimally efficient algorithm for the single-link cluster method."),
        VersionBounds::any(),
        CiteOptions::new()
            .description("Single linkage")
            .conditions(Conditions::new().on(1, "method", ["single", DC_DEFAULT])),
    );
    Ok(())
}

/// Registration module for the `demo` package of [`demo_runtime`].
///
/// Not submitted to the global registry; pass it to
/// [`Injector::with_modules`].
pub static DEMO_MODULE: InjectionModule = InjectionModule {
    name: "test::demo",
    unit: "demo",
    inject: inject_demo,
};

fn inject_failing(_injector: &Injector) -> Result<()> {
    anyhow::bail!("registration exploded")
}

/// Registration module for `demo` that always fails.
pub static FAILING_MODULE: InjectionModule = InjectionModule {
    name: "test::failing",
    unit: "demo",
    inject: inject_failing,
};
