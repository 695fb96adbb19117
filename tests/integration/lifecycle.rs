use duecite::collector::{CitationCollector, CollectorHandle, InactiveCollector};
use duecite::config::DueConfig;
use duecite::io::{load_collector, save_collector};
use duecite::runtime::{CallArgs, Runtime, UnitSpec};
use duecite::switch::DueSwitch;
use duecite::test_utils::{init_test_logging, sample_collector};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;

fn scipy_runtime() -> Runtime {
    let mut rt = Runtime::new();
    rt.define(UnitSpec::new("scipy").version("1.11.1"))
        .define(UnitSpec::new("scipy.cluster"))
        .define(UnitSpec::new("scipy.cluster.hierarchy").member("linkage", |_| Ok(json!([[0, 1, 0.5, 2]]))));
    rt
}

fn config_for(path: &Path) -> DueConfig {
    DueConfig {
        enable: true,
        outputs: vec!["json".to_string()],
        filename: path.to_path_buf(),
        ..DueConfig::default()
    }
}

#[test]
fn test_builtin_scipy_citations_survive_a_dump() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join(".duecite.json");

    let switch = DueSwitch::from_config(config_for(&snapshot));
    let mut rt = scipy_runtime();
    switch.attach(&mut rt);

    rt.import("scipy.cluster.hierarchy").unwrap();
    rt.call("scipy.cluster.hierarchy", "linkage", &CallArgs::positional([json!([1.0, 2.0, 4.0])])).unwrap();
    switch.dump();

    let restored = load_collector(&snapshot).unwrap();
    let scipy = restored.citation("scipy", "jop+01").unwrap();
    assert_eq!(scipy.version(), Some("1.11.1"));

    let slink = restored.citation("scipy.cluster.hierarchy:linkage", "sibson1973slink").unwrap();
    assert_eq!(slink.count(), 1);
    assert!(restored.citation("scipy.cluster.hierarchy:linkage", "ward1963hierarchical").is_none());

    // Every hierarchy reference is cited for the module itself
    let edu = restored
        .citations()
        .values()
        .filter(|c| c.path() == "scipy.cluster.hierarchy" && c.tags().contains("edu"))
        .count();
    assert_eq!(edu, 7);
}

#[test]
fn test_restored_collector_keeps_counting() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join(".duecite.json");
    save_collector(&sample_collector(), &snapshot).unwrap();

    let switch = DueSwitch::from_config(config_for(&snapshot));
    let ward = "ward, j.h. hierarchical grouping to optimize an objective function.";
    assert_eq!(switch.live().with(|c| c.citation("demo.cluster:linkage", ward).map(|c| c.count())), Some(2));

    // Key-only citation of an entry known from the snapshot
    switch.cite(ward.into(), &duecite::citation::CiteOptions::at("demo.cluster:linkage"));
    switch.dump();

    let restored = load_collector(&snapshot).unwrap();
    assert_eq!(restored.citation("demo.cluster:linkage", ward).map(|c| c.count()), Some(3));
}

#[test]
fn test_unreadable_snapshot_falls_back_to_empty_live_collector() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join(".duecite.json");
    std::fs::write(&snapshot, r#"{"version": 99, "entries": [], "citations": []}"#).unwrap();

    let switch = DueSwitch::from_config(config_for(&snapshot));
    assert!(switch.is_active());
    assert!(switch.live().with(|c| c.is_empty()));

    let mut rt = scipy_runtime();
    switch.attach(&mut rt);
    rt.import("scipy").unwrap();
    assert!(switch.live().with(|c| c.citation("scipy", "jop+01").is_some()));
}

#[test]
fn test_disabled_switch_collects_nothing() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join(".duecite.json");

    let switch = DueSwitch::from_config(DueConfig {
        enable: false,
        ..config_for(&snapshot)
    });
    let mut rt = scipy_runtime();
    switch.attach(&mut rt);
    rt.import("scipy.cluster.hierarchy").unwrap();

    assert!(!rt.importer().is_intercepting());
    assert!(switch.live().with(|c| c.is_empty()));
    assert!(!switch.collector().is_active());
}

#[test]
fn test_switch_toggles_dispatch_target() {
    init_test_logging(None);
    let live = CollectorHandle::default();
    let mut switch = DueSwitch::new(InactiveCollector, live.clone(), true);
    let options = duecite::citation::CiteOptions::at("demo");

    switch.cite(duecite::entries::Entry::text("first").into(), &options);
    switch.activate(false);
    switch.cite(duecite::entries::Entry::text("second").into(), &options);
    switch.activate(true);
    switch.cite(duecite::entries::Entry::text("third").into(), &options);

    live.with(|c| {
        assert!(c.citation("demo", "first").is_some());
        assert!(c.citation("demo", "second").is_none());
        assert!(c.citation("demo", "third").is_some());
    });
}
