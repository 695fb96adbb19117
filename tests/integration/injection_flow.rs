use duecite::collector::CollectorHandle;
use duecite::core::DueError;
use duecite::injections::Injector;
use duecite::runtime::{BaseImporter, CallArgs, Importer, Runtime, UnitSpec};
use duecite::test_utils::{DEMO_MODULE, FAILING_MODULE, demo_runtime, init_test_logging};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

const WARD: &str = "ward, j.h. hierarchical grouping to optimize an objective function.";
const SLINK: &str = "sibson, r. slink: an optimally efficient algorithm for the single-link cluster method.";

fn demo_injector() -> (CollectorHandle, Injector) {
    init_test_logging(None);
    let collector = CollectorHandle::default();
    let injector = Injector::with_modules(collector.clone(), vec![&DEMO_MODULE]).raise_module_errors(false);
    (collector, injector)
}

fn count(collector: &CollectorHandle, path: &str, key: &str) -> u64 {
    collector.with(|c| c.citation(path, key).map_or(0, |citation| citation.count()))
}

#[test]
fn test_registration_runs_only_when_package_loads() {
    let (collector, injector) = demo_injector();
    let mut rt = demo_runtime();
    injector.activate(&mut rt, false).unwrap();

    assert_eq!(injector.pending_injections(), vec!["demo"]);
    assert!(injector.records().is_empty());

    rt.import("other").unwrap();
    assert_eq!(injector.pending_injections(), vec!["demo"]);
    assert!(collector.with(|c| c.is_empty()));

    rt.import("demo.cluster").unwrap();
    assert!(injector.pending_injections().is_empty());
    assert!(injector.is_processed("demo"));
    assert!(injector.is_processed("demo.cluster"));
    // Every record was applied
    assert!(injector.records().is_empty());
}

#[test]
fn test_whole_package_cited_with_registry_version() {
    let (collector, injector) = demo_injector();
    let mut rt = demo_runtime();
    injector.activate(&mut rt, false).unwrap();

    rt.import("demo").unwrap();

    let citation = collector.with(|c| c.citation("demo", "van2011numpy").cloned()).unwrap();
    assert_eq!(citation.count(), 1);
    assert_eq!(citation.version(), Some("1.0.0"));
    assert!(citation.cites_module());
}

#[test]
fn test_wrapped_member_cites_by_condition() {
    let (collector, injector) = demo_injector();
    let mut rt = demo_runtime();
    injector.activate(&mut rt, false).unwrap();
    rt.import("demo.cluster").unwrap();

    assert!(collector.with(|c| c.citation("demo.cluster:linkage", WARD).is_none()));

    let ward = CallArgs::positional([json!([1, 2, 3]), json!("ward")]);
    let result = rt.call("demo.cluster", "linkage", &ward).unwrap();
    assert_eq!(result, json!({ "method": "ward" }));
    assert_eq!(count(&collector, "demo.cluster:linkage", WARD), 1);
    assert_eq!(count(&collector, "demo.cluster:linkage", SLINK), 0);

    // No method given: the default triggers single linkage
    rt.call("demo.cluster", "linkage", &CallArgs::positional([json!([1, 2, 3])])).unwrap();
    rt.call("demo.cluster", "linkage", &CallArgs::new().kwarg("method", json!("single"))).unwrap();
    assert_eq!(count(&collector, "demo.cluster:linkage", WARD), 1);
    assert_eq!(count(&collector, "demo.cluster:linkage", SLINK), 2);
}

#[test]
fn test_wrapping_keeps_member_identity() {
    let (_collector, injector) = demo_injector();
    let mut rt = demo_runtime();
    injector.activate(&mut rt, false).unwrap();
    rt.import("demo.cluster").unwrap();

    let member = rt.member("demo.cluster", "linkage").unwrap();
    assert_eq!(member.name(), "linkage");
    assert_eq!(member.doc(), Some("Hierarchical clustering"));
    assert!(member.wrap_depth() > 0);

    // Members without records are left untouched
    assert_eq!(rt.member("demo.cluster", "cut").unwrap().wrap_depth(), 0);
}

#[test]
fn test_required_units_are_processed_in_depth_order() {
    init_test_logging(None);

    struct Recording {
        inner: BaseImporter,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl Importer for Recording {
        fn import(&self, runtime: &mut Runtime, name: &str) -> anyhow::Result<()> {
            self.seen.borrow_mut().push(name.to_string());
            self.inner.import(runtime, name)
        }
    }

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut rt = demo_runtime();
    rt.set_importer(Rc::new(Recording {
        inner: BaseImporter,
        seen: Rc::clone(&seen),
    }));

    let (collector, injector) = demo_injector();
    injector.activate(&mut rt, false).unwrap();

    // demo.plot pulls in demo.cluster while it loads
    rt.import("demo.plot").unwrap();
    assert_eq!(*seen.borrow(), vec!["demo.plot", "demo.cluster"]);

    for unit in ["demo", "demo.cluster", "demo.plot"] {
        assert!(injector.is_processed(unit), "{unit} was not processed");
    }
    assert_eq!(count(&collector, "demo", "van2011numpy"), 1);
    assert!(rt.member("demo.cluster", "linkage").unwrap().wrap_depth() > 0);
}

#[test]
fn test_retrospective_activation() {
    let (collector, injector) = demo_injector();
    let mut rt = demo_runtime();
    rt.import("demo.cluster").unwrap();

    injector.activate(&mut rt, true).unwrap();
    assert!(injector.is_processed("demo.cluster"));
    assert_eq!(count(&collector, "demo", "van2011numpy"), 1);

    rt.call("demo.cluster", "linkage", &CallArgs::new()).unwrap();
    assert_eq!(count(&collector, "demo.cluster:linkage", SLINK), 1);
}

#[test]
fn test_deactivate_restores_previous_importer() {
    let (_collector, injector) = demo_injector();
    let mut rt = demo_runtime();

    injector.activate(&mut rt, false).unwrap();
    injector.activate(&mut rt, false).unwrap();
    assert!(rt.importer().is_intercepting());
    assert!(injector.is_active());

    injector.deactivate(&mut rt);
    assert!(!rt.importer().is_intercepting());
    assert!(!injector.is_active());

    // Loads after deactivation are not processed
    rt.import("demo").unwrap();
    assert!(!injector.is_processed("demo"));
}

#[test]
fn test_failing_registration_module() {
    init_test_logging(None);
    let mut rt = demo_runtime();
    let injector = Injector::with_modules(CollectorHandle::default(), vec![&FAILING_MODULE]).raise_module_errors(false);
    injector.activate(&mut rt, false).unwrap();

    let err = rt.import("demo").unwrap_err();
    match err.downcast_ref::<DueError>() {
        Some(DueError::InjectionModuleFailed {
            module,
            reason,
        }) => {
            assert_eq!(module, "test::failing");
            assert!(reason.contains("registration exploded"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_failing_registration_module_raw_error() {
    init_test_logging(None);
    let mut rt = demo_runtime();
    let injector = Injector::with_modules(CollectorHandle::default(), vec![&FAILING_MODULE]).raise_module_errors(true);
    injector.activate(&mut rt, false).unwrap();

    let err = rt.import("demo").unwrap_err();
    assert!(err.downcast_ref::<DueError>().is_none());
    assert_eq!(err.to_string(), "registration exploded");
}

#[test]
fn test_records_outside_version_bounds_are_skipped() {
    let (collector, injector) = demo_injector();
    let mut rt = Runtime::new();
    // Too old for the Ward record, which needs 0.5 or later
    rt.define(UnitSpec::new("demo").version("0.4.0")).define(
        UnitSpec::new("demo.cluster").member("linkage", |_| Ok(json!(null))),
    );
    injector.activate(&mut rt, false).unwrap();
    rt.import("demo.cluster").unwrap();

    rt.call("demo.cluster", "linkage", &CallArgs::positional([json!([]), json!("ward")])).unwrap();
    rt.call("demo.cluster", "linkage", &CallArgs::new()).unwrap();

    assert_eq!(count(&collector, "demo.cluster:linkage", WARD), 0);
    assert_eq!(count(&collector, "demo.cluster:linkage", SLINK), 1);
}
