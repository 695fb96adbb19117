use duecite::citation::CiteOptions;
use duecite::collector::{Collector, CollectorHandle};
use duecite::core::DueError;
use duecite::entries::Entry;
use duecite::io::{ReportOptions, TextOutput};
use duecite::runtime::{CallArgs, Member};
use duecite::test_utils::{BibFixture, NUMPY_BIBTEX, init_test_logging, sample_collector};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_citing_a_registered_key_three_times() {
    init_test_logging(None);
    let mut collector = Collector::new();
    collector.add(Entry::text("Some demo reference").with_key("XXX0"));

    for _ in 0..3 {
        collector.cite("XXX0", &CiteOptions::at("demo")).unwrap();
    }

    assert_eq!(collector.citations().len(), 1);
    let citation = collector.citation("demo", "xxx0").unwrap();
    assert_eq!(citation.count(), 3);
    assert_eq!(collector.entries().len(), 1);
    assert!(collector.entry("xxx0").is_some());
}

#[test]
fn test_unknown_key_and_missing_path_are_errors() {
    let mut collector = Collector::new();
    assert!(matches!(
        collector.try_cite("nobody2020", &CiteOptions::at("demo")),
        Err(DueError::EntryNotFound { .. })
    ));
    assert!(matches!(
        collector.try_cite(Entry::text("x"), &CiteOptions::new()),
        Err(DueError::MissingPath)
    ));
    // Never-fail variants absorb both
    assert!(collector.cite("nobody2020", &CiteOptions::at("demo")).is_none());
}

#[test]
fn test_loading_a_bib_file_then_citing_by_key() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let path = BibFixture::sample().write_to(temp.path()).unwrap();

    let mut collector = Collector::new();
    assert_eq!(collector.load(&path), Some(2));
    let citation = collector.cite("Jain1988Algorithms", &CiteOptions::at("demo.cluster")).unwrap();
    assert_eq!(citation.entry().key(), "jain1988algorithms");
}

#[test]
fn test_loading_a_bib_file_with_a_commented_header() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let path = BibFixture::with_stray_at().write_to(temp.path()).unwrap();

    let mut collector = Collector::new();
    assert_eq!(collector.try_load(&path).unwrap(), 2);
    assert!(collector.entry("van2011numpy").is_some());
    assert!(collector.entry("jain1988algorithms").is_some());
}

#[test]
fn test_loading_a_broken_bib_file() {
    let temp = TempDir::new().unwrap();
    let path = BibFixture::missing_key().write_to(temp.path()).unwrap();

    let mut collector = Collector::new();
    assert!(matches!(collector.try_load(&path), Err(DueError::BibtexParse { .. })));
    assert!(collector.entries().is_empty());

    let not_bib = temp.path().join("refs.txt");
    std::fs::write(&not_bib, NUMPY_BIBTEX).unwrap();
    assert!(matches!(collector.try_load(&not_bib), Err(DueError::UnsupportedFormat { .. })));
}

#[test]
fn test_wrap_preserves_behavior() {
    let collector = CollectorHandle::default();
    let member = Member::new("calc", "add", |args: &CallArgs| {
        let a = args.positional[0].as_i64().unwrap_or(0);
        let b = args.positional[1].as_i64().unwrap_or(0);
        Ok(json!(a + b))
    })
    .with_doc("Add two numbers");

    let wrapped = collector
        .wrap(Entry::text("Peano, G. Arithmetices principia."), CiteOptions::new().description("Addition"))
        .apply(member.clone());

    let args = CallArgs::positional([json!(2), json!(3)]);
    assert_eq!(wrapped.call(&args).unwrap(), member.call(&args).unwrap());
    assert_eq!(wrapped.name(), member.name());
    assert_eq!(wrapped.doc(), member.doc());

    let count = collector.with(|c| c.citation("calc:add", "peano, g. arithmetices principia.").map(|c| c.count()));
    assert_eq!(count, Some(1));
}

#[test]
fn test_text_report_of_sample_collector() {
    let collector = sample_collector();
    let options = ReportOptions {
        tags: vec!["*".to_string()],
        ..ReportOptions::default()
    };

    let mut out = Vec::new();
    TextOutput::new(&mut out, options).dump(&collector).unwrap();
    let report = String::from_utf8(out).unwrap();

    assert!(report.starts_with("\nDueCite Report:\n- Array computing / demo [1]\n"));
    assert!(report.contains("  - Clustering / demo.cluster [2]\n"));
    assert!(report.contains("  - Ward linkage / demo.cluster:linkage [3]\n"));
    assert!(report.contains("\n1 package cited\n1 module cited\n1 function cited"));
    assert!(report.contains("\n[2] DOI: 10.1109/72.761722"));
}
