use assert_cmd::Command;
use duecite::io::{load_collector, save_collector};
use duecite::test_utils::{BibFixture, sample_collector};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// The binary, isolated from the user's config, cache and environment.
fn duecite(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("duecite").unwrap();
    for var in ["DUECITE_ENABLE", "DUECITE_OUTPUTS", "DUECITE_REPORT_TAGS", "DUECITE_REPORT_ALL", "DUECITE_STYLE", "DUECITE_FILE"] {
        cmd.env_remove(var);
    }
    cmd.current_dir(home)
        .env("DUECITE_CONFIG", home.join("config.toml"))
        .env("DUECITE_CACHE_DIR", home.join("cache"))
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0");
    cmd
}

#[test]
fn test_summary_of_stored_snapshot() {
    let temp = TempDir::new().unwrap();
    save_collector(&sample_collector(), &temp.path().join(".duecite.json")).unwrap();

    duecite(temp.path())
        .args(["summary", "--offline"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DueCite Report:"))
        .stdout(predicate::str::contains("- Array computing / demo [1]"))
        .stdout(predicate::str::contains("Ward linkage / demo.cluster:linkage [2]"))
        // The edu-tagged module citation is not in the default tags
        .stdout(predicate::str::contains("demo.cluster [").not())
        .stdout(predicate::str::contains(
            "[1] Van Der Walt, S., Colbert, S.C. & Varoquaux, G., 2011.",
        ));
}

#[test]
fn test_summary_with_all_tags_and_apa_style() {
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join("run.json");
    save_collector(&sample_collector(), &snapshot).unwrap();

    duecite(temp.path())
        .args(["summary", "--offline", "--tags", "*", "--style", "apa", "-f"])
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("- Clustering / demo.cluster [2]"))
        .stdout(predicate::str::contains("Van Der Walt, S., Colbert, S. C., & Varoquaux, G. (2011)."))
        .stdout(predicate::str::contains("[2] DOI: 10.1109/72.761722"));
}

#[test]
fn test_summary_bibtex_format() {
    let temp = TempDir::new().unwrap();
    save_collector(&sample_collector(), &temp.path().join(".duecite.json")).unwrap();

    duecite(temp.path())
        .args(["summary", "--offline", "--format", "bibtex"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("@article{van2011numpy,"))
        .stdout(predicate::str::contains("Ward").not());
}

#[test]
fn test_summary_without_snapshot_fails() {
    let temp = TempDir::new().unwrap();

    duecite(temp.path())
        .args(["summary", "--offline"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No citations collected at .duecite.json"));
}

#[test]
fn test_summary_with_corrupt_snapshot_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".duecite.json"), "not json").unwrap();

    duecite(temp.path())
        .args(["summary", "--offline"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid collector snapshot"));
}

#[test]
fn test_add_creates_snapshot() {
    let temp = TempDir::new().unwrap();
    let bib = BibFixture::sample().write_to(temp.path()).unwrap();

    duecite(temp.path())
        .arg("add")
        .arg(&bib)
        .assert()
        .success()
        .stdout(predicate::str::contains("Added 2 entries"));

    let collector = load_collector(&temp.path().join(".duecite.json")).unwrap();
    assert!(collector.entry("van2011numpy").is_some());
    assert!(collector.entry("jain1988algorithms").is_some());
    assert!(collector.citations().is_empty());
}

#[test]
fn test_add_keeps_existing_citations() {
    let temp = TempDir::new().unwrap();
    let snapshot = temp.path().join("run.json");
    save_collector(&sample_collector(), &snapshot).unwrap();
    let bib = BibFixture::sample().write_to(temp.path()).unwrap();

    duecite(temp.path()).arg("add").arg(&bib).arg("-f").arg(&snapshot).assert().success();

    let collector = load_collector(&snapshot).unwrap();
    assert_eq!(collector.citations().len(), 3);
    assert!(collector.entry("jain1988algorithms").is_some());
}

#[test]
fn test_add_rejects_broken_bibtex() {
    let temp = TempDir::new().unwrap();
    let bib = BibFixture::missing_key().write_to(temp.path()).unwrap();

    duecite(temp.path())
        .arg("add")
        .arg(&bib)
        .assert()
        .failure()
        .stderr(predicate::str::contains("suggestion"));
    assert!(!temp.path().join(".duecite.json").exists());
}

#[test]
fn test_injections_lists_builtin_modules() {
    let temp = TempDir::new().unwrap();

    duecite(temp.path())
        .arg("injections")
        .assert()
        .success()
        .stdout(predicate::str::contains("builtin::numpy (numpy)"))
        .stdout(predicate::str::contains("builtin::scipy (scipy)"))
        .stdout(predicate::str::contains("  numpy van2011numpy - Scientific tools library"));
}

#[test]
fn test_injections_for_one_unit() {
    let temp = TempDir::new().unwrap();

    duecite(temp.path())
        .args(["injections", "--unit", "scipy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("scipy.cluster.hierarchy:linkage sibson1973slink"))
        .stdout(predicate::str::contains("builtin::numpy").not());

    duecite(temp.path())
        .args(["injections", "--unit", "nosuchpackage"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No registration module for unit 'nosuchpackage'"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "enable = [").unwrap();

    duecite(temp.path()).arg("injections").assert().failure().code(1);
}
