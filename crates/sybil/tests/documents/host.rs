use pretty_assertions::assert_eq;
use sybil::test::{TestOutcome, TestRunner, TestRunnerConfig};
use sybil::Value;

use crate::common::{outcomes, sample, samples, sample_sybil};

fn sequential() -> TestRunnerConfig {
    TestRunnerConfig {
        parallel: false,
        ..TestRunnerConfig::default()
    }
}

#[test]
fn test_failure_is_local_to_its_example() {
    let document = sample_sybil().parse(&sample("boom.rst")).unwrap();
    assert_eq!(
        outcomes(&document),
        vec!["ok", "fail: ValueError: boom! (line 11)", "ok"]
    );

    let namespace = document.namespace();
    assert_eq!(namespace.get("x"), Some(Value::Int(2)));
    assert_eq!(namespace.get("before"), Some(Value::Bool(true)));
    assert!(!namespace.contains("after"));
}

#[test]
fn test_run_sample_directory() {
    let summary = TestRunner::with_config(vec![sample_sybil()], sequential()).run(&samples());

    let names: Vec<String> = summary
        .files
        .iter()
        .filter_map(|f| f.path.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["boom.rst", "codeblock.rst", "skip.rst", "skip_conditional.rst"]
    );
    assert_eq!(
        (summary.passed, summary.failed, summary.skipped),
        (17, 2, 4)
    );
    assert_eq!(summary.error_files, 0);
    assert_eq!(summary.exit_code(), 1);
}

#[test]
fn test_explicit_filename_is_collected() {
    let sybil = sample_sybil().filenames(["notes.txt"]);
    let summary = TestRunner::with_config(vec![sybil], sequential()).run(&samples());

    assert_eq!(summary.files.len(), 5);
    let notes = summary
        .files
        .iter()
        .find(|f| f.path.ends_with("notes.txt"))
        .unwrap();
    assert_eq!(
        notes.results[0].outcome,
        TestOutcome::Failed("AssertionError: notes.txt should not have run (line 5)".to_string())
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let sequential = TestRunner::with_config(vec![sample_sybil()], sequential()).run(&samples());
    let parallel = TestRunner::new(vec![sample_sybil()]).run(&samples());

    assert_eq!(parallel.total(), sequential.total());
    assert_eq!(
        (parallel.passed, parallel.failed, parallel.skipped),
        (sequential.passed, sequential.failed, sequential.skipped)
    );
}

#[test]
fn test_filter_selects_one_example() {
    let config = TestRunnerConfig {
        filter: Some("boom.rst::line:8,".to_string()),
        ..sequential()
    };
    let summary = TestRunner::with_config(vec![sample_sybil()], config).run(&samples());

    assert_eq!(summary.total(), 1);
    assert_eq!(summary.failed, 1);
}
