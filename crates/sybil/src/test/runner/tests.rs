use super::*;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use sybil_script::Value;
use tempfile::tempdir;

use crate::test::TestOutcome;

const MIXED: &str = "\
Intro.

.. code-block:: script

    x = 1

.. code-block:: script

    raise ValueError('boom!')

.. skip: next

.. code-block:: script

    x = 100

.. code-block:: script

    assert x == 1
";

fn sybil() -> Sybil {
    Sybil::with_default_parsers().pattern("*.rst").unwrap()
}

fn sequential() -> TestRunnerConfig {
    TestRunnerConfig {
        parallel: false,
        ..TestRunnerConfig::default()
    }
}

#[test]
fn test_runner_mixed_outcomes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mixed.rst");
    std::fs::write(&path, MIXED).unwrap();

    let summary = TestRunner::new(vec![sybil()]).run_file(&path);
    assert_eq!(summary.passed, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.errors.is_empty());

    let names: Vec<_> = summary.results.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "line:3,column:1",
            "line:7,column:1",
            "line:11,column:1",
            "line:13,column:1",
            "line:17,column:1",
        ]
    );
    assert_eq!(
        summary.results[1].outcome,
        TestOutcome::Failed("ValueError: boom! (line 9)".to_string())
    );
    assert_eq!(
        summary.results[3].outcome,
        TestOutcome::Skipped("skipped by directive".to_string())
    );
}

#[test]
fn test_runner_unparseable_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.rst");
    std::fs::write(&path, ".. code-block:: script\n\n    x = (\n\nText.\n").unwrap();

    let summary = TestRunner::new(vec![sybil()]).run_file(&path);
    assert_eq!(summary.total(), 0);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("line 3"));
}

#[test]
fn test_runner_config_error_stops_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.rst");
    std::fs::write(
        &path,
        ".. skip: end if(True)\n\n.. code-block:: script\n\n    x = 1\n",
    )
    .unwrap();

    let summary = TestRunner::new(vec![sybil()]).run_file(&path);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.has_failures());
}

#[test]
fn test_runner_setup_fixtures_and_teardown() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fixtures.rst");
    std::fs::write(
        &path,
        ".. code-block:: script\n\n    x += 1\n    assert greeting == 'hi'\n\n\
         .. code-block:: script\n\n    x += 1\n",
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);
    let sybil = sybil()
        .setup(|ns| {
            ns.insert("x", Value::Int(0));
        })
        .teardown(move |ns| {
            recorder.lock().unwrap().push(ns.get("x").map(|x| x.repr()));
        })
        .fixtures(["greeting"]);
    let fixtures = FixtureRegistry::new().register("greeting", || Value::str("hi"));

    let summary = TestRunner::with_config(vec![sybil], sequential())
        .with_fixtures(fixtures)
        .run_file(&path);
    assert_eq!(summary.passed, 2);
    assert_eq!(*seen.lock().unwrap(), vec![Some("2".to_string())]);
}

#[test]
fn test_runner_missing_fixture_fails_example() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("needs.rst");
    std::fs::write(&path, ".. code-block:: script\n\n    pass\n").unwrap();

    let summary = TestRunner::new(vec![sybil().fixtures(["db"])]).run_file(&path);
    assert_eq!(summary.failed, 1);
    assert_eq!(
        summary.results[0].outcome,
        TestOutcome::Failed("fixture 'db' is not registered".to_string())
    );
}

#[test]
fn test_runner_filter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mixed.rst");
    std::fs::write(&path, MIXED).unwrap();

    let config = TestRunnerConfig {
        filter: Some("line:3,".to_string()),
        ..sequential()
    };
    let summary = TestRunner::with_config(vec![sybil()], config).run(dir.path());
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.passed, 1);
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        std::fs::write(dir.path().join(format!("doc{i}.rst")), MIXED).unwrap();
    }
    std::fs::write(dir.path().join("ignored.txt"), MIXED).unwrap();

    let parallel = TestRunner::new(vec![sybil()]).run(dir.path());
    let sequential = TestRunner::with_config(vec![sybil()], sequential()).run(dir.path());

    assert_eq!(parallel.files.len(), 6);
    assert_eq!(parallel.passed, sequential.passed);
    assert_eq!(parallel.failed, sequential.failed);
    assert_eq!(parallel.skipped, sequential.skipped);
    assert_eq!(parallel.total(), 30);
    assert_eq!(parallel.exit_code(), 1);
}

#[test]
fn test_nothing_collected() {
    let dir = tempdir().unwrap();
    let summary = TestRunner::new(vec![sybil()]).run(dir.path());
    assert_eq!(summary.exit_code(), 2);
}

#[test]
fn test_last_accepting_sybil_runs_the_document() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.rst"),
        ".. code-block:: script\n\n    assert x == 2\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.txt"),
        ".. code-block:: script\n\n    assert x == 1\n",
    )
    .unwrap();

    let everything = Sybil::with_default_parsers()
        .pattern("*")
        .unwrap()
        .setup(|ns| {
            ns.insert("x", Value::Int(1));
        });
    let rst = sybil().setup(|ns| {
        ns.insert("x", Value::Int(2));
    });

    let summary = TestRunner::with_config(vec![everything, rst], sequential()).run(dir.path());
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_run_file_without_accepting_sybil() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, ".. code-block:: script\n\n    pass\n").unwrap();

    let summary = TestRunner::new(vec![sybil()]).run_file(&path);
    assert_eq!(summary.total(), 0);
    assert_eq!(summary.errors, vec!["no sybil accepts this file".to_string()]);
}
