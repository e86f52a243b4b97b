use pretty_assertions::assert_eq;
use sybil::Value;

use crate::common::{outcomes, sample, sample_sybil};

const SKIPPED: &str = "skip: skipped by directive";

#[test]
fn test_next_start_and_end() {
    let document = sample_sybil().parse(&sample("skip.rst")).unwrap();
    assert_eq!(
        outcomes(&document),
        vec!["ok", "ok", SKIPPED, "ok", "ok", SKIPPED, SKIPPED, "ok", "ok"]
    );
    assert_eq!(
        document.namespace().get("run").map(|v| v.repr()),
        Some("[2, 5]".to_string())
    );
    assert_eq!(document.skip_state(), None);
}

#[test]
fn test_conditions_not_met() {
    let sybil = sample_sybil();
    let document = sybil.parse(&sample("skip_conditional.rst")).unwrap();
    sybil.run_setup(document.namespace());

    assert_eq!(
        outcomes(&document),
        vec!["ok", "ok", "ok", "ok", "skip: (version < 3)", "ok"]
    );
    assert!(!document.namespace().contains("new_feature"));
}

#[test]
fn test_conditions_met() {
    let sybil = sample_sybil();
    let document = sybil.parse(&sample("skip_conditional.rst")).unwrap();
    sybil.run_setup(document.namespace());
    document
        .namespace()
        .insert("platform", Value::str("windows"));
    document.namespace().insert("version", Value::Int(3));

    assert_eq!(
        outcomes(&document),
        vec![
            "ok",
            "skip: not on windows",
            "ok",
            "ok",
            "ok",
            "fail: NameError: name 'posix_only' is not defined (line 20)",
        ]
    );
    assert_eq!(document.namespace().get("new_feature"), Some(Value::Bool(true)));
}

#[test]
fn test_condition_sees_current_namespace() {
    let sybil = sample_sybil();
    let document = sybil.parse(&sample("skip_conditional.rst")).unwrap();
    sybil.run_setup(document.namespace());

    let mut examples = document.examples();
    examples.next().unwrap().evaluate().unwrap();
    examples.next().unwrap().evaluate().unwrap();
    examples.next().unwrap().evaluate().unwrap();

    // Changed after parsing, before the `next` directive is evaluated.
    document.namespace().insert("version", Value::Int(5));
    examples.next().unwrap().evaluate().unwrap();
    assert!(examples.next().unwrap().evaluate().is_ok());
}
