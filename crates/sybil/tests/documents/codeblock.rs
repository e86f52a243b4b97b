use std::sync::Arc;

use pretty_assertions::assert_eq;
use sybil::{CodeBlockParser, EvaluationError, Example, Parser, SkipParser, Sybil, Value};

use crate::common::{outcomes, sample, sample_sybil};

#[test]
fn test_examples_in_document_order() {
    let document = sample_sybil().parse(&sample("codeblock.rst")).unwrap();
    let names: Vec<String> = document.examples().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec![
            "line:3,column:1",
            "line:9,column:1",
            "line:13,column:1",
            "line:17,column:1",
            "line:26,column:1",
        ]
    );
}

#[test]
fn test_failure_points_at_raising_line() {
    let sybil = sample_sybil();
    let document = sybil.parse(&sample("codeblock.rst")).unwrap();
    sybil.run_setup(document.namespace());

    let failure = document.examples().nth(1).unwrap().evaluate().unwrap_err();
    assert_eq!(failure.line, 9);
    assert_eq!(failure.reported_line(), 11);
    assert_eq!(failure.error.to_string(), "Exception: boom! (line 11)");
    assert!(failure.to_string().ends_with("codeblock.rst, line 9, column 1: Exception: boom! (line 11)"));
}

#[test]
fn test_failure_does_not_stop_later_blocks() {
    let sybil = sample_sybil();
    let document = sybil.parse(&sample("codeblock.rst")).unwrap();
    sybil.run_setup(document.namespace());

    assert_eq!(
        outcomes(&document),
        vec!["ok", "fail: Exception: boom! (line 11)", "ok", "ok", "ok"]
    );
    let namespace = document.namespace();
    assert_eq!(namespace.get("y"), Some(Value::Int(1)));
    assert_eq!(namespace.get("z"), Some(Value::Int(1)));
    assert_eq!(namespace.get("bin").map(|v| v.repr()), Some("b'x'".to_string()));
    assert_eq!(namespace.get("define_this"), Some(Value::Int(1)));
    assert!(!namespace.contains("__builtins__"));
}

#[test]
fn test_custom_language_next_to_script() {
    let lolcode = CodeBlockParser::new("lolcode").with_evaluator(Arc::new(
        |example: &Example<'_>| -> Result<(), EvaluationError> {
            let body = example.parsed_as::<String>().cloned().unwrap_or_default();
            example.namespace().insert("lolcode", Value::str(body.trim()));
            Ok(())
        },
    ));
    let parsers: Vec<Arc<dyn Parser>> = vec![
        Arc::new(CodeBlockParser::script()),
        Arc::new(lolcode),
        Arc::new(SkipParser::new()),
    ];
    let sybil = Sybil::new(parsers).setup(|namespace| {
        namespace.insert("y", Value::Int(0));
        namespace.insert("z", Value::Int(0));
    });
    let document = sybil.parse(&sample("codeblock.rst")).unwrap();
    sybil.run_setup(document.namespace());

    let lines: Vec<usize> = document.examples().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 9, 13, 17, 22, 26]);
    assert_eq!(outcomes(&document)[4], "ok");
    assert_eq!(document.namespace().get("lolcode"), Some(Value::str("HAI")));
}

#[test]
fn test_lolcode_without_evaluator_fails_as_configuration() {
    let parsers: Vec<Arc<dyn Parser>> = vec![Arc::new(CodeBlockParser::new("lolcode"))];
    let document = Sybil::new(parsers).parse(&sample("codeblock.rst")).unwrap();
    let failure = document.examples().next().unwrap().evaluate().unwrap_err();
    assert!(failure.error.is_config());
    assert_eq!(
        failure.error.to_string(),
        "no evaluator for code blocks in language 'lolcode'"
    );
}

#[test]
fn test_parsing_twice_is_deterministic() {
    let sybil = sample_sybil();
    let one = sybil.parse(&sample("codeblock.rst")).unwrap();
    let two = sybil.parse(&sample("codeblock.rst")).unwrap();
    assert_eq!(one.len(), two.len());
    assert!(one.regions().eq(two.regions()));
}
