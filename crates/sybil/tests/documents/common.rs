//! Shared helpers for the document tests.

use std::path::{Path, PathBuf};

use sybil::{Document, Sybil, Value};

pub fn samples() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("samples")
}

pub fn sample(name: &str) -> PathBuf {
    samples().join(name)
}

/// Default parsers over `*.rst`, with the names the samples expect.
pub fn sample_sybil() -> Sybil {
    Sybil::with_default_parsers()
        .pattern("*.rst")
        .unwrap()
        .setup(|namespace| {
            namespace.insert("y", Value::Int(0));
            namespace.insert("z", Value::Int(0));
            namespace.insert("platform", Value::str("linux"));
            namespace.insert("version", Value::Int(2));
        })
}

/// Evaluate every example in order: `ok`, `skip: <reason>` or
/// `fail: <error>`.
pub fn outcomes(document: &Document) -> Vec<String> {
    document
        .examples()
        .map(|example| match example.evaluate() {
            Ok(()) => "ok".to_string(),
            Err(failure) => match failure.error.skip_reason() {
                Some(reason) => format!("skip: {reason}"),
                None => format!("fail: {}", failure.error),
            },
        })
        .collect()
}
