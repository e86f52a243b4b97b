//! The `list` command: show the examples each document contains.

use std::path::Path;

use crate::test::discover_documents_in;
use crate::{Example, Sybil};

/// Print every example found at `path` without running anything.
pub fn list_examples(path: &str, sybils: &[Sybil]) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Path not found: {}", path.display());
        std::process::exit(1);
    }

    let mut failed = false;
    for file in discover_documents_in(path, sybils) {
        println!("{}", file.path.display());
        match sybils[file.sybil].parse(&file.path) {
            Ok(document) => {
                for example in document.examples() {
                    println!("  {}  {}", example.name(), summary_line(&example));
                }
            }
            Err(error) => {
                failed = true;
                println!("  ERROR: {error}");
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}

/// First non-blank line of the region, shortened.
fn summary_line(example: &Example<'_>) -> String {
    const MAX: usize = 60;
    let line = example
        .source()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");
    if line.chars().count() > MAX {
        let cut: String = line.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        line.to_string()
    }
}
