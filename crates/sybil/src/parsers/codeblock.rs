//! Code blocks written as reStructuredText directives.
//!
//! ```text
//! .. code-block:: script
//!    :caption: optional options are skipped
//!
//!    x = 1
//!    assert x == 1
//! ```
//!
//! `.. code::` and `.. invisible-code-block:` are accepted too. The body runs
//! until the first line that starts with a non-whitespace character, or the
//! end of the document.
//!
//! Blocks in [`DEFAULT_LANGUAGE`] are compiled while the document is parsed,
//! numbering lines from the document line the body starts on, so errors point
//! into the document. Blocks in any other language carry their dedented body
//! as a `String` and need an evaluator supplied with
//! [`CodeBlockParser::with_evaluator`].

use std::sync::Arc;

use regex::Regex;

use crate::document::Document;
use crate::errors::DocumentError;
use crate::evaluator::{Evaluator, MissingEvaluator, ScriptEvaluator};
use crate::region::Region;

use super::{dedent, find_region_sources, Parser, RegionSource, Regions};

/// Language whose blocks are run by the built-in script interpreter.
pub const DEFAULT_LANGUAGE: &str = "script";

pub struct CodeBlockParser {
    language: String,
    start: Regex,
    end: Regex,
    evaluator: Arc<dyn Evaluator>,
}

impl CodeBlockParser {
    /// Parser for blocks in `language`.
    ///
    /// Script blocks are run by a [`ScriptEvaluator`]; other languages fail
    /// with a configuration error until an evaluator is supplied.
    pub fn new(language: &str) -> Self {
        let evaluator: Arc<dyn Evaluator> = if language == DEFAULT_LANGUAGE {
            ScriptEvaluator::shared()
        } else {
            Arc::new(MissingEvaluator::new(language))
        };
        CodeBlockParser {
            language: language.to_string(),
            start: start_pattern(language),
            end: end_pattern(),
            evaluator,
        }
    }

    /// Parser for [`DEFAULT_LANGUAGE`] blocks.
    pub fn script() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }

    #[must_use]
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn evaluator(&self) -> &Arc<dyn Evaluator> {
        &self.evaluator
    }

    fn region(&self, document: &Document, block: &RegionSource<'_>) -> Result<Region, DocumentError> {
        let source = dedent(block.source);
        let end = if block.end.is_empty() {
            block.end.start
        } else {
            block.end.start + 1
        };
        let evaluator = Arc::clone(&self.evaluator);

        if self.language != DEFAULT_LANGUAGE {
            return Ok(Region::new(block.start.start, end, source, evaluator));
        }

        let first_line = document.line_index().newlines_before(block.start.end) + 1;
        let program = sybil_script::compile(&source, u32::try_from(first_line).unwrap_or(u32::MAX))
            .map_err(|source| DocumentError::Compile {
                line: first_line,
                source,
            })?;
        Ok(Region::new(block.start.start, end, program, evaluator))
    }
}

impl Default for CodeBlockParser {
    fn default() -> Self {
        Self::script()
    }
}

impl Parser for CodeBlockParser {
    fn parse<'a>(&'a self, document: &'a Document) -> Regions<'a> {
        Box::new(
            // The end match ends on the first character of the next line.
            find_region_sources(document.text(), &self.start, &self.end)
                .consume_end(1)
                .map(move |block| self.region(document, &block)),
        )
    }
}

#[expect(
    clippy::expect_used,
    reason = "pattern is a literal around an escaped language name"
)]
fn start_pattern(language: &str) -> Regex {
    Regex::new(&format!(
        r"(?m)^\.\.\s*(?:invisible-)?code(?:-block)?::?\s*{}\b(?:\s*:[\w-]+:.*\n)*(?:\s*\n)*",
        regex::escape(language)
    ))
    .expect("code-block start pattern compiles")
}

/// A newline followed by a non-whitespace character or the end of the text.
#[expect(clippy::expect_used, reason = "pattern is a literal")]
fn end_pattern() -> Regex {
    Regex::new(r"\n(?:\z|\S)").expect("code-block end pattern compiles")
}
