//! `.. skip:` directives.
//!
//! ```text
//! .. skip: next
//! .. skip: start if(flag, reason='not on this platform')
//! .. skip: end
//! ```
//!
//! Each directive becomes a region carrying a [`SkipDirective`] and the
//! [`SkipEvaluator`]. A `start` before the previous `start` was ended is
//! rejected while parsing.

use std::sync::Arc;

use regex::Regex;

use crate::document::Document;
use crate::errors::DocumentError;
use crate::evaluator::Evaluator;
use crate::region::Region;
use crate::skip::{SkipDirective, SkipEvaluator};

use super::{Parser, Regions};

pub struct SkipParser {
    pattern: Regex,
    evaluator: Arc<dyn Evaluator>,
}

impl SkipParser {
    #[expect(clippy::expect_used, reason = "pattern is a literal")]
    pub fn new() -> Self {
        SkipParser {
            pattern: Regex::new(r"(?m)^\.\.\s*skip:\s*(\w+)(?:\s+if(.+?))?[ \t\r]*$")
                .expect("skip pattern compiles"),
            evaluator: SkipEvaluator::shared(),
        }
    }
}

impl Default for SkipParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser for SkipParser {
    fn parse<'a>(&'a self, document: &'a Document) -> Regions<'a> {
        let mut open_start = false;
        Box::new(self.pattern.captures_iter(document.text()).map(move |caps| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let action = caps.get(1).map_or("", |m| m.as_str());
            let condition = caps.get(2).map(|m| m.as_str().trim().to_string());

            match action {
                "start" if open_start => {
                    return Err(DocumentError::NestedSkip {
                        line: document.line_index().line(whole.start),
                    });
                }
                "start" => open_start = true,
                "end" => open_start = false,
                _ => {}
            }

            Ok(Region::new(
                whole.start,
                whole.end,
                SkipDirective::new(action, condition),
                Arc::clone(&self.evaluator),
            ))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn directives(text: &str) -> Result<Vec<SkipDirective>, DocumentError> {
        let parsers: Vec<Arc<dyn Parser>> = vec![Arc::new(SkipParser::new())];
        let document = Document::from_text("doc.rst", text, &parsers)?;
        Ok(document
            .regions()
            .filter_map(|r| r.parsed_as::<SkipDirective>().cloned())
            .collect())
    }

    #[test]
    fn parses_actions_and_conditions() {
        let found = directives(concat!(
            ".. skip: next\n",
            "\n",
            ".. skip: start if(x > 1, reason='big')\r\n",
            ".. skip: end\n",
        ));
        assert_eq!(
            found.ok(),
            Some(vec![
                SkipDirective::new("next", None),
                SkipDirective::new("start", Some("(x > 1, reason='big')".to_string())),
                SkipDirective::new("end", None),
            ])
        );
    }

    #[test]
    fn unknown_actions_are_kept_for_evaluation() {
        let found = directives(".. skip: lolwut\n");
        assert_eq!(found.ok(), Some(vec![SkipDirective::new("lolwut", None)]));
    }

    #[test]
    fn nested_start_is_rejected() {
        let error = directives(".. skip: start\n\n.. skip: start\n\n.. skip: end\n");
        assert!(matches!(error, Err(DocumentError::NestedSkip { line: 3 })));
    }

    #[test]
    fn start_after_end_is_fine() {
        let found = directives(".. skip: start\n.. skip: end\n.. skip: start\n.. skip: end\n");
        assert_eq!(found.map(|d| d.len()).ok(), Some(4));
    }
}
