//! Parsers: find the regions of a document.
//!
//! A parser scans the full document text and yields the regions it
//! recognises, lazily and in any order. Parsers run independently of each
//! other; the document resolves overlaps between them.
//!
//! Plain functions with the right signature are parsers:
//!
//! ```text
//! fn parse_checks(document: &Document) -> Regions<'_> { ... }
//! let parsers: Vec<Arc<dyn Parser>> = vec![Arc::new(parse_checks)];
//! ```

use std::ops::Range;

use regex::Regex;

use crate::document::Document;
use crate::errors::DocumentError;
use crate::region::Region;

pub mod codeblock;
pub mod skip;

pub use codeblock::{CodeBlockParser, DEFAULT_LANGUAGE};
pub use skip::SkipParser;

/// Lazy sequence of regions; an error aborts the whole document.
pub type Regions<'a> = Box<dyn Iterator<Item = Result<Region, DocumentError>> + 'a>;

pub trait Parser: Send + Sync {
    fn parse<'a>(&'a self, document: &'a Document) -> Regions<'a>;
}

impl<F> Parser for F
where
    F: for<'a> Fn(&'a Document) -> Regions<'a> + Send + Sync,
{
    fn parse<'a>(&'a self, document: &'a Document) -> Regions<'a> {
        self(document)
    }
}

/// Text between a start match and the next end match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionSource<'t> {
    /// Span of the start match.
    pub start: Range<usize>,
    /// Span of the end match; empty at the end of the text when the end
    /// pattern never matched.
    pub end: Range<usize>,
    /// `text[start.end..end.start]`.
    pub source: &'t str,
}

/// Pair every match of `start` with the first match of `end` after it.
///
/// Scanning for the next start resumes after the end match, so a fence
/// that both opens and closes blocks is never read as an opener right
/// after it closed one. See [`RegionSources::consume_end`] for end
/// patterns that look ahead into the next line.
pub fn find_region_sources<'t, 'r>(
    text: &'t str,
    start: &'r Regex,
    end: &'r Regex,
) -> RegionSources<'t, 'r> {
    RegionSources {
        text,
        start,
        end,
        position: 0,
        consumed: usize::MAX,
    }
}

pub struct RegionSources<'t, 'r> {
    text: &'t str,
    start: &'r Regex,
    end: &'r Regex,
    position: usize,
    consumed: usize,
}

impl RegionSources<'_, '_> {
    /// Consume only the first `len` bytes of each end match; the rest of it
    /// may open the next block.
    #[must_use]
    pub fn consume_end(mut self, len: usize) -> Self {
        self.consumed = len;
        self
    }
}

impl<'t> Iterator for RegionSources<'t, '_> {
    type Item = RegionSource<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position > self.text.len() {
            return None;
        }
        let start = self.start.find_at(self.text, self.position)?;
        let end = self
            .end
            .find_at(self.text, start.end())
            .map_or(self.text.len()..self.text.len(), |m| m.range());

        // Never revisit the same start.
        let next = (end.start + self.consumed.min(end.len())).max(start.end());
        self.position = if next > start.start() {
            next
        } else {
            next + self.text[next..].chars().next().map_or(1, char::len_utf8)
        };

        Some(RegionSource {
            source: &self.text[start.end()..end.start],
            start: start.range(),
            end,
        })
    }
}

/// Remove the indentation common to every non-blank line.
///
/// Whitespace-only lines become empty (their line ending is kept).
pub fn dedent(text: &str) -> String {
    let margin = text
        .split_inclusive('\n')
        .filter(|line| !line.trim().is_empty())
        .map(leading_whitespace)
        .reduce(common_prefix)
        .unwrap_or("");

    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            let ending = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            out.push_str(ending);
        } else {
            out.push_str(&line[margin.len()..]);
        }
    }
    out
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((i, _), _)| i);
    &a[..len]
}
