use super::*;
use crate::errors::EvaluationError;
use crate::parsers::Regions;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sybil_script::Value;

/// Yields fixed spans labelled with a string payload.
struct SpanParser {
    spans: Vec<(usize, usize, &'static str)>,
    evaluator: Arc<dyn Evaluator>,
}

impl SpanParser {
    fn new(spans: &[(usize, usize, &'static str)]) -> Arc<dyn Parser> {
        Arc::new(SpanParser {
            spans: spans.to_vec(),
            evaluator: Arc::new(record),
        })
    }
}

impl Parser for SpanParser {
    fn parse<'a>(&'a self, _document: &'a Document) -> Regions<'a> {
        Box::new(self.spans.iter().map(|&(start, end, label)| {
            Ok(Region::new(start, end, label, Arc::clone(&self.evaluator)))
        }))
    }
}

/// Stores the payload label under `last` and counts calls in `count`.
fn record(example: &Example<'_>) -> Result<(), EvaluationError> {
    let namespace = example.namespace();
    let label = example.parsed_as::<&str>().copied().unwrap_or("?");
    let count = match namespace.get("count") {
        Some(Value::Int(n)) => n + 1,
        _ => 1,
    };
    namespace.insert("count", Value::Int(count));
    namespace.insert("last", Value::str(label));
    Ok(())
}

fn failing(_document: &Document) -> Regions<'_> {
    Box::new(std::iter::once(Err(DocumentError::Parser(
        "malformed block".to_string(),
    ))))
}

fn labels(document: &Document) -> Vec<(usize, usize, &'static str)> {
    document
        .regions()
        .map(|r| (r.start, r.end, *r.parsed_as::<&str>().unwrap()))
        .collect()
}

const TEXT: &str = "aaaa bbbb cccc dddd";

#[test]
fn test_regions_sorted_across_parsers() {
    let parsers = vec![
        SpanParser::new(&[(10, 14, "c"), (0, 4, "a")]),
        SpanParser::new(&[(5, 9, "b"), (15, 19, "d")]),
    ];
    let document = Document::from_text("doc.txt", TEXT, &parsers).unwrap();
    assert_eq!(
        labels(&document),
        vec![(0, 4, "a"), (5, 9, "b"), (10, 14, "c"), (15, 19, "d")]
    );
    assert_eq!(document.examples().len(), 4);
}

#[test]
fn test_later_parser_wins_overlap() {
    let first = SpanParser::new(&[(0, 9, "first")]);
    let second = SpanParser::new(&[(5, 14, "second")]);

    let document =
        Document::from_text("doc.txt", TEXT, &[Arc::clone(&first), Arc::clone(&second)]).unwrap();
    assert_eq!(labels(&document), vec![(5, 14, "second")]);

    let document = Document::from_text("doc.txt", TEXT, &[second, first]).unwrap();
    assert_eq!(labels(&document), vec![(0, 9, "first")]);
}

#[test]
fn test_one_region_can_evict_several() {
    let parsers = vec![
        SpanParser::new(&[(0, 4, "a"), (5, 9, "b"), (15, 19, "d")]),
        SpanParser::new(&[(2, 12, "wide")]),
    ];
    let document = Document::from_text("doc.txt", TEXT, &parsers).unwrap();
    assert_eq!(labels(&document), vec![(2, 12, "wide"), (15, 19, "d")]);
}

#[test]
fn test_same_start_collision_keeps_later() {
    let parsers = vec![
        SpanParser::new(&[(0, 4, "a")]),
        SpanParser::new(&[(0, 2, "b")]),
    ];
    let document = Document::from_text("doc.txt", TEXT, &parsers).unwrap();
    assert_eq!(labels(&document), vec![(0, 2, "b")]);
}

#[test]
fn test_adjacent_regions_are_kept() {
    let parsers = vec![SpanParser::new(&[(0, 4, "a"), (4, 9, "b")])];
    let document = Document::from_text("doc.txt", TEXT, &parsers).unwrap();
    assert_eq!(document.len(), 2);
}

#[test]
fn test_region_out_of_bounds() {
    let parsers = vec![SpanParser::new(&[(0, 100, "big")])];
    let error = Document::from_text("doc.txt", TEXT, &parsers).unwrap_err();
    assert!(matches!(
        error,
        DocumentError::RegionOutOfBounds {
            start: 0,
            end: 100,
            len: 19
        }
    ));
}

#[test]
fn test_parser_error_aborts_document() {
    let parsers: Vec<Arc<dyn Parser>> =
        vec![SpanParser::new(&[(0, 4, "a")]), Arc::new(failing)];
    let error = Document::from_text("doc.txt", TEXT, &parsers).unwrap_err();
    assert_eq!(error.to_string(), "malformed block");
}

#[test]
fn test_examples_share_namespace_and_locate_regions() {
    let text = "one\ntwo\n  three\n";
    let parsers = vec![SpanParser::new(&[(0, 3, "one"), (10, 15, "three")])];
    let document = Document::from_text("doc.txt", text, &parsers).unwrap();

    let examples: Vec<_> = document.examples().collect();
    assert_eq!((examples[0].line, examples[0].column), (1, 1));
    assert_eq!((examples[1].line, examples[1].column), (3, 3));
    assert_eq!(examples[1].source(), "three");
    assert_eq!(examples[1].name(), "line:3,column:3");

    for example in &document {
        example.evaluate().unwrap();
    }
    assert_eq!(document.namespace().get("count"), Some(Value::Int(2)));
    assert_eq!(document.namespace().get("last"), Some(Value::str("three")));
}

#[test]
fn test_installed_evaluator_replaces_region_evaluators() {
    let parsers = vec![SpanParser::new(&[(0, 4, "a")])];
    let mut document = Document::from_text("doc.txt", TEXT, &parsers).unwrap();

    document.set_evaluator(Arc::new(|_: &Example<'_>| -> Result<(), EvaluationError> {
        Err(EvaluationError::failed("installed"))
    }));
    let failure = document.examples().next().unwrap().evaluate().unwrap_err();
    assert_eq!(failure.error.to_string(), "installed");
    assert_eq!((failure.line, failure.column), (1, 1));
    assert_eq!(failure.path, PathBuf::from("doc.txt"));

    document.reset_evaluator();
    assert!(document.examples().next().unwrap().evaluate().is_ok());
}

#[test]
fn test_parsing_twice_gives_equal_regions() {
    let parsers = vec![
        SpanParser::new(&[(0, 4, "a"), (10, 14, "c")]),
        SpanParser::new(&[(12, 19, "d")]),
    ];
    let one = Document::from_text("doc.txt", TEXT, &parsers).unwrap();
    let two = Document::from_text("doc.txt", TEXT, &parsers).unwrap();
    assert!(one.regions().eq(two.regions()));
    assert!(!one.namespace().ptr_eq(two.namespace()));
}

#[test]
fn test_read_missing_file() {
    let error = Document::parse(Path::new("/nonexistent/doc.rst"), &[]).unwrap_err();
    assert!(matches!(error, DocumentError::Io { .. }));
}

proptest! {
    #[test]
    fn test_merged_regions_never_overlap(
        spans in prop::collection::vec((0usize..19, 1usize..6), 1..12)
    ) {
        let spans: Vec<(usize, usize, &'static str)> = spans
            .into_iter()
            .map(|(start, len)| (start, (start + len).min(TEXT.len()), "x"))
            .collect();
        let last = *spans.last().unwrap();
        let document = Document::from_text("doc.txt", TEXT, &[SpanParser::new(&spans)]).unwrap();

        let regions: Vec<_> = document.regions().collect();
        for pair in regions.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        prop_assert!(regions.iter().any(|r| r.start == last.0 && r.end == last.1));
    }
}
