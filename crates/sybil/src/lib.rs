//! Run the code examples embedded in prose documents as tests.
//!
//! A [`Sybil`] holds a list of [`Parser`]s. Parsing a file yields a
//! [`Document`]: the text, the ordered non-overlapping [`Region`]s the parsers
//! found, and one [`Namespace`] shared by all of them. Each region becomes an
//! [`Example`] with a line and column; evaluating it dispatches to the
//! region's [`Evaluator`], or to whatever evaluator the document's slot holds
//! while a skip directive is in force.
//!
//! Hosts follow one contract: `should_parse`, `parse`, then for every example
//! bind fixtures into `example.namespace()` and call `example.evaluate()`,
//! reporting failures at `example.line`/`example.column`. The [`test`] module
//! is a reference host.

pub mod commands;
pub mod document;
pub mod errors;
pub mod evaluator;
pub mod example;
pub mod fixtures;
pub mod line_index;
pub mod parsers;
pub mod region;
pub mod skip;
mod sybil;
pub mod test;
mod tracing_setup;

pub use document::Document;
pub use errors::{ConfigError, DocumentError, EvaluationError, ExampleFailure};
pub use evaluator::{Evaluator, MissingEvaluator, ScriptEvaluator};
pub use example::Example;
pub use fixtures::FixtureRegistry;
pub use parsers::{find_region_sources, CodeBlockParser, Parser, Regions, SkipParser};
pub use region::{Payload, Region};
pub use skip::{SkipAction, SkipDirective, SkipState};
pub use sybil::{NamespaceHook, Sybil};
pub use sybil_script::{Namespace, Value};
pub use tracing_setup::init_tracing;
