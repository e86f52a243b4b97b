//! Examples: a region resolved against its document.

use std::any::Any;
use std::fmt;
use std::path::Path;

use sybil_script::Namespace;

use crate::document::Document;
use crate::errors::{EvaluationError, ExampleFailure};
use crate::region::{Payload, Region};

/// One runnable check: a region of a document, located at a 1-based line
/// and column.
///
/// Examples borrow their document, so they are cheap to make and never
/// outlive it. The namespace they expose is the document's own.
#[derive(Clone, Copy)]
pub struct Example<'d> {
    document: &'d Document,
    region: &'d Region,
    pub line: usize,
    pub column: usize,
}

impl<'d> Example<'d> {
    pub(crate) fn new(document: &'d Document, region: &'d Region) -> Self {
        let (line, column) = document.line_col(region.start);
        Example {
            document,
            region,
            line,
            column,
        }
    }

    pub fn document(&self) -> &'d Document {
        self.document
    }

    pub fn region(&self) -> &'d Region {
        self.region
    }

    pub fn path(&self) -> &'d Path {
        self.document.path()
    }

    pub fn namespace(&self) -> &'d Namespace {
        self.document.namespace()
    }

    pub fn parsed(&self) -> &'d dyn Payload {
        self.region.parsed()
    }

    pub fn parsed_as<T: Any>(&self) -> Option<&'d T> {
        self.region.parsed_as::<T>()
    }

    /// The document text the region covers.
    pub fn source(&self) -> &'d str {
        self.document
            .text()
            .get(self.region.start..self.region.end)
            .unwrap_or_default()
    }

    /// Test name used by hosts: `line:<L>,column:<C>`.
    pub fn name(&self) -> String {
        format!("line:{},column:{}", self.line, self.column)
    }

    /// Run the example through whichever evaluator is in force.
    pub fn evaluate(&self) -> Result<(), ExampleFailure> {
        tracing::trace!(path = %self.path().display(), line = self.line, "evaluating example");
        self.document
            .dispatch(self)
            .map_err(|error| self.failure(error))
    }

    pub(crate) fn failure(&self, error: EvaluationError) -> ExampleFailure {
        ExampleFailure {
            path: self.path().to_path_buf(),
            line: self.line,
            column: self.column,
            error,
        }
    }
}

impl fmt::Debug for Example<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Example path={} line={} column={} using {:?}>",
            self.path().display(),
            self.line,
            self.column,
            self.region.parsed()
        )
    }
}
