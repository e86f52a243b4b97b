//! Documents: one source file, its regions and its namespace.
//!
//! Every parser scans the whole text and the regions they yield are merged
//! into one ordered, non-overlapping sequence. When spans overlap, the region
//! seen later wins: parsers are consulted in registration order and each
//! parser's regions in the order it yields them, and a new region evicts
//! every earlier region it overlaps.
//!
//! Examples of a document share its [`Namespace`] and must be evaluated in
//! order on one thread.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sybil_script::Namespace;

use crate::errors::{DocumentError, EvaluationError};
use crate::evaluator::Evaluator;
use crate::example::Example;
use crate::line_index::LineIndex;
use crate::parsers::Parser;
use crate::region::Region;
use crate::skip::{SkipController, SkipState};

/// Which evaluator runs the next example.
#[derive(Clone, Default)]
pub(crate) enum EvaluatorSlot {
    /// Each region's own evaluator.
    #[default]
    Region,
    /// An evaluator installed by the host for every example.
    Installed(Arc<dyn Evaluator>),
    /// A skip directive is in force.
    Skip(SkipController),
}

pub struct Document {
    path: PathBuf,
    text: String,
    namespace: Namespace,
    line_index: LineIndex,
    regions: BTreeMap<usize, Region>,
    evaluator: RefCell<EvaluatorSlot>,
}

impl Document {
    /// A document over `text` with no regions yet.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        Document {
            path: path.into(),
            line_index: LineIndex::build(&text),
            text,
            namespace: Namespace::new(),
            regions: BTreeMap::new(),
            evaluator: RefCell::new(EvaluatorSlot::Region),
        }
    }

    /// Read `path` and collect the regions of every parser.
    pub fn parse(path: &Path, parsers: &[Arc<dyn Parser>]) -> Result<Self, DocumentError> {
        let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(path, text, parsers)
    }

    /// Collect the regions of every parser over in-memory `text`.
    pub fn from_text(
        path: impl Into<PathBuf>,
        text: impl Into<String>,
        parsers: &[Arc<dyn Parser>],
    ) -> Result<Self, DocumentError> {
        let mut document = Document::new(path, text);
        let mut found = Vec::new();
        for parser in parsers {
            for region in parser.parse(&document) {
                found.push(region?);
            }
        }
        for region in found {
            document.add_region(region)?;
        }
        tracing::debug!(
            path = %document.path.display(),
            regions = document.regions.len(),
            "parsed document"
        );
        Ok(document)
    }

    /// Add a region, evicting any earlier region it overlaps.
    pub fn add_region(&mut self, region: Region) -> Result<(), DocumentError> {
        if region.start > region.end
            || region.end > self.text.len()
            || !self.text.is_char_boundary(region.start)
            || !self.text.is_char_boundary(region.end)
        {
            return Err(DocumentError::RegionOutOfBounds {
                start: region.start,
                end: region.end,
                len: self.text.len(),
            });
        }

        let evicted: Vec<usize> = self
            .regions
            .values()
            .filter(|existing| existing.start == region.start || existing.overlaps(&region))
            .map(|existing| existing.start)
            .collect();
        for start in evicted {
            if let Some(old) = self.regions.remove(&start) {
                tracing::debug!(
                    old_start = old.start,
                    old_end = old.end,
                    new_start = region.start,
                    new_end = region.end,
                    "region replaced by overlapping region"
                );
            }
        }
        self.regions.insert(region.start, region);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        self.line_index.line_col(&self.text, offset)
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Regions in ascending start order.
    pub fn regions(&self) -> impl ExactSizeIterator<Item = &Region> + '_ {
        self.regions.values()
    }

    /// Examples in ascending start order.
    pub fn examples(&self) -> impl ExactSizeIterator<Item = Example<'_>> + '_ {
        self.regions.values().map(|region| Example::new(self, region))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Run every example with `evaluator` instead of the regions' own.
    ///
    /// Needs exclusive access: no example can be mid-evaluation.
    pub fn set_evaluator(&mut self, evaluator: Arc<dyn Evaluator>) {
        *self.evaluator.get_mut() = EvaluatorSlot::Installed(evaluator);
    }

    /// Go back to running each region's own evaluator.
    pub fn reset_evaluator(&mut self) {
        *self.evaluator.get_mut() = EvaluatorSlot::Region;
    }

    /// Skip bookkeeping, when a skip directive is in force.
    pub fn skip_state(&self) -> Option<SkipState> {
        match &*self.evaluator.borrow() {
            EvaluatorSlot::Skip(controller) => Some(controller.state().clone()),
            _ => None,
        }
    }

    pub(crate) fn dispatch(&self, example: &Example<'_>) -> Result<(), EvaluationError> {
        let slot = self.evaluator.borrow().clone();
        match slot {
            EvaluatorSlot::Skip(_) => self.run_skip(example),
            EvaluatorSlot::Installed(evaluator) if !is_directive(example) => {
                evaluator.evaluate(example)
            }
            EvaluatorSlot::Installed(_) | EvaluatorSlot::Region => {
                example.region().evaluator().evaluate(example)
            }
        }
    }

    /// Route `example` through the skip controller, installing one first if
    /// the slot does not hold one yet.
    pub(crate) fn run_skip(&self, example: &Example<'_>) -> Result<(), EvaluationError> {
        let slot = self.evaluator.borrow().clone();
        let (next, result) = SkipController::wrap(slot).handle(example);
        *self.evaluator.borrow_mut() = next;
        result
    }
}

fn is_directive(example: &Example<'_>) -> bool {
    example
        .parsed_as::<crate::skip::SkipDirective>()
        .is_some()
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("regions", &self.regions.len())
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl<'d> IntoIterator for &'d Document {
    type Item = Example<'d>;
    type IntoIter = Box<dyn Iterator<Item = Example<'d>> + 'd>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.examples())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
