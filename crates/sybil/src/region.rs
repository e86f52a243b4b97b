//! Regions: spans of document text a parser has claimed.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::evaluator::Evaluator;

/// What a parser extracted from a region.
///
/// Implemented for every `Any + Debug + PartialEq` type, so parsers can use
/// any plain data type (a compiled program, a string, a tuple of captures) as
/// their payload and regions stay comparable.
pub trait Payload: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    /// Value equality across the type-erased boundary.
    fn eq_payload(&self, other: &dyn Payload) -> bool;
}

impl<T: Any + fmt::Debug + PartialEq> Payload for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_payload(&self, other: &dyn Payload) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A half-open span `[start, end)` of a document's text, with the parsed
/// payload and the evaluator that checks it.
///
/// Regions are immutable once built. Cloning shares the payload.
#[derive(Clone)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    parsed: Rc<dyn Payload>,
    evaluator: Arc<dyn Evaluator>,
}

impl Region {
    pub fn new(
        start: usize,
        end: usize,
        parsed: impl Payload,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Region {
            start,
            end,
            parsed: Rc::new(parsed),
            evaluator,
        }
    }

    pub fn parsed(&self) -> &dyn Payload {
        &*self.parsed
    }

    /// The payload, if it is a `T`.
    pub fn parsed_as<T: Any>(&self) -> Option<&T> {
        self.parsed.as_any().downcast_ref::<T>()
    }

    pub fn evaluator(&self) -> &Arc<dyn Evaluator> {
        &self.evaluator
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the two spans share at least one byte.
    pub fn overlaps(&self, other: &Region) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Same span, equal payload and the very same evaluator instance.
impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.parsed.eq_payload(&*other.parsed)
            && Arc::ptr_eq(&self.evaluator, &other.evaluator)
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("parsed", &self.parsed)
            .finish_non_exhaustive()
    }
}
