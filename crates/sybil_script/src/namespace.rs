//! The shared execution context of a document.
//!
//! A `Namespace` is a handle: cloning it yields another reference to the
//! same bindings, never a copy. Every example of a document holds the same
//! handle, so a name bound by one snippet is visible to the next. Use
//! [`Namespace::snapshot`] when an independent copy is wanted.
//!
//! # Thread Safety
//! `Namespace` is NOT thread-safe. It wraps `Rc<RefCell<..>>` and is meant to
//! be created, used, and dropped by the single thread running one document.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

#[derive(Clone, Default)]
#[repr(transparent)]
pub struct Namespace(Rc<RefCell<FxHashMap<String, Value>>>);

impl Namespace {
    pub fn new() -> Self {
        Namespace::default()
    }

    /// Look up a binding, cloning the (reference-counted) value out.
    #[inline]
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    /// Bind `name`, returning the previous value if there was one.
    #[inline]
    pub fn insert(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().insert(name.into(), value)
    }

    pub fn remove(&self, name: &str) -> Option<Value> {
        self.0.borrow_mut().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Bound names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.0.borrow().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Remove every binding.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// An independent namespace holding the same bindings.
    ///
    /// The map is copied; the values themselves are shared, so mutating a
    /// list through the snapshot is still visible here. Rebinding a name is
    /// not.
    #[must_use]
    pub fn snapshot(&self) -> Namespace {
        Namespace(Rc::new(RefCell::new(self.0.borrow().clone())))
    }

    /// Whether both handles refer to the same bindings.
    pub fn ptr_eq(&self, other: &Namespace) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.0.borrow();
        let mut entries: Vec<_> = map.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        f.debug_map().entries(entries).finish()
    }
}
