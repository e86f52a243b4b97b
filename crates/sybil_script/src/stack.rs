//! Stack growth for deeply recursive snippets.
//!
//! Script function calls recurse through the tree-walking interpreter, so a
//! recursive snippet consumes native stack proportional to its call depth.
//! Calls run under [`ensure_sufficient_stack`], which grows the stack on
//! demand; the interpreter's own depth limit then turns runaway recursion
//! into a `RecursionError` instead of a crash.

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
