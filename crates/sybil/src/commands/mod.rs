//! Command handlers for the `sybil` binary.

mod list;

pub use list::list_examples;
pub use test::run_tests;
