//! Reference host: runs the examples of every matching document.
//!
//! - Discovery: walk a directory for files some [`Sybil`](crate::Sybil) wants;
//!   the last sybil that accepts a file parses it
//! - Execution: one document per task, its examples strictly in order
//! - Results: pass/fail/skip per example, summarised per file and overall
//! - Parallelism: independent documents run concurrently on a scoped rayon pool

mod result;
mod runner;

pub use discovery::{discover_documents, discover_documents_in, select_sybil, DocumentFile};
pub use result::{FileSummary, TestOutcome, TestResult, TestSummary};
pub use runner::{TestRunner, TestRunnerConfig};
