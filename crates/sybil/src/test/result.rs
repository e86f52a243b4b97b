//! Test result types.

use std::path::PathBuf;
use std::time::Duration;

/// Outcome of a single example.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    /// Failed with a located message.
    Failed(String),
    /// Not run, with the reason.
    Skipped(String),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TestOutcome::Skipped(_))
    }
}

/// Result of running a single example.
#[derive(Clone, Debug)]
pub struct TestResult {
    /// `line:<L>,column:<C>`.
    pub name: String,
    pub outcome: TestOutcome,
    pub duration: Duration,
}

impl TestResult {
    pub fn passed(name: String, duration: Duration) -> Self {
        TestResult {
            name,
            outcome: TestOutcome::Passed,
            duration,
        }
    }

    #[cold]
    pub fn failed(name: String, error: String, duration: Duration) -> Self {
        TestResult {
            name,
            outcome: TestOutcome::Failed(error),
            duration,
        }
    }

    #[cold]
    pub fn skipped(name: String, reason: String) -> Self {
        TestResult {
            name,
            outcome: TestOutcome::Skipped(reason),
            duration: Duration::ZERO,
        }
    }
}

/// Results for one document.
#[derive(Clone, Debug, Default)]
pub struct FileSummary {
    pub path: PathBuf,
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration: Duration,
    /// Errors that stopped the document (unparseable text, bad configuration).
    pub errors: Vec<String>,
}

impl FileSummary {
    pub fn new(path: PathBuf) -> Self {
        FileSummary {
            path,
            ..Default::default()
        }
    }

    pub fn add_result(&mut self, result: TestResult) {
        match &result.outcome {
            TestOutcome::Passed => self.passed += 1,
            TestOutcome::Failed(_) => self.failed += 1,
            TestOutcome::Skipped(_) => self.skipped += 1,
        }
        self.duration += result.duration;
        self.results.push(result);
    }

    pub fn add_error(&mut self, error: String) {
        self.errors.push(error);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || !self.errors.is_empty()
    }
}

/// Overall summary of a run.
#[derive(Clone, Debug, Default)]
pub struct TestSummary {
    pub files: Vec<FileSummary>,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Number of documents with errors.
    pub error_files: usize,
    pub duration: Duration,
}

impl TestSummary {
    pub fn new() -> Self {
        TestSummary::default()
    }

    pub fn add_file(&mut self, summary: FileSummary) {
        self.passed += summary.passed;
        self.failed += summary.failed;
        self.skipped += summary.skipped;
        if !summary.errors.is_empty() {
            self.error_files += 1;
        }
        self.duration += summary.duration;
        self.files.push(summary);
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.error_files > 0
    }

    /// 0 = all pass, 1 = failures or document errors, 2 = nothing collected.
    pub fn exit_code(&self) -> i32 {
        if self.total() == 0 && self.error_files == 0 {
            2
        } else {
            i32::from(self.has_failures())
        }
    }
}

#[cfg(test)]
mod tests;
