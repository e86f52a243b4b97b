//! Test execution engine.
//!
//! Parses each document and runs its examples in order, collecting results.

use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;

use crate::errors::ExampleFailure;
use crate::example::Example;
use crate::fixtures::FixtureRegistry;
use crate::Sybil;

use super::discovery::{discover_documents_in, select_sybil, DocumentFile};
use super::result::{FileSummary, TestResult, TestSummary};

/// Configuration for the test runner.
#[derive(Clone, Debug)]
pub struct TestRunnerConfig {
    /// Only run examples whose `path::line:L,column:C` id contains this.
    pub filter: Option<String>,
    pub verbose: bool,
    /// Run documents in parallel. Examples of one document always run in
    /// order.
    pub parallel: bool,
}

impl Default for TestRunnerConfig {
    fn default() -> Self {
        TestRunnerConfig {
            filter: None,
            verbose: false,
            parallel: true,
        }
    }
}

pub struct TestRunner {
    config: TestRunnerConfig,
    sybils: Vec<Sybil>,
    fixtures: FixtureRegistry,
}

impl TestRunner {
    /// Runner over `sybils`; each file is parsed by the last sybil that
    /// accepts it.
    pub fn new(sybils: Vec<Sybil>) -> Self {
        Self::with_config(sybils, TestRunnerConfig::default())
    }

    pub fn with_config(sybils: Vec<Sybil>, config: TestRunnerConfig) -> Self {
        TestRunner {
            config,
            sybils,
            fixtures: FixtureRegistry::new(),
        }
    }

    /// Factories for the fixture names the sybils declare.
    #[must_use]
    pub fn with_fixtures(mut self, fixtures: FixtureRegistry) -> Self {
        self.fixtures = fixtures;
        self
    }

    pub fn sybils(&self) -> &[Sybil] {
        &self.sybils
    }

    /// Run every document at `path` (a file or a directory).
    pub fn run(&self, path: &Path) -> TestSummary {
        let files = discover_documents_in(path, &self.sybils);
        tracing::debug!(files = files.len(), path = %path.display(), "discovered documents");

        if self.config.parallel {
            self.run_parallel(&files)
        } else {
            self.run_sequential(&files)
        }
    }

    fn run_sequential(&self, files: &[DocumentFile]) -> TestSummary {
        let mut summary = TestSummary::new();
        let start = Instant::now();

        for file in files {
            summary.add_file(self.run_document(file));
        }

        summary.duration = start.elapsed();
        summary
    }

    /// Run documents on a scoped rayon pool.
    ///
    /// Each task owns its document and namespace; only the runner itself is
    /// shared. The pool is torn down before this returns.
    fn run_parallel(&self, files: &[DocumentFile]) -> TestSummary {
        let start = Instant::now();

        let file_summaries = rayon::ThreadPoolBuilder::new()
            // Deeply recursive snippets run on these threads.
            .stack_size(32 * 1024 * 1024)
            .build_scoped(rayon::ThreadBuilder::run, |pool| {
                pool.install(|| {
                    files
                        .par_iter()
                        .map(|file| self.run_document(file))
                        .collect::<Vec<_>>()
                })
            })
            .unwrap_or_else(|e| {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                files.iter().map(|file| self.run_document(file)).collect()
            });

        let mut summary = TestSummary::new();
        for file_summary in file_summaries {
            summary.add_file(file_summary);
        }
        summary.duration = start.elapsed();
        summary
    }

    /// Parse one document with the last sybil that accepts it and run its
    /// examples in order.
    ///
    /// Setup runs before the first example and teardown after the last, both
    /// against the document namespace. A configuration error stops the
    /// document.
    pub fn run_file(&self, path: &Path) -> FileSummary {
        match select_sybil(&self.sybils, path) {
            Some(index) => self.run_with(&self.sybils[index], path),
            None => {
                let mut summary = FileSummary::new(path.to_path_buf());
                summary.add_error("no sybil accepts this file".to_string());
                summary
            }
        }
    }

    fn run_document(&self, file: &DocumentFile) -> FileSummary {
        match self.sybils.get(file.sybil) {
            Some(sybil) => self.run_with(sybil, &file.path),
            None => self.run_file(&file.path),
        }
    }

    fn run_with(&self, sybil: &Sybil, path: &Path) -> FileSummary {
        let mut summary = FileSummary::new(path.to_path_buf());

        let document = match sybil.parse(path) {
            Ok(document) => document,
            Err(error) => {
                tracing::debug!(path = %path.display(), %error, "document not parsed");
                summary.add_error(error.to_string());
                return summary;
            }
        };

        let namespace = document.namespace();
        sybil.run_setup(namespace);

        for example in document.examples() {
            let name = example.name();
            if !self.matches_filter(path, &name) {
                continue;
            }

            let start = Instant::now();
            let result = self.evaluate(sybil, &example);
            let duration = start.elapsed();

            match result {
                Ok(()) => summary.add_result(TestResult::passed(name, duration)),
                Err(failure) => {
                    if let Some(reason) = failure.error.skip_reason() {
                        summary.add_result(TestResult::skipped(name, reason.to_string()));
                        continue;
                    }
                    let message = failure.error.to_string();
                    summary.add_result(TestResult::failed(name, message, duration));
                    if failure.error.is_config() {
                        summary.add_error(format!(
                            "{failure}; remaining examples were not run"
                        ));
                        break;
                    }
                }
            }
        }

        sybil.run_teardown(namespace);
        tracing::debug!(
            path = %path.display(),
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "document finished"
        );
        summary
    }

    fn evaluate(&self, sybil: &Sybil, example: &Example<'_>) -> Result<(), ExampleFailure> {
        self.fixtures
            .inject(sybil.fixture_names(), example.namespace())
            .map_err(|error| example.failure(error.into()))?;
        example.evaluate()
    }

    fn matches_filter(&self, path: &Path, name: &str) -> bool {
        match &self.config.filter {
            Some(filter) => format!("{}::{name}", path.display()).contains(filter.as_str()),
            None => true,
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
