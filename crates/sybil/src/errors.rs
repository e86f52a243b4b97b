//! Error types.
//!
//! Three layers, from most to least fatal:
//!
//! - [`DocumentError`]: the document could not be parsed at all. No examples
//!   are produced for it.
//! - [`ConfigError`]: a directive or parser was configured wrongly. Reported
//!   when the offending example is evaluated.
//! - [`EvaluationError`]: what an evaluator returns. Skip signals live here too,
//!   distinguished by [`EvaluationError::is_skip`].
//!
//! [`ExampleFailure`] wraps an `EvaluationError` with the document location a
//! host reports.

use std::error::Error;
use std::path::PathBuf;

use sybil_script::ScriptError;
use thiserror::Error;

/// Message shown for examples skipped by a directive that gave no reason.
pub const DEFAULT_SKIP_MESSAGE: &str = "skipped by directive";

/// A document could not be turned into examples.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A parser produced a region that does not fit the document text.
    #[error("region {start}..{end} does not fit a document of {len} bytes")]
    RegionOutOfBounds { start: usize, end: usize, len: usize },

    /// A code block failed to compile.
    #[error("code block starting on line {line} does not compile: {source}")]
    Compile {
        line: usize,
        #[source]
        source: ScriptError,
    },

    /// A skip `start` appeared before the previous `start` was ended.
    #[error("line {line}: skip 'start' inside a block that is already being skipped")]
    NestedSkip { line: usize },

    /// A custom parser gave up.
    #[error("{0}")]
    Parser(String),
}

/// A directive or parser was configured wrongly.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Bad skip action: {action}")]
    BadSkipAction { action: String },

    #[error("Cannot have condition on 'skip: end'")]
    ConditionOnEnd,

    #[error("skip 'start' while a previous 'start' is still active")]
    NestedSkip,

    #[error("no evaluator for code blocks in language '{language}'")]
    NoEvaluator { language: String },

    #[error("fixture '{name}' is not registered")]
    UnknownFixture { name: String },
}

/// Why an example did not pass.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The evaluator reported a failure message.
    #[error("{0}")]
    Failed(String),

    /// The example was intentionally not run.
    #[error("{}", skip_message(reason))]
    Skipped { reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A snippet raised. Type and message are kept as the script reported them.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Any other error raised by a custom evaluator.
    #[error(transparent)]
    Raised(Box<dyn Error + Send + Sync>),
}

fn skip_message(reason: &str) -> &str {
    if reason.is_empty() {
        DEFAULT_SKIP_MESSAGE
    } else {
        reason
    }
}

impl EvaluationError {
    pub fn failed(message: impl Into<String>) -> Self {
        EvaluationError::Failed(message.into())
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        EvaluationError::Skipped {
            reason: reason.into(),
        }
    }

    /// Wrap an arbitrary error raised by a custom evaluator.
    pub fn raised<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        EvaluationError::Raised(Box::new(error))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, EvaluationError::Skipped { .. })
    }

    /// Configuration errors end the run of the whole document.
    pub fn is_config(&self) -> bool {
        matches!(self, EvaluationError::Config(_))
    }

    /// The message a host shows for a skipped example.
    pub fn skip_reason(&self) -> Option<&str> {
        match self {
            EvaluationError::Skipped { reason } => Some(skip_message(reason)),
            _ => None,
        }
    }

    /// The script error behind this failure, if a snippet raised it.
    pub fn as_script_error(&self) -> Option<&ScriptError> {
        match self {
            EvaluationError::Script(error) => Some(error),
            _ => None,
        }
    }
}

/// An evaluation error located in its document.
#[derive(Debug, Error)]
#[error("{}, line {line}, column {column}: {error}", path.display())]
pub struct ExampleFailure {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    #[source]
    pub error: EvaluationError,
}

impl ExampleFailure {
    pub fn is_skip(&self) -> bool {
        self.error.is_skip()
    }

    /// Document line the failure points at.
    ///
    /// A snippet error carries the line of the statement that raised; any
    /// other failure points at the start of the example.
    pub fn reported_line(&self) -> usize {
        self.error
            .as_script_error()
            .and_then(|e| e.line)
            .and_then(|line| usize::try_from(line).ok())
            .unwrap_or(self.line)
    }
}
