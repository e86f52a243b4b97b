//! Evaluators: what runs an example.

use std::sync::Arc;

use sybil_script::Program;

use crate::errors::{ConfigError, EvaluationError};
use crate::example::Example;

/// Checks one example.
///
/// Evaluators are shared between threads (one parser, many documents), so
/// they hold no per-document state; anything an example needs to remember
/// goes into its namespace.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, example: &Example<'_>) -> Result<(), EvaluationError>;
}

impl<F> Evaluator for F
where
    F: Fn(&Example<'_>) -> Result<(), EvaluationError> + Send + Sync,
{
    fn evaluate(&self, example: &Example<'_>) -> Result<(), EvaluationError> {
        self(example)
    }
}

/// Runs a compiled [`Program`] payload against the document namespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptEvaluator;

impl ScriptEvaluator {
    pub fn shared() -> Arc<dyn Evaluator> {
        Arc::new(ScriptEvaluator)
    }
}

impl Evaluator for ScriptEvaluator {
    fn evaluate(&self, example: &Example<'_>) -> Result<(), EvaluationError> {
        let program = example.parsed_as::<Program>().ok_or_else(|| {
            EvaluationError::failed(format!(
                "expected a compiled program, found {:?}",
                example.parsed()
            ))
        })?;
        program.execute(example.namespace())?;
        Ok(())
    }
}

/// Stands in for a code-block language nobody supplied an evaluator for.
#[derive(Clone, Debug)]
pub struct MissingEvaluator {
    language: String,
}

impl MissingEvaluator {
    pub fn new(language: impl Into<String>) -> Self {
        MissingEvaluator {
            language: language.into(),
        }
    }
}

impl Evaluator for MissingEvaluator {
    fn evaluate(&self, _example: &Example<'_>) -> Result<(), EvaluationError> {
        Err(ConfigError::NoEvaluator {
            language: self.language.clone(),
        }
        .into())
    }
}
