//! Conditional skipping.
//!
//! Skip directives (`.. skip: start`, `next`, `end`, optionally with an
//! `if(...)` condition) do not check anything themselves. Evaluating one
//! installs a [`SkipController`] in the document's evaluator slot, which then
//! sees every later example first and decides whether it runs or reports as
//! skipped.
//!
//! The controller's bookkeeping is a small state machine, [`SkipState`], whose
//! transitions are plain functions of the current state and the directive.
//!
//! ```text
//!             start            next
//!   Active ──────────▶ Skipping      Active ─────────▶ RestoreScheduled
//!      ▲     end          │             ▲   one example     │
//!      └──────────────────┘             └───────────────────┘
//! ```
//!
//! A condition that evaluates falsy turns any directive into "back to
//! `Active`". `end` never takes a condition.

use std::str::FromStr;
use std::sync::Arc;

use sybil_script::errors::{arity_mismatch, missing_argument, unexpected_keyword};
use sybil_script::{Namespace, NativeFunction, Value};

use crate::document::EvaluatorSlot;
use crate::errors::{ConfigError, EvaluationError};
use crate::evaluator::Evaluator;
use crate::example::Example;

/// Payload of a skip directive region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkipDirective {
    /// Action as written; validated when the directive is evaluated.
    pub action: String,
    /// Text after `if`, parentheses included, e.g. `(x > 1, reason='old')`.
    pub condition: Option<String>,
}

impl SkipDirective {
    pub fn new(action: impl Into<String>, condition: Option<String>) -> Self {
        SkipDirective {
            action: action.into(),
            condition,
        }
    }

    /// Evaluate the condition against a copy of `namespace`.
    ///
    /// The copy binds `If`, a callable returning its reason (the condition
    /// text unless `reason=` is given) when its first argument is truthy and
    /// `None` otherwise. The expression evaluated is `If` followed by the
    /// condition text.
    pub fn verdict(
        &self,
        action: SkipAction,
        namespace: &Namespace,
    ) -> Result<Verdict, EvaluationError> {
        let Some(condition) = self.condition.as_deref() else {
            return Ok(Verdict::Unconditional);
        };
        if action == SkipAction::End {
            return Err(ConfigError::ConditionOnEnd.into());
        }

        let scope = namespace.snapshot();
        scope.insert("If", Value::Native(conditional_builder(condition.trim())));
        let value = sybil_script::eval_expression(&format!("If{condition}"), &scope)?;
        Ok(if value.is_truthy() {
            Verdict::Met(value.to_string())
        } else {
            Verdict::NotMet
        })
    }
}

/// `If(condition, reason=None)`.
fn conditional_builder(default_reason: &str) -> NativeFunction {
    let default_reason = default_reason.to_string();
    NativeFunction::new("If", move |args, kwargs| {
        let mut reason = args.get(1).cloned();
        for (key, value) in kwargs {
            match key.as_str() {
                "reason" if reason.is_none() => reason = Some(value.clone()),
                "reason" => {
                    return Err(sybil_script::errors::duplicate_argument("If", "reason"));
                }
                other => return Err(unexpected_keyword("If", other)),
            }
        }
        if args.len() > 2 {
            return Err(arity_mismatch("If", 2, args.len()));
        }
        let condition = args.first().ok_or_else(|| missing_argument("If", "condition"))?;
        if !condition.is_truthy() {
            return Ok(Value::None);
        }
        Ok(match reason {
            Some(reason) if reason.is_truthy() => reason,
            _ => Value::str(&default_reason),
        })
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipAction {
    /// Skip every example until `end`.
    Start,
    /// Skip exactly one example.
    Next,
    /// Stop skipping.
    End,
}

impl FromStr for SkipAction {
    type Err = ConfigError;

    fn from_str(action: &str) -> Result<Self, Self::Err> {
        match action {
            "start" => Ok(SkipAction::Start),
            "next" => Ok(SkipAction::Next),
            "end" => Ok(SkipAction::End),
            other => Err(ConfigError::BadSkipAction {
                action: other.to_string(),
            }),
        }
    }
}

/// Outcome of a directive's condition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// No condition: the directive always applies, without a reason.
    Unconditional,
    /// The condition held; the skip reason.
    Met(String),
    NotMet,
}

/// Where a document is in its skip bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SkipState {
    /// Examples run normally.
    #[default]
    Active,
    /// Every example is skipped until `end`.
    Skipping { reason: String },
    /// The next example is skipped, then examples run again.
    RestoreScheduled { reason: String },
}

impl SkipState {
    /// State after a directive.
    ///
    /// A scheduled restore is consumed before the directive is considered, so
    /// a directive right after `next` starts from `Active`.
    pub fn on_directive(&self, action: SkipAction, verdict: Verdict) -> Result<Self, ConfigError> {
        let current = match self {
            SkipState::RestoreScheduled { .. } => &SkipState::Active,
            state => state,
        };
        let reason = match verdict {
            Verdict::NotMet => return Ok(SkipState::Active),
            Verdict::Unconditional => String::new(),
            Verdict::Met(reason) => reason,
        };
        match action {
            SkipAction::End => Ok(SkipState::Active),
            SkipAction::Start if matches!(current, SkipState::Skipping { .. }) => {
                Err(ConfigError::NestedSkip)
            }
            SkipAction::Start => Ok(SkipState::Skipping { reason }),
            SkipAction::Next => Ok(SkipState::RestoreScheduled { reason }),
        }
    }

    /// State after an ordinary example, and the skip reason if it must not
    /// run.
    pub fn on_example(self) -> (Self, Option<String>) {
        match self {
            SkipState::Active => (SkipState::Active, None),
            SkipState::Skipping { reason } => {
                let skip = Some(reason.clone());
                (SkipState::Skipping { reason }, skip)
            }
            SkipState::RestoreScheduled { reason } => (SkipState::Active, Some(reason)),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SkipState::Active)
    }
}

/// Occupies a document's evaluator slot while a skip is in force.
///
/// Wraps whatever evaluator was in the slot before it, and puts that back as
/// soon as its state returns to [`SkipState::Active`].
#[derive(Clone)]
pub(crate) struct SkipController {
    original: Option<Arc<dyn Evaluator>>,
    state: SkipState,
}

impl SkipController {
    /// Take over `slot`, reusing the controller already there.
    pub(crate) fn wrap(slot: EvaluatorSlot) -> Self {
        match slot {
            EvaluatorSlot::Skip(controller) => controller,
            EvaluatorSlot::Region => SkipController {
                original: None,
                state: SkipState::Active,
            },
            EvaluatorSlot::Installed(evaluator) => SkipController {
                original: Some(evaluator),
                state: SkipState::Active,
            },
        }
    }

    pub(crate) fn state(&self) -> &SkipState {
        &self.state
    }

    /// Handle one example; returns what the slot holds afterwards.
    pub(crate) fn handle(self, example: &Example<'_>) -> (EvaluatorSlot, Result<(), EvaluationError>) {
        if let Some(directive) = example.parsed_as::<SkipDirective>() {
            return match self.apply(directive, example) {
                Ok(state) => {
                    tracing::debug!(line = example.line, ?state, "skip directive");
                    (self.into_slot(state), Ok(()))
                }
                Err(error) => {
                    let state = self.state.clone();
                    (self.into_slot(state), Err(error))
                }
            };
        }

        let (state, skip) = self.state.clone().on_example();
        let result = match skip {
            Some(reason) => Err(EvaluationError::Skipped { reason }),
            None => self.forward(example),
        };
        (self.into_slot(state), result)
    }

    fn apply(
        &self,
        directive: &SkipDirective,
        example: &Example<'_>,
    ) -> Result<SkipState, EvaluationError> {
        let action: SkipAction = directive.action.parse()?;
        let verdict = directive.verdict(action, example.namespace())?;
        Ok(self.state.on_directive(action, verdict)?)
    }

    fn forward(&self, example: &Example<'_>) -> Result<(), EvaluationError> {
        match &self.original {
            Some(evaluator) => evaluator.evaluate(example),
            None => example.region().evaluator().evaluate(example),
        }
    }

    fn into_slot(self, state: SkipState) -> EvaluatorSlot {
        if state.is_active() {
            return match self.original {
                Some(evaluator) => EvaluatorSlot::Installed(evaluator),
                None => EvaluatorSlot::Region,
            };
        }
        EvaluatorSlot::Skip(SkipController {
            original: self.original,
            state,
        })
    }
}

/// Region evaluator for skip directives.
///
/// Hands the directive to the document, which routes it through its skip
/// controller, installing one if needed.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipEvaluator;

impl SkipEvaluator {
    pub fn shared() -> Arc<dyn Evaluator> {
        Arc::new(SkipEvaluator)
    }
}

impl Evaluator for SkipEvaluator {
    fn evaluate(&self, example: &Example<'_>) -> Result<(), EvaluationError> {
        example.document().run_skip(example)
    }
}
