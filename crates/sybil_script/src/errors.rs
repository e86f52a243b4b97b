//! Error types for compiling and executing snippets.
//!
//! `ScriptErrorKind` names the exception class a failure belongs to, so hosts
//! can match on the category (or print it) without parsing message strings.
//! Factory functions (e.g. `division_by_zero()`) are the construction API:
//! they populate both `kind` and `message`.
//!
//! Errors carry an optional document line. Statements stamp their line onto
//! errors raised beneath them, innermost first, so the reported line is the
//! one that actually failed.

use std::fmt;

/// Result of compiling or executing script code.
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Exception class of a script failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptErrorKind {
    Syntax,
    Name,
    Type,
    Value,
    ZeroDivision,
    Index,
    Key,
    Assertion,
    Recursion,
    Overflow,
    /// Raised explicitly with `raise`; carries the constructor's name.
    Raised {
        type_name: String,
    },
}

impl ScriptErrorKind {
    /// The exception class name as snippets spell it.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::Name => "NameError",
            Self::Type => "TypeError",
            Self::Value => "ValueError",
            Self::ZeroDivision => "ZeroDivisionError",
            Self::Index => "IndexError",
            Self::Key => "KeyError",
            Self::Assertion => "AssertionError",
            Self::Recursion => "RecursionError",
            Self::Overflow => "OverflowError",
            Self::Raised { type_name } => type_name,
        }
    }
}

/// A failure raised while compiling or running a snippet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptError {
    pub kind: ScriptErrorKind,
    pub message: String,
    /// Document line of the failing statement, when known.
    pub line: Option<u32>,
}

impl ScriptError {
    pub fn new(kind: ScriptErrorKind, message: impl Into<String>) -> Self {
        ScriptError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    /// Attach `line` unless a more precise line is already recorded.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        if self.line.is_none() {
            self.line = Some(line);
        }
        self
    }

    pub fn type_name(&self) -> &str {
        self.kind.type_name()
    }

    /// `true` when the error was produced by the tokenizer or parser.
    pub fn is_syntax_error(&self) -> bool {
        self.kind == ScriptErrorKind::Syntax
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.type_name())?;
        } else {
            write!(f, "{}: {}", self.type_name(), self.message)?;
        }
        if let Some(line) = self.line {
            write!(f, " (line {line})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {}

// Factory functions

pub fn syntax_error(message: impl Into<String>, line: u32) -> ScriptError {
    ScriptError::new(ScriptErrorKind::Syntax, message).at_line(line)
}

pub fn undefined_variable(name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Name,
        format!("name '{name}' is not defined"),
    )
}

pub fn division_by_zero() -> ScriptError {
    ScriptError::new(ScriptErrorKind::ZeroDivision, "division by zero")
}

pub fn modulo_by_zero() -> ScriptError {
    ScriptError::new(ScriptErrorKind::ZeroDivision, "integer modulo by zero")
}

pub fn integer_overflow(operation: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Overflow,
        format!("integer overflow in {operation}"),
    )
}

pub fn unsupported_operand(op: &str, left: &str, right: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("unsupported operand type(s) for {op}: '{left}' and '{right}'"),
    )
}

pub fn bad_operand(op: &str, type_name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("bad operand type for unary {op}: '{type_name}'"),
    )
}

pub fn not_comparable(op: &str, left: &str, right: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("'{op}' not supported between instances of '{left}' and '{right}'"),
    )
}

pub fn not_callable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("'{type_name}' object is not callable"),
    )
}

pub fn not_iterable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("'{type_name}' object is not iterable"),
    )
}

pub fn not_subscriptable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("'{type_name}' object is not subscriptable"),
    )
}

pub fn unhashable(type_name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("unhashable type: '{type_name}'"),
    )
}

pub fn type_error(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ScriptErrorKind::Type, message)
}

pub fn value_error(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ScriptErrorKind::Value, message)
}

pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> ScriptError {
    let arg_word = if expected == 1 { "argument" } else { "arguments" };
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("{name}() takes {expected} positional {arg_word} but {got} were given"),
    )
}

pub fn missing_argument(name: &str, param: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("{name}() missing required argument: '{param}'"),
    )
}

pub fn unexpected_keyword(name: &str, keyword: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("{name}() got an unexpected keyword argument '{keyword}'"),
    )
}

pub fn duplicate_argument(name: &str, param: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Type,
        format!("{name}() got multiple values for argument '{param}'"),
    )
}

pub fn index_out_of_range(type_name: &str) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Index,
        format!("{type_name} index out of range"),
    )
}

pub fn key_not_found(key_repr: &str) -> ScriptError {
    ScriptError::new(ScriptErrorKind::Key, key_repr)
}

pub fn assertion_failed(message: impl Into<String>) -> ScriptError {
    ScriptError::new(ScriptErrorKind::Assertion, message)
}

pub fn recursion_limit(depth: usize) -> ScriptError {
    ScriptError::new(
        ScriptErrorKind::Recursion,
        format!("maximum recursion depth exceeded (limit: {depth})"),
    )
}

/// An exception raised by `raise`. Builtin class names map back onto their
/// structured kind so `raise ValueError(...)` and a failed `int('x')` agree.
pub fn raised(type_name: &str, message: impl Into<String>) -> ScriptError {
    let kind = match type_name {
        "TypeError" => ScriptErrorKind::Type,
        "ValueError" => ScriptErrorKind::Value,
        "NameError" => ScriptErrorKind::Name,
        "ZeroDivisionError" => ScriptErrorKind::ZeroDivision,
        "IndexError" => ScriptErrorKind::Index,
        "KeyError" => ScriptErrorKind::Key,
        "AssertionError" => ScriptErrorKind::Assertion,
        "RecursionError" => ScriptErrorKind::Recursion,
        "OverflowError" => ScriptErrorKind::Overflow,
        other => ScriptErrorKind::Raised {
            type_name: other.to_string(),
        },
    };
    ScriptError::new(kind, message)
}
