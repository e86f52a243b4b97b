//! The snippet language run by sybil documents.
//!
//! A small, indentation-structured, dynamically typed language. Snippets
//! are compiled once with [`compile`], which numbers lines from the
//! document line the snippet starts on, and then executed against a shared
//! [`Namespace`]. Every example of a document runs against the same
//! namespace, so names bound by one snippet are visible to the next.
//!
//! ```text
//! let program = sybil_script::compile("x = 1\nassert x == 1\n", 9)?;
//! program.execute(&namespace)?;
//! ```
//!
//! Errors are [`ScriptError`]s: an exception class, a message, and the
//! document line of the statement that failed.

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod parser;

mod interpreter;
mod namespace;
mod stack;
mod value;

pub use ast::Program;
pub use errors::{ScriptError, ScriptErrorKind, ScriptResult};
pub use interpreter::{lookup_builtin, Builtin, Interpreter, EXCEPTION_TYPES, MAX_CALL_DEPTH};
pub use namespace::Namespace;
pub use value::{ExceptionValue, FunctionValue, NativeFn, NativeFunction, Number, Value};

/// Compile a snippet whose first line is document line `first_line`.
pub fn compile(source: &str, first_line: u32) -> ScriptResult<Program> {
    parser::parse(source, first_line)
}

/// Evaluate a single expression against `namespace`.
///
/// Names resolve in the namespace, then among the builtins.
pub fn eval_expression(source: &str, namespace: &Namespace) -> ScriptResult<Value> {
    let expr = parser::parse_expression(source)?;
    Interpreter::new(namespace).evaluate(&expr)
}
