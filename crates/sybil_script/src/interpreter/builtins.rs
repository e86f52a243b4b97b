//! Builtin functions and exception classes.
//!
//! Builtins resolve after locals and the namespace, from this fixed table.
//! They are never inserted into a namespace, so a namespace only ever holds
//! what snippets (or the host) put there.

use std::rc::Rc;

use super::operators::{iterate, ordering};
use crate::errors::{
    arity_mismatch, type_error, unexpected_keyword, value_error, ScriptError, ScriptResult,
};
use crate::value::{ExceptionValue, Number, Value};

/// Exception classes available to snippets.
pub const EXCEPTION_TYPES: &[&str] = &[
    "Exception",
    "ValueError",
    "TypeError",
    "KeyError",
    "IndexError",
    "AssertionError",
    "RuntimeError",
    "NameError",
    "ZeroDivisionError",
    "RecursionError",
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Len,
    Str,
    Repr,
    Int,
    Float,
    Bool,
    Range,
    List,
    Tuple,
    Abs,
    Min,
    Max,
    Sum,
    Sorted,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Repr => "repr",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Bool => "bool",
            Builtin::Range => "range",
            Builtin::List => "list",
            Builtin::Tuple => "tuple",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Sorted => "sorted",
        }
    }
}

/// Resolve a builtin name.
pub fn lookup(name: &str) -> Option<Value> {
    let builtin = match name {
        "print" => Builtin::Print,
        "len" => Builtin::Len,
        "str" => Builtin::Str,
        "repr" => Builtin::Repr,
        "int" => Builtin::Int,
        "float" => Builtin::Float,
        "bool" => Builtin::Bool,
        "range" => Builtin::Range,
        "list" => Builtin::List,
        "tuple" => Builtin::Tuple,
        "abs" => Builtin::Abs,
        "min" => Builtin::Min,
        "max" => Builtin::Max,
        "sum" => Builtin::Sum,
        "sorted" => Builtin::Sorted,
        _ => {
            return EXCEPTION_TYPES
                .contains(&name)
                .then(|| Value::ExceptionType(Rc::from(name)));
        }
    };
    Some(Value::Builtin(builtin))
}

fn check_arity(name: &str, args: &[Value], min: usize, max: usize) -> ScriptResult<()> {
    if args.len() < min || args.len() > max {
        let expected = if args.len() < min { min } else { max };
        return Err(arity_mismatch(name, expected, args.len()));
    }
    Ok(())
}

fn no_keywords(name: &str, kwargs: &[(String, Value)]) -> ScriptResult<()> {
    match kwargs.first() {
        Some((key, _)) => Err(unexpected_keyword(name, key)),
        None => Ok(()),
    }
}

fn usize_to_int(n: usize) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

pub fn call_builtin(
    builtin: Builtin,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> ScriptResult<Value> {
    let name = builtin.name();
    if builtin != Builtin::Print {
        no_keywords(name, kwargs)?;
    }
    match builtin {
        Builtin::Print => print(args, kwargs),
        Builtin::Len => {
            check_arity(name, args, 1, 1)?;
            match &args[0] {
                Value::Str(s) => Ok(usize_to_int(s.chars().count())),
                Value::Bytes(b) => Ok(usize_to_int(b.len())),
                Value::List(items) => Ok(usize_to_int(items.borrow().len())),
                Value::Tuple(items) => Ok(usize_to_int(items.len())),
                Value::Dict(entries) => Ok(usize_to_int(entries.borrow().len())),
                other => Err(type_error(format!(
                    "object of type '{}' has no len()",
                    other.type_name()
                ))),
            }
        }
        Builtin::Str => {
            check_arity(name, args, 0, 1)?;
            Ok(args
                .first()
                .map_or_else(|| Value::str(""), |v| Value::from(v.to_string())))
        }
        Builtin::Repr => {
            check_arity(name, args, 1, 1)?;
            Ok(Value::from(args[0].repr()))
        }
        Builtin::Int => {
            check_arity(name, args, 0, 1)?;
            args.first().map_or(Ok(Value::Int(0)), to_int)
        }
        Builtin::Float => {
            check_arity(name, args, 0, 1)?;
            args.first().map_or(Ok(Value::Float(0.0)), to_float)
        }
        Builtin::Bool => {
            check_arity(name, args, 0, 1)?;
            Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
        }
        Builtin::Range => range(args),
        Builtin::List => {
            check_arity(name, args, 0, 1)?;
            let items = args.first().map_or(Ok(Vec::new()), iterate)?;
            Ok(Value::list(items))
        }
        Builtin::Tuple => {
            check_arity(name, args, 0, 1)?;
            let items = args.first().map_or(Ok(Vec::new()), iterate)?;
            Ok(Value::tuple(items))
        }
        Builtin::Abs => {
            check_arity(name, args, 1, 1)?;
            match args[0].as_number() {
                Some(Number::Int(n)) => n
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| crate::errors::integer_overflow("abs")),
                Some(Number::Float(x)) => Ok(Value::Float(x.abs())),
                None => Err(type_error(format!(
                    "bad operand type for abs(): '{}'",
                    args[0].type_name()
                ))),
            }
        }
        Builtin::Min | Builtin::Max => extremum(builtin, args),
        Builtin::Sum => {
            check_arity(name, args, 1, 2)?;
            let mut total = args.get(1).cloned().unwrap_or(Value::Int(0));
            for item in iterate(&args[0])? {
                total = super::operators::binary(crate::ast::BinaryOp::Add, &total, &item)?;
            }
            Ok(total)
        }
        Builtin::Sorted => {
            check_arity(name, args, 1, 1)?;
            let mut items = iterate(&args[0])?;
            sort_values(&mut items)?;
            Ok(Value::list(items))
        }
    }
}

fn print(args: &[Value], kwargs: &[(String, Value)]) -> ScriptResult<Value> {
    let mut sep = " ".to_string();
    let mut end = "\n".to_string();
    for (key, value) in kwargs {
        match key.as_str() {
            "sep" => sep = value.to_string(),
            "end" => end = value.to_string(),
            other => return Err(unexpected_keyword("print", other)),
        }
    }
    let parts: Vec<String> = args.iter().map(ToString::to_string).collect();
    print!("{}{end}", parts.join(&sep));
    Ok(Value::None)
}

fn to_int(value: &Value) -> ScriptResult<Value> {
    match value {
        Value::Str(s) => {
            let text = s.trim().replace('_', "");
            text.parse::<i64>().map(Value::Int).map_err(|_| {
                value_error(format!("invalid literal for int() with base 10: {}", value.repr()))
            })
        }
        other => match other.as_number() {
            Some(Number::Int(n)) => Ok(Value::Int(n)),
            Some(Number::Float(x)) => float_to_int(x),
            None => Err(type_error(format!(
                "int() argument must be a string or a number, not '{}'",
                other.type_name()
            ))),
        },
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "range checked before the cast"
)]
fn float_to_int(x: f64) -> ScriptResult<Value> {
    if x.is_nan() {
        return Err(value_error("cannot convert float NaN to integer"));
    }
    let truncated = x.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(crate::errors::integer_overflow("int()"));
    }
    Ok(Value::Int(truncated as i64))
}

fn to_float(value: &Value) -> ScriptResult<Value> {
    match value {
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            value_error(format!("could not convert string to float: {}", value.repr()))
        }),
        other => other
            .as_number()
            .map(|n| Value::Float(n.as_f64()))
            .ok_or_else(|| {
                type_error(format!(
                    "float() argument must be a string or a number, not '{}'",
                    other.type_name()
                ))
            }),
    }
}

fn int_arg(name: &str, value: &Value) -> ScriptResult<i64> {
    match value.as_number() {
        Some(Number::Int(n)) => Ok(n),
        _ => Err(type_error(format!(
            "'{}' object cannot be interpreted as an integer in {name}()",
            value.type_name()
        ))),
    }
}

fn range(args: &[Value]) -> ScriptResult<Value> {
    check_arity("range", args, 1, 3)?;
    let (start, stop, step) = match args {
        [stop] => (0, int_arg("range", stop)?, 1),
        [start, stop] => (int_arg("range", start)?, int_arg("range", stop)?, 1),
        [start, stop, step] => (
            int_arg("range", start)?,
            int_arg("range", stop)?,
            int_arg("range", step)?,
        ),
        _ => return Err(arity_mismatch("range", 3, args.len())),
    };
    if step == 0 {
        return Err(value_error("range() arg 3 must not be zero"));
    }
    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < stop) || (step < 0 && current > stop) {
        items.push(Value::Int(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::list(items))
}

fn extremum(builtin: Builtin, args: &[Value]) -> ScriptResult<Value> {
    let name = builtin.name();
    let items = match args {
        [] => return Err(arity_mismatch(name, 1, 0)),
        [single] => iterate(single)?,
        many => many.to_vec(),
    };
    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(value_error(format!("{name}() arg is an empty sequence")));
    };
    for item in iter {
        let order = ordering(if builtin == Builtin::Min { "<" } else { ">" }, &item, &best)?;
        let better = match builtin {
            Builtin::Min => order.is_some_and(std::cmp::Ordering::is_lt),
            _ => order.is_some_and(std::cmp::Ordering::is_gt),
        };
        if better {
            best = item;
        }
    }
    Ok(best)
}

/// Stable sort that surfaces the first comparison error.
fn sort_values(items: &mut [Value]) -> ScriptResult<()> {
    let mut error: Option<ScriptError> = None;
    items.sort_by(|a, b| match ordering("<", a, b) {
        Ok(order) => order.unwrap_or(std::cmp::Ordering::Equal),
        Err(e) => {
            error.get_or_insert(e);
            std::cmp::Ordering::Equal
        }
    });
    error.map_or(Ok(()), Err)
}

/// Calling an exception class builds an instance; the message is the single
/// argument's `str()`, or the tuple repr when several are given.
pub fn construct_exception(
    type_name: &str,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> ScriptResult<Value> {
    no_keywords(type_name, kwargs)?;
    let message = match args {
        [] => String::new(),
        [single] => single.to_string(),
        many => Value::tuple(many.to_vec()).repr(),
    };
    Ok(Value::Exception(Rc::new(ExceptionValue {
        type_name: type_name.to_string(),
        message,
    })))
}
