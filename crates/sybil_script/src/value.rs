//! Runtime values.
//!
//! Values are cheap to clone: every heap-backed variant is reference
//! counted. Lists and dicts are shared and mutable, so two names bound to
//! the same list observe each other's updates. Values are single-threaded;
//! a namespace and everything in it lives and dies on one thread.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionDef;
use crate::errors::ScriptResult;
use crate::interpreter::Builtin;
use crate::stack::ensure_sufficient_stack;

/// Signature of a host-provided callable.
pub type NativeFn = dyn Fn(&[Value], &[(String, Value)]) -> ScriptResult<Value>;

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    List(Rc<RefCell<Vec<Value>>>),
    Tuple(Rc<[Value]>),
    /// Insertion-ordered association list; keys are compared by value.
    Dict(Rc<RefCell<Vec<(Value, Value)>>>),
    Function(Rc<FunctionValue>),
    Builtin(Builtin),
    Native(NativeFunction),
    /// An exception class such as `ValueError`; calling it builds an instance.
    ExceptionType(Rc<str>),
    Exception(Rc<ExceptionValue>),
}

/// A function defined by a `def` statement.
#[derive(Debug)]
pub struct FunctionValue {
    pub def: Rc<FunctionDef>,
    /// Default values evaluated when the `def` statement ran, one per parameter.
    pub defaults: Vec<Option<Value>>,
}

/// An exception instance created by calling an exception class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExceptionValue {
    pub type_name: String,
    pub message: String,
}

/// A callable supplied by the embedding host.
#[derive(Clone)]
pub struct NativeFunction {
    name: Rc<str>,
    func: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: &str,
        func: impl Fn(&[Value], &[(String, Value)]) -> ScriptResult<Value> + 'static,
    ) -> Self {
        NativeFunction {
            name: Rc::from(name),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value], kwargs: &[(String, Value)]) -> ScriptResult<Value> {
        (self.func)(args, kwargs)
    }

    fn ptr_eq(&self, other: &NativeFunction) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native function {}>", self.name)
    }
}

impl Value {
    pub fn str(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }

    pub fn bytes(b: &[u8]) -> Self {
        Value::Bytes(Rc::from(b))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Rc::from(items))
    }

    pub fn dict(entries: Vec<(Value, Value)>) -> Self {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Dict(_) => "dict",
            Value::Function(_) => "function",
            Value::Builtin(_) | Value::Native(_) => "builtin_function_or_method",
            Value::ExceptionType(_) => "type",
            Value::Exception(exc) => exc.type_name.as_str(),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Dict(entries) => !entries.borrow().is_empty(),
            Value::Function(_)
            | Value::Builtin(_)
            | Value::Native(_)
            | Value::ExceptionType(_)
            | Value::Exception(_) => true,
        }
    }

    /// Whether the value may be used as a dict key.
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Dict(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            _ => true,
        }
    }

    /// Object identity, as tested by `is`.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => Rc::ptr_eq(a, b) || a == b,
            (Value::Bytes(a), Value::Bytes(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Tuple(a), Value::Tuple(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Developer-facing representation, as printed by `repr()`.
    ///
    /// A list or dict met again while it is being printed shows as `[...]`
    /// or `{...}`.
    pub fn repr(&self) -> String {
        self.repr_in(&mut Vec::new())
    }

    fn repr_in(&self, active: &mut Vec<*const ()>) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => format_float(*x),
            Value::Str(s) => repr_str(s),
            Value::Bytes(b) => repr_bytes(b),
            Value::List(items) => {
                let id = Rc::as_ptr(items).cast::<()>();
                if active.contains(&id) {
                    return "[...]".to_string();
                }
                active.push(id);
                let inner = join_reprs(items.borrow().iter(), active);
                active.pop();
                format!("[{inner}]")
            }
            Value::Tuple(items) => {
                if items.len() == 1 {
                    format!("({},)", items[0].repr_in(active))
                } else {
                    format!("({})", join_reprs(items.iter(), active))
                }
            }
            Value::Dict(entries) => {
                let id = Rc::as_ptr(entries).cast::<()>();
                if active.contains(&id) {
                    return "{...}".to_string();
                }
                active.push(id);
                let parts: Vec<String> = entries
                    .borrow()
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.repr_in(active), v.repr_in(active)))
                    .collect();
                active.pop();
                format!("{{{}}}", parts.join(", "))
            }
            Value::Function(func) => format!("<function {}>", func.def.name),
            Value::Builtin(builtin) => format!("<built-in function {}>", builtin.name()),
            Value::Native(native) => format!("<built-in function {}>", native.name()),
            Value::ExceptionType(name) => format!("<class '{name}'>"),
            Value::Exception(exc) => format!("{}({})", exc.type_name, repr_str(&exc.message)),
        }
    }

    /// Structural equality. A pair of containers met again while they are
    /// being compared counts as equal, so self-referencing values compare
    /// in finite time.
    fn eq_in(&self, other: &Value, active: &mut Vec<(*const (), *const ())>) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
                if active.contains(&pair) {
                    return true;
                }
                active.push(pair);
                let equal = {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len()
                        && a.iter()
                            .zip(b.iter())
                            .all(|(x, y)| ensure_sufficient_stack(|| x.eq_in(y, active)))
                };
                active.pop();
                equal
            }
            (Value::Tuple(a), Value::Tuple(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(x, y)| ensure_sufficient_stack(|| x.eq_in(y, active)))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Rc::as_ptr(a).cast::<()>(), Rc::as_ptr(b).cast::<()>());
                if active.contains(&pair) {
                    return true;
                }
                active.push(pair);
                let equal = {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len()
                        && a.iter().all(|(k, v)| {
                            b.iter().any(|(k2, v2)| {
                                ensure_sufficient_stack(|| k.eq_in(k2, active) && v.eq_in(v2, active))
                            })
                        })
                };
                active.pop();
                equal
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Native(a), Value::Native(b)) => a.ptr_eq(b),
            (Value::ExceptionType(a), Value::ExceptionType(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => a == b,
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => x.numeric_eq(y),
                _ => false,
            },
        }
    }
}

fn join_reprs<'a>(items: impl Iterator<Item = &'a Value>, active: &mut Vec<*const ()>) -> String {
    items
        .map(|item| ensure_sufficient_stack(|| item.repr_in(active)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "nan".to_string()
    } else if x.is_infinite() {
        if x > 0.0 { "inf" } else { "-inf" }.to_string()
    } else if x.fract() == 0.0 && x.abs() < 1e16 {
        format!("{x:.1}")
    } else {
        x.to_string()
    }
}

fn repr_str(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn repr_bytes(b: &[u8]) -> String {
    let mut out = String::from("b'");
    for &byte in b {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => out.push_str(&format!("\\x{byte:02x}")),
        }
    }
    out.push('\'');
    out
}

/// User-facing form, as printed by `str()` and `print()`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Exception(exc) => f.write_str(&exc.message),
            other => f.write_str(&other.repr()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        self.eq_in(other, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr())
    }
}

/// A value viewed as a number; `bool` counts as an integer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[expect(clippy::cast_precision_loss, reason = "int/float promotion")]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    fn numeric_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        }
    }
}

impl Value {
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(x) => Some(Number::Float(*x)),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}
