//! Operator semantics: arithmetic, comparison, membership, subscripting,
//! and iteration over values.

use std::cmp::Ordering;

use crate::ast::{BinaryOp, CompareOp, UnaryOp};
use crate::errors::{
    bad_operand, division_by_zero, index_out_of_range, integer_overflow, key_not_found,
    modulo_by_zero, not_comparable, not_iterable, not_subscriptable, recursion_limit, type_error,
    unhashable, unsupported_operand, ScriptResult,
};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Number, Value};

use super::MAX_CALL_DEPTH;

pub fn unary(op: UnaryOp, operand: &Value) -> ScriptResult<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand.as_number() {
            Some(Number::Int(n)) => n
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("negation")),
            Some(Number::Float(x)) => Ok(Value::Float(-x)),
            None => Err(bad_operand("-", operand.type_name())),
        },
        UnaryOp::Pos => match operand.as_number() {
            Some(Number::Int(n)) => Ok(Value::Int(n)),
            Some(Number::Float(x)) => Ok(Value::Float(x)),
            None => Err(bad_operand("+", operand.type_name())),
        },
    }
}

pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> ScriptResult<Value> {
    match (op, left, right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Ok(Value::from(s))
        }
        (BinaryOp::Add, Value::Bytes(a), Value::Bytes(b)) => Ok(Value::bytes(&[&a[..], &b[..]].concat())),
        (BinaryOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect()))
        }
        (BinaryOp::Mul, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_)), count)
        | (BinaryOp::Mul, count, seq @ (Value::Str(_) | Value::List(_) | Value::Tuple(_)))
            if matches!(count.as_number(), Some(Number::Int(_))) =>
        {
            let times = match count.as_number() {
                Some(Number::Int(n)) => usize::try_from(n).unwrap_or(0),
                _ => 0,
            };
            Ok(repeat(seq, times))
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => arithmetic(op, a, b),
            _ => Err(unsupported_operand(
                op.as_symbol(),
                left.type_name(),
                right.type_name(),
            )),
        },
    }
}

fn repeat(seq: &Value, times: usize) -> Value {
    match seq {
        Value::Str(s) => Value::from(s.repeat(times)),
        Value::List(items) => {
            let items = items.borrow();
            Value::list(items.iter().cloned().cycle().take(items.len() * times).collect())
        }
        Value::Tuple(items) => {
            Value::tuple(items.iter().cloned().cycle().take(items.len() * times).collect())
        }
        other => other.clone(),
    }
}

fn arithmetic(op: BinaryOp, a: Number, b: Number) -> ScriptResult<Value> {
    if let (Number::Int(a), Number::Int(b)) = (a, b) {
        return int_arithmetic(op, a, b);
    }
    let (a, b) = (a.as_f64(), b.as_f64());
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(division_by_zero());
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(modulo_by_zero());
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
    };
    Ok(Value::Float(result))
}

/// Integer arithmetic with floor semantics for `//` and `%`: the remainder
/// takes the sign of the divisor.
fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> ScriptResult<Value> {
    let overflow = || integer_overflow(op.as_symbol());
    let result = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            return arithmetic(op, Number::Float(Number::Int(a).as_f64()), Number::Int(b));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && (a < 0) != (b < 0) {
                q - 1
            } else {
                q
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            let r = a.checked_rem(b).ok_or_else(overflow)?;
            if r != 0 && (r < 0) != (b < 0) {
                r + b
            } else {
                r
            }
        }
    };
    Ok(Value::Int(result))
}

pub fn compare(op: CompareOp, left: &Value, right: &Value) -> ScriptResult<bool> {
    let ordered = |accept: fn(Ordering) -> bool| -> ScriptResult<bool> {
        Ok(ordering(op.as_symbol(), left, right)?.is_some_and(accept))
    };
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::NotEq => Ok(left != right),
        CompareOp::Lt => ordered(Ordering::is_lt),
        CompareOp::LtEq => ordered(Ordering::is_le),
        CompareOp::Gt => ordered(Ordering::is_gt),
        CompareOp::GtEq => ordered(Ordering::is_ge),
        CompareOp::In => contains(right, left),
        CompareOp::NotIn => contains(right, left).map(|found| !found),
        CompareOp::Is => Ok(left.is_identical(right)),
        CompareOp::IsNot => Ok(!left.is_identical(right)),
    }
}

/// Order two values. `None` means unordered (a NaN was involved).
///
/// Nested sequences deeper than [`MAX_CALL_DEPTH`] (a list that contains
/// itself, say) raise `RecursionError`.
pub fn ordering(symbol: &str, left: &Value, right: &Value) -> ScriptResult<Option<Ordering>> {
    ordering_at(symbol, left, right, 0)
}

fn ordering_at(
    symbol: &str,
    left: &Value,
    right: &Value,
    depth: usize,
) -> ScriptResult<Option<Ordering>> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        (Value::Bytes(a), Value::Bytes(b)) => Ok(Some(a.cmp(b))),
        (Value::List(a), Value::List(b)) => {
            let (a, b) = (a.borrow().clone(), b.borrow().clone());
            sequence_ordering(symbol, &a, &b, depth)
        }
        (Value::Tuple(a), Value::Tuple(b)) => sequence_ordering(symbol, a, b, depth),
        _ => match (left.as_number(), right.as_number()) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => Ok(Some(a.cmp(&b))),
            (Some(a), Some(b)) => Ok(a.as_f64().partial_cmp(&b.as_f64())),
            _ => Err(not_comparable(symbol, left.type_name(), right.type_name())),
        },
    }
}

fn sequence_ordering(
    symbol: &str,
    a: &[Value],
    b: &[Value],
    depth: usize,
) -> ScriptResult<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if x != y {
            if depth >= MAX_CALL_DEPTH {
                return Err(recursion_limit(MAX_CALL_DEPTH));
            }
            return ensure_sufficient_stack(|| ordering_at(symbol, x, y, depth + 1));
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// Membership test: `item in container`.
pub fn contains(container: &Value, item: &Value) -> ScriptResult<bool> {
    match (container, item) {
        (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(&**needle)),
        (Value::Str(_), other) => Err(type_error(format!(
            "'in <string>' requires string as left operand, not {}",
            other.type_name()
        ))),
        (Value::Bytes(haystack), Value::Bytes(needle)) => Ok(needle.is_empty()
            || haystack.windows(needle.len()).any(|w| w == &needle[..])),
        (Value::Bytes(haystack), Value::Int(n)) => {
            Ok(u8::try_from(*n).is_ok_and(|byte| haystack.contains(&byte)))
        }
        (Value::List(items), item) => Ok(items.borrow().iter().any(|v| v == item)),
        (Value::Tuple(items), item) => Ok(items.iter().any(|v| v == item)),
        (Value::Dict(entries), key) => Ok(entries.borrow().iter().any(|(k, _)| k == key)),
        (other, _) => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

/// Resolve a possibly negative index against `len`.
fn normalize_index(index: &Value, len: usize, type_name: &str) -> ScriptResult<usize> {
    let Some(Number::Int(i)) = index.as_number() else {
        return Err(type_error(format!(
            "{type_name} indices must be integers, not {}",
            index.type_name()
        )));
    };
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if i < 0 { i + len_i } else { i };
    if (0..len_i).contains(&resolved) {
        usize::try_from(resolved).map_err(|_| index_out_of_range(type_name))
    } else {
        Err(index_out_of_range(type_name))
    }
}

pub fn get_item(object: &Value, index: &Value) -> ScriptResult<Value> {
    match object {
        Value::List(items) => {
            let items = items.borrow();
            let i = normalize_index(index, items.len(), "list")?;
            Ok(items[i].clone())
        }
        Value::Tuple(items) => {
            let i = normalize_index(index, items.len(), "tuple")?;
            Ok(items[i].clone())
        }
        Value::Str(s) => {
            let i = normalize_index(index, s.chars().count(), "string")?;
            Ok(s.chars().nth(i).map(|c| Value::from(c.to_string())).unwrap_or(Value::None))
        }
        Value::Bytes(b) => {
            let i = normalize_index(index, b.len(), "bytes")?;
            Ok(Value::Int(i64::from(b[i])))
        }
        Value::Dict(entries) => {
            if !index.is_hashable() {
                return Err(unhashable(index.type_name()));
            }
            entries
                .borrow()
                .iter()
                .find(|(k, _)| k == index)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| key_not_found(&index.repr()))
        }
        other => Err(not_subscriptable(other.type_name())),
    }
}

pub fn set_item(object: &Value, index: Value, value: Value) -> ScriptResult<()> {
    match object {
        Value::List(items) => {
            let len = items.borrow().len();
            let i = normalize_index(&index, len, "list")?;
            items.borrow_mut()[i] = value;
            Ok(())
        }
        Value::Dict(entries) => {
            if !index.is_hashable() {
                return Err(unhashable(index.type_name()));
            }
            dict_insert(&mut entries.borrow_mut(), index, value);
            Ok(())
        }
        other => Err(type_error(format!(
            "'{}' object does not support item assignment",
            other.type_name()
        ))),
    }
}

pub fn del_item(object: &Value, index: &Value) -> ScriptResult<()> {
    match object {
        Value::List(items) => {
            let len = items.borrow().len();
            let i = normalize_index(index, len, "list")?;
            items.borrow_mut().remove(i);
            Ok(())
        }
        Value::Dict(entries) => {
            let position = entries.borrow().iter().position(|(k, _)| k == index);
            match position {
                Some(i) => {
                    entries.borrow_mut().remove(i);
                    Ok(())
                }
                None => Err(key_not_found(&index.repr())),
            }
        }
        other => Err(type_error(format!(
            "'{}' object does not support item deletion",
            other.type_name()
        ))),
    }
}

/// Insert or replace `key`, keeping first-insertion order.
pub fn dict_insert(entries: &mut Vec<(Value, Value)>, key: Value, value: Value) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

/// Materialize the items a `for` loop would visit.
pub fn iterate(value: &Value) -> ScriptResult<Vec<Value>> {
    match value {
        Value::List(items) => Ok(items.borrow().clone()),
        Value::Tuple(items) => Ok(items.to_vec()),
        Value::Str(s) => Ok(s.chars().map(|c| Value::from(c.to_string())).collect()),
        Value::Bytes(b) => Ok(b.iter().map(|&byte| Value::Int(i64::from(byte))).collect()),
        Value::Dict(entries) => Ok(entries.borrow().iter().map(|(k, _)| k.clone()).collect()),
        other => Err(not_iterable(other.type_name())),
    }
}
