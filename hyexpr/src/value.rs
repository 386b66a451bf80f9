//! Dynamic literal values stored in expression leaves.
//!
//! Role
//! - [`Value`] is the opaque literal an expression can hold: anything the
//!   catalog operations know how to compute with.
//! - The `checked_*` kernels implement the native semantics used by constant
//!   folding. They never panic; every failure is an [`EvalError`].
//!
//! Semantics
//! - Integers are `i64` with overflow detection. Booleans count as `0`/`1` in
//!   arithmetic and bitwise operations; mixing an integer and a float promotes
//!   to float.
//! - `/` always produces a float. `//` and `%` round toward negative infinity,
//!   so the remainder takes the sign of the divisor.
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::error::{EvalError, EvalResult};

/// A concrete value.
#[derive(Debug, Clone, PartialEq, Default, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
}

#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn to_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn mismatch(symbol: &'static str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::TypeMismatch {
        symbol,
        types: format!("`{}` and `{}`", lhs.type_name(), rhs.type_name()),
    }
}

fn mismatch_unary(symbol: &'static str, operand: &Value) -> EvalError {
    EvalError::TypeMismatch {
        symbol,
        types: format!("`{}`", operand.type_name()),
    }
}

/// Shared kernel for operators whose integer form can overflow and whose float
/// form cannot fail.
fn numeric(
    symbol: &'static str,
    lhs: &Value,
    rhs: &Value,
    int: fn(i64, i64) -> Option<i64>,
    float: fn(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (lhs.as_num(), rhs.as_num()) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => int(a, b)
            .map(Value::Int)
            .ok_or(EvalError::OutOfRange { symbol }),
        (Some(a), Some(b)) => Ok(Value::Float(float(a.to_f64(), b.to_f64()))),
        _ => Err(mismatch(symbol, lhs, rhs)),
    }
}

/// Largest string (in bytes) or list (in elements) a repetition may produce.
const MAX_REPEAT_LEN: usize = 1 << 24;

/// Effective repetition count for a sequence of `len` items repeated `times`.
/// Negative counts repeat zero times.
fn repeat_times(len: usize, times: i64) -> EvalResult<usize> {
    let times = usize::try_from(times).unwrap_or(0);
    if len == 0 || times == 0 {
        return Ok(0);
    }
    len.checked_mul(times)
        .filter(|total| *total <= MAX_REPEAT_LEN)
        .map(|_| times)
        .ok_or(EvalError::OutOfRange { symbol: "*" })
}

fn repeat<T: Clone>(items: &[T], times: i64) -> EvalResult<Vec<T>> {
    let times = repeat_times(items.len(), times)?;
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    Ok(out)
}

/// Bitwise kernel: booleans stay booleans, everything else integral becomes an `Int`.
fn bitwise(
    symbol: &'static str,
    lhs: &Value,
    rhs: &Value,
    boolean: fn(bool, bool) -> bool,
    int: fn(i64, i64) -> i64,
) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(boolean(*a, *b))),
        _ => match (lhs.as_int(), rhs.as_int()) {
            (Some(a), Some(b)) => Ok(Value::Int(int(a, b))),
            _ => Err(mismatch(symbol, lhs, rhs)),
        },
    }
}

impl Value {
    /// Human-readable name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
        }
    }

    /// Truthiness: `none`, `false`, zero, and empty strings or lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
        }
    }

    fn as_num(&self) -> Option<Num> {
        match self {
            Value::Bool(b) => Some(Num::Int(*b as i64)),
            Value::Int(i) => Some(Num::Int(*i)),
            Value::Float(f) => Some(Num::Float(*f)),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(*b as i64),
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub(crate) fn checked_add(&self, rhs: &Value) -> EvalResult<Value> {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
            (Value::List(a), Value::List(b)) => {
                Ok(Value::List(a.iter().chain(b.iter()).cloned().collect()))
            }
            _ => numeric("+", self, rhs, i64::checked_add, |a, b| a + b),
        }
    }

    pub(crate) fn checked_sub(&self, rhs: &Value) -> EvalResult<Value> {
        numeric("-", self, rhs, i64::checked_sub, |a, b| a - b)
    }

    pub(crate) fn checked_mul(&self, rhs: &Value) -> EvalResult<Value> {
        match (self, rhs) {
            (Value::Str(s), n) | (n, Value::Str(s)) if n.as_int().is_some() => {
                let times = repeat_times(s.len(), n.as_int().unwrap_or(0))?;
                Ok(Value::Str(s.repeat(times)))
            }
            (Value::List(items), n) | (n, Value::List(items)) if n.as_int().is_some() => {
                repeat(items, n.as_int().unwrap_or(0)).map(Value::List)
            }
            _ => numeric("*", self, rhs, i64::checked_mul, |a, b| a * b),
        }
    }

    pub(crate) fn checked_true_div(&self, rhs: &Value) -> EvalResult<Value> {
        const SYMBOL: &str = "/";
        match (self.as_num(), rhs.as_num()) {
            (Some(a), Some(b)) => {
                let divisor = b.to_f64();
                if divisor == 0.0 {
                    return Err(EvalError::DivisionByZero { symbol: SYMBOL });
                }
                Ok(Value::Float(a.to_f64() / divisor))
            }
            _ => Err(mismatch(SYMBOL, self, rhs)),
        }
    }

    pub(crate) fn checked_floor_div(&self, rhs: &Value) -> EvalResult<Value> {
        const SYMBOL: &str = "//";
        match (self.as_num(), rhs.as_num()) {
            (Some(Num::Int(_)), Some(Num::Int(0))) => {
                Err(EvalError::DivisionByZero { symbol: SYMBOL })
            }
            (Some(Num::Int(a)), Some(Num::Int(b))) => {
                let q = a
                    .checked_div(b)
                    .ok_or(EvalError::OutOfRange { symbol: SYMBOL })?;
                if a % b != 0 && ((a < 0) != (b < 0)) {
                    Ok(Value::Int(q - 1))
                } else {
                    Ok(Value::Int(q))
                }
            }
            (Some(a), Some(b)) => {
                let divisor = b.to_f64();
                if divisor == 0.0 {
                    return Err(EvalError::DivisionByZero { symbol: SYMBOL });
                }
                Ok(Value::Float((a.to_f64() / divisor).floor()))
            }
            _ => Err(mismatch(SYMBOL, self, rhs)),
        }
    }

    pub(crate) fn checked_rem(&self, rhs: &Value) -> EvalResult<Value> {
        const SYMBOL: &str = "%";
        match (self.as_num(), rhs.as_num()) {
            (Some(Num::Int(_)), Some(Num::Int(0))) => {
                Err(EvalError::DivisionByZero { symbol: SYMBOL })
            }
            (Some(Num::Int(a)), Some(Num::Int(b))) => {
                let r = a
                    .checked_rem(b)
                    .ok_or(EvalError::OutOfRange { symbol: SYMBOL })?;
                if r != 0 && ((r < 0) != (b < 0)) {
                    Ok(Value::Int(r + b))
                } else {
                    Ok(Value::Int(r))
                }
            }
            (Some(a), Some(b)) => {
                let (a, b) = (a.to_f64(), b.to_f64());
                if b == 0.0 {
                    return Err(EvalError::DivisionByZero { symbol: SYMBOL });
                }
                let r = a % b;
                if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                    Ok(Value::Float(r + b))
                } else {
                    Ok(Value::Float(r))
                }
            }
            _ => Err(mismatch(SYMBOL, self, rhs)),
        }
    }

    pub(crate) fn checked_pow(&self, rhs: &Value) -> EvalResult<Value> {
        const SYMBOL: &str = "**";
        match (self.as_num(), rhs.as_num()) {
            (Some(Num::Int(base)), Some(Num::Int(exp))) if exp >= 0 => match (base, u32::try_from(exp)) {
                (_, Ok(exp)) => base
                    .checked_pow(exp)
                    .map(Value::Int)
                    .ok_or(EvalError::OutOfRange { symbol: SYMBOL }),
                // Exponent too large for `i64::checked_pow`: only trivial bases stay finite.
                (0 | 1, Err(_)) => Ok(Value::Int(base)),
                (-1, Err(_)) => Ok(Value::Int(if exp % 2 == 0 { 1 } else { -1 })),
                (_, Err(_)) => Err(EvalError::OutOfRange { symbol: SYMBOL }),
            },
            (Some(base), Some(exp)) => {
                let (base, exp) = (base.to_f64(), exp.to_f64());
                if base == 0.0 && exp < 0.0 {
                    return Err(EvalError::DivisionByZero { symbol: SYMBOL });
                }
                let out = base.powf(exp);
                if out.is_nan() && !base.is_nan() && !exp.is_nan() {
                    // Negative base with a fractional exponent.
                    return Err(EvalError::OutOfRange { symbol: SYMBOL });
                }
                if out.is_infinite() && base.is_finite() && exp.is_finite() {
                    return Err(EvalError::OutOfRange { symbol: SYMBOL });
                }
                Ok(Value::Float(out))
            }
            _ => Err(mismatch(SYMBOL, self, rhs)),
        }
    }

    pub(crate) fn checked_bitand(&self, rhs: &Value) -> EvalResult<Value> {
        bitwise("&", self, rhs, |a, b| a & b, |a, b| a & b)
    }

    pub(crate) fn checked_bitor(&self, rhs: &Value) -> EvalResult<Value> {
        bitwise("|", self, rhs, |a, b| a | b, |a, b| a | b)
    }

    pub(crate) fn checked_bitxor(&self, rhs: &Value) -> EvalResult<Value> {
        bitwise("^", self, rhs, |a, b| a ^ b, |a, b| a ^ b)
    }

    pub(crate) fn checked_shl(&self, rhs: &Value) -> EvalResult<Value> {
        const SYMBOL: &str = "<<";
        let (Some(a), Some(b)) = (self.as_int(), rhs.as_int()) else {
            return Err(mismatch(SYMBOL, self, rhs));
        };
        if b < 0 {
            return Err(EvalError::NegativeShift);
        }
        if a == 0 {
            return Ok(Value::Int(0));
        }
        if b >= 64 {
            return Err(EvalError::OutOfRange { symbol: SYMBOL });
        }
        let shifted = a << b;
        if shifted >> b != a {
            return Err(EvalError::OutOfRange { symbol: SYMBOL });
        }
        Ok(Value::Int(shifted))
    }

    pub(crate) fn checked_shr(&self, rhs: &Value) -> EvalResult<Value> {
        let (Some(a), Some(b)) = (self.as_int(), rhs.as_int()) else {
            return Err(mismatch(">>", self, rhs));
        };
        if b < 0 {
            return Err(EvalError::NegativeShift);
        }
        if b >= 64 {
            return Ok(Value::Int(if a < 0 { -1 } else { 0 }));
        }
        Ok(Value::Int(a >> b))
    }

    pub(crate) fn checked_invert(&self) -> EvalResult<Value> {
        self.as_int()
            .map(|i| Value::Int(!i))
            .ok_or_else(|| mismatch_unary("~", self))
    }

    pub(crate) fn checked_pos(&self) -> EvalResult<Value> {
        match self.as_num() {
            Some(Num::Int(i)) => Ok(Value::Int(i)),
            Some(Num::Float(f)) => Ok(Value::Float(f)),
            None => Err(mismatch_unary("+", self)),
        }
    }

    pub(crate) fn checked_neg(&self) -> EvalResult<Value> {
        const SYMBOL: &str = "-";
        match self.as_num() {
            Some(Num::Int(i)) => i
                .checked_neg()
                .map(Value::Int)
                .ok_or(EvalError::OutOfRange { symbol: SYMBOL }),
            Some(Num::Float(f)) => Ok(Value::Float(-f)),
            None => Err(mismatch_unary(SYMBOL, self)),
        }
    }

    /// Value equality as used by `==`: numbers compare across `bool`, `int` and
    /// `float`; values of unrelated types are simply unequal.
    pub fn loose_eq(&self, rhs: &Value) -> bool {
        match (self, rhs) {
            (Value::None, Value::None) => true,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            _ => match (self.as_num(), rhs.as_num()) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
                (Some(a), Some(b)) => a.to_f64() == b.to_f64(),
                _ => false,
            },
        }
    }

    /// Ordering used by `<`, `<=`, `>` and `>=`.
    ///
    /// `Ok(None)` means the values are comparable in kind but unordered (NaN).
    fn partial_order(&self, rhs: &Value) -> Result<Option<Ordering>, ()> {
        match (self, rhs) {
            (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b) {
                    if !x.loose_eq(y) {
                        return x.partial_order(y);
                    }
                }
                Ok(Some(a.len().cmp(&b.len())))
            }
            _ => match (self.as_num(), rhs.as_num()) {
                (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(Some(a.cmp(&b))),
                (Some(a), Some(b)) => Ok(a.to_f64().partial_cmp(&b.to_f64())),
                _ => Err(()),
            },
        }
    }

    pub(crate) fn checked_compare(
        &self,
        rhs: &Value,
        symbol: &'static str,
        accept: fn(Ordering) -> bool,
    ) -> EvalResult<Value> {
        match self.partial_order(rhs) {
            Ok(ordering) => Ok(Value::Bool(ordering.is_some_and(accept))),
            Err(()) => Err(mismatch(symbol, self, rhs)),
        }
    }

    /// Identity test: same kind and same contents, without numeric coercion.
    pub fn is_identical(&self, rhs: &Value) -> bool {
        self == rhs
    }

    /// Membership test `item in self`.
    pub(crate) fn checked_contains(&self, item: &Value, symbol: &'static str) -> EvalResult<bool> {
        match (self, item) {
            (Value::Str(haystack), Value::Str(needle)) => Ok(haystack.contains(needle.as_str())),
            (Value::List(items), _) => Ok(items.iter().any(|x| x.loose_eq(item))),
            _ => Err(mismatch(symbol, item, self)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            // Debug keeps the fractional part visible (`2.0`, not `2`).
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match item {
                        Value::Str(s) => write!(f, "{s:?}")?,
                        other => write!(f, "{other}")?,
                    }
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
