//! Error types.
//!
//! [`ExprError`] is returned by the fallible parts of the public API (variable
//! registration, checked node construction). [`EvalError`] describes why a
//! concrete subtree could not be evaluated natively; the simplifier consumes it
//! and keeps the subtree symbolic, so it only reaches callers who evaluate
//! operations or external functions directly.
use strum::EnumIs;
use thiserror::Error;

use crate::ops::Operation;

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum ExprError {
    /// The requested variable name is held by another live variable.
    #[error(
        "A variable named `{name}` is already registered. Variable names must be unique within their registry."
    )]
    DuplicateName { name: String },

    /// A catalog operation was given the wrong number of operands.
    #[error("Operation `{operation}` expects {expected} operand(s), but {found} were provided.")]
    ArityMismatch {
        operation: Operation,
        expected: usize,
        found: usize,
    },

    /// The same keyword argument was supplied twice to an external function call.
    #[error("Keyword argument `{name}` was provided more than once in a call to `{function}`.")]
    DuplicateKeyword { function: String, name: String },
}

pub type ExprResult<T> = Result<T, ExprError>;

#[derive(Debug, Clone, PartialEq, EnumIs, Error)]
pub enum EvalError {
    #[error("Division by zero in `{symbol}`.")]
    DivisionByZero { symbol: &'static str },

    /// Integer overflow, or a float result that is not a real number.
    #[error("Result of `{symbol}` is out of the representable range.")]
    OutOfRange { symbol: &'static str },

    #[error("Unsupported operand type(s) for `{symbol}`: {types}.")]
    TypeMismatch { symbol: &'static str, types: String },

    #[error("Negative shift count.")]
    NegativeShift,

    #[error("Operation `{symbol}` expects {expected} operand(s), but {found} were provided.")]
    WrongOperandCount {
        symbol: &'static str,
        expected: usize,
        found: usize,
    },

    /// Failure reported by an external function.
    #[error("{0}")]
    Custom(String),
}

pub type EvalResult<T> = Result<T, EvalError>;
