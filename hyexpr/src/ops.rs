//! Operation catalog.
//!
//! Every operator an expression node can apply, together with its display
//! symbol, arity, precedence rank and native evaluation. The table is encoded
//! as `match` arms and is therefore fixed for the lifetime of the process.
//!
//! Precedence, from loosest to tightest:
//!
//! | rank | operations                                   |
//! |------|----------------------------------------------|
//! | 1    | `or`                                         |
//! | 2    | `and`                                        |
//! | 3    | `== != < <= > >= is` `is not` `in` `not in`  |
//! | 4    | `\|`                                         |
//! | 5    | `^`                                          |
//! | 6    | `&`                                          |
//! | 7    | `<< >>`                                      |
//! | 8    | `+ -`                                        |
//! | 9    | `* / // %`                                   |
//! | 10   | `**`                                         |
//! | 11   | unary `~ + - not`                            |
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Number of operands an operation consumes.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Arity {
    Unary,
    Binary,
}

impl Arity {
    /// Number of positional operands.
    pub fn count(&self) -> usize {
        match self {
            Arity::Unary => 1,
            Arity::Binary => 2,
        }
    }
}

/// A catalog operation.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operation {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`, always producing a float
    TrueDiv,
    /// `a // b`
    FloorDiv,
    /// `a ** b`
    Pow,
    /// `a % b`
    Mod,
    /// `a & b`
    BitAnd,
    /// `a | b`
    BitOr,
    /// `a ^ b`
    BitXor,
    /// `a << b`
    Shl,
    /// `a >> b`
    Shr,
    /// `~a`
    Invert,
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
    /// `a is b`
    Is,
    /// `a is not b`
    IsNot,
    /// `a in b`
    In,
    /// `a not in b`
    NotIn,
    /// `a and b`
    And,
    /// `a or b`
    Or,
    /// `not a`
    Not,
    /// `+a`
    Pos,
    /// `-a`
    Neg,
}

impl Operation {
    /// Canonical display symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Sub => "-",
            Operation::Mul => "*",
            Operation::TrueDiv => "/",
            Operation::FloorDiv => "//",
            Operation::Pow => "**",
            Operation::Mod => "%",
            Operation::BitAnd => "&",
            Operation::BitOr => "|",
            Operation::BitXor => "^",
            Operation::Shl => "<<",
            Operation::Shr => ">>",
            Operation::Invert => "~",
            Operation::Eq => "==",
            Operation::Ne => "!=",
            Operation::Lt => "<",
            Operation::Le => "<=",
            Operation::Gt => ">",
            Operation::Ge => ">=",
            Operation::Is => "is",
            Operation::IsNot => "is not",
            Operation::In => "in",
            Operation::NotIn => "not in",
            Operation::And => "and",
            Operation::Or => "or",
            Operation::Not => "not",
            Operation::Pos => "+",
            Operation::Neg => "-",
        }
    }

    /// Look an operation up by symbol. `+` and `-` exist with both arities, so
    /// the arity is part of the key.
    pub fn from_symbol(symbol: &str, arity: Arity) -> Option<Self> {
        Operation::iter().find(|op| op.symbol() == symbol && op.arity() == arity)
    }

    pub fn arity(&self) -> Arity {
        if self.is_unary() {
            Arity::Unary
        } else {
            Arity::Binary
        }
    }

    /// Precedence rank; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            Operation::Or => 1,
            Operation::And => 2,
            Operation::Eq
            | Operation::Ne
            | Operation::Lt
            | Operation::Le
            | Operation::Gt
            | Operation::Ge
            | Operation::Is
            | Operation::IsNot
            | Operation::In
            | Operation::NotIn => 3,
            Operation::BitOr => 4,
            Operation::BitXor => 5,
            Operation::BitAnd => 6,
            Operation::Shl | Operation::Shr => 7,
            Operation::Add | Operation::Sub => 8,
            Operation::Mul | Operation::TrueDiv | Operation::FloorDiv | Operation::Mod => 9,
            Operation::Pow => 10,
            Operation::Invert | Operation::Pos | Operation::Neg | Operation::Not => 11,
        }
    }

    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Operation::Invert | Operation::Pos | Operation::Neg | Operation::Not
        )
    }

    /// Comparisons, identity and membership tests. These never chain.
    pub fn is_comparison(&self) -> bool {
        self.precedence() == 3
    }

    /// Short-circuit `and` / `or`.
    pub fn is_logical(&self) -> bool {
        matches!(self, Operation::And | Operation::Or)
    }

    /// Binary operations for which an equal-precedence right operand regroups
    /// the expression (`a - (b - c)` differs from `a - b - c`).
    pub fn is_right_sensitive(&self) -> bool {
        matches!(
            self,
            Operation::Sub
                | Operation::TrueDiv
                | Operation::FloorDiv
                | Operation::Mod
                | Operation::Pow
                | Operation::Shl
                | Operation::Shr
        )
    }

    /// Operators spelled as words, rendered as keywords.
    pub fn is_keyword(&self) -> bool {
        self.symbol().starts_with(|c: char| c.is_ascii_alphabetic())
    }

    /// Evaluate the operation on concrete operands.
    pub fn apply(&self, operands: &[Value]) -> EvalResult<Value> {
        match (self.arity(), operands) {
            (Arity::Unary, [a]) => self.apply_unary(a),
            (Arity::Binary, [a, b]) => self.apply_binary(a, b),
            _ => Err(EvalError::WrongOperandCount {
                symbol: self.symbol(),
                expected: self.arity().count(),
                found: operands.len(),
            }),
        }
    }

    fn apply_unary(&self, a: &Value) -> EvalResult<Value> {
        match self {
            Operation::Invert => a.checked_invert(),
            Operation::Pos => a.checked_pos(),
            Operation::Neg => a.checked_neg(),
            Operation::Not => Ok(Value::Bool(!a.is_truthy())),
            _ => unreachable!("binary operation `{}` applied as unary", self),
        }
    }

    fn apply_binary(&self, a: &Value, b: &Value) -> EvalResult<Value> {
        let symbol = self.symbol();
        match self {
            Operation::Add => a.checked_add(b),
            Operation::Sub => a.checked_sub(b),
            Operation::Mul => a.checked_mul(b),
            Operation::TrueDiv => a.checked_true_div(b),
            Operation::FloorDiv => a.checked_floor_div(b),
            Operation::Pow => a.checked_pow(b),
            Operation::Mod => a.checked_rem(b),
            Operation::BitAnd => a.checked_bitand(b),
            Operation::BitOr => a.checked_bitor(b),
            Operation::BitXor => a.checked_bitxor(b),
            Operation::Shl => a.checked_shl(b),
            Operation::Shr => a.checked_shr(b),
            Operation::Eq => Ok(Value::Bool(a.loose_eq(b))),
            Operation::Ne => Ok(Value::Bool(!a.loose_eq(b))),
            Operation::Lt => a.checked_compare(b, symbol, |o| o.is_lt()),
            Operation::Le => a.checked_compare(b, symbol, |o| o.is_le()),
            Operation::Gt => a.checked_compare(b, symbol, |o| o.is_gt()),
            Operation::Ge => a.checked_compare(b, symbol, |o| o.is_ge()),
            Operation::Is => Ok(Value::Bool(a.is_identical(b))),
            Operation::IsNot => Ok(Value::Bool(!a.is_identical(b))),
            Operation::In => b.checked_contains(a, symbol).map(Value::Bool),
            Operation::NotIn => b.checked_contains(a, symbol).map(|found| Value::Bool(!found)),
            Operation::And => Ok(if a.is_truthy() { b.clone() } else { a.clone() }),
            Operation::Or => Ok(if a.is_truthy() { a.clone() } else { b.clone() }),
            _ => unreachable!("unary operation `{}` applied as binary", self),
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}
