//! Expressions: the handle users hold, and how operators build it.
//!
//! Role
//! - [`Expression`] wraps a node, a bare [`Variable`], or a resolved literal;
//!   [`ExprKind`] tells which.
//! - Rust operators build new nodes: `+ - * / % & | ^ << >>`, unary `-`, and
//!   unary `!` for bitwise invert. Literals work on either side (`2 * x`).
//! - The [`Expr`] trait adds named builders for operators Rust cannot
//!   overload (`pow`, `floor_div`, comparisons, `and`/`or`/`not`, identity and
//!   membership tests) together with rendering, simplification and free
//!   variable queries. It is implemented by [`Expression`] and [`Variable`].
//!
//! Comparison builders are ordinary methods; neither `Expression` nor
//! `Variable` overloads `==` to build nodes.
//!
//! Example
//! ```
//! use hyexpr::prelude::*;
//!
//! let registry = VariableRegistry::new();
//! let x = Variable::new_in(&registry, "x", None).unwrap();
//! let y = Variable::new_in(&registry, "y", None).unwrap();
//!
//! let e = (&x + &y) * 2;
//! assert_eq!(e.render(), "(x + y) * 2");
//! assert_eq!(e.kind(), ExprKind::Normal);
//! assert_eq!(e.free_variable_count(), 2);
//!
//! x.set_value(1);
//! assert_eq!(e.simplify().render(), "(1 + y) * 2");
//! y.set_value(4);
//! assert_eq!(e.simplify().as_literal(), Some(&Value::Int(10)));
//! ```
pub mod collect;
pub mod node;
pub mod pretty;
pub mod simplify;

use std::collections::HashSet;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::{
    error::ExprResult,
    expr::node::{ExprNode, Operand},
    ops::Operation,
    value::Value,
    variable::Variable,
};

/// Classification of an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExprKind {
    /// Wraps an operation node.
    Normal,
    /// Wraps a bare variable.
    Variable,
    /// Wraps a resolved literal, as produced by simplification.
    Object,
}

/// User-facing expression handle. Cheap to clone; immutable.
#[derive(Debug, Clone)]
pub struct Expression {
    root: Operand,
}

impl Expression {
    pub(crate) fn from_operand(root: Operand) -> Self {
        Self { root }
    }

    pub(crate) fn from_node(node: ExprNode) -> Self {
        Self::from_operand(Operand::Node(Arc::new(node)))
    }

    pub(crate) fn unary(op: Operation, operand: impl Into<Operand>) -> Self {
        Self::from_node(ExprNode::unary(op, operand.into()))
    }

    pub(crate) fn binary(op: Operation, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Self {
        Self::from_node(ExprNode::binary(op, lhs.into(), rhs.into()))
    }

    /// An expression holding a literal (kind [`ExprKind::Object`]).
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::from_operand(Operand::Literal(value.into()))
    }

    /// Apply any catalog operation, checking the number of operands.
    ///
    /// ```
    /// use hyexpr::prelude::*;
    ///
    /// let e = Expression::apply(Operation::Or, [true, false]).unwrap();
    /// assert_eq!(e.render(), "true or false");
    /// assert!(Expression::apply(Operation::Not, [1, 2]).is_err());
    /// ```
    pub fn apply<I>(op: Operation, operands: I) -> ExprResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        ExprNode::new(op, operands).map(Self::from_node)
    }

    pub fn kind(&self) -> ExprKind {
        match &self.root {
            Operand::Node(_) => ExprKind::Normal,
            Operand::Variable(_) => ExprKind::Variable,
            Operand::Literal(_) => ExprKind::Object,
        }
    }

    /// The wrapped operand.
    pub fn root(&self) -> &Operand {
        &self.root
    }

    pub fn as_node(&self) -> Option<&ExprNode> {
        match &self.root {
            Operand::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match &self.root {
            Operand::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// The literal, when the expression is fully resolved.
    pub fn as_literal(&self) -> Option<&Value> {
        match &self.root {
            Operand::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_literal(self) -> Option<Value> {
        match self.root {
            Operand::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Builders and queries shared by everything that can stand for an expression.
///
/// Every builder returns a new [`Expression`]; the receiver and the operands
/// are left untouched.
pub trait Expr {
    /// The operand this value contributes to a node.
    fn operand(&self) -> Operand;

    /// View as an [`Expression`].
    fn to_expression(&self) -> Expression {
        Expression::from_operand(self.operand())
    }

    /// `self ** rhs`
    fn pow<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Pow, self.operand(), rhs)
    }

    /// `self // rhs`
    fn floor_div<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::FloorDiv, self.operand(), rhs)
    }

    /// `self == rhs`
    fn equals<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Eq, self.operand(), rhs)
    }

    /// `self != rhs`
    fn not_equals<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Ne, self.operand(), rhs)
    }

    /// `self < rhs`
    fn less_than<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Lt, self.operand(), rhs)
    }

    /// `self <= rhs`
    fn less_equal<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Le, self.operand(), rhs)
    }

    /// `self > rhs`
    fn greater_than<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Gt, self.operand(), rhs)
    }

    /// `self >= rhs`
    fn greater_equal<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Ge, self.operand(), rhs)
    }

    /// `self is rhs`
    fn is_<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Is, self.operand(), rhs)
    }

    /// `self is not rhs`
    fn is_not<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::IsNot, self.operand(), rhs)
    }

    /// `self in container`
    fn contained_in<Q: Into<Operand>>(&self, container: Q) -> Expression {
        Expression::binary(Operation::In, self.operand(), container)
    }

    /// `self not in container`
    fn not_contained_in<Q: Into<Operand>>(&self, container: Q) -> Expression {
        Expression::binary(Operation::NotIn, self.operand(), container)
    }

    /// `self and rhs`
    fn and<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::And, self.operand(), rhs)
    }

    /// `self or rhs`
    fn or<Q: Into<Operand>>(&self, rhs: Q) -> Expression {
        Expression::binary(Operation::Or, self.operand(), rhs)
    }

    /// `not self`
    fn logical_not(&self) -> Expression {
        Expression::unary(Operation::Not, self.operand())
    }

    /// `+self`
    fn pos(&self) -> Expression {
        Expression::unary(Operation::Pos, self.operand())
    }

    /// `-self`, same as the unary `-` operator.
    fn negate(&self) -> Expression {
        Expression::unary(Operation::Neg, self.operand())
    }

    /// `~self`, same as the unary `!` operator.
    fn invert(&self) -> Expression {
        Expression::unary(Operation::Invert, self.operand())
    }

    /// Distinct variables reachable from this expression, bound or not.
    fn free_variables(&self) -> HashSet<Variable> {
        collect::free_variables(&self.operand())
    }

    fn free_variable_count(&self) -> usize {
        self.free_variables().len()
    }

    /// Canonical, minimally parenthesized text.
    fn render(&self) -> String {
        pretty::render_plain(&self.operand())
    }

    /// Substitute bound variables and fold every concrete subtree.
    fn simplify(&self) -> Expression {
        Expression::from_operand(simplify::fold(&self.operand()))
    }
}

impl Expr for Expression {
    fn operand(&self) -> Operand {
        self.root.clone()
    }

    fn to_expression(&self) -> Expression {
        self.clone()
    }
}

impl Expr for Variable {
    fn operand(&self) -> Operand {
        Operand::Variable(self.clone())
    }
}

// ========================= Conversions =========================
impl From<Operand> for Expression {
    fn from(value: Operand) -> Self {
        Expression::from_operand(value)
    }
}

impl From<Expression> for Operand {
    fn from(value: Expression) -> Self {
        value.root
    }
}

impl From<&Expression> for Operand {
    fn from(value: &Expression) -> Self {
        value.root.clone()
    }
}

impl From<Variable> for Operand {
    fn from(value: Variable) -> Self {
        Operand::Variable(value)
    }
}

impl From<&Variable> for Operand {
    fn from(value: &Variable) -> Self {
        Operand::Variable(value.clone())
    }
}

impl From<Variable> for Expression {
    fn from(value: Variable) -> Self {
        Expression::from_operand(Operand::Variable(value))
    }
}

impl From<&Variable> for Expression {
    fn from(value: &Variable) -> Self {
        value.to_expression()
    }
}

macro_rules! impl_literal_operand {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Operand {
                fn from(value: $t) -> Self {
                    Operand::Literal(Value::from(value))
                }
            }
        )*
    };
}

impl_literal_operand!(Value, bool, i64, i32, f64, &str, String);

// ========================= Operator sugar =========================
// `lhs op rhs` for every handle type, with anything convertible on the right.
macro_rules! impl_forward_op {
    ($lhs:ty, $trait:ident, $method:ident, $op:ident) => {
        impl<R: Into<Operand>> std::ops::$trait<R> for $lhs {
            type Output = Expression;

            fn $method(self, rhs: R) -> Expression {
                Expression::binary(Operation::$op, self, rhs)
            }
        }
    };
}

// `literal op handle`, the reflected forms.
macro_rules! impl_reflected_op {
    ($lhs:ty, $trait:ident, $method:ident, $op:ident) => {
        impl std::ops::$trait<Expression> for $lhs {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::binary(Operation::$op, self, rhs)
            }
        }

        impl std::ops::$trait<&Expression> for $lhs {
            type Output = Expression;

            fn $method(self, rhs: &Expression) -> Expression {
                Expression::binary(Operation::$op, self, rhs)
            }
        }

        impl std::ops::$trait<Variable> for $lhs {
            type Output = Expression;

            fn $method(self, rhs: Variable) -> Expression {
                Expression::binary(Operation::$op, self, rhs)
            }
        }

        impl std::ops::$trait<&Variable> for $lhs {
            type Output = Expression;

            fn $method(self, rhs: &Variable) -> Expression {
                Expression::binary(Operation::$op, self, rhs)
            }
        }
    };
}

macro_rules! impl_binary_ops {
    ($impl_op:ident: $($lhs:ty),* $(,)?) => {
        $(
            $impl_op!($lhs, Add, add, Add);
            $impl_op!($lhs, Sub, sub, Sub);
            $impl_op!($lhs, Mul, mul, Mul);
            $impl_op!($lhs, Div, div, TrueDiv);
            $impl_op!($lhs, Rem, rem, Mod);
            $impl_op!($lhs, BitAnd, bitand, BitAnd);
            $impl_op!($lhs, BitOr, bitor, BitOr);
            $impl_op!($lhs, BitXor, bitxor, BitXor);
            $impl_op!($lhs, Shl, shl, Shl);
            $impl_op!($lhs, Shr, shr, Shr);
        )*
    };
}

impl_binary_ops!(impl_forward_op: Expression, &Expression, Variable, &Variable);
impl_binary_ops!(impl_reflected_op: Value, bool, i64, i32, f64);

macro_rules! impl_unary_ops {
    ($($t:ty),* $(,)?) => {
        $(
            impl std::ops::Neg for $t {
                type Output = Expression;

                fn neg(self) -> Expression {
                    Expression::unary(Operation::Neg, self)
                }
            }

            /// Bitwise invert (`~`), matching `!` on Rust integers.
            impl std::ops::Not for $t {
                type Output = Expression;

                fn not(self) -> Expression {
                    Expression::unary(Operation::Invert, self)
                }
            }
        )*
    };
}

impl_unary_ops!(Expression, &Expression, Variable, &Variable);

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        pretty::fmt_operand(&self.root, f)
    }
}
