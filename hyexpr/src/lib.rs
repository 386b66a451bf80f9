//! Hyexpr: symbolic expressions built with ordinary operators.
//!
//! Expressions are immutable trees of catalog operations (`+`, `**`, `<`,
//! `and`, `in`, ...) and calls to external native functions, with variables
//! and literal values at the leaves. They can be rendered back to text with
//! the fewest parentheses that keep the same grouping, and simplified by
//! substituting bound variables and folding every concrete subtree.
//!
//! Building blocks
//!  - [`ops::Operation`]: the catalog, each entry with a symbol, a precedence
//!    level and an arity.
//!  - [`variable::Variable`]: a named placeholder. Equality is identity; names
//!    are unique within a [`variable::VariableRegistry`].
//!  - [`expr::Expression`]: the handle produced by operators and by the
//!    builders of the [`expr::Expr`] trait.
//!  - [`value::Value`]: the literal type folding computes with.
//!
//! Folding never fails. A subtree whose evaluation errors (division by zero,
//! overflow, incompatible types) is simply kept in symbolic form.
//!
//! Example
//! ```
//! use hyexpr::prelude::*;
//!
//! let registry = VariableRegistry::new();
//! let x = Variable::new_in(&registry, "x", None).unwrap();
//! let y = Variable::new_in(&registry, "y", None).unwrap();
//!
//! let e = (&x + &y + 5 + 6).pow(5);
//! assert_eq!(e.render(), "(x + y + 5 + 6) ** 5");
//!
//! x.set_value(2);
//! assert_eq!(e.simplify().render(), "(2 + y + 5 + 6) ** 5");
//!
//! y.set_value(4);
//! assert_eq!(e.simplify().as_literal(), Some(&Value::Int(1419857)));
//! ```

/// Error types and result aliases.
pub mod error;
/// Expressions: nodes, operator sugar, rendering, folding, traversal.
pub mod expr;
/// The operation catalog.
pub mod ops;
/// Literal values and their native semantics.
pub mod value;
/// Variables and the name registry.
pub mod variable;

pub mod prelude {
    //! Convenient re-exports for end users.
    //!
    //! - `Expr` trait with builder helpers
    //! - Expression, node and external-function types
    //! - Pretty-printing via `PrettyExpr`
    //! - Variables, values and errors
    pub use crate::error::{EvalError, EvalResult, ExprError, ExprResult};
    pub use crate::expr::{
        Expr, ExprKind, Expression,
        node::{CallArgs, CallBuilder, Callee, ExprNode, ExternalFn, Operand},
        pretty::{PrettyExpr, Style},
    };
    pub use crate::ops::{Arity, Operation};
    pub use crate::value::Value;
    pub use crate::variable::{Variable, VariableId, VariableRegistry};
}
