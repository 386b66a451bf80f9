//! Expression tree nodes.
//!
//! An [`ExprNode`] applies a [`Callee`] to ordered positional operands and to
//! ordered named operands. Nodes are immutable once built and share their
//! children through [`Arc`], so building a larger expression never copies or
//! mutates the smaller ones.
use std::sync::Arc;

use smallvec::SmallVec;
use strum::{EnumIs, EnumTryAs};

use crate::{
    error::{EvalError, EvalResult, ExprError, ExprResult},
    expr::Expression,
    ops::{Arity, Operation},
    value::Value,
    variable::Variable,
};

/// Operand of a node: a subtree, a variable, or a literal.
#[derive(Debug, Clone, EnumIs, EnumTryAs)]
pub enum Operand {
    Node(Arc<ExprNode>),
    Variable(Variable),
    Literal(Value),
}

impl Operand {
    /// `true` if the operand no longer refers to anything symbolic.
    pub fn is_concrete(&self) -> bool {
        self.is_literal()
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Operand::Literal(value) => Some(value),
            _ => None,
        }
    }
}

/// Positional operands. Catalog operations never need more than two.
pub type Positional = SmallVec<[Operand; 2]>;

/// Named operands in insertion order. Names are unique within a node.
pub type Named = Vec<(String, Operand)>;

/// Arguments handed to an [`ExternalFn`] during evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CallArgs<'a> {
    positional: &'a [Value],
    named: &'a [(String, Value)],
}

impl<'a> CallArgs<'a> {
    pub fn new(positional: &'a [Value], named: &'a [(String, Value)]) -> Self {
        Self { positional, named }
    }

    pub fn positional(&self) -> &'a [Value] {
        self.positional
    }

    /// Positional argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&'a Value> {
        self.positional.get(index)
    }

    /// Named argument `name`.
    pub fn named(&self, name: &str) -> Option<&'a Value> {
        self.named
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    pub fn named_iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.named.iter().map(|(key, value)| (key.as_str(), value))
    }
}

type NativeFn = dyn Fn(&CallArgs<'_>) -> EvalResult<Value> + Send + Sync;

/// A named native function outside of the operation catalog.
///
/// Nodes built from it render in call form, `name(a, b, key=value)`, and fold
/// by invoking the function once every argument is concrete.
///
/// ```
/// use hyexpr::prelude::*;
///
/// let clamp = ExternalFn::new("clamp", |args| {
///     match (args.arg(0), args.named("max")) {
///         (Some(Value::Int(v)), Some(Value::Int(max))) => Ok(Value::Int((*v).min(*max))),
///         _ => Err(EvalError::Custom("clamp expects integers".into())),
///     }
/// });
/// let call = clamp.invoke().arg(12).kwarg("max", 10).build().unwrap();
/// assert_eq!(call.render(), "clamp(12, max=10)");
/// assert_eq!(call.simplify().as_literal(), Some(&Value::Int(10)));
/// ```
#[derive(Clone)]
pub struct ExternalFn {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl ExternalFn {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&CallArgs<'_>) -> EvalResult<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.into()),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a call with positional operands only.
    pub fn call<I>(&self, positional: I) -> Expression
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let node = ExprNode::from_parts(
            Callee::External(self.clone()),
            positional.into_iter().map(Into::into).collect(),
            Named::new(),
        );
        Expression::from_node(node)
    }

    /// Start building a call with positional and named operands.
    pub fn invoke(&self) -> CallBuilder {
        CallBuilder {
            func: self.clone(),
            positional: Positional::new(),
            named: Named::new(),
        }
    }

    /// Run the native function.
    pub fn evaluate(&self, args: &CallArgs<'_>) -> EvalResult<Value> {
        (self.func)(args)
    }
}

impl std::fmt::Debug for ExternalFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExternalFn").field(&self.name).finish()
    }
}

/// Builder returned by [`ExternalFn::invoke`].
#[derive(Debug, Clone)]
pub struct CallBuilder {
    func: ExternalFn,
    positional: Positional,
    named: Named,
}

impl CallBuilder {
    /// Append a positional operand.
    pub fn arg(mut self, operand: impl Into<Operand>) -> Self {
        self.positional.push(operand.into());
        self
    }

    /// Append a named operand.
    pub fn kwarg(mut self, name: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.named.push((name.into(), operand.into()));
        self
    }

    /// Finish the call. Fails if a keyword was given twice.
    pub fn build(self) -> ExprResult<Expression> {
        for (i, (name, _)) in self.named.iter().enumerate() {
            if self.named[..i].iter().any(|(other, _)| other == name) {
                return Err(ExprError::DuplicateKeyword {
                    function: self.func.name().to_owned(),
                    name: name.clone(),
                });
            }
        }

        Ok(Expression::from_node(ExprNode::from_parts(
            Callee::External(self.func),
            self.positional,
            self.named,
        )))
    }
}

/// What a node applies: a catalog operation or an external function.
#[derive(Debug, Clone, EnumIs, EnumTryAs)]
pub enum Callee {
    Op(Operation),
    External(ExternalFn),
}

impl Callee {
    /// Catalog precedence, `None` for external functions, which render as calls
    /// and never need parentheses of their own.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            Callee::Op(op) => Some(op.precedence()),
            Callee::External(_) => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Callee::Op(op) => Some(*op),
            Callee::External(_) => None,
        }
    }

    /// Evaluate on concrete arguments.
    pub fn evaluate(&self, positional: &[Value], named: &[(String, Value)]) -> EvalResult<Value> {
        match self {
            Callee::Op(op) => {
                if !named.is_empty() {
                    return Err(EvalError::WrongOperandCount {
                        symbol: op.symbol(),
                        expected: op.arity().count(),
                        found: positional.len() + named.len(),
                    });
                }
                op.apply(positional)
            }
            Callee::External(func) => func.evaluate(&CallArgs::new(positional, named)),
        }
    }
}

impl std::fmt::Display for Callee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callee::Op(op) => write!(f, "{op}"),
            Callee::External(func) => write!(f, "{}()", func.name()),
        }
    }
}

/// An immutable application node.
#[derive(Debug, Clone)]
pub struct ExprNode {
    callee: Callee,
    positional: Positional,
    named: Named,
}

impl ExprNode {
    /// Build a catalog node, checking the operand count against the operation's arity.
    pub fn new<I>(op: Operation, operands: I) -> ExprResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<Operand>,
    {
        let positional: Positional = operands.into_iter().map(Into::into).collect();
        let expected = op.arity().count();
        if positional.len() != expected {
            return Err(ExprError::ArityMismatch {
                operation: op,
                expected,
                found: positional.len(),
            });
        }
        Ok(Self::from_parts(Callee::Op(op), positional, Named::new()))
    }

    pub(crate) fn unary(op: Operation, operand: Operand) -> Self {
        debug_assert_eq!(op.arity(), Arity::Unary);
        let mut positional = Positional::new();
        positional.push(operand);
        Self::from_parts(Callee::Op(op), positional, Named::new())
    }

    pub(crate) fn binary(op: Operation, lhs: Operand, rhs: Operand) -> Self {
        debug_assert_eq!(op.arity(), Arity::Binary);
        let mut positional = Positional::new();
        positional.push(lhs);
        positional.push(rhs);
        Self::from_parts(Callee::Op(op), positional, Named::new())
    }

    pub(crate) fn from_parts(callee: Callee, positional: Positional, named: Named) -> Self {
        Self {
            callee,
            positional,
            named,
        }
    }

    pub fn callee(&self) -> &Callee {
        &self.callee
    }

    /// The catalog operation, if this node is not an external call.
    pub fn operation(&self) -> Option<Operation> {
        self.callee.operation()
    }

    pub fn positional(&self) -> &[Operand] {
        &self.positional
    }

    pub fn named(&self) -> &[(String, Operand)] {
        &self.named
    }
}
