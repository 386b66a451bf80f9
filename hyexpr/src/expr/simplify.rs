//! Constant folding.
//!
//! A single bottom-up pass: bound variables are replaced by their values, and a
//! node whose operands are all literals after that replacement is evaluated
//! with its native operation. When evaluation fails (division by zero, type
//! mismatch, overflow, a failing external function) the node is rebuilt from
//! its folded operands and stays symbolic. The input tree is never modified.
use std::sync::Arc;

use log::{debug, trace};

use crate::expr::node::{ExprNode, Named, Operand, Positional};
use crate::value::Value;

/// Fold `operand`, returning a literal whenever the whole subtree reduces.
pub(crate) fn fold(operand: &Operand) -> Operand {
    match operand {
        Operand::Variable(var) => match var.value() {
            Some(value) => Operand::Literal(value),
            None => operand.clone(),
        },
        Operand::Literal(_) => operand.clone(),
        Operand::Node(node) => fold_node(node),
    }
}

fn fold_node(node: &ExprNode) -> Operand {
    let positional: Positional = node.positional().iter().map(fold).collect();
    let named: Named = node
        .named()
        .iter()
        .map(|(name, arg)| (name.clone(), fold(arg)))
        .collect();

    if let Some((values, named_values)) = concrete_arguments(&positional, &named) {
        match node.callee().evaluate(&values, &named_values) {
            Ok(value) => {
                trace!("Folded `{}` into `{}`.", node.callee(), value);
                return Operand::Literal(value);
            }
            Err(err) => {
                debug!("Keeping `{}` symbolic: {}", node.callee(), err);
            }
        }
    }

    Operand::Node(Arc::new(ExprNode::from_parts(
        node.callee().clone(),
        positional,
        named,
    )))
}

type ConcreteArguments = (Vec<Value>, Vec<(String, Value)>);

/// The literal arguments, or `None` if anything symbolic remains.
fn concrete_arguments(positional: &[Operand], named: &[(String, Operand)]) -> Option<ConcreteArguments> {
    let values = positional
        .iter()
        .map(|arg| arg.as_literal().cloned())
        .collect::<Option<Vec<_>>>()?;
    let named_values = named
        .iter()
        .map(|(name, arg)| arg.as_literal().map(|v| (name.clone(), v.clone())))
        .collect::<Option<Vec<_>>>()?;
    Some((values, named_values))
}
