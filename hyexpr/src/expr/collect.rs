//! Free-variable collection.
//!
//! Iterative traversal with an explicit stack, so very deep trees cannot
//! exhaust the call stack. Variables are deduplicated by identity.
use std::collections::HashSet;

use smallvec::{SmallVec, smallvec};

use crate::expr::node::Operand;
use crate::variable::Variable;

/// Every variable reachable from `root` through positional or named operands.
pub(crate) fn free_variables(root: &Operand) -> HashSet<Variable> {
    let mut found = HashSet::new();
    let mut stack: SmallVec<[&Operand; 16]> = smallvec![root];

    while let Some(operand) = stack.pop() {
        match operand {
            Operand::Variable(var) => {
                if !found.contains(var) {
                    found.insert(var.clone());
                }
            }
            Operand::Literal(_) => {}
            Operand::Node(node) => {
                stack.extend(node.positional().iter());
                stack.extend(node.named().iter().map(|(_, arg)| arg));
            }
        }
    }

    found
}
