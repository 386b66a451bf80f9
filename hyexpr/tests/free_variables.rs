use std::collections::HashSet;

use hyexpr::prelude::*;

#[test]
fn repeated_references_count_once() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();

    assert_eq!((&x + &x).free_variable_count(), 1);
    assert_eq!(((&x * 2).pow(&x) - &x).free_variable_count(), 1);
    assert_eq!(x.free_variable_count(), 1);
}

#[test]
fn literals_contribute_nothing() {
    assert_eq!((Expression::literal(1) + 2).free_variable_count(), 0);
    assert!(Expression::literal("s").free_variables().is_empty());
}

#[test]
fn bound_variables_are_still_free() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", Some(Value::Int(1))).unwrap();
    let y = Variable::new_in(&registry, "y", None).unwrap();

    let e = &x + &y;
    let expected: HashSet<Variable> = [x.clone(), y.clone()].into_iter().collect();
    assert_eq!(e.free_variables(), expected);

    // After folding only the unbound one remains reachable.
    assert_eq!(e.simplify().free_variables(), HashSet::from([y]));
}

#[test]
fn named_operands_are_traversed() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let y = Variable::new_in(&registry, "y", None).unwrap();
    let z = Variable::new_in(&registry, "z", None).unwrap();

    let f = ExternalFn::new("f", |_| Ok(Value::None));
    let call = f
        .invoke()
        .arg(&x)
        .kwarg("scale", &y * 2)
        .kwarg("offset", -&z)
        .build()
        .unwrap();

    let found = call.free_variables();
    assert_eq!(found.len(), 3);
    assert!(found.contains(&x) && found.contains(&y) && found.contains(&z));
}

#[test]
fn long_chains_are_collected() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let y = Variable::new_in(&registry, "y", None).unwrap();

    let mut e = x.to_expression();
    for i in 0..1_000 {
        e = if i % 2 == 0 { e + &y } else { e * 3 };
    }
    assert_eq!(e.free_variable_count(), 2);
}
