use std::collections::HashSet;
use std::sync::Arc;

use hyexpr::prelude::*;

#[test]
fn duplicate_names_are_rejected() {
    let registry = VariableRegistry::new();
    let _x = Variable::new_in(&registry, "x", None).unwrap();

    let err = Variable::new_in(&registry, "x", Some(Value::Int(1))).unwrap_err();
    assert_eq!(err, ExprError::DuplicateName { name: "x".into() });
    assert_eq!(registry.len(), 1);
}

#[test]
fn registries_are_independent() {
    let first = VariableRegistry::new();
    let second = VariableRegistry::new();

    let a = Variable::new_in(&first, "x", None).unwrap();
    let b = Variable::new_in(&second, "x", None).unwrap();
    assert_ne!(a, b);
    assert_eq!(first.lookup("x"), Some(a.id()));
    assert_eq!(second.lookup("x"), Some(b.id()));
}

#[test]
fn dropping_the_last_handle_releases_the_name() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let e = &x + 1;
    drop(x);

    // Still referenced by the expression.
    assert!(Variable::new_in(&registry, "x", None).is_err());

    drop(e);
    assert!(registry.is_empty());
    let again = Variable::new_in(&registry, "x", None).unwrap();
    assert_eq!(again.name(), "x");
}

#[test]
fn rename_updates_registry() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let y = Variable::new_in(&registry, "y", None).unwrap();

    assert!(x.rename("y").unwrap_err().is_duplicate_name());
    assert_eq!(x.name(), "x");

    x.rename("x").unwrap();
    x.rename("z").unwrap();
    assert_eq!(x.name(), "z");
    assert_eq!(registry.lookup("z"), Some(x.id()));
    assert_eq!(registry.lookup("x"), None);
    assert_eq!(registry.name_of(y.id()).as_deref(), Some("y"));

    // The old name is free again.
    let _w = Variable::new_in(&registry, "x", None).unwrap();
    assert_eq!(registry.len(), 3);
}

#[test]
fn equality_is_identity() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", Some(Value::Int(1))).unwrap();
    let y = Variable::new_in(&registry, "y", Some(Value::Int(1))).unwrap();
    let alias = x.clone();

    assert_eq!(x, alias);
    assert_ne!(x, y);

    let mut set = HashSet::new();
    set.insert(x.clone());
    x.rename("renamed").unwrap();
    x.set_value(99);
    assert!(set.contains(&alias));
    assert!(!set.contains(&y));
}

#[test]
fn values_are_shared_between_handles() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let alias = x.clone();
    assert!(!x.is_bound());

    alias.set_value("hello");
    assert_eq!(x.value(), Some(Value::Str("hello".into())));

    x.clear_value();
    assert!(!alias.is_bound());
}

#[test]
fn variable_as_expression() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let e: Expression = x.clone().into();

    assert_eq!(e.kind(), ExprKind::Variable);
    assert_eq!(e.as_variable(), Some(&x));
    assert_eq!(e.render(), "x");
    assert_eq!(x.render(), "x");
}

#[test]
fn global_registry_constructors() {
    let x = Variable::new("hyexpr_global_registry_test").unwrap();
    assert!(Variable::new("hyexpr_global_registry_test").is_err());
    assert!(Arc::ptr_eq(x.registry(), VariableRegistry::global()));

    let bound = Variable::bound("hyexpr_global_registry_bound", 2.5).unwrap();
    assert_eq!(bound.value(), Some(Value::Float(2.5)));
}

#[test]
fn binding_none_leaves_the_variable_free() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", Some(Value::Int(1))).unwrap();
    let e = &x + 1;

    x.set_value(Value::None);
    assert!(!x.is_bound());
    assert_eq!(x.value(), None);
    assert_eq!(e.simplify().render(), "x + 1");

    let y = Variable::new_in(&registry, "y", Some(Value::None)).unwrap();
    assert!(!y.is_bound());
    assert_eq!(y.simplify().kind(), ExprKind::Variable);
}
