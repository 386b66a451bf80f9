use std::sync::Arc;

use hyexpr::prelude::*;
use strum::IntoEnumIterator;

fn vars(registry: &Arc<VariableRegistry>, names: &[&str]) -> Vec<Variable> {
    names
        .iter()
        .map(|name| Variable::new_in(registry, *name, None).unwrap())
        .collect()
}

#[test]
fn every_binary_operation_renders_with_single_spaces() {
    for op in Operation::iter().filter(|op| op.arity() == Arity::Binary) {
        let e = Expression::apply(op, [1, 2]).unwrap();
        assert_eq!(e.render(), format!("1 {} 2", op.symbol()), "{op:?}");
    }
}

#[test]
fn operator_sugar_maps_to_catalog_operations() {
    let registry = VariableRegistry::new();
    let [a, b] = <[Variable; 2]>::try_from(vars(&registry, &["a", "b"])).unwrap();

    let cases = [
        (&a + &b, Operation::Add),
        (&a - &b, Operation::Sub),
        (&a * &b, Operation::Mul),
        (&a / &b, Operation::TrueDiv),
        (&a % &b, Operation::Mod),
        (&a & &b, Operation::BitAnd),
        (&a | &b, Operation::BitOr),
        (&a ^ &b, Operation::BitXor),
        (&a << &b, Operation::Shl),
        (&a >> &b, Operation::Shr),
        (a.pow(&b), Operation::Pow),
        (a.floor_div(&b), Operation::FloorDiv),
        (-&a, Operation::Neg),
        (!&a, Operation::Invert),
        (a.pos(), Operation::Pos),
        (a.logical_not(), Operation::Not),
    ];
    for (e, op) in cases {
        assert_eq!(e.kind(), ExprKind::Normal);
        assert_eq!(e.as_node().and_then(|n| n.operation()), Some(op));
    }
}

#[test]
fn reflected_literals_keep_operand_order() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();

    assert_eq!((2i64 * &x).render(), "2 * x");
    assert_eq!((10i64 - &x).render(), "10 - x");
    assert_eq!((1.5 / x.clone()).render(), "1.5 / x");
    assert_eq!((true & &x).render(), "true & x");

    let node = (7i64 - &x).as_node().cloned().unwrap();
    assert!(node.positional()[0].is_literal());
    assert!(node.positional()[1].is_variable());
}

#[test]
fn lower_precedence_children_are_wrapped() {
    let registry = VariableRegistry::new();
    let v = vars(&registry, &["a", "b", "c"]);
    let (a, b, c) = (&v[0], &v[1], &v[2]);

    assert_eq!(((a + b) * c).render(), "(a + b) * c");
    assert_eq!((a + b * c).render(), "a + b * c");
    assert_eq!((a * (b + c)).render(), "a * (b + c)");
    assert_eq!(((a | b) & c).render(), "(a | b) & c");
    assert_eq!((a ^ (b & c)).render(), "a ^ b & c");
    assert_eq!(a.less_than(b + 1).render(), "a < b + 1");
    assert_eq!((a + b).pow(2).render(), "(a + b) ** 2");
}

#[test]
fn left_associative_operators_wrap_only_the_right_side() {
    let registry = VariableRegistry::new();
    let v = vars(&registry, &["a", "b", "c"]);
    let (a, b, c) = (&v[0], &v[1], &v[2]);

    assert_eq!((a - (b - c)).render(), "a - (b - c)");
    assert_eq!(((a - b) - c).render(), "a - b - c");
    assert_eq!((a / (b * c)).render(), "a / (b * c)");
    assert_eq!((a % (b * c)).render(), "a % (b * c)");
    assert_eq!(a.floor_div(b.floor_div(c)).render(), "a // (b // c)");
    assert_eq!((a << (b >> c)).render(), "a << (b >> c)");
    assert_eq!(((a << b) >> c).render(), "a << b >> c");
    assert_eq!((a + (b + c)).render(), "a + b + c");
}

#[test]
fn power_is_right_associative() {
    let registry = VariableRegistry::new();
    let v = vars(&registry, &["a", "b", "c"]);
    let (a, b, c) = (&v[0], &v[1], &v[2]);

    assert_eq!(a.pow(b).pow(c).render(), "(a ** b) ** c");
    assert_eq!(a.pow(b.pow(c)).render(), "a ** b ** c");
}

#[test]
fn comparisons_never_chain() {
    let registry = VariableRegistry::new();
    let v = vars(&registry, &["a", "b", "c"]);
    let (a, b, c) = (&v[0], &v[1], &v[2]);

    assert_eq!(a.less_than(b).less_than(c).render(), "(a < b) < c");
    assert_eq!(a.equals(b.greater_equal(c)).render(), "a == (b >= c)");
    assert_eq!(a.is_not(Value::None).render(), "a is not None");
    assert_eq!(
        a.not_contained_in(Value::from(vec![1, 2, 3])).render(),
        "a not in [1, 2, 3]"
    );
    assert_eq!(a.contained_in(b).is_(true).render(), "(a in b) is true");
}

#[test]
fn logical_chains_are_parenthesized_conservatively() {
    let registry = VariableRegistry::new();
    let v = vars(&registry, &["a", "b", "c"]);
    let (a, b, c) = (&v[0], &v[1], &v[2]);

    assert_eq!(a.and(b).and(c).render(), "(a and b) and c");
    assert_eq!(a.or(b).or(c).render(), "(a or b) or c");
    assert_eq!(a.and(b).or(c).render(), "a and b or c");
    assert_eq!(a.or(b).and(c).render(), "(a or b) and c");
    assert_eq!(a.less_than(b).and(c).render(), "a < b and c");
}

#[test]
fn unary_operators_render_without_space() {
    let registry = VariableRegistry::new();
    let v = vars(&registry, &["a", "b"]);
    let (a, b) = (&v[0], &v[1]);

    assert_eq!((-a).render(), "-a");
    assert_eq!((!a).render(), "~a");
    assert_eq!(a.pos().render(), "+a");
    assert_eq!(a.logical_not().render(), "nota");
    assert_eq!((-(a + b)).render(), "-(a + b)");
    assert_eq!((-(-a)).render(), "-(-a)");
    assert_eq!((!(-a)).render(), "~(-a)");
    assert_eq!(((-a) * b).render(), "-a * b");
    assert_eq!(a.pow(-b).render(), "a ** -b");
}

#[test]
fn external_calls_render_in_call_form() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let f = ExternalFn::new("f", |_| Ok(Value::None));

    assert_eq!(f.call(std::iter::empty::<Operand>()).render(), "f()");
    assert_eq!(f.call([1, 2]).render(), "f(1, 2)");
    assert_eq!(f.invoke().kwarg("d", 4).build().unwrap().render(), "f(d=4)");
    assert_eq!(
        f.invoke().arg(&x).arg("s").kwarg("d", &x + 1).build().unwrap().render(),
        "f(x, s, d=x + 1)"
    );

    // Calls never need parentheses, as operands or as containers.
    assert_eq!((f.call([&x]) * 2).render(), "f(x) * 2");
    assert_eq!(f.call([(&x + 1) * 2]).render(), "f((x + 1) * 2)");
}

#[test]
fn duplicate_keyword_is_rejected() {
    let f = ExternalFn::new("f", |_| Ok(Value::None));
    let err = f.invoke().kwarg("d", 1).kwarg("d", 2).build().unwrap_err();
    assert_eq!(
        err,
        ExprError::DuplicateKeyword {
            function: "f".into(),
            name: "d".into(),
        }
    );
}

#[test]
fn checked_apply_rejects_wrong_arity() {
    let err = Expression::apply(Operation::Add, [1]).unwrap_err();
    assert!(err.is_arity_mismatch());
    assert!(Expression::apply(Operation::Neg, [1, 2]).is_err());
    assert_eq!(Expression::apply(Operation::Neg, [1]).unwrap().render(), "-1");
}

#[test]
fn display_matches_render_and_follows_renames() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let e = (&x + 1) * 3;
    assert_eq!(e.to_string(), e.render());

    x.rename("speed").unwrap();
    assert_eq!(e.render(), "(speed + 1) * 3");
}

#[test]
fn long_expressions_stay_on_one_line() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let mut e = x.to_expression();
    for i in 0..60 {
        e = e + i;
    }
    let text = e.render();
    assert!(!text.contains('\n'));
    assert!(text.starts_with("x + 0 + 1 + 2"));
    assert!(text.ends_with("+ 58 + 59"));
}

#[test]
fn colored_output_contains_plain_text() {
    let registry = VariableRegistry::new();
    let x = Variable::new_in(&registry, "x", None).unwrap();
    let e = (&x + 1).pow(2);

    let mut buffer = termcolor::Buffer::no_color();
    e.pretty_render_to(80, &mut buffer).unwrap();
    assert_eq!(String::from_utf8(buffer.into_inner()).unwrap(), "(x + 1) ** 2");
}
