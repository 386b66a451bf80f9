use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use hyexpr::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use strum::IntoEnumIterator;

fn build_simple_expr(registry: &Arc<VariableRegistry>) -> (Vec<Variable>, Expression) {
    // (x + y + 5 + 6) ** 5 < z * 2 or not z
    let x = Variable::new_in(registry, "x", Some(Value::Int(2))).unwrap();
    let y = Variable::new_in(registry, "y", Some(Value::Int(4))).unwrap();
    let z = Variable::new_in(registry, "z", None).unwrap();

    let e = (&x + &y + 5 + 6)
        .pow(5)
        .less_than(&z * 2)
        .or(z.logical_not());
    (vec![x, y, z], e)
}

fn build_complex_expr(registry: &Arc<VariableRegistry>) -> (Vec<Variable>, Expression) {
    // Build a medium-sized expression from random catalog operations. Use randomness seeded
    // for determinism.
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);

    // Half of the variables are bound, so folding has both work and residue.
    let vars: Vec<Variable> = (0..8)
        .map(|i| {
            let value = (i % 2 == 0).then(|| Value::Int(i as i64 + 1));
            Variable::new_in(registry, format!("v{i}"), value).unwrap()
        })
        .collect();

    let binary: Vec<Operation> = Operation::iter()
        .filter(|op| op.arity() == Arity::Binary)
        .collect();
    let unary: Vec<Operation> = Operation::iter()
        .filter(|op| op.arity() == Arity::Unary)
        .collect();

    fn next_create(
        budget: usize,
        rng: &mut impl Rng,
        vars: &[Variable],
        binary: &[Operation],
        unary: &[Operation],
    ) -> Operand {
        if budget == 0 || rng.random_bool(0.2) {
            // Select a leaf node randomly sampled uniformly
            return match rng.random_range(0..=2) {
                0 => Operand::from(rng.random_range(-10i64..=10)),
                1 => Operand::from(rng.random_bool(0.5)),
                2 => Operand::from(&vars[rng.random_range(0..vars.len())]),
                _ => unreachable!(),
            };
        }

        let built = if rng.random_bool(0.15) {
            let op = unary[rng.random_range(0..unary.len())];
            let inner = next_create(budget - 1, rng, vars, binary, unary);
            Expression::apply(op, [inner])
        } else {
            let op = binary[rng.random_range(0..binary.len())];
            let left = next_create(budget - 1, rng, vars, binary, unary);
            let right = next_create(budget - 1, rng, vars, binary, unary);
            Expression::apply(op, [left, right])
        };
        built
            .map(Operand::from)
            .unwrap_or_else(|err| panic!("random tree has wrong arity: {err}"))
    }

    let root = next_create(10, &mut rng, &vars, &binary, &unary);
    (vars, Expression::from(root))
}

fn bench_render(c: &mut Criterion) {
    let registry = VariableRegistry::new();
    let (_simple_vars, simple_expr) = build_simple_expr(&registry);
    let (_complex_vars, complex_expr) = build_complex_expr(&registry);

    c.bench_function("render_simple", |b| {
        b.iter(|| {
            black_box(simple_expr.render());
        })
    });

    c.bench_function("render_complex", |b| {
        b.iter(|| {
            black_box(complex_expr.render());
        })
    });
}

fn bench_simplify(c: &mut Criterion) {
    let registry = VariableRegistry::new();
    let (_simple_vars, simple_expr) = build_simple_expr(&registry);
    let (_complex_vars, complex_expr) = build_complex_expr(&registry);

    c.bench_function("simplify_simple", |b| {
        b.iter(|| {
            black_box(simple_expr.simplify());
        })
    });

    c.bench_function("simplify_complex", |b| {
        b.iter(|| {
            black_box(complex_expr.simplify());
        })
    });
}

fn bench_free_variables(c: &mut Criterion) {
    let registry = VariableRegistry::new();
    let (_complex_vars, complex_expr) = build_complex_expr(&registry);

    c.bench_function("free_variables_complex", |b| {
        b.iter(|| {
            black_box(complex_expr.free_variable_count());
        })
    });
}

criterion_group!(benches, bench_render, bench_simplify, bench_free_variables);
criterion_main!(benches);
