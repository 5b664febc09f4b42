use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{DMatrix, DVector};
use normstep::prelude::*;

/// a dense, deterministic Jacobian with well spread column norms
fn synthetic_jacobian(residual_count: usize, parameter_count: usize) -> DMatrix<f64> {
    DMatrix::from_fn(residual_count, parameter_count, |i, j| {
        ((i * parameter_count + j) as f64 * 0.37).sin() + 0.01 * (j as f64 + 1.0)
    })
}

fn bench_solve_cycle(c: &mut Criterion) {
    let (residual_count, parameter_count) = (256, 32);
    let jacobian = synthetic_jacobian(residual_count, parameter_count);
    let residuals = DVector::from_fn(residual_count, |i, _| ((i as f64) * 0.11).cos());
    let damping_weights = DVector::from_element(parameter_count, 1.0);
    let mut solver =
        CholeskySolver::new(residual_count, parameter_count).expect("solver allocation");

    c.bench_function("refresh + prepare + solve, 256x32", |bencher| {
        bencher.iter(|| {
            solver.refresh(&jacobian).unwrap();
            solver.prepare(1e-3, &damping_weights).unwrap();
            criterion::black_box(solver.solve(&residuals).unwrap())
        })
    });

    c.bench_function("prepare + solve on a cached refresh, 256x32", |bencher| {
        solver.refresh(&jacobian).unwrap();
        bencher.iter(|| {
            solver.prepare(1e-3, &damping_weights).unwrap();
            criterion::black_box(solver.solve(&residuals).unwrap())
        })
    });
}

criterion_group!(benches, bench_solve_cycle);
criterion_main!(benches);
