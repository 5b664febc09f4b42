use super::*;
use approx::assert_relative_eq;
use assert_matches::assert_matches;
use nalgebra::{DMatrix, DVector};

fn example_jacobian() -> DMatrix<f64> {
    DMatrix::from_row_slice(4, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, -1.0])
}

fn unit_damping_weights() -> DVector<f64> {
    DVector::from_element(2, 1.0)
}

#[test]
fn the_undamped_solve_reproduces_the_reference_solution() {
    let jacobian = example_jacobian();
    let residuals = DVector::from(vec![1.0, 1.0, 0.0, 0.0]);

    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&jacobian).unwrap();
    solver.prepare(0.0, &unit_damping_weights()).unwrap();
    let step = solver.solve(&residuals).unwrap();

    // independently computed solution of J^T J p = -J^T f
    assert_relative_eq!(step[0], -1.0 / 3.0, epsilon = 1e-10);
    assert_relative_eq!(step[1], -1.0 / 3.0, epsilon = 1e-10);

    // the balanced system itself must be satisfied: (J~^T J~) p~ = -J~^T f,
    // where p~ is the returned step with the balancing divided back out
    let scaled_step = step.component_div(&solver.scale);
    let balanced_gram = solver.scaled_jacobian.tr_mul(&solver.scaled_jacobian);
    let rhs = -solver.scaled_jacobian.tr_mul(&residuals);
    assert_relative_eq!(balanced_gram * scaled_step, rhs, epsilon = 1e-10);
}

#[test]
fn the_damped_solve_matches_a_closed_form_reference() {
    let jacobian = example_jacobian();
    let residuals = DVector::from(vec![1.0, 1.0, 0.0, 0.0]);
    let damping_weights = DVector::from(vec![2.0, 0.5]);
    let mu = 0.37;

    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&jacobian).unwrap();
    solver.prepare(mu, &damping_weights).unwrap();
    let step = solver.solve(&residuals).unwrap();

    // the balancing cancels analytically, so the step solves
    // (J^T J + mu D^T D) p = -J^T f in the original variables
    let mut normal = jacobian.tr_mul(&jacobian);
    for i in 0..2 {
        normal[(i, i)] += mu * damping_weights[i] * damping_weights[i];
    }
    let expected = normal
        .cholesky()
        .expect("damped normal matrix is positive definite")
        .solve(&(-jacobian.tr_mul(&residuals)));
    assert_relative_eq!(step, expected, epsilon = 1e-10);
}

#[test]
fn a_zero_jacobian_column_gets_the_fallback_scale_and_still_solves() {
    let jacobian = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 2.0, 0.0, 2.0, 0.0]);
    let residuals = DVector::from(vec![1.0, 0.0, 0.0]);

    let mut solver = CholeskySolver::new(3, 2).unwrap();
    solver.refresh(&jacobian).unwrap();

    assert_eq!(solver.scale[1], 1.0);
    assert_eq!(solver.scaled_jacobian.column(1).iter().sum::<f64>(), 0.0);

    // the Gram matrix is singular, which the modified decomposition absorbs
    solver.prepare(0.0, &unit_damping_weights()).unwrap();
    let step = solver.solve(&residuals).unwrap();
    assert!(step.iter().all(|v| v.is_finite()));
}

#[test]
fn refreshing_twice_with_the_same_jacobian_is_bit_identical() {
    let jacobian = example_jacobian();

    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&jacobian).unwrap();
    let first_scale = solver.scale.clone();
    let first_gram = solver.gram.clone();

    solver.refresh(&jacobian).unwrap();
    assert_eq!(solver.scale, first_scale);
    assert_eq!(solver.gram, first_gram);
}

#[test]
fn regularizing_with_zero_damping_copies_the_cached_gram_matrix() {
    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&example_jacobian()).unwrap();

    solver.regularize(0.0, &unit_damping_weights());
    for j in 0..2 {
        for i in j..2 {
            assert_eq!(solver.gram_work[(i, j)], solver.gram[(i, j)]);
        }
    }
}

#[test]
fn damping_touches_only_the_diagonal_and_grows_with_mu() {
    let damping_weights = DVector::from(vec![1.5, 0.25]);

    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&example_jacobian()).unwrap();

    solver.regularize(0.0, &damping_weights);
    let undamped = solver.gram_work.clone();

    let mut previous_diag = vec![undamped[(0, 0)], undamped[(1, 1)]];
    for mu in [1e-6, 1e-3, 1.0, 50.0] {
        solver.regularize(mu, &damping_weights);
        for j in 0..2 {
            for i in (j + 1)..2 {
                assert_eq!(solver.gram_work[(i, j)], undamped[(i, j)]);
            }
        }
        for (i, prev) in previous_diag.iter_mut().enumerate() {
            let current = solver.gram_work[(i, i)];
            assert!(current >= *prev);
            *prev = current;
        }
    }
}

#[test]
fn repeated_prepare_calls_never_mutate_the_cached_gram_matrix() {
    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&example_jacobian()).unwrap();
    let snapshot = solver.gram.clone();

    for mu in [0.0, 0.1, 0.7, 0.0, 123.0] {
        solver.prepare(mu, &unit_damping_weights()).unwrap();
    }
    assert_eq!(solver.gram, snapshot);
}

#[test]
fn solving_without_a_factorization_is_a_contract_violation() {
    let residuals = DVector::from(vec![1.0, 1.0, 0.0, 0.0]);

    let mut solver = CholeskySolver::new(4, 2).unwrap();
    solver.refresh(&example_jacobian()).unwrap();
    assert_matches!(
        solver.solve(&residuals),
        Err(SolverError::FactorizationMissing)
    );

    // a refresh invalidates an earlier factorization
    solver.prepare(0.0, &unit_damping_weights()).unwrap();
    solver.refresh(&example_jacobian()).unwrap();
    assert_matches!(
        solver.solve(&residuals),
        Err(SolverError::FactorizationMissing)
    );
}

#[test]
fn degenerate_dimensions_are_rejected_at_construction() {
    assert_matches!(
        CholeskySolver::<f64>::new(0, 2),
        Err(SolverError::InvalidDimensions { rows: 0, cols: 2 })
    );
    assert_matches!(
        CholeskySolver::<f64>::new(4, 0),
        Err(SolverError::InvalidDimensions { rows: 4, cols: 0 })
    );
}

#[test]
fn mismatched_inputs_are_rejected_at_every_entry_point() {
    let mut solver = CholeskySolver::new(4, 2).unwrap();

    let wrong_jacobian = DMatrix::<f64>::zeros(3, 2);
    assert_matches!(
        solver.refresh(&wrong_jacobian),
        Err(SolverError::DimensionMismatch {
            expected: 4,
            actual: 3
        })
    );

    solver.refresh(&example_jacobian()).unwrap();

    let wrong_weights = DVector::<f64>::zeros(3);
    assert_matches!(
        solver.prepare(0.0, &wrong_weights),
        Err(SolverError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );

    solver.prepare(0.0, &unit_damping_weights()).unwrap();
    let wrong_residuals = DVector::<f64>::zeros(5);
    assert_matches!(
        solver.solve(&wrong_residuals),
        Err(SolverError::DimensionMismatch {
            expected: 4,
            actual: 5
        })
    );
}
