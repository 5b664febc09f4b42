use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::Float;

/// the robust Cholesky solver for the regularized normal equations
pub mod cholesky;
/// contains the errors reported by the solvers
pub mod error;

pub use error::SolverError;

/// The strategy contract between the trust-region outer loop and the linear
/// solver that produces candidate steps.
///
/// A solver instance owns all of its scratch buffers, which are allocated
/// once by the variant's constructor for fixed problem dimensions and
/// released when the instance is dropped. Different decomposition variants
/// (this crate ships the robust Cholesky variant in [cholesky]; QR or SVD
/// based variants are external) plug into the same three-stage protocol:
///
/// 1. [refresh](StepSolver::refresh) ingests the current Jacobian. This runs
///    once per outer iteration and recomputes everything derived from the
///    Jacobian (in particular the cached normal equations).
/// 2. [prepare](StepSolver::prepare) regularizes the cached normal equations
///    with a trial damping value and factors the result. The outer loop may
///    call this several times per refresh with different damping values; the
///    working copy is re-seeded from the cache every time, so earlier trials
///    never leak into later ones.
/// 3. [solve](StepSolver::solve) computes the candidate step for the current
///    residual vector from the most recent successful factorization. Calling
///    it without one (or after a refresh invalidated it) is a contract
///    violation and reports [SolverError::FactorizationMissing].
///
/// A solver instance must be driven from a single logical call sequence;
/// there is no internal synchronization.
pub trait StepSolver {
    /// the scalar number type of the solver
    type ScalarType: Scalar + RealField + Float;

    /// Ingest the Jacobian for the current outer iteration.
    fn refresh(&mut self, jacobian: &DMatrix<Self::ScalarType>) -> Result<(), SolverError>;

    /// Regularize the cached normal equations with the damping value `mu`
    /// and the diagonal damping weights, then factor the result.
    fn prepare(
        &mut self,
        mu: Self::ScalarType,
        damping_weights: &DVector<Self::ScalarType>,
    ) -> Result<(), SolverError>;

    /// Solve for the candidate step belonging to the given residual vector,
    /// using the factorization produced by the last call to
    /// [prepare](StepSolver::prepare).
    fn solve(
        &mut self,
        residuals: &DVector<Self::ScalarType>,
    ) -> Result<DVector<Self::ScalarType>, SolverError>;
}
