use thiserror::Error as ThisError;

/// An error structure that contains the error variants that can occur when
/// driving a step solver.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SolverError {
    /// Solver state was requested for a degenerate system. Solvers need at
    /// least one residual and one parameter.
    #[error(
        "cannot allocate solver state for a {rows}x{cols} system. Both dimensions must be nonzero."
    )]
    InvalidDimensions {
        /// the requested number of residuals
        rows: usize,
        /// the requested number of parameters
        cols: usize,
    },

    /// An input passed to one of the solver operations disagrees with the
    /// dimensions the solver state was allocated for.
    #[error("dimension mismatch: expected length {expected}, but the input has length {actual}")]
    DimensionMismatch {
        /// the length dictated by the solver state
        expected: usize,
        /// the length of the offending input
        actual: usize,
    },

    /// The factorization (or the triangular solve based on it) could not
    /// produce a usable decomposition. With the perturbed pivoting of the
    /// robust Cholesky variant this indicates non-finite input rather than
    /// indefiniteness.
    #[error("factorization of the regularized normal equations failed")]
    FactorizationFailed,

    /// A step was requested without a successful factorization for the
    /// current Jacobian. The caller must run a successful prepare step
    /// between refreshing the Jacobian and solving.
    #[error("solve called without a successful factorization for the current jacobian")]
    FactorizationMissing,
}
