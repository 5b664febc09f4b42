use crate::linalg_helpers::{
    balance_columns, copy_lower_triangle, gram_lower_triangle, modified_cholesky_decompose,
    modified_cholesky_solve,
};
use crate::solvers::{SolverError, StepSolver};
use log::trace;
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::Float;

#[cfg(test)]
mod test;

/// A step solver that solves the balanced normal equations
///
/// ```math
/// [ \tilde{J}^T \tilde{J} + \mu \tilde{D}^T \tilde{D} ] \, \tilde{p} = -\tilde{J}^T \vec{f}
/// ```
///
/// with a pivoted modified Cholesky decomposition, where `$\tilde{J} = J S$`
/// and `$\tilde{D} = D S$` are the column-balanced Jacobian and damping
/// weights and `$S_{jj}$` is the norm of Jacobian column `$j$`. The true
/// step is recovered as `$\vec{p} = S \tilde{p}$`.
///
/// The modified decomposition perturbs tiny or negative pivots, so a Gram
/// matrix that rounding errors have made slightly indefinite (which can
/// happen for `$\mu = 0$`) still factors. Genuine failure is reserved for
/// non-finite input.
///
/// Only the lower triangle of the Gram matrix is ever formed or referenced.
/// All buffers are allocated once in [CholeskySolver::new] and reused across
/// iterations; see [StepSolver] for the calling protocol.
#[derive(Debug, Clone)]
pub struct CholeskySolver<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// lower triangle of `J~^T J~`, cached between refreshes
    gram: DMatrix<ScalarType>,
    /// working copy of the Gram matrix, regularized and factored in place
    gram_work: DMatrix<ScalarType>,
    /// the balanced Jacobian `J~ = J S`
    scaled_jacobian: DMatrix<ScalarType>,
    /// the balancing scale factors `S`
    scale: DVector<ScalarType>,
    /// right hand side scratch for `-J~^T f`
    rhs: DVector<ScalarType>,
    /// pivot record of the factorization
    perm: Vec<usize>,
    /// whether `gram_work` holds a successful factorization for the current
    /// Jacobian
    factorized: bool,
}

impl<ScalarType> CholeskySolver<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// Allocate solver state for a problem with `residual_count`
    /// observations and `parameter_count` parameters. All scratch buffers
    /// live for the whole optimization run; dropping the solver releases
    /// them.
    ///
    /// # Errors
    /// [SolverError::InvalidDimensions] if either dimension is zero.
    pub fn new(residual_count: usize, parameter_count: usize) -> Result<Self, SolverError> {
        if residual_count == 0 || parameter_count == 0 {
            return Err(SolverError::InvalidDimensions {
                rows: residual_count,
                cols: parameter_count,
            });
        }
        Ok(Self {
            gram: DMatrix::zeros(parameter_count, parameter_count),
            gram_work: DMatrix::zeros(parameter_count, parameter_count),
            scaled_jacobian: DMatrix::zeros(residual_count, parameter_count),
            scale: DVector::zeros(parameter_count),
            rhs: DVector::zeros(parameter_count),
            perm: vec![0; parameter_count],
            factorized: false,
        })
    }

    fn residual_count(&self) -> usize {
        self.scaled_jacobian.nrows()
    }

    fn parameter_count(&self) -> usize {
        self.scaled_jacobian.ncols()
    }

    /// Seed the working matrix from the cached Gram matrix and add the
    /// damping term `mu (D_i S_i)^2` to its diagonal. The cache itself is
    /// never written to, so repeated trials with different damping values
    /// all start from the same matrix.
    fn regularize(&mut self, mu: ScalarType, damping_weights: &DVector<ScalarType>) {
        copy_lower_triangle(&self.gram, &mut self.gram_work);

        if mu != ScalarType::zero() {
            for i in 0..self.parameter_count() {
                let balanced_weight = damping_weights[i] * self.scale[i];
                self.gram_work[(i, i)] += mu * balanced_weight * balanced_weight;
            }
        }
    }
}

impl<ScalarType> StepSolver for CholeskySolver<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    type ScalarType = ScalarType;

    /// Balance the columns of the given Jacobian and cache the lower
    /// triangle of the balanced Gram matrix `J~^T J~`. Any factorization
    /// from an earlier Jacobian is invalidated.
    fn refresh(&mut self, jacobian: &DMatrix<ScalarType>) -> Result<(), SolverError> {
        if jacobian.nrows() != self.residual_count() {
            return Err(SolverError::DimensionMismatch {
                expected: self.residual_count(),
                actual: jacobian.nrows(),
            });
        }
        if jacobian.ncols() != self.parameter_count() {
            return Err(SolverError::DimensionMismatch {
                expected: self.parameter_count(),
                actual: jacobian.ncols(),
            });
        }

        balance_columns(jacobian, &mut self.scaled_jacobian, &mut self.scale);
        gram_lower_triangle(&self.scaled_jacobian, &mut self.gram);
        self.factorized = false;

        trace!(
            "refreshed normal equations from a {}x{} jacobian",
            self.residual_count(),
            self.parameter_count()
        );
        Ok(())
    }

    /// Compute the modified Cholesky decomposition of
    /// `J~^T J~ + mu D~^T D~`, re-seeding the working matrix from the cached
    /// Gram matrix first.
    fn prepare(
        &mut self,
        mu: ScalarType,
        damping_weights: &DVector<ScalarType>,
    ) -> Result<(), SolverError> {
        if damping_weights.len() != self.parameter_count() {
            return Err(SolverError::DimensionMismatch {
                expected: self.parameter_count(),
                actual: damping_weights.len(),
            });
        }

        self.factorized = false;
        self.regularize(mu, damping_weights);
        modified_cholesky_decompose(&mut self.gram_work, &mut self.perm)
            .map_err(|_| SolverError::FactorizationFailed)?;
        self.factorized = true;
        Ok(())
    }

    /// Compute the step `p` solving `(J~^T J~ + mu D~^T D~) p~ = -J~^T f`
    /// and undo the balancing transformation.
    fn solve(&mut self, residuals: &DVector<ScalarType>) -> Result<DVector<ScalarType>, SolverError> {
        if residuals.len() != self.residual_count() {
            return Err(SolverError::DimensionMismatch {
                expected: self.residual_count(),
                actual: residuals.len(),
            });
        }
        if !self.factorized {
            return Err(SolverError::FactorizationMissing);
        }

        // rhs = -J~^T f
        self.rhs
            .gemv_tr(-ScalarType::one(), &self.scaled_jacobian, residuals, ScalarType::zero());

        let mut step = modified_cholesky_solve(&self.gram_work, &self.perm, &self.rhs)
            .map_err(|_| SolverError::FactorizationFailed)?;

        // undo the balancing transformation
        step.component_mul_assign(&self.scale);
        Ok(step)
    }
}
