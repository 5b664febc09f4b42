use crate::problem::{DifferenceSettings, JacobianProduct, ProductKind};
use crate::util::Weights;
use nalgebra::{DVector, RealField, Scalar};
use num_traits::Float;
use thiserror::Error as ThisError;


/// An error structure that contains the error variants that can occur when
/// evaluating the predicted reduction.
#[derive(Debug, ThisError)]
pub enum PredictionError<ModelError>
where
    ModelError: std::error::Error,
{
    /// The Jacobian-vector product evaluator failed. The underlying error
    /// is carried unchanged as the source of this variant.
    #[error("jacobian-vector product evaluation failed")]
    Evaluation(#[source] ModelError),

    /// The residual vector does not have the length the workspace was
    /// allocated for.
    #[error(
        "residual vector has length {actual}, but the workspace was allocated for length {expected}"
    )]
    DimensionMismatch {
        /// the length the workspace was allocated for
        expected: usize,
        /// the length of the given residual vector
        actual: usize,
    },
}

/// Evaluates the expected decrease of the standard quadratic model
///
/// ```math
/// m(\vec{dx}) = \Phi(\vec{x}) + \vec{dx}^T \vec{g} + \frac{1}{2} \vec{dx}^T B \, \vec{dx}
/// ```
///
/// for a candidate step `$\vec{dx}$`, which the trust-region outer loop
/// compares against the actual decrease of the objective to accept or
/// reject the step and to resize the trust region. The predicted reduction
/// is calculated as
///
/// ```math
/// m(0) - m(\vec{dx}) = -2 \, \hat{f} \cdot \vec{\beta} - \lVert \vec{\beta} \rVert^2,
/// \quad \vec{\beta} = \frac{J \, \vec{dx}}{\lVert \vec{f} \rVert},
/// \quad \hat{f} = \frac{\vec{f}}{\lVert \vec{f} \rVert},
/// ```
///
/// so it needs exactly one Jacobian-vector product, obtained through the
/// [JacobianProduct] collaborator. The instance owns the workspace for that
/// product, which is allocated once for a fixed residual count.
#[derive(Debug, Clone)]
pub struct QuadraticModel<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// holds `J dx`, then `beta`; one entry per residual
    work: DVector<ScalarType>,
}

impl<ScalarType> QuadraticModel<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// Allocate the workspace for a problem with `residual_count`
    /// observations.
    pub fn new(residual_count: usize) -> Self {
        Self {
            work: DVector::zeros(residual_count),
        }
    }

    /// Calculate the predicted reduction of the quadratic model for the
    /// candidate step `step` taken at `params`, where `residuals` is the
    /// residual vector at `params`.
    ///
    /// A step of zero predicts a reduction of exactly zero; a step that
    /// strictly decreases the quadratic model predicts a positive
    /// reduction. The value is dimensionless, normalized by the squared
    /// residual norm.
    ///
    /// # Errors
    /// A failure of the evaluator is propagated unchanged inside
    /// [PredictionError::Evaluation]; no partial result is returned.
    pub fn predicted_reduction<Model>(
        &mut self,
        model: &mut Model,
        params: &DVector<ScalarType>,
        residuals: &DVector<ScalarType>,
        step: &DVector<ScalarType>,
        weights: &Weights<ScalarType>,
        differences: &DifferenceSettings<ScalarType>,
    ) -> Result<ScalarType, PredictionError<Model::Error>>
    where
        Model: JacobianProduct<ScalarType = ScalarType>,
    {
        if residuals.len() != self.work.len() {
            return Err(PredictionError::DimensionMismatch {
                expected: self.work.len(),
                actual: residuals.len(),
            });
        }

        let norm_f = residuals.norm();

        // work = J * dx
        model
            .jacobian_product(
                ProductKind::Plain,
                params,
                residuals,
                step,
                weights,
                differences,
                &mut self.work,
            )
            .map_err(PredictionError::Evaluation)?;

        // beta = J * dx / ||f||
        self.work /= norm_f;
        let norm_beta = self.work.norm();

        let two = ScalarType::one() + ScalarType::one();
        let mut reduction = -(norm_beta * norm_beta);
        for i in 0..residuals.len() {
            reduction -= two * (residuals[i] / norm_f) * self.work[i];
        }

        Ok(reduction)
    }
}
