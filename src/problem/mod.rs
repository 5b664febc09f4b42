use crate::util::Weights;
use nalgebra::{DVector, RealField, Scalar};
use num_traits::Float;

/// The operator that a [JacobianProduct] implementation applies to the
/// direction vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    /// compute `J · v`, a vector with one entry per residual
    Plain,
    /// compute `Jᵀ · v`, a vector with one entry per parameter
    Transposed,
}

/// The finite difference scheme used when a Jacobian-vector product is
/// approximated from residual evaluations instead of an analytic Jacobian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DifferenceScheme {
    /// forward differences, one extra residual evaluation per product
    #[default]
    Forward,
    /// central differences, twice the cost but second order accurate
    Central,
}

/// Settings for finite difference approximations, handed through to the
/// [JacobianProduct] evaluator. An implementation backed by an analytic
/// Jacobian is free to ignore them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceSettings<ScalarType> {
    /// the step size for the difference quotient
    pub step_size: ScalarType,
    /// the difference scheme
    pub scheme: DifferenceScheme,
}

/// Default settings: forward differences with a step size of the square
/// root of machine epsilon.
impl<ScalarType> Default for DifferenceSettings<ScalarType>
where
    ScalarType: Float,
{
    fn default() -> Self {
        Self {
            step_size: Float::sqrt(ScalarType::epsilon()),
            scheme: DifferenceScheme::default(),
        }
    }
}

/// The collaborator interface through which the problem definition provides
/// Jacobian-vector products. The quadratic model evaluation in
/// [crate::prediction] consumes this trait; it never forms or stores a
/// Jacobian matrix itself.
///
/// Implementations may compute the product from an analytic Jacobian or
/// approximate it with finite differences using the residual function and
/// the given [DifferenceSettings]. For weighted problems the observation
/// weights must be applied to the product, so that the operator is the
/// Jacobian of the *weighted* residuals.
pub trait JacobianProduct {
    /// the scalar number type of the problem
    type ScalarType: Scalar + RealField + Float;
    /// the error type reported when a product cannot be computed
    type Error: std::error::Error;

    /// Compute the product of the Jacobian at `params` (or its transpose,
    /// depending on `kind`) with `direction` into `product`.
    ///
    /// `residuals` holds the residual vector at `params`, which finite
    /// difference implementations need to avoid re-evaluating the model.
    /// `product` must have one entry per residual for [ProductKind::Plain]
    /// and one entry per parameter for [ProductKind::Transposed].
    #[allow(clippy::too_many_arguments)]
    fn jacobian_product(
        &mut self,
        kind: ProductKind,
        params: &DVector<Self::ScalarType>,
        residuals: &DVector<Self::ScalarType>,
        direction: &DVector<Self::ScalarType>,
        weights: &Weights<Self::ScalarType>,
        differences: &DifferenceSettings<Self::ScalarType>,
        product: &mut DVector<Self::ScalarType>,
    ) -> Result<(), Self::Error>;
}
