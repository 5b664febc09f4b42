use crate::util::DiagMatrix;
use nalgebra::{DVector, RealField, Scalar};
use num_traits::Float;
use std::ops::Mul;

/// A variant for different weights that can be applied to a least squares
/// problem. Right now this covers only unit weights (i.e. an unweighted
/// problem) or a diagonal weight matrix, which corresponds to statistically
/// independent observations. The enum offers an interface for matrix-vector
/// multiplication, so it can be extended with more general weight matrices
/// in the future.
#[derive(Debug, Clone, PartialEq)]
pub enum Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// unit weights, which means the problem is unweighted
    Unit,
    /// the weights are represented by a diagonal matrix
    Diagonal(DiagMatrix<ScalarType>),
}

impl<ScalarType> Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// create diagonal weights with the given diagonal elements.
    /// The resulting weight matrix is a square matrix with the given
    /// diagonal elements and all off-diagonal elements set to zero.
    /// Make sure that the dimensions of the weights match the data that
    /// they should be applied to.
    pub fn diagonal(diagonal: DVector<ScalarType>) -> Self {
        Self::from(DiagMatrix::from(diagonal))
    }

    /// check that the weights are appropriately sized for a data vector of
    /// the given length, so that they can be applied without panic. For unit
    /// weights this is always true, but for diagonal weights it is not.
    pub fn is_valid_for_length(&self, data_len: usize) -> bool {
        match self {
            Weights::Unit => true,
            Weights::Diagonal(diag) => diag.size() == data_len,
        }
    }
}

/// Get a variant representing unit weights (i.e. an unweighted problem)
impl<ScalarType> Default for Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    fn default() -> Self {
        Self::Unit
    }
}

/// create diagonal weights using the given diagonal matrix
impl<ScalarType> From<DiagMatrix<ScalarType>> for Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    fn from(diag: DiagMatrix<ScalarType>) -> Self {
        Self::Diagonal(diag)
    }
}

/// A convenience method that allows to multiply weights to a vector from the
/// left. Since the method knows whether the weights are diagonal or unit it
/// can take shortcuts: it is a no-op for unit weights and an in-place
/// elementwise multiplication for diagonal weights.
/// # Panics
/// If the multiplication fails because of incorrect dimensions.
/// (unit weights never panic)
impl<ScalarType> Mul<DVector<ScalarType>> for &Weights<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    type Output = DVector<ScalarType>;

    fn mul(self, rhs: DVector<ScalarType>) -> Self::Output {
        match self {
            Weights::Unit => rhs,
            Weights::Diagonal(weights) => weights * rhs,
        }
    }
}
