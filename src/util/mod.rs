use nalgebra::{DVector, RealField, Scalar};
use num_traits::Float;
use std::ops::Mul;

mod weights;
pub use weights::Weights;

/// A square diagonal matrix with dynamic dimension. Off-diagonal entries are
/// assumed zero. This internally stores only the diagonal elements.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    diagonal: DVector<ScalarType>,
}

impl<ScalarType> DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    /// get the number of columns of the matrix.
    /// The matrix is square, so this is equal to the number of rows
    pub fn ncols(&self) -> usize {
        self.size()
    }

    /// get the number of rows of the matrix.
    /// The matrix is square, so this is equal to the number of columns
    pub fn nrows(&self) -> usize {
        self.size()
    }

    /// the size (i.e. number of rows == number of columns) of this square
    /// matrix
    pub fn size(&self) -> usize {
        self.diagonal.len()
    }
}

/// Generate a square diagonal matrix from the given diagonal vector.
impl<ScalarType> From<DVector<ScalarType>> for DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    fn from(diagonal: DVector<ScalarType>) -> Self {
        Self { diagonal }
    }
}

/// Multiply this diagonal matrix from the left to a vector. The vector is
/// taken by value and scaled in place, so the multiplication does not
/// allocate.
/// # Panics
/// Panics if the dimensions are incorrect for matrix-vector multiplication.
impl<ScalarType> Mul<DVector<ScalarType>> for &DiagMatrix<ScalarType>
where
    ScalarType: Scalar + RealField + Float,
{
    type Output = DVector<ScalarType>;

    fn mul(self, mut rhs: DVector<ScalarType>) -> Self::Output {
        assert_eq!(
            self.ncols(),
            rhs.nrows(),
            "Matrix dimensions incorrect for diagonal matrix multiplication."
        );
        rhs.component_mul_assign(&self.diagonal);
        rhs
    }
}
