
use log::debug;
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::Float;
use thiserror::Error as ThisError;

/// Error indicating that a factorization or triangular solve ran into a
/// pivot that is not a finite positive number. With the perturbation applied
/// by [modified_cholesky_decompose] this only happens for NaN or infinite
/// input.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("factorization encountered a pivot that is not a finite positive number")]
pub struct DecompositionError;

/// Compute the balanced Jacobian `J~ = J S` together with the scale factors.
///
/// The scale factor for column `j` is the Euclidean norm of that column, or
/// one if the column norm is zero, so a zero column stays exactly zero and
/// never produces a division by zero further down the line. The caller
/// recovers the true step from the balanced one by an elementwise multiply
/// with the scale factors.
pub fn balance_columns<ScalarType>(
    jacobian: &DMatrix<ScalarType>,
    scaled: &mut DMatrix<ScalarType>,
    scale: &mut DVector<ScalarType>,
) where
    ScalarType: Scalar + RealField + Float,
{
    for (j, col) in jacobian.column_iter().enumerate() {
        let mut norm = col.norm();
        if norm == ScalarType::zero() {
            norm = ScalarType::one();
        }
        scale[j] = norm;
        let mut scaled_col = scaled.column_mut(j);
        scaled_col.copy_from(&col);
        scaled_col *= norm;
    }
}

/// Compute the lower triangle of the Gram matrix `A^T A` into `gram`.
/// The strictly upper triangle of `gram` is left untouched.
pub fn gram_lower_triangle<ScalarType>(a: &DMatrix<ScalarType>, gram: &mut DMatrix<ScalarType>)
where
    ScalarType: Scalar + RealField + Float,
{
    let p = a.ncols();
    for j in 0..p {
        for i in j..p {
            gram[(i, j)] = a.column(i).dot(&a.column(j));
        }
    }
}

/// Copy the lower triangle (diagonal included) of `src` into `dst`.
/// The strictly upper triangle of `dst` is left untouched.
pub fn copy_lower_triangle<ScalarType>(src: &DMatrix<ScalarType>, dst: &mut DMatrix<ScalarType>)
where
    ScalarType: Scalar + RealField + Float,
{
    let p = src.ncols();
    for j in 0..p {
        for i in j..p {
            dst[(i, j)] = src[(i, j)];
        }
    }
}

/// Pivoted modified Cholesky factorization of a symmetric matrix.
///
/// Factors `P (A + E) P^T = L D L^T`, referencing only the lower triangle of
/// `a`. On output the unit lower triangular factor `L` occupies the strictly
/// lower triangle of `a` and the positive diagonal factor `D` its diagonal.
/// `E` is a non-negative diagonal perturbation: whenever a pivot falls below
/// a threshold derived from the largest initial diagonal entry and machine
/// epsilon, it is raised to that threshold. This makes the factorization
/// succeed even when rounding errors have made a Gram matrix slightly
/// indefinite, which is exactly the situation it is meant to absorb.
///
/// The symmetric pivoting picks the largest remaining diagonal entry at each
/// elimination step and records it in `perm`: `perm[k]` is the index of the
/// input row/column that ended up in position `k`.
///
/// The only error condition is a non-finite pivot, i.e. NaN or infinity in
/// the input.
pub fn modified_cholesky_decompose<ScalarType>(
    a: &mut DMatrix<ScalarType>,
    perm: &mut [usize],
) -> Result<(), DecompositionError>
where
    ScalarType: Scalar + RealField + Float,
{
    let p = a.nrows();
    debug_assert_eq!(p, a.ncols());
    debug_assert_eq!(p, perm.len());

    for (k, entry) in perm.iter_mut().enumerate() {
        *entry = k;
    }

    let mut max_diag = ScalarType::zero();
    for k in 0..p {
        max_diag = Float::max(max_diag, Float::abs(a[(k, k)]));
    }
    let delta = Float::max(ScalarType::one(), max_diag) * Float::epsilon();

    let mut perturbed = 0usize;
    for k in 0..p {
        let mut pivot = k;
        for j in (k + 1)..p {
            if a[(j, j)] > a[(pivot, pivot)] {
                pivot = j;
            }
        }
        if pivot != k {
            swap_symmetric_lower(a, k, pivot);
            perm.swap(k, pivot);
        }

        let mut d = a[(k, k)];
        if !Float::is_finite(d) {
            return Err(DecompositionError);
        }
        if d < delta {
            d = delta;
            a[(k, k)] = d;
            perturbed += 1;
        }

        for j in (k + 1)..p {
            let l_jk = a[(j, k)] / d;
            for i in j..p {
                let update = a[(i, k)] * l_jk;
                a[(i, j)] -= update;
            }
            a[(j, k)] = l_jk;
        }
    }

    if perturbed > 0 {
        debug!("modified cholesky perturbed {perturbed} of {p} pivots");
    }
    Ok(())
}

/// Solve `A x = b` given the factorization produced by
/// [modified_cholesky_decompose] (so the solution actually refers to the
/// perturbed matrix `A + E`). The pivots are re-checked during the solve and
/// a non-finite or non-positive one reports an error instead of producing
/// garbage.
pub fn modified_cholesky_solve<ScalarType>(
    a: &DMatrix<ScalarType>,
    perm: &[usize],
    b: &DVector<ScalarType>,
) -> Result<DVector<ScalarType>, DecompositionError>
where
    ScalarType: Scalar + RealField + Float,
{
    let p = a.nrows();
    debug_assert_eq!(p, b.len());
    debug_assert_eq!(p, perm.len());

    // y <- P b
    let mut y = DVector::from_fn(p, |k, _| b[perm[k]]);

    // forward substitution with the unit lower triangular factor
    for k in 1..p {
        let mut acc = y[k];
        for j in 0..k {
            acc -= a[(k, j)] * y[j];
        }
        y[k] = acc;
    }

    for k in 0..p {
        let d = a[(k, k)];
        if !Float::is_finite(d) || d <= ScalarType::zero() {
            return Err(DecompositionError);
        }
        y[k] /= d;
    }

    // back substitution with the transposed factor
    for k in (0..p.saturating_sub(1)).rev() {
        let mut acc = y[k];
        for i in (k + 1)..p {
            acc -= a[(i, k)] * y[i];
        }
        y[k] = acc;
    }

    // x <- P^T y
    let mut x = DVector::zeros(p);
    for k in 0..p {
        x[perm[k]] = y[k];
    }
    Ok(x)
}

/// Exchange rows/columns `k` and `pivot` of a symmetric matrix of which only
/// the lower triangle is stored. Requires `k < pivot`.
fn swap_symmetric_lower<ScalarType>(a: &mut DMatrix<ScalarType>, k: usize, pivot: usize)
where
    ScalarType: Scalar + RealField + Float,
{
    debug_assert!(k < pivot);
    let p = a.nrows();

    a.swap((k, k), (pivot, pivot));
    for j in 0..k {
        a.swap((k, j), (pivot, j));
    }
    for i in (k + 1)..pivot {
        a.swap((i, k), (pivot, i));
    }
    for i in (pivot + 1)..p {
        a.swap((i, k), (i, pivot));
    }
}
