#![warn(missing_docs)]
//!
//! # Introduction
//!
//! This crate provides the linear-algebra core of a trust-region nonlinear
//! least-squares optimizer. During every iteration, a Levenberg-Marquardt /
//! trust-region outer loop must solve the regularized normal equations
//!
//! ```math
//! [ \tilde{J}^T \tilde{J} + \mu \tilde{D}^T \tilde{D} ] \, \tilde{p} = -\tilde{J}^T \vec{f}
//! ```
//!
//! for the next candidate step `$\vec{p}$`, where `$\vec{f}$` is the current
//! residual vector, `$\mu \geq 0$` the damping parameter of the trust region
//! and `$D$` a diagonal matrix of damping weights chosen by the outer loop.
//! Quantities are balanced according to
//!
//! ```math
//! \tilde{J} = J S, \quad \tilde{D} = D S, \quad \tilde{p} = S^{-1} \vec{p},
//! ```
//!
//! where `$S$` is the diagonal matrix with `$S_{jj} = \lVert J_j \rVert$` and
//! `$J_j$` is column `$j$` of the Jacobian (a column whose norm is zero gets
//! the scale factor one). Balancing the columns this way improves the
//! conditioning of the normal equations for some Jacobians.
//!
//! Even with balancing, rounding errors in forming `$\tilde{J}^T \tilde{J}$`
//! can make the Gram matrix slightly indefinite, in which case a plain
//! Cholesky decomposition would fail for `$\mu = 0$`. The solver in this
//! crate therefore factors the regularized matrix with a pivoted *modified*
//! Cholesky decomposition that perturbs tiny or negative pivots just enough
//! to proceed, so that indefiniteness from rounding never aborts an
//! iteration.
//!
//! # Usage
//!
//! The [CholeskySolver](crate::solvers::cholesky::CholeskySolver) is driven
//! through the [StepSolver](crate::solvers::StepSolver) trait in three
//! stages: `refresh` ingests a new Jacobian (once per outer iteration),
//! `prepare` regularizes and factors the cached normal equations for a trial
//! damping value (possibly several times per iteration), and `solve`
//! produces the step for the current residual vector.
//!
//! ```rust
//! use nalgebra::{DMatrix, DVector};
//! use normstep::prelude::*;
//!
//! // a small least squares system J x ≈ y with residuals f = J x - y
//! let jacobian = DMatrix::from_row_slice(4, 2, &[
//!     1.0, 0.0,
//!     0.0, 1.0,
//!     1.0, 1.0,
//!     1.0, -1.0,
//! ]);
//! let residuals = DVector::from(vec![1.0, 1.0, 0.0, 0.0]);
//! let damping_weights = DVector::from(vec![1.0, 1.0]);
//!
//! let mut solver = CholeskySolver::<f64>::new(4, 2).unwrap();
//! solver.refresh(&jacobian).unwrap();
//! solver.prepare(0.0, &damping_weights).unwrap();
//! let step = solver.solve(&residuals).unwrap();
//! // for mu = 0 this is the Gauss-Newton step
//! assert!((step[0] + 1.0 / 3.0).abs() < 1e-10);
//! assert!((step[1] + 1.0 / 3.0).abs() < 1e-10);
//! ```
//!
//! After a step has been produced, the outer loop judges its quality by
//! comparing the actual decrease of the objective against the decrease
//! predicted by the local quadratic model. The
//! [QuadraticModel](crate::prediction::QuadraticModel) utility evaluates
//! that predicted reduction with a single Jacobian-vector product, obtained
//! through the [JacobianProduct](crate::problem::JacobianProduct)
//! collaborator trait that the problem definition implements.
//!
//! # What this crate does not do
//!
//! The outer trust-region iteration (step acceptance, damping updates,
//! convergence tests) is out of scope, as is the evaluation of the Jacobian
//! itself; both are collaborators of this crate, not parts of it.

/// predicted reduction of the local quadratic model
pub mod prediction;
/// commonly useful imports
pub mod prelude;
/// the collaborator interface to the problem definition
pub mod problem;
/// solvers for the regularized normal equations
pub mod solvers;
/// observation weights for weighted least squares problems
pub mod util;

/// private module that contains helper functionality for dense linear
/// algebra that is not implemented in the nalgebra crate
mod linalg_helpers;
