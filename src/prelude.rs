pub use crate::prediction::QuadraticModel;
pub use crate::problem::JacobianProduct;
pub use crate::solvers::cholesky::CholeskySolver;
pub use crate::solvers::StepSolver;
pub use crate::util::Weights;
