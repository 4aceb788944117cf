//! Backend trait behind the Poisson solver facade.

use crate::error::SolverResult;
use crate::field::PoissonFields;
use crate::poisson::SolverMode;

/// One elliptic solver implementation bound to a fixed grid.
///
/// A backend owns its plans and scratch memory, so concurrent solves need
/// separate backends.
pub trait EllipticBackend: Send {
    fn mode(&self) -> SolverMode;

    /// Solve for the current contents of `fields`, writing `fields.solution`.
    /// `fields.rhs` is consumed as scratch.
    fn solve(&mut self, fields: &mut PoissonFields) -> SolverResult<()>;

    /// Estimated floating-point operations of one solve.
    fn flops(&self) -> f64;

    /// Release scratch memory, then plans.
    fn dispose(self: Box<Self>);
}
