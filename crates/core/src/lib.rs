//! Fast 2D Poisson solver: sine transform along X, shutter elimination
//! along Y.

pub mod backend;
pub mod error;
pub mod fft_solver;
pub mod field;
pub mod grid;
pub mod interop;
pub mod io;
pub mod metrics;
pub mod poisson;
pub mod profiler;
pub mod shutter;
pub mod transform;

pub use error::{SolverError, SolverResult};
pub use field::{ComplexReal, PoissonFields, Real};
pub use grid::Grid2D;
pub use poisson::{PoissonSolver, SolverMode, SolverOptions};
pub use shutter::{BoundaryKind, YBoundaries};
pub use transform::{DstAlgorithm, PlanFlags, PlanRigor, SineTransformPlan, WisdomCache};

#[cfg(test)]
mod _tests_field;
#[cfg(test)]
mod _tests_transform;
#[cfg(test)]
mod _tests_wisdom;
