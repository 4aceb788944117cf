//! Errors surfaced by solver initialisation and plan construction.

use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The requested solver mode is unknown or has no implementation.
    #[error("undefined Poisson solver method (mode {0})")]
    UnsupportedSolverMode(i32),

    /// The transform backend could not build a plan.
    #[error("sine transform plan creation failed (len={len}, howmany={howmany}): {reason}")]
    PlanCreationFailure {
        len: usize,
        howmany: usize,
        reason: String,
    },
}

impl SolverError {
    pub(crate) fn plan(len: usize, howmany: usize, reason: impl Into<String>) -> Self {
        Self::PlanCreationFailure {
            len,
            howmany,
            reason: reason.into(),
        }
    }
}
