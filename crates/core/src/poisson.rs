//! Poisson solver facade.
//!
//! ```text
//! Δu = f   on the interior of an (m + 2) × (n + 2) grid
//! ```
//!
//! [`PoissonSolver::init`] selects a backend by [`SolverMode`], takes
//! ownership of the problem buffers and builds every plan up front;
//! [`PoissonSolver::solve`] then runs the whole pipeline synchronously and
//! [`PoissonSolver::dispose`] releases the backend and hands the buffers
//! back. Disposal consumes the solver, so a handle cannot be disposed twice
//! or used afterwards, and a failed `init` leaves nothing behind.
//!
//! # Example
//!
//! ```
//! use breeze2d_core::{Grid2D, PoissonFields, PoissonSolver, SolverMode};
//!
//! let grid = Grid2D::new(16, 16, 0.1, 0.1);
//! let mut solver =
//!     PoissonSolver::init(SolverMode::Fft, grid, PoissonFields::zeros(grid)).unwrap();
//! solver.fields_mut().rhs.fill(1.0);
//! solver.solve().unwrap();
//! let fields = solver.dispose();
//! assert!(fields.solution.iter().all(|v| v.is_finite()));
//! ```

use std::fmt;
use std::sync::Arc;

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::backend::EllipticBackend;
use crate::error::{SolverError, SolverResult};
use crate::fft_solver::FftBackend;
use crate::field::{PoissonFields, Real};
use crate::grid::Grid2D;
use crate::metrics::{MetricsEvent, MetricsRecorder};
use crate::shutter::YBoundaries;
use crate::transform::{PlanRigor, WisdomCache};

/// Raw identifier of the FFT solver.
pub const POISSON_SOLVER_FFT: i32 = 0;

/// Raw identifier of the finite-difference solver.
pub const POISSON_SOLVER_FDIFFS: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    /// Sine transform along X + shutter along Y.
    Fft,
    /// Finite differences. Recognised but not implemented.
    #[serde(alias = "fdiffs")]
    FiniteDifferences,
}

impl SolverMode {
    pub const fn raw(self) -> i32 {
        match self {
            SolverMode::Fft => POISSON_SOLVER_FFT,
            SolverMode::FiniteDifferences => POISSON_SOLVER_FDIFFS,
        }
    }
}

impl TryFrom<i32> for SolverMode {
    type Error = SolverError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            POISSON_SOLVER_FFT => Ok(SolverMode::Fft),
            POISSON_SOLVER_FDIFFS => Ok(SolverMode::FiniteDifferences),
            other => Err(SolverError::UnsupportedSolverMode(other)),
        }
    }
}

impl fmt::Display for SolverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverMode::Fft => write!(f, "fft"),
            SolverMode::FiniteDifferences => write!(f, "finite differences"),
        }
    }
}

/// Knobs shared by every backend.
#[derive(Clone)]
pub struct SolverOptions {
    /// Worker threads for batched transforms; 1 runs on the caller's thread.
    pub threads: usize,
    pub rigor: PlanRigor,
    pub boundaries: YBoundaries,
    /// Planning knowledge, possibly shared between solvers.
    pub wisdom: Arc<WisdomCache>,
    pub metrics: Option<Arc<MetricsRecorder>>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            threads: 1,
            rigor: PlanRigor::default(),
            boundaries: YBoundaries::default(),
            wisdom: Arc::new(WisdomCache::in_memory()),
            metrics: None,
        }
    }
}

pub struct PoissonSolver {
    grid: Grid2D,
    fields: PoissonFields,
    backend: Box<dyn EllipticBackend>,
}

impl PoissonSolver {
    /// Initialise a solver with default options.
    pub fn init(mode: SolverMode, grid: Grid2D, fields: PoissonFields) -> SolverResult<Self> {
        Self::init_with(mode, grid, fields, &SolverOptions::default())
    }

    pub fn init_with(
        mode: SolverMode,
        grid: Grid2D,
        fields: PoissonFields,
        options: &SolverOptions,
    ) -> SolverResult<Self> {
        debug_assert!(
            fields.matches(grid),
            "field buffers must match a {}x{} grid",
            grid.m,
            grid.n
        );

        let backend: Box<dyn EllipticBackend> = match mode {
            SolverMode::Fft => Box::new(FftBackend::new(grid, options)?),
            SolverMode::FiniteDifferences => {
                error!("{mode} Poisson solver is not available");
                return Err(SolverError::UnsupportedSolverMode(mode.raw()));
            }
        };

        info!(
            "initialised {mode} Poisson solver m={} n={} hx={} hy={}",
            grid.m, grid.n, grid.hx, grid.hy
        );
        if let Some(recorder) = &options.metrics {
            recorder.emit(MetricsEvent::SolverInit {
                mode,
                m: grid.m,
                n: grid.n,
                hx: grid.hx as f64,
                hy: grid.hy as f64,
                threads: options.threads,
            });
        }

        Ok(Self {
            grid,
            fields,
            backend,
        })
    }

    /// Initialise from a raw mode identifier.
    pub fn init_raw(
        mode: i32,
        grid: Grid2D,
        fields: PoissonFields,
        options: &SolverOptions,
    ) -> SolverResult<Self> {
        let mode = SolverMode::try_from(mode).inspect_err(|err| error!("{err}"))?;
        Self::init_with(mode, grid, fields, options)
    }

    pub fn mode(&self) -> SolverMode {
        self.backend.mode()
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }

    pub fn fields(&self) -> &PoissonFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut PoissonFields {
        &mut self.fields
    }

    pub fn solution(&self) -> &[Real] {
        &self.fields.solution
    }

    /// Solve for the current boundaries and right-hand side.
    pub fn solve(&mut self) -> SolverResult<()> {
        self.backend.solve(&mut self.fields)
    }

    pub fn flops(&self) -> f64 {
        self.backend.flops()
    }

    /// Release the backend and return the problem buffers.
    pub fn dispose(self) -> PoissonFields {
        self.backend.dispose();
        self.fields
    }
}
