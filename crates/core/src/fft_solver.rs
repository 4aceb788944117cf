//! FFT backend: 1D sine transform along X, shutter elimination along Y.
//!
//! # Pipeline
//!
//! ```text
//! rhs ──fold bx/ex──▶ rhs ──DST(X)──▶ solution   (spectral right-hand side)
//! by, ey ──DST──▶ cby, cey                       (spectral Y boundaries)
//! solution ──shutter──▶ rhs                      (scaled spectral solution)
//! rhs ──DST(X)──▶ solution                       (physical solution)
//! ```
//!
//! The right-hand side buffer doubles as scratch for the spectral solution,
//! so it no longer holds the caller's data once a solve returns.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};

use crate::backend::EllipticBackend;
use crate::error::SolverResult;
use crate::field::{PoissonFields, Real};
use crate::grid::Grid2D;
use crate::metrics::{MetricsEvent, MetricsRecorder};
use crate::poisson::{SolverMode, SolverOptions};
use crate::profiler::{start_timer, stop_timer};
use crate::shutter::{self, ShutterScratch, YBoundaries};
use crate::transform::{PlanFlags, PlanRigor, SineTransformPlan};

pub struct FftBackend {
    grid: Grid2D,
    boundaries: YBoundaries,
    /// All `n` rows of the m-wide buffers, forward and inverse.
    plan_main: SineTransformPlan,
    plan_lower: SineTransformPlan,
    plan_upper: SineTransformPlan,
    scratch: ShutterScratch,
    cby: Vec<Real>,
    cey: Vec<Real>,
    metrics: Option<Arc<MetricsRecorder>>,
}

impl FftBackend {
    pub fn new(grid: Grid2D, options: &SolverOptions) -> SolverResult<Self> {
        let flags = PlanFlags::new(options.rigor);
        let wisdom = options.wisdom.as_ref();
        let metrics = options.metrics.clone();

        let plan_main = timed_plan(metrics.as_deref(), || {
            SineTransformPlan::create_batched(
                grid.m,
                grid.n,
                grid.m,
                grid.m,
                flags,
                options.threads,
                wisdom,
            )
        })?;

        let plan_lower = timed_plan(metrics.as_deref(), || {
            SineTransformPlan::create(grid.m, flags, wisdom)
        })?;

        // The lower plan has just measured this length.
        let upper_flags = match options.rigor {
            PlanRigor::Measure => flags.wisdom_only(),
            PlanRigor::Estimate => flags,
        };
        let plan_upper = timed_plan(metrics.as_deref(), || {
            SineTransformPlan::create(grid.m, upper_flags, wisdom)
        })?;

        debug!(
            "fft backend ready: m={} n={} algorithm={:?}",
            grid.m,
            grid.n,
            plan_main.algorithm()
        );

        Ok(Self {
            grid,
            boundaries: options.boundaries,
            plan_main,
            plan_lower,
            plan_upper,
            scratch: ShutterScratch::new(grid.n),
            cby: vec![0.0; grid.m],
            cey: vec![0.0; grid.m],
            metrics,
        })
    }

    pub fn grid(&self) -> Grid2D {
        self.grid
    }
}

fn timed_plan<F>(metrics: Option<&MetricsRecorder>, create: F) -> SolverResult<SineTransformPlan>
where
    F: FnOnce() -> SolverResult<SineTransformPlan>,
{
    let start = Instant::now();
    let plan = create()?;
    if let Some(recorder) = metrics {
        recorder.emit(MetricsEvent::PlanCreated {
            len: plan.len(),
            howmany: plan.howmany(),
            algorithm: plan.algorithm(),
            from_wisdom: plan.planned_from_wisdom(),
            duration_ms: start.elapsed().as_secs_f64() * 1e3,
        });
    }
    Ok(plan)
}

/// Move the X-side Dirichlet values into the first and last column of the
/// right-hand side.
fn fold_x_boundaries(grid: &Grid2D, fields: &mut PoissonFields) {
    let inv_hx2 = 1.0 / (grid.hx * grid.hx);
    let last = grid.m - 1;
    for (k, row) in fields.rhs.chunks_exact_mut(grid.m).enumerate() {
        row[0] -= fields.bx[k] * inv_hx2;
        row[last] -= fields.ex[k] * inv_hx2;
    }
}

impl EllipticBackend for FftBackend {
    fn mode(&self) -> SolverMode {
        SolverMode::Fft
    }

    fn solve(&mut self, fields: &mut PoissonFields) -> SolverResult<()> {
        let start = Instant::now();
        fold_x_boundaries(&self.grid, fields);
        let PoissonFields {
            by,
            ey,
            rhs,
            solution,
            ..
        } = fields;

        start_timer("fft.forward");
        self.plan_main.forward(rhs, solution);
        self.plan_lower.forward(by, &mut self.cby);
        self.plan_upper.forward(ey, &mut self.cey);
        stop_timer("fft.forward");

        start_timer("fft.shutter");
        shutter::eliminate_real(
            &self.grid,
            self.boundaries,
            solution,
            rhs,
            &mut self.scratch,
            &self.cby,
            &self.cey,
        );
        stop_timer("fft.shutter");

        start_timer("fft.inverse");
        self.plan_main.inverse(rhs, solution);
        stop_timer("fft.inverse");

        if let Some(recorder) = &self.metrics {
            recorder.emit(MetricsEvent::Solve {
                m: self.grid.m,
                n: self.grid.n,
                duration_ms: start.elapsed().as_secs_f64() * 1e3,
                flops: self.flops(),
            });
        }
        Ok(())
    }

    fn flops(&self) -> f64 {
        self.plan_main.flops()
    }

    fn dispose(self: Box<Self>) {
        let this = *self;
        info!("disposing fft backend m={} n={}", this.grid.m, this.grid.n);
        drop(this.scratch);
        drop(this.cby);
        drop(this.cey);
        this.plan_main.dispose();
        this.plan_lower.dispose();
        this.plan_upper.dispose();
        if let Some(recorder) = this.metrics {
            recorder.emit(MetricsEvent::Dispose {
                mode: SolverMode::Fft,
            });
        }
    }
}
