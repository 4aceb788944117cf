//! Sine-transform plan management.
//!
//! A [`SineTransformPlan`] describes one DST-I of length `N`, or a batch of
//! `howmany` independent DST-Is whose starting elements are `idist`
//! (input) and `odist` (output) elements apart. Buffers are handed to the
//! plan when it executes, so the same plan serves out-of-place and in-place
//! use.
//!
//! The forward and inverse handles are the same kernel: DST-I is
//! self-inverse up to `2(N+1)`, a factor the caller applies.
//!
//! # Planning
//!
//! Planning picks a [`DstAlgorithm`] for the length:
//!
//! - [`PlanRigor::Estimate`] uses a size heuristic.
//! - [`PlanRigor::Measure`] times the candidates and records the winner in
//!   the [`WisdomCache`].
//! - [`PlanFlags::wisdom_only`] refuses to plan lengths the cache has never
//!   seen.
//!
//! Knowledge already in the cache always wins over both rigors.

pub mod dst;
pub mod wisdom;

use log::debug;
use rayon::prelude::*;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};

pub use dst::DstAlgorithm;
pub use wisdom::{WisdomCache, DEFAULT_WISDOM_FILE};

use crate::error::{SolverError, SolverResult};
use crate::field::Real;
use dst::{DstKernel, DstWork};
use wisdom::Choice;

/// Transform kinds understood by the plan manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    /// Odd symmetry around j = -1 and j = N (DST-I).
    Rodft00,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanRigor {
    Estimate,
    #[default]
    Measure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlanFlags {
    pub rigor: PlanRigor,
    pub wisdom_only: bool,
}

impl PlanFlags {
    pub const ESTIMATE: Self = Self::new(PlanRigor::Estimate);
    pub const MEASURE: Self = Self::new(PlanRigor::Measure);

    pub const fn new(rigor: PlanRigor) -> Self {
        Self {
            rigor,
            wisdom_only: false,
        }
    }

    /// Fail instead of planning when the cache knows nothing about the length.
    pub const fn wisdom_only(self) -> Self {
        Self {
            rigor: self.rigor,
            wisdom_only: true,
        }
    }
}

pub struct SineTransformPlan {
    len: usize,
    howmany: usize,
    idist: usize,
    odist: usize,
    kind: TransformKind,
    from_wisdom: bool,
    kernel: DstKernel,
    work: DstWork,
    pool: Option<rayon::ThreadPool>,
}

impl SineTransformPlan {
    /// Plan a single DST-I of length `len`.
    pub fn create(len: usize, flags: PlanFlags, wisdom: &WisdomCache) -> SolverResult<Self> {
        Self::create_batched(len, 1, len, len, flags, 1, wisdom)
    }

    /// Plan `howmany` DST-Is of length `len`. Transform `b` reads
    /// `input[b * idist..][..len]` and writes `output[b * odist..][..len]`.
    ///
    /// With `threads > 1` the batch executes on a dedicated worker pool.
    pub fn create_batched(
        len: usize,
        howmany: usize,
        idist: usize,
        odist: usize,
        flags: PlanFlags,
        threads: usize,
        wisdom: &WisdomCache,
    ) -> SolverResult<Self> {
        if len == 0 {
            return Err(SolverError::plan(len, howmany, "transform length must be positive"));
        }
        if howmany == 0 {
            return Err(SolverError::plan(len, howmany, "batch must contain at least one transform"));
        }
        if idist < len || odist < len {
            return Err(SolverError::plan(
                len,
                howmany,
                format!("transform distance ({idist}, {odist}) overlaps successive transforms"),
            ));
        }

        let mut planner = FftPlanner::<Real>::new();
        let resolution = wisdom.resolve(len, || {
            if flags.wisdom_only {
                return Err(SolverError::plan(len, howmany, "no wisdom recorded for this length"));
            }
            Ok(match flags.rigor {
                PlanRigor::Estimate => Choice {
                    algorithm: dst::estimate(len),
                    measured: false,
                },
                PlanRigor::Measure => Choice {
                    algorithm: dst::measure(len, &mut planner),
                    measured: true,
                },
            })
        })?;

        let pool = if threads > 1 && howmany > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("breeze2d-dst-{i}"))
                .build()
                .map_err(|err| SolverError::plan(len, howmany, err.to_string()))?;
            Some(pool)
        } else {
            None
        };

        let kernel = DstKernel::new(len, resolution.algorithm, &mut planner);
        let work = kernel.work();
        debug!(
            "planned DST-I len={len} howmany={howmany} algorithm={:?} wisdom={} threads={}",
            resolution.algorithm,
            resolution.from_wisdom,
            pool.as_ref().map_or(1, |p| p.current_num_threads())
        );

        Ok(Self {
            len,
            howmany,
            idist,
            odist,
            kind: TransformKind::Rodft00,
            from_wisdom: resolution.from_wisdom,
            kernel,
            work,
            pool,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn howmany(&self) -> usize {
        self.howmany
    }

    pub fn distances(&self) -> (usize, usize) {
        (self.idist, self.odist)
    }

    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    pub fn algorithm(&self) -> DstAlgorithm {
        self.kernel.algorithm()
    }

    /// Whether the kernel choice came from previously recorded wisdom.
    pub fn planned_from_wisdom(&self) -> bool {
        self.from_wisdom
    }

    pub fn forward(&mut self, input: &[Real], output: &mut [Real]) {
        self.execute(input, output);
    }

    pub fn inverse(&mut self, input: &[Real], output: &mut [Real]) {
        self.execute(input, output);
    }

    pub fn forward_in_place(&mut self, data: &mut [Real]) {
        self.execute_in_place(data);
    }

    pub fn inverse_in_place(&mut self, data: &mut [Real]) {
        self.execute_in_place(data);
    }

    /// Estimated floating-point operations of one execution.
    pub fn flops(&self) -> f64 {
        let len = self.len as f64;
        2.5 * self.howmany as f64 * len * len.log2()
    }

    /// Release the plan and its worker pool.
    pub fn dispose(self) {
        debug!("disposing DST-I plan len={} howmany={}", self.len, self.howmany);
    }

    fn execute(&mut self, input: &[Real], output: &mut [Real]) {
        debug_assert!(input.len() >= (self.howmany - 1) * self.idist + self.len);
        debug_assert!(output.len() >= (self.howmany - 1) * self.odist + self.len);

        let kernel = &self.kernel;
        match &self.pool {
            Some(pool) => pool.install(|| {
                input
                    .par_chunks(self.idist)
                    .zip(output.par_chunks_mut(self.odist))
                    .take(self.howmany)
                    .for_each_init(|| kernel.work(), |work, (src, dst)| {
                        kernel.apply(src, dst, work)
                    });
            }),
            None => {
                for b in 0..self.howmany {
                    let src = &input[b * self.idist..];
                    let dst = &mut output[b * self.odist..];
                    kernel.apply(src, dst, &mut self.work);
                }
            }
        }
    }

    fn execute_in_place(&mut self, data: &mut [Real]) {
        debug_assert_eq!(self.idist, self.odist, "in-place execution needs equal distances");
        debug_assert!(data.len() >= (self.howmany - 1) * self.idist + self.len);

        let kernel = &self.kernel;
        match &self.pool {
            Some(pool) => pool.install(|| {
                data.par_chunks_mut(self.idist)
                    .take(self.howmany)
                    .for_each_init(|| kernel.work(), |work, row| {
                        kernel.apply_in_place(row, work)
                    });
            }),
            None => {
                for b in 0..self.howmany {
                    kernel.apply_in_place(&mut data[b * self.idist..], &mut self.work);
                }
            }
        }
    }
}
