//! DST-I kernels (FFTW's `RODFT00`).
//!
//! ```text
//! Y[k] = 2 Σ_{j=0}^{N-1} X[j] sin(π (j+1)(k+1) / (N+1))
//! ```
//!
//! The transform is its own inverse up to a factor of `2(N+1)`; callers apply
//! that factor themselves.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::field::{ComplexReal, Real, PI};

/// Largest length for which the quadratic kernel is ever considered.
pub const DIRECT_MAX_LEN: usize = 64;

/// Length below which `Estimate` prefers the quadratic kernel.
const DIRECT_ESTIMATE_LEN: usize = 8;

/// How a DST-I of a given length is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstAlgorithm {
    /// Complex FFT of length `2(N+1)` over the odd extension of the input.
    OddExtension,
    /// Sine-table summation, `O(N²)`.
    Direct,
}

enum Strategy {
    OddExtension(Arc<dyn Fft<Real>>),
    /// `sin(π t / (N+1))` for `t` in `0..2(N+1)`.
    Direct(Vec<Real>),
}

pub(crate) struct DstKernel {
    len: usize,
    strategy: Strategy,
}

/// Per-thread working memory of a kernel.
pub(crate) struct DstWork {
    extended: Vec<ComplexReal>,
    fft_scratch: Vec<ComplexReal>,
    staged: Vec<Real>,
}

impl DstKernel {
    pub fn new(len: usize, algorithm: DstAlgorithm, planner: &mut FftPlanner<Real>) -> Self {
        let period = 2 * (len + 1);
        let strategy = match algorithm {
            DstAlgorithm::OddExtension => Strategy::OddExtension(planner.plan_fft_forward(period)),
            DstAlgorithm::Direct => Strategy::Direct(
                (0..period)
                    .map(|t| (PI * t as Real / (len + 1) as Real).sin())
                    .collect(),
            ),
        };
        Self { len, strategy }
    }

    pub fn algorithm(&self) -> DstAlgorithm {
        match self.strategy {
            Strategy::OddExtension(_) => DstAlgorithm::OddExtension,
            Strategy::Direct(_) => DstAlgorithm::Direct,
        }
    }

    pub fn work(&self) -> DstWork {
        match &self.strategy {
            Strategy::OddExtension(fft) => DstWork {
                extended: vec![ComplexReal::default(); 2 * (self.len + 1)],
                fft_scratch: vec![ComplexReal::default(); fft.get_inplace_scratch_len()],
                staged: Vec::new(),
            },
            Strategy::Direct(_) => DstWork {
                extended: Vec::new(),
                fft_scratch: Vec::new(),
                staged: vec![0.0; self.len],
            },
        }
    }

    /// Transform `input[..N]` into `output[..N]`.
    pub fn apply(&self, input: &[Real], output: &mut [Real], work: &mut DstWork) {
        self.stage(&input[..self.len], work);
        self.emit(&mut output[..self.len], work);
    }

    /// Transform `data[..N]` in place.
    pub fn apply_in_place(&self, data: &mut [Real], work: &mut DstWork) {
        let data = &mut data[..self.len];
        self.stage(data, work);
        self.emit(data, work);
    }

    fn stage(&self, input: &[Real], work: &mut DstWork) {
        match self.strategy {
            Strategy::OddExtension(_) => {
                let n = self.len;
                let ext = &mut work.extended;
                ext[0] = ComplexReal::default();
                ext[n + 1] = ComplexReal::default();
                for (j, &x) in input.iter().enumerate() {
                    ext[j + 1] = ComplexReal::new(x, 0.0);
                    ext[2 * n + 1 - j] = ComplexReal::new(-x, 0.0);
                }
            }
            Strategy::Direct(_) => work.staged.copy_from_slice(input),
        }
    }

    fn emit(&self, output: &mut [Real], work: &mut DstWork) {
        match &self.strategy {
            Strategy::OddExtension(fft) => {
                fft.process_with_scratch(&mut work.extended, &mut work.fft_scratch);
                // The odd extension has a purely imaginary spectrum: Z[k+1] = -i Y[k].
                for (k, value) in output.iter_mut().enumerate() {
                    *value = -work.extended[k + 1].im;
                }
            }
            Strategy::Direct(sines) => {
                let period = sines.len();
                for (k, value) in output.iter_mut().enumerate() {
                    let mut sum = 0.0;
                    for (j, &x) in work.staged.iter().enumerate() {
                        sum += x * sines[((j + 1) * (k + 1)) % period];
                    }
                    *value = 2.0 * sum;
                }
            }
        }
    }
}

/// Heuristic choice used by `PlanRigor::Estimate`.
pub(crate) fn estimate(len: usize) -> DstAlgorithm {
    if len <= DIRECT_ESTIMATE_LEN {
        DstAlgorithm::Direct
    } else {
        DstAlgorithm::OddExtension
    }
}

/// Time every candidate kernel on a synthetic signal and return the fastest.
pub(crate) fn measure(len: usize, planner: &mut FftPlanner<Real>) -> DstAlgorithm {
    if len > DIRECT_MAX_LEN {
        return DstAlgorithm::OddExtension;
    }

    let signal: Vec<Real> = (0..len).map(|j| ((j * 7 + 3) % 11) as Real - 5.0).collect();
    let mut output = vec![0.0; len];
    let reps = (4096 / len).max(4);

    let mut best = (DstAlgorithm::OddExtension, Duration::MAX);
    for algorithm in [DstAlgorithm::OddExtension, DstAlgorithm::Direct] {
        let kernel = DstKernel::new(len, algorithm, planner);
        let mut work = kernel.work();
        kernel.apply(&signal, &mut output, &mut work);
        let start = Instant::now();
        for _ in 0..reps {
            kernel.apply(&signal, &mut output, &mut work);
        }
        let elapsed = start.elapsed();
        if elapsed < best.1 {
            best = (algorithm, elapsed);
        }
    }
    best.0
}
