//! Per-wavenumber tridiagonal elimination ("shutter" method).
//!
//! After the sine transform diagonalises the X part of the Laplacian, each
//! wavenumber `p` leaves an independent system along Y:
//!
//! ```text
//! u[k-1] - b(p) u[k] + u[k+1] = hy² f[k]
//! b(p) = 2 + 4 (hy/hx · sin(π (p+1) · freq_factor))²
//! ```
//!
//! solved by forward elimination and back substitution (Thomas algorithm)
//! with `a = c = 1`. `b(p) > 2` keeps every pivot `b(p) - alpha[k-1]` at
//! least `b(p) - 1`, so no pivoting is done.
//!
//! Results are written pre-multiplied by `scale`, the normalisation the
//! inverse transform needs.
//!
//! # Layouts
//!
//! - Real: DST-I coefficients, one column per wavenumber `p = 0..m`,
//!   `freq_factor = scale = 1 / (2(m+1))`.
//! - Complex: complex spectrum rows of width `m/2`, one system per
//!   `p = 0..m/2`, `freq_factor = 1/m`, `scale = 1 / (2m)`.
//!
//! Neither routine validates buffer sizes.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

use crate::field::{ComplexReal, Real, PI};
use crate::grid::Grid2D;

/// Boundary condition imposed on one Y side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// The boundary vector holds values.
    #[default]
    Dirichlet,
    /// The boundary vector holds discrete fluxes: `u[0] - u[-1] = hy·g` below,
    /// `u[n-1] - u[n-2] = hy·g` on top.
    Neumann,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct YBoundaries {
    #[serde(default)]
    pub lower: BoundaryKind,
    #[serde(default)]
    pub upper: BoundaryKind,
}

impl YBoundaries {
    pub const DIRICHLET: Self = Self {
        lower: BoundaryKind::Dirichlet,
        upper: BoundaryKind::Dirichlet,
    };
}

/// Elimination coefficients for one backend. `beta` is real or complex
/// depending on the variant; `alpha` is always real.
#[derive(Debug, Clone)]
pub struct ShutterScratch<T = Real> {
    pub alpha: Vec<Real>,
    pub beta: Vec<T>,
}

impl<T: Copy + Default> ShutterScratch<T> {
    pub fn new(n: usize) -> Self {
        Self {
            alpha: vec![0.0; n],
            beta: vec![T::default(); n],
        }
    }
}

/// Diagonal of the system for wavenumber `p`.
#[inline]
pub fn diagonal_coefficient(p: usize, ratio: Real, freq_factor: Real) -> Real {
    let val = ratio * (PI * (p + 1) as Real * freq_factor).sin();
    2.0 + 4.0 * val * val
}

/// Frequency factor and output scale of the real variant.
#[inline]
pub fn real_scale(m: usize) -> Real {
    0.5 / (m + 1) as Real
}

/// Output scale of the complex variant.
#[inline]
pub fn complex_scale(m: usize) -> Real {
    0.5 / m as Real
}

/// Solve the `m` real systems of a DST-I spectrum.
///
/// `coeffs` holds the transformed right-hand side, `lower`/`upper` the
/// transformed Y boundary vectors; `out` receives the scaled spectral
/// solution. Both spectra are `m × n`, row-major.
pub fn eliminate_real(
    grid: &Grid2D,
    kinds: YBoundaries,
    coeffs: &[Real],
    out: &mut [Real],
    scratch: &mut ShutterScratch,
    lower: &[Real],
    upper: &[Real],
) {
    let m = grid.m;
    let scale = real_scale(m);
    let system = System {
        width: m,
        n: grid.n,
        hy: grid.hy,
        scale,
        kinds,
    };
    for p in 0..m {
        let b = diagonal_coefficient(p, grid.ratio(), scale);
        system.sweep(
            p,
            b,
            coeffs,
            out,
            &mut scratch.alpha,
            &mut scratch.beta,
            lower[p],
            upper[p],
        );
    }
}

/// Solve the `m/2` complex systems of a complex spectrum with Dirichlet
/// data on both Y sides. Rows of `coeffs`/`out` are `m/2` wide.
#[allow(clippy::too_many_arguments)]
pub fn eliminate_complex(
    m: usize,
    n: usize,
    hx: Real,
    hy: Real,
    coeffs: &[ComplexReal],
    out: &mut [ComplexReal],
    scratch: &mut ShutterScratch<ComplexReal>,
    lower: &[ComplexReal],
    upper: &[ComplexReal],
) {
    let freq_factor = 1.0 / m as Real;
    let half = m / 2;
    let system = System {
        width: half,
        n,
        hy,
        scale: complex_scale(m),
        kinds: YBoundaries::DIRICHLET,
    };
    for p in 0..half {
        let b = diagonal_coefficient(p, hy / hx, freq_factor);
        system.sweep(
            p,
            b,
            coeffs,
            out,
            &mut scratch.alpha,
            &mut scratch.beta,
            lower[p],
            upper[p],
        );
    }
}

struct System {
    width: usize,
    n: usize,
    hy: Real,
    scale: Real,
    kinds: YBoundaries,
}

impl System {
    #[allow(clippy::too_many_arguments)]
    #[inline]
    fn sweep<T>(
        &self,
        p: usize,
        b: Real,
        coeffs: &[T],
        out: &mut [T],
        alpha: &mut [Real],
        beta: &mut [T],
        lower: T,
        upper: T,
    ) where
        T: Copy + Add<Output = T> + Sub<Output = T> + Mul<Real, Output = T>,
    {
        let (w, n, hy, scale) = (self.width, self.n, self.hy, self.scale);
        let hy2 = hy * hy;

        // ground b.c.
        match self.kinds.lower {
            BoundaryKind::Dirichlet => {
                alpha[0] = 0.0;
                beta[0] = lower;
            }
            BoundaryKind::Neumann => {
                alpha[0] = 1.0;
                beta[0] = lower * -hy;
            }
        }

        for k in 1..n {
            let pivot = 1.0 / (b - alpha[k - 1]);
            alpha[k] = pivot;
            beta[k] = (beta[k - 1] - coeffs[p + (k - 1) * w] * hy2) * pivot;
        }

        // top b.c.
        out[p + (n - 1) * w] = match self.kinds.upper {
            BoundaryKind::Dirichlet => upper * scale,
            BoundaryKind::Neumann => (beta[n - 1] + upper * hy) * (scale / (1.0 - alpha[n - 1])),
        };

        for k in (1..n).rev() {
            out[p + (k - 1) * w] = out[p + k * w] * alpha[k] + beta[k] * scale;
        }
    }
}
