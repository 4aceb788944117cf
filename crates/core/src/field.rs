//! Precision aliases and the buffers a Poisson solve reads and writes.
//!
//! # Precision
//!
//! Precision is a single build-wide choice. By default every array and
//! coefficient is `f64`; the `single-precision` feature switches the whole
//! crate to `f32`. The two are never mixed within one build.

use crate::grid::Grid2D;

#[cfg(not(feature = "single-precision"))]
pub type Real = f64;

#[cfg(feature = "single-precision")]
pub type Real = f32;

#[cfg(not(feature = "single-precision"))]
pub use std::f64::consts::PI;

#[cfg(feature = "single-precision")]
pub use std::f32::consts::PI;

/// Complex scalar in the build precision.
pub type ComplexReal = num_complex::Complex<Real>;

/// Boundary vectors, right-hand side and solution of one problem.
///
/// Layout is row-major along the transform axis: `rhs[k * m + i]` is the
/// value at column `i` of row `k`. `bx`/`ex` hold one value per row (length
/// `n`), `by`/`ey` one value per column (length `m`).
///
/// A solve consumes `rhs`: it is folded with the X boundaries and then
/// reused as scratch for transformed coefficients. Refill it before solving
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct PoissonFields {
    pub bx: Vec<Real>,
    pub ex: Vec<Real>,
    pub by: Vec<Real>,
    pub ey: Vec<Real>,
    pub rhs: Vec<Real>,
    pub solution: Vec<Real>,
}

impl PoissonFields {
    pub fn zeros(grid: Grid2D) -> Self {
        Self {
            bx: vec![0.0; grid.n],
            ex: vec![0.0; grid.n],
            by: vec![0.0; grid.m],
            ey: vec![0.0; grid.m],
            rhs: vec![0.0; grid.len()],
            solution: vec![0.0; grid.len()],
        }
    }

    /// Sample boundaries and right-hand side from closures over physical
    /// coordinates. `bx`/`ex` are taken at x = 0 and x = (m + 1)·hx, `by` at
    /// y = 0, and `ey` on the last interior row.
    pub fn sample<U, F>(grid: Grid2D, boundary: U, rhs: F) -> Self
    where
        U: Fn(Real, Real) -> Real,
        F: Fn(Real, Real) -> Real,
    {
        let mut fields = Self::zeros(grid);
        let x_end = grid.hx * (grid.m + 1) as Real;
        let y_top = grid.y(grid.n.saturating_sub(1));
        for k in 0..grid.n {
            let y = grid.y(k);
            fields.bx[k] = boundary(0.0, y);
            fields.ex[k] = boundary(x_end, y);
            for i in 0..grid.m {
                fields.rhs[grid.idx(i, k)] = rhs(grid.x(i), y);
            }
        }
        for i in 0..grid.m {
            let x = grid.x(i);
            fields.by[i] = boundary(x, 0.0);
            fields.ey[i] = boundary(x, y_top);
        }
        fields
    }

    pub fn matches(&self, grid: Grid2D) -> bool {
        self.bx.len() == grid.n
            && self.ex.len() == grid.n
            && self.by.len() == grid.m
            && self.ey.len() == grid.m
            && self.rhs.len() == grid.len()
            && self.solution.len() == grid.len()
    }
}
