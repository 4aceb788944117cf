#![cfg(test)]

use super::field::{PoissonFields, Real};
use super::grid::Grid2D;

#[test]
fn zeros_allocates_every_buffer_for_the_grid() {
    let grid = Grid2D::new(3, 5, 0.1, 0.2);
    let fields = PoissonFields::zeros(grid);
    assert_eq!(fields.bx.len(), 5);
    assert_eq!(fields.ex.len(), 5);
    assert_eq!(fields.by.len(), 3);
    assert_eq!(fields.ey.len(), 3);
    assert_eq!(fields.rhs.len(), 15);
    assert_eq!(fields.solution.len(), 15);
    assert!(fields.matches(grid));
    assert!(!fields.matches(Grid2D::new(5, 3, 0.1, 0.2)));
}

#[test]
fn idx_is_row_major_along_x() {
    let grid = Grid2D::new(4, 3, 1.0, 1.0);
    assert_eq!(grid.idx(0, 0), 0);
    assert_eq!(grid.idx(3, 0), 3);
    assert_eq!(grid.idx(0, 1), 4);
    assert_eq!(grid.idx(2, 2), 10);
    assert_eq!(grid.len(), 12);
    assert!(!grid.is_empty());
}

#[test]
fn coordinates_skip_the_boundary() {
    let grid = Grid2D::new(4, 3, 0.5, 0.25);
    assert_eq!(grid.x(0), 0.5);
    assert_eq!(grid.x(3), 2.0);
    assert_eq!(grid.y(0), 0.25);
    assert_eq!(grid.ratio(), 0.5);
}

#[test]
fn sample_places_boundaries_on_the_right_lines() {
    let grid = Grid2D::new(3, 4, 1.0, 1.0);
    let fields = PoissonFields::sample(grid, |x, y| 10.0 * x + y, |x, y| x * y);

    // bx at x = 0, ex at x = m + 1.
    for k in 0..grid.n {
        let y = (k + 1) as Real;
        assert_eq!(fields.bx[k], y);
        assert_eq!(fields.ex[k], 40.0 + y);
    }
    // by at y = 0, ey on the last interior row.
    for i in 0..grid.m {
        let x = (i + 1) as Real;
        assert_eq!(fields.by[i], 10.0 * x);
        assert_eq!(fields.ey[i], 10.0 * x + 4.0);
    }
    assert_eq!(fields.rhs[grid.idx(2, 1)], 6.0);
    assert!(fields.solution.iter().all(|&v| v == 0.0));
}
