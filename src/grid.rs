//! Tricubic interpolating function over a rectilinear 3D grid.
//!
//! ```rust
//! use tricubic::{FnProvider, SampleBundle, TricubicBuilder};
//!
//! // f = x * y * z has all of its derivatives in closed form
//! let x = [0.0, 1.0, 2.0];
//! let y = [0.0, 0.5, 1.5];
//! let z = [-1.0, 1.0];
//! let at = |i: usize, j: usize, k: usize| (x[i], y[j], z[k]);
//! let shape = [3, 3, 2];
//!
//! let f = FnProvider::new(shape, |i, j, k| { let (x, y, z) = at(i, j, k); x * y * z });
//! let dx = FnProvider::new(shape, |i, j, k| { let (_, y, z) = at(i, j, k); y * z });
//! let dy = FnProvider::new(shape, |i, j, k| { let (x, _, z) = at(i, j, k); x * z });
//! let dz = FnProvider::new(shape, |i, j, k| { let (x, y, _) = at(i, j, k); x * y });
//! let dxy = FnProvider::new(shape, |i, j, k| at(i, j, k).2);
//! let dxz = FnProvider::new(shape, |i, j, k| at(i, j, k).1);
//! let dyz = FnProvider::new(shape, |i, j, k| at(i, j, k).0);
//! let dxyz = FnProvider::new(shape, |_, _, _| 1.0);
//! let samples = SampleBundle::new([&f, &dx, &dy, &dz, &dxy, &dxz, &dyz, &dxyz]);
//!
//! let func = TricubicBuilder::new(&x, &y, &z).build(&samples).unwrap();
//! let (v, grad) = func.value_d1(1.5, 0.25, 0.5).unwrap();
//! assert!((v - 1.5 * 0.25 * 0.5).abs() < 1e-12);
//! assert!((grad[0] - 0.25 * 0.5).abs() < 1e-12);
//!
//! // Points outside the grid are rejected
//! assert!(func.value(2.5, 0.0, 0.0).is_err());
//! ```
use std::sync::Arc;

use crate::axis::Axis;
use crate::cell::{Cell, Optimum};
use crate::coefficients::{solve, N_COEFFS};
use crate::config::{BuildOptions, Parallelism};
use crate::error::{Result, TricubicError};
use crate::power_table::{PowerTable, ScaledPowerTables, SplinePosition};
use crate::progress::ProgressSink;
use crate::provider::SampleBundle;

/// Builds a [`TricubicFunction`] from axis samples and the eight
/// value/derivative arrays.
#[derive(Clone, Debug)]
pub struct TricubicBuilder {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    options: BuildOptions,
    parallelism: Parallelism,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl TricubicBuilder {
    /// Start a builder for the given axis samples, which must each have at
    /// least 2 strictly increasing entries.
    pub fn new(x: &[f64], y: &[f64], z: &[f64]) -> Self {
        Self {
            x: x.to_vec(),
            y: y.to_vec(),
            z: z.to_vec(),
            options: BuildOptions::default(),
            parallelism: Parallelism::default(),
            progress: None,
        }
    }

    pub fn options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn single_precision(mut self, single_precision: bool) -> Self {
        self.options.single_precision = single_precision;
        self
    }

    pub fn task_size(mut self, task_size: usize) -> Self {
        self.options.task_size = task_size;
        self
    }

    pub fn integer_fast_path(mut self, enabled: bool) -> Self {
        self.options.integer_fast_path = enabled;
        self
    }

    pub fn parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    fn axes(&self) -> Result<[Axis; 3]> {
        let mut axes = [
            Axis::new('x', &self.x)?,
            Axis::new('y', &self.y)?,
            Axis::new('z', &self.z)?,
        ];
        if !self.options.integer_fast_path {
            axes = axes.map(Axis::without_integer_path);
        }
        Ok(axes)
    }

    /// Solve for every cell of the grid.
    ///
    /// # Errors
    /// * If any axis has fewer than 2 entries, is not strictly increasing, or
    ///   has non-finite entries
    /// * If the shape of any sample array does not match the axis lengths
    pub fn build(&self, samples: &SampleBundle) -> Result<TricubicFunction> {
        let [x, y, z] = self.axes()?;
        samples.check_shape([x.len(), y.len(), z.len()])?;

        let dims = [x.cells(), y.cells(), z.cells()];
        let n = dims.iter().product::<usize>();
        let single = self.options.single_precision;
        let progress = self.progress.as_deref();
        if let Some(p) = progress {
            p.start(n);
        }

        let build_cell = |index: usize| -> Cell {
            let [i, j, k] = unflatten(index, dims);
            let beta = gather_beta(samples, [&x, &y, &z], i, j, k);
            let cell = Cell::new(&solve(&beta), single);
            if let Some(p) = progress {
                p.tick();
            }
            cell
        };

        let parallel = !self.parallelism.is_serial() && n > self.options.task_size;
        tracing::debug!(
            "Building {} tricubic cells {:?} ({}, {})",
            n,
            dims,
            if single { "f32" } else { "f64" },
            if parallel { "parallel" } else { "serial" }
        );
        let cells = if parallel {
            self.build_parallel(n, &build_cell)
        } else {
            (0..n).map(build_cell).collect()
        };

        Ok(TricubicFunction { x, y, z, cells })
    }

    #[cfg(feature = "parallel")]
    fn build_parallel<F>(&self, n: usize, build_cell: &F) -> Vec<Cell>
    where
        F: Fn(usize) -> Cell + Sync,
    {
        use rayon::prelude::*;

        let task_size = self.options.task_size.max(1);
        let run = || {
            (0..n)
                .into_par_iter()
                .with_min_len(task_size)
                .map(build_cell)
                .collect::<Vec<Cell>>()
        };
        match &self.parallelism {
            Parallelism::Pool(pool) => pool.install(run),
            _ => run(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn build_parallel<F>(&self, n: usize, build_cell: &F) -> Vec<Cell>
    where
        F: Fn(usize) -> Cell + Sync,
    {
        (0..n).map(build_cell).collect()
    }
}

/// Split a flat cell index into (i, j, k), with k varying fastest.
#[inline(always)]
fn unflatten(index: usize, dims: [usize; 3]) -> [usize; 3] {
    let k = index % dims[2];
    let ij = index / dims[2];
    [ij / dims[1], ij % dims[1], k]
}

/// Collect the 64 solver inputs for cell (i, j, k), converting derivatives
/// from axis units to cell units on axes that are not unit-spaced.
fn gather_beta(
    samples: &SampleBundle,
    axes: [&Axis; 3],
    i: usize,
    j: usize,
    k: usize,
) -> [f64; N_COEFFS] {
    let width = |axis: &Axis, c: usize| {
        if axis.is_integer() {
            1.0
        } else {
            axis.cell_scale(c)
        }
    };
    let (sx, sy, sz) = (width(axes[0], i), width(axes[1], j), width(axes[2], k));

    // Chain rule factor for each derivative kind, in solver order
    let factor = [1.0, sx, sy, sz, sx * sy, sx * sz, sy * sz, sx * sy * sz];

    let mut beta = [0.0; N_COEFFS];
    for kind in 0..8 {
        for corner in 0..8 {
            let (cx, cy, cz) = (corner & 1, (corner >> 1) & 1, corner >> 2);
            beta[kind * 8 + corner] = samples.get(kind, i + cx, j + cy, k + cz) * factor[kind];
        }
    }
    beta
}

/// A tricubic spline over a rectilinear grid, giving values, gradients,
/// and pure second partial derivatives anywhere inside the sampled range.
///
/// Queries take `&self` and are safe to run concurrently. Precision changes
/// take `&mut self`.
#[derive(Clone, Debug, PartialEq)]
pub struct TricubicFunction {
    x: Axis,
    y: Axis,
    z: Axis,

    /// One cell per interior grid cell, size prod(axis.cells()),
    /// i outermost and k innermost
    cells: Vec<Cell>,
}

impl TricubicFunction {
    /// Assemble a function from axes and already solved cells, ordered with
    /// k varying fastest.
    ///
    /// # Errors
    /// * If any axis is invalid
    /// * If the number of cells does not match the axes
    pub fn from_cells(x: &[f64], y: &[f64], z: &[f64], cells: Vec<Cell>) -> Result<Self> {
        let (x, y, z) = (Axis::new('x', x)?, Axis::new('y', y)?, Axis::new('z', z)?);
        let dims = [x.cells(), y.cells(), z.cells()];
        let n: usize = dims.iter().product();
        if cells.len() != n {
            return Err(TricubicError::DimensionMismatch {
                what: "cells",
                expected: dims.to_vec(),
                actual: vec![cells.len()],
            });
        }
        Ok(Self { x, y, z, cells })
    }

    pub fn axis_x(&self) -> &Axis {
        &self.x
    }

    pub fn axis_y(&self) -> &Axis {
        &self.y
    }

    pub fn axis_z(&self) -> &Axis {
        &self.z
    }

    /// Number of samples along each axis
    pub fn dims(&self) -> [usize; 3] {
        [self.x.len(), self.y.len(), self.z.len()]
    }

    /// Number of cells along each axis
    pub fn cell_dims(&self) -> [usize; 3] {
        [self.x.cells(), self.y.cells(), self.z.cells()]
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn min_x(&self) -> f64 {
        self.x.min()
    }

    pub fn max_x(&self) -> f64 {
        self.x.max()
    }

    pub fn min_y(&self) -> f64 {
        self.y.min()
    }

    pub fn max_y(&self) -> f64 {
        self.y.max()
    }

    pub fn min_z(&self) -> f64 {
        self.z.min()
    }

    pub fn max_z(&self) -> f64 {
        self.z.max()
    }

    /// Largest cell index along x
    pub fn max_x_spline_position(&self) -> usize {
        self.x.max_spline_position()
    }

    pub fn max_y_spline_position(&self) -> usize {
        self.y.max_spline_position()
    }

    pub fn max_z_spline_position(&self) -> usize {
        self.z.max_spline_position()
    }

    /// x sample at index `i`
    pub fn x_value(&self, i: usize) -> f64 {
        self.x.value(i)
    }

    pub fn y_value(&self, j: usize) -> f64 {
        self.y.value(j)
    }

    pub fn z_value(&self, k: usize) -> f64 {
        self.z.value(k)
    }

    pub fn is_uniform(&self) -> bool {
        self.x.is_uniform() && self.y.is_uniform() && self.z.is_uniform()
    }

    pub fn is_integer(&self) -> bool {
        self.x.is_integer() && self.y.is_integer() && self.z.is_integer()
    }

    /// True if every cell stores single precision coefficients
    pub fn is_single_precision(&self) -> bool {
        self.cells.iter().all(Cell::is_single_precision)
    }

    /// The spacing along each axis.
    ///
    /// # Errors
    /// * If any axis is not uniform
    pub fn scale(&self) -> Result<[f64; 3]> {
        Ok([self.x.scale()?, self.y.scale()?, self.z.scale()?])
    }

    /// Inclusive check that a point is inside the sampled range.
    pub fn is_valid_point(&self, x: f64, y: f64, z: f64) -> bool {
        self.x.contains(x) && self.y.contains(y) && self.z.contains(z)
    }

    #[inline(always)]
    fn flat_index(&self, i: usize, j: usize, k: usize) -> Result<usize> {
        let [ni, nj, nk] = self.cell_dims();
        if i >= ni || j >= nj || k >= nk {
            return Err(TricubicError::CellIndex {
                index: [i, j, k],
                dims: [ni, nj, nk],
            });
        }
        Ok((i * nj + j) * nk + k)
    }

    /// The cell with lower corner at sample (i, j, k).
    ///
    /// # Errors
    /// * If (i, j, k) is not a cell index
    #[inline]
    pub fn cell(&self, i: usize, j: usize, k: usize) -> Result<&Cell> {
        Ok(&self.cells[self.flat_index(i, j, k)?])
    }

    /// All cells, k varying fastest
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Copy of the 64 coefficients of cell (i, j, k).
    pub fn coefficients(&self, i: usize, j: usize, k: usize) -> Result<[f64; N_COEFFS]> {
        Ok(self.cell(i, j, k)?.coefficients())
    }

    /// Resolve an x coordinate to a cell and normalized offset.
    ///
    /// # Errors
    /// * If `v` is outside the x range
    pub fn x_spline_position(&self, v: f64) -> Result<SplinePosition> {
        spline_position(&self.x, v)
    }

    pub fn y_spline_position(&self, v: f64) -> Result<SplinePosition> {
        spline_position(&self.y, v)
    }

    pub fn z_spline_position(&self, v: f64) -> Result<SplinePosition> {
        spline_position(&self.z, v)
    }

    /// Monomials for a set of positions, for use with the table queries.
    pub fn compute_power_table(
        &self,
        x: &SplinePosition,
        y: &SplinePosition,
        z: &SplinePosition,
    ) -> PowerTable {
        PowerTable::from_positions(x, y, z)
    }

    /// Interpolated value at (x, y, z).
    ///
    /// # Errors
    /// * If the point is outside the sampled range
    #[inline]
    pub fn value(&self, x: f64, y: f64, z: f64) -> Result<f64> {
        let (i, tx) = self.x.normalize(x)?;
        let (j, ty) = self.y.normalize(y)?;
        let (k, tz) = self.z.normalize(z)?;
        Ok(self.cell(i, j, k)?.value(tx, ty, tz))
    }

    /// Interpolated value and gradient at (x, y, z).
    #[inline]
    pub fn value_d1(&self, x: f64, y: f64, z: f64) -> Result<(f64, [f64; 3])> {
        let (px, py, pz) = self.positions(x, y, z)?;
        self.value_d1_at(&px, &py, &pz)
    }

    /// Interpolated value, gradient and pure second partials
    /// (d2/dx2, d2/dy2, d2/dz2) at (x, y, z).
    #[inline]
    pub fn value_d2(&self, x: f64, y: f64, z: f64) -> Result<(f64, [f64; 3], [f64; 3])> {
        let (px, py, pz) = self.positions(x, y, z)?;
        self.value_d2_at(&px, &py, &pz)
    }

    fn positions(
        &self,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(SplinePosition, SplinePosition, SplinePosition)> {
        Ok((
            self.x_spline_position(x)?,
            self.y_spline_position(y)?,
            self.z_spline_position(z)?,
        ))
    }

    /// Interpolated value at precomputed positions.
    ///
    /// # Errors
    /// * If the positions do not refer to a cell of this function
    #[inline]
    pub fn value_at(
        &self,
        x: &SplinePosition,
        y: &SplinePosition,
        z: &SplinePosition,
    ) -> Result<f64> {
        let cell = self.cell(x.index, y.index, z.index)?;
        Ok(cell.value(x.offset, y.offset, z.offset))
    }

    /// Interpolated value and gradient at precomputed positions.
    #[inline]
    pub fn value_d1_at(
        &self,
        x: &SplinePosition,
        y: &SplinePosition,
        z: &SplinePosition,
    ) -> Result<(f64, [f64; 3])> {
        let cell = self.cell(x.index, y.index, z.index)?;
        let (v, d1) = cell.value_d1(x.offset, y.offset, z.offset);
        Ok((
            v,
            [
                x.scale_derivative1(d1[0]),
                y.scale_derivative1(d1[1]),
                z.scale_derivative1(d1[2]),
            ],
        ))
    }

    /// Interpolated value, gradient and pure second partials at precomputed positions.
    #[inline]
    pub fn value_d2_at(
        &self,
        x: &SplinePosition,
        y: &SplinePosition,
        z: &SplinePosition,
    ) -> Result<(f64, [f64; 3], [f64; 3])> {
        let cell = self.cell(x.index, y.index, z.index)?;
        let (v, d1, d2) = cell.value_d2(x.offset, y.offset, z.offset);
        Ok((
            v,
            [
                x.scale_derivative1(d1[0]),
                y.scale_derivative1(d1[1]),
                z.scale_derivative1(d1[2]),
            ],
            [
                x.scale_derivative2(d2[0]),
                y.scale_derivative2(d2[1]),
                z.scale_derivative2(d2[2]),
            ],
        ))
    }

    /// Value of cell (i, j, k) from precomputed monomials.
    ///
    /// # Errors
    /// * If (i, j, k) is not a cell index
    #[inline]
    pub fn value_with_table(
        &self,
        i: usize,
        j: usize,
        k: usize,
        table: &PowerTable,
    ) -> Result<f64> {
        Ok(self.cell(i, j, k)?.value_with_table(table))
    }

    /// Value and gradient of cell (i, j, k) from precomputed monomials,
    /// with the gradient in axis units.
    #[inline]
    pub fn value_d1_with_tables(
        &self,
        i: usize,
        j: usize,
        k: usize,
        tables: &ScaledPowerTables,
    ) -> Result<(f64, [f64; 3])> {
        let (v, d1) = self.cell(i, j, k)?.value_d1_with_tables(tables);
        let s = self.cell_scales(i, j, k);
        Ok((v, [d1[0] / s[0], d1[1] / s[1], d1[2] / s[2]]))
    }

    /// Value, gradient and pure second partials of cell (i, j, k) from
    /// precomputed monomials, with derivatives in axis units.
    #[inline]
    pub fn value_d2_with_tables(
        &self,
        i: usize,
        j: usize,
        k: usize,
        tables: &ScaledPowerTables,
    ) -> Result<(f64, [f64; 3], [f64; 3])> {
        let (v, d1, d2) = self.cell(i, j, k)?.value_d2_with_tables(tables);
        let s = self.cell_scales(i, j, k);
        Ok((
            v,
            [d1[0] / s[0], d1[1] / s[1], d1[2] / s[2]],
            [
                d2[0] / (s[0] * s[0]),
                d2[1] / (s[1] * s[1]),
                d2[2] / (s[2] * s[2]),
            ],
        ))
    }

    /// Width of cell (i, j, k) along each axis, 1 on integer axes.
    /// Indices must already be validated.
    #[inline(always)]
    fn cell_scales(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        let width = |axis: &Axis, c: usize| {
            if axis.is_integer() {
                1.0
            } else {
                axis.cell_scale(c)
            }
        };
        [width(&self.x, i), width(&self.y, j), width(&self.z, k)]
    }

    /// Interpolate on a contiguous list of observation points.
    ///
    /// # Errors
    /// * If the coordinate slices and the output differ in length
    /// * If any point is outside the sampled range
    pub fn interp(&self, obs: [&[f64]; 3], out: &mut [f64]) -> Result<()> {
        let n = out.len();
        if !obs.iter().all(|o| o.len() == n) {
            return Err(TricubicError::DimensionMismatch {
                what: "observation points",
                expected: vec![n; 3],
                actual: obs.iter().map(|o| o.len()).collect(),
            });
        }
        for i in 0..n {
            out[i] = self.value(obs[0][i], obs[1][i], obs[2][i])?;
        }
        Ok(())
    }

    /// Interpolate, allocating a new Vec for the output.
    ///
    /// For best results, use `interp` with preallocated output.
    pub fn interp_alloc(&self, obs: [&[f64]; 3]) -> Result<Vec<f64>> {
        let mut out = vec![0.0; obs[0].len()];
        self.interp(obs, &mut out)?;
        Ok(out)
    }

    /// Convert every cell to f32 storage. No-op for cells already in f32.
    pub fn to_single_precision(&mut self) {
        tracing::debug!("Converting {} cells to single precision", self.cells.len());
        for cell in self.cells.iter_mut() {
            if !cell.is_single_precision() {
                *cell = cell.to_single_precision();
            }
        }
    }

    /// Convert every cell to f64 storage. No-op for cells already in f64.
    pub fn to_double_precision(&mut self) {
        tracing::debug!("Converting {} cells to double precision", self.cells.len());
        for cell in self.cells.iter_mut() {
            if cell.is_single_precision() {
                *cell = cell.to_double_precision();
            }
        }
    }

    /// Cell in which to start a search: the cell whose origin has the best
    /// value, stepped back by one cell along each axis where the gradient at
    /// that origin points toward the previous cell.
    pub(crate) fn search_start(&self, maximum: bool) -> [usize; 3] {
        let mut best = 0;
        let mut best_value = self.cells[0].value000();
        for (n, cell) in self.cells.iter().enumerate().skip(1) {
            let v = cell.value000();
            let better = if maximum { v > best_value } else { v < best_value };
            if better {
                best = n;
                best_value = v;
            }
        }

        let (_, gradient) = self.cells[best].value000_d1();
        let mut index = unflatten(best, self.cell_dims());
        for d in 0..3 {
            let step_back = if maximum { gradient[d] < 0.0 } else { gradient[d] > 0.0 };
            if step_back {
                index[d] = index[d].saturating_sub(1);
            }
        }
        index
    }

    /// Search the whole grid for the maximum or minimum of the interpolant.
    ///
    /// The best cell origin is found by scanning all cells, and the local
    /// search of [`Cell::search`] is run within the cell that contains it,
    /// or the preceding cell along any axis where the gradient shows the
    /// optimum lies behind the origin.
    ///
    /// # Errors
    /// * If `refinements` is zero
    pub fn search(
        &self,
        maximum: bool,
        refinements: usize,
        relative_error: f64,
        absolute_error: f64,
    ) -> Result<Optimum> {
        let [i, j, k] = self.search_start(maximum);
        let local = self
            .cell(i, j, k)?
            .search(maximum, refinements, relative_error, absolute_error)?;
        let [tx, ty, tz] = local.position;
        let optimum = Optimum {
            position: [
                self.x.denormalize(i, tx),
                self.y.denormalize(j, ty),
                self.z.denormalize(k, tz),
            ],
            value: local.value,
        };
        tracing::debug!(
            "Search for {} in cell {:?} found {:?}",
            if maximum { "maximum" } else { "minimum" },
            [i, j, k],
            optimum
        );
        Ok(optimum)
    }
}

fn spline_position(axis: &Axis, v: f64) -> Result<SplinePosition> {
    let (i, t) = axis.normalize(v)?;
    let scale = if axis.is_integer() {
        None
    } else {
        Some(axis.cell_scale(i))
    };
    Ok(SplinePosition::new(i, t, scale))
}
