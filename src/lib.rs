//! Tricubic spline interpolation on rectilinear 3D grids, with analytic
//! gradients and pure second derivatives.
//!
//! Given function values and the seven derivative kinds
//! (df/dx, df/dy, df/dz, d2f/dxdy, d2f/dxdz, d2f/dydz, d3f/dxdydz) at every
//! grid vertex, each cell gets the unique tricubic polynomial that matches
//! all of them at its 8 corners. The result is continuous with continuous
//! gradient across cell faces.
//!
//! # Performance Scalings
//! Building a cell is a fixed linear solve of 64 unknowns, done as three
//! separable passes of 1D Hermite fits. Construction is parallelized over
//! cells with rayon when the `parallel` feature is enabled (the default).
//!
//! Each query costs one index search per axis plus a 64-term dot product.
//! On axes with unit spacing the index is computed directly; otherwise a
//! bisection search takes log2(axis length) iterations.
//!
//! | Operation                     | RAM        | Cost                                |
//! |-------------------------------|------------|-------------------------------------|
//! | build                         | 512 B/cell | O(cells)                            |
//! | value / value_d1 / value_d2   | O(1)       | O(64) + log2(axis length) per axis  |
//! | value_with_table              | O(1)       | O(64)                               |
//! | sample                        | O(steps^3) | O(64) per output point              |
//!
//! Cells may be stored in single precision at 256 B/cell.
//!
//! # Example
//! ```rust
//! use tricubic::{Grid3, SampleBundle, TricubicBuilder};
//!
//! // Samples of f = x^2 + y - z and its derivatives
//! let x = [0.0, 1.0, 2.0, 3.0];
//! let y = [0.0, 0.5, 1.0];
//! let z = [0.0, 2.0];
//! let shape = [x.len(), y.len(), z.len()];
//! let f = Grid3::from_fn(shape, |i, j, k| x[i] * x[i] + y[j] - z[k]);
//! let dx = Grid3::from_fn(shape, |i, _, _| 2.0 * x[i]);
//! let dy = Grid3::from_fn(shape, |_, _, _| 1.0);
//! let dz = Grid3::from_fn(shape, |_, _, _| -1.0);
//! let zero = Grid3::zeros(shape);
//! let samples = SampleBundle::new([&f, &dx, &dy, &dz, &zero, &zero, &zero, &zero]);
//!
//! let func = TricubicBuilder::new(&x, &y, &z).build(&samples).unwrap();
//!
//! let (v, grad, d2) = func.value_d2(1.5, 0.25, 1.0).unwrap();
//! assert!((v - (2.25 + 0.25 - 1.0)).abs() < 1e-12);
//! assert!((grad[0] - 3.0).abs() < 1e-12);
//! assert!((d2[0] - 2.0).abs() < 1e-12);
//!
//! // Search for the minimum
//! let opt = func.search(false, 20, 0.0, 1e-12).unwrap();
//! assert!(opt.position[0].abs() < 1e-6);
//! ```
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

pub mod error;
pub use error::{Result, TricubicError};

pub mod axis;
pub use axis::Axis;

pub mod coefficients;

pub mod power_table;
pub use power_table::{PowerTable, ScaledPowerTables, SplinePosition};

pub mod cell;
pub use cell::{Cell, CellFunction, Optimum};

pub mod provider;
pub use provider::{FnProvider, Grid3, SampleBundle, ValueProvider};

pub mod config;
pub use config::{BuildOptions, Parallelism};

pub mod progress;
pub use progress::{LogProgress, ProgressCounter, ProgressSink};

pub mod grid;
pub use grid::{TricubicBuilder, TricubicFunction};

pub mod sample;
pub use sample::{SampleProcedure, SampledGrid};

pub mod io;

pub mod derivatives;
pub use derivatives::{estimate_derivatives, DerivativeGrids};

pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
