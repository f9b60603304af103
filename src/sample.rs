//! Dense resampling of a tricubic function onto a finer regular subdivision.
//!
//! Each cell is split into `n` equal steps per axis. Every output point then
//! sits at one of only `(nx + 1) * (ny + 1) * (nz + 1)` distinct offsets
//! within its cell, regardless of the number of cells, so the monomials for
//! each offset are computed once and shared by every cell.
use crate::axis::Axis;
use crate::error::{Result, TricubicError};
use crate::grid::TricubicFunction;
use crate::power_table::PowerTable;

/// Receives the output of [`TricubicFunction::sample`].
///
/// Calls arrive in order: `set_dimensions`, every `set_x`, every `set_y`,
/// every `set_z`, then `set_value` for each point with z outermost and x
/// innermost.
pub trait SampleProcedure {
    /// Number of output points along each axis
    fn set_dimensions(&mut self, nx: usize, ny: usize, nz: usize);

    fn set_x(&mut self, i: usize, x: f64);

    fn set_y(&mut self, j: usize, y: f64);

    fn set_z(&mut self, k: usize, z: f64);

    fn set_value(&mut self, i: usize, j: usize, k: usize, value: f64);
}

/// Collects a resampled grid in memory, x varying fastest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SampledGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub values: Vec<f64>,
}

impl SampledGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        (k * self.y.len() + j) * self.x.len() + i
    }

    /// Sampled value at output point (i, j, k).
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.values[self.offset(i, j, k)]
    }
}

impl SampleProcedure for SampledGrid {
    fn set_dimensions(&mut self, nx: usize, ny: usize, nz: usize) {
        self.x = vec![0.0; nx];
        self.y = vec![0.0; ny];
        self.z = vec![0.0; nz];
        self.values = vec![0.0; nx * ny * nz];
    }

    fn set_x(&mut self, i: usize, x: f64) {
        self.x[i] = x;
    }

    fn set_y(&mut self, j: usize, y: f64) {
        self.y[j] = y;
    }

    fn set_z(&mut self, k: usize, z: f64) {
        self.z[k] = z;
    }

    fn set_value(&mut self, i: usize, j: usize, k: usize, value: f64) {
        let n = self.offset(i, j, k);
        self.values[n] = value;
    }
}

/// Cell index and sub-step of output point `m` along an axis with `cells`
/// cells split into `n` steps each. The final point closes the last cell.
#[inline(always)]
fn split(m: usize, n: usize, cells: usize) -> (usize, usize) {
    if m == n * cells {
        (cells - 1, n)
    } else {
        (m / n, m % n)
    }
}

impl TricubicFunction {
    /// Evaluate the function on a grid with `nx`, `ny`, `nz` equal steps per
    /// cell along each axis, `n * cells + 1` points per axis, and hand the
    /// results to `procedure`.
    ///
    /// # Errors
    /// * If any of `nx`, `ny`, `nz` is zero
    /// * If the number of points along an axis overflows `usize`
    pub fn sample(
        &self,
        nx: usize,
        ny: usize,
        nz: usize,
        procedure: &mut impl SampleProcedure,
    ) -> Result<()> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(TricubicError::invalid_argument(format!(
                "sampling steps must be positive, got {:?}",
                [nx, ny, nz]
            )));
        }
        let [cx, cy, cz] = self.cell_dims();
        let points = |n: usize, cells: usize| {
            n.checked_mul(cells)
                .and_then(|m| m.checked_add(1))
                .ok_or_else(|| {
                    TricubicError::invalid_argument(format!(
                        "{n} steps over {cells} cells overflows the point count"
                    ))
                })
        };
        let (px, py, pz) = (points(nx, cx)?, points(ny, cy)?, points(nz, cz)?);
        tracing::debug!(
            "Sampling {} cells onto {:?} points",
            self.cell_count(),
            [px, py, pz]
        );
        procedure.set_dimensions(px, py, pz);

        let coordinate = |axis: &Axis, m: usize, n: usize| {
            let (c, s) = split(m, n, axis.cells());
            if s == n {
                axis.max()
            } else {
                axis.denormalize(c, s as f64 / n as f64)
            }
        };
        (0..px).for_each(|i| procedure.set_x(i, coordinate(self.axis_x(), i, nx)));
        (0..py).for_each(|j| procedure.set_y(j, coordinate(self.axis_y(), j, ny)));
        (0..pz).for_each(|k| procedure.set_z(k, coordinate(self.axis_z(), k, nz)));

        // One table per distinct offset, x offset fastest
        let mut tables = Vec::with_capacity((nx + 1) * (ny + 1) * (nz + 1));
        for sz in 0..=nz {
            for sy in 0..=ny {
                for sx in 0..=nx {
                    tables.push(PowerTable::new(
                        sx as f64 / nx as f64,
                        sy as f64 / ny as f64,
                        sz as f64 / nz as f64,
                    ));
                }
            }
        }

        for k in 0..pz {
            let (ck, sz) = split(k, nz, cz);
            for j in 0..py {
                let (cj, sy) = split(j, ny, cy);
                for i in 0..px {
                    let (ci, sx) = split(i, nx, cx);
                    let table = &tables[(sz * (ny + 1) + sy) * (nx + 1) + sx];
                    let value = self.value_with_table(ci, cj, ck, table)?;
                    procedure.set_value(i, j, k, value);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::TricubicBuilder;
    use crate::testing::*;

    fn build() -> TricubicFunction {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [-1.0, -0.5, 1.0];
        let z = [0.0, 0.25, 0.5];
        let grids = sample_grids(&x, &y, &z, cubic_test_function);
        TricubicBuilder::new(&x, &y, &z).build(&bundle(&grids)).unwrap()
    }

    #[test]
    fn test_sample_matches_direct() {
        let f = build();
        let mut grid = SampledGrid::new();
        f.sample(3, 2, 4, &mut grid).unwrap();
        assert_eq!((grid.x.len(), grid.y.len(), grid.z.len()), (10, 5, 9));
        assert_eq!(grid.x[0], 0.0);
        assert_eq!(grid.x[9], 3.0);
        assert_eq!(grid.y[3], 0.25);
        assert_eq!(grid.z[8], 0.5);

        for k in 0..grid.z.len() {
            for j in 0..grid.y.len() {
                for i in 0..grid.x.len() {
                    let direct = f.value(grid.x[i], grid.y[j], grid.z[k]).unwrap();
                    assert!((grid.get(i, j, k) - direct).abs() < 1e-9);
                }
            }
        }
    }

    /// Records the order of calls
    #[derive(Default)]
    struct Recorder {
        calls: Vec<char>,
        points: Vec<[usize; 3]>,
    }

    impl SampleProcedure for Recorder {
        fn set_dimensions(&mut self, _nx: usize, _ny: usize, _nz: usize) {
            self.calls.push('d');
        }

        fn set_x(&mut self, _i: usize, _x: f64) {
            self.calls.push('x');
        }

        fn set_y(&mut self, _j: usize, _y: f64) {
            self.calls.push('y');
        }

        fn set_z(&mut self, _k: usize, _z: f64) {
            self.calls.push('z');
        }

        fn set_value(&mut self, i: usize, j: usize, k: usize, _value: f64) {
            self.calls.push('v');
            self.points.push([i, j, k]);
        }
    }

    #[test]
    fn test_call_order() {
        let f = build();
        let mut r = Recorder::default();
        f.sample(1, 1, 1, &mut r).unwrap();
        // 4 x 3 x 3 points
        let header: String = r.calls[..11].iter().collect();
        assert_eq!(header, "dxxxxyyyzzz");
        assert!(r.calls[11..].iter().all(|c| *c == 'v'));
        assert_eq!(r.points.len(), 36);
        assert_eq!(r.points[0], [0, 0, 0]);
        assert_eq!(r.points[1], [1, 0, 0]);
        assert_eq!(r.points[4], [0, 1, 0]);
        assert_eq!(r.points[12], [0, 0, 1]);
    }

    #[test]
    fn test_zero_steps() {
        let f = build();
        assert!(matches!(
            f.sample(2, 0, 2, &mut SampledGrid::new()),
            Err(TricubicError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_step_overflow() {
        let f = build();
        let mut r = Recorder::default();
        assert!(matches!(
            f.sample(usize::MAX / 2, 1, 1, &mut r),
            Err(TricubicError::InvalidArgument(_))
        ));
        assert!(r.calls.is_empty());
    }
}
