//! Derivative estimates for grids where only function values are known.
//!
//! Each derivative is a nested first-order difference on the rectilinear
//! axes, central at interior samples and one-sided at the two ends:
//!
//! ```text
//! df/dx[i] = (f[i + 1] - f[i - 1]) / (x[i + 1] - x[i - 1])    0 < i < n - 1
//! df/dx[0] = (f[1] - f[0]) / (x[1] - x[0])
//! ```
//!
//! Mixed derivatives apply the same operator along each axis in turn. The
//! estimates are exact for functions that are linear along each axis, and the
//! resulting interpolant is then continuous but only approximately smooth.
use crate::axis::Axis;
use crate::error::{Result, TricubicError};
use crate::provider::{Grid3, SampleBundle, ValueProvider};

/// Function values and the seven estimated derivative kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivativeGrids {
    pub f: Grid3,
    pub dx: Grid3,
    pub dy: Grid3,
    pub dz: Grid3,
    pub dxy: Grid3,
    pub dxz: Grid3,
    pub dyz: Grid3,
    pub dxyz: Grid3,
}

impl DerivativeGrids {
    /// All eight arrays in builder order.
    pub fn bundle(&self) -> SampleBundle<'_> {
        SampleBundle::new([
            &self.f,
            &self.dx,
            &self.dy,
            &self.dz,
            &self.dxy,
            &self.dxz,
            &self.dyz,
            &self.dxyz,
        ])
    }
}

/// Difference `g` along dimension `dim`, whose coordinates are `coords`.
fn difference(g: &Grid3, coords: &[f64], dim: usize) -> Grid3 {
    let last = coords.len() - 1;
    Grid3::from_fn(g.shape(), |i, j, k| {
        let index = [i, j, k];
        let m = index[dim];
        let (lo, hi) = (m.saturating_sub(1), (m + 1).min(last));
        let at = |c: usize| {
            let mut p = index;
            p[dim] = c;
            g.get(p[0], p[1], p[2])
        };
        (at(hi) - at(lo)) / (coords[hi] - coords[lo])
    })
}

/// Estimate the derivatives needed to build a tricubic function from
/// values on the grid alone.
///
/// # Errors
/// * If any axis is invalid
/// * If the shape of `f` does not match the axes
pub fn estimate_derivatives(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    f: &dyn ValueProvider,
) -> Result<DerivativeGrids> {
    let axes = [Axis::new('x', x)?, Axis::new('y', y)?, Axis::new('z', z)?];
    let shape = [axes[0].len(), axes[1].len(), axes[2].len()];
    if f.shape() != shape {
        return Err(TricubicError::DimensionMismatch {
            what: "f",
            expected: shape.to_vec(),
            actual: f.shape().to_vec(),
        });
    }
    tracing::debug!("Estimating derivatives on a {:?} grid", shape);

    let f = Grid3::from_fn(shape, |i, j, k| f.get(i, j, k));
    let dx = difference(&f, x, 0);
    let dy = difference(&f, y, 1);
    let dz = difference(&f, z, 2);
    let dxy = difference(&dx, y, 1);
    let dxz = difference(&dx, z, 2);
    let dyz = difference(&dy, z, 2);
    let dxyz = difference(&dxy, z, 2);

    Ok(DerivativeGrids {
        f,
        dx,
        dy,
        dz,
        dxy,
        dxz,
        dyz,
        dxyz,
    })
}
