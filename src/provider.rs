//! Sources of sampled values and derivatives on the grid vertices.
//!
//! Grid construction reads eight same-shaped 3D arrays, the function value
//! and its seven derivative kinds, through the [`ValueProvider`] trait so
//! that callers can supply owned arrays, closures, or views into their own
//! storage without copying.
use crate::error::{Result, TricubicError};

/// A 3D array of samples indexed by (i, j, k) along (x, y, z).
pub trait ValueProvider: Sync {
    /// Number of samples along x, y and z
    fn shape(&self) -> [usize; 3];

    /// Sample at (i, j, k).
    ///
    /// It is highly recommended to inline implementations of this function.
    fn get(&self, i: usize, j: usize, k: usize) -> f64;
}

/// An owned 3D array in C ordering: the last index (k) varies fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid3 {
    shape: [usize; 3],
    vals: Vec<f64>,
}

impl Grid3 {
    /// Wrap an existing C-ordered array.
    ///
    /// # Errors
    /// * If `vals.len()` is not the product of the shape
    pub fn new(shape: [usize; 3], vals: Vec<f64>) -> Result<Self> {
        let n: usize = shape.iter().product();
        if vals.len() != n {
            return Err(TricubicError::DimensionMismatch {
                what: "value array",
                expected: vec![n],
                actual: vec![vals.len()],
            });
        }
        Ok(Self { shape, vals })
    }

    pub fn zeros(shape: [usize; 3]) -> Self {
        Self {
            shape,
            vals: vec![0.0; shape.iter().product()],
        }
    }

    /// Fill an array by evaluating `f` at every index.
    pub fn from_fn(shape: [usize; 3], mut f: impl FnMut(usize, usize, usize) -> f64) -> Self {
        let mut vals = Vec::with_capacity(shape.iter().product());
        for (i, j, k) in itertools::iproduct!(0..shape[0], 0..shape[1], 0..shape[2]) {
            vals.push(f(i, j, k));
        }
        Self { shape, vals }
    }

    #[inline(always)]
    fn offset(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.shape[1] + j) * self.shape[2] + k
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, v: f64) {
        let n = self.offset(i, j, k);
        self.vals[n] = v;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.vals
    }
}

impl ValueProvider for Grid3 {
    fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[inline]
    fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.vals[self.offset(i, j, k)]
    }
}

/// Samples computed on demand by a closure.
pub struct FnProvider<F> {
    shape: [usize; 3],
    f: F,
}

impl<F> FnProvider<F>
where
    F: Fn(usize, usize, usize) -> f64 + Sync,
{
    pub fn new(shape: [usize; 3], f: F) -> Self {
        Self { shape, f }
    }
}

impl<F> ValueProvider for FnProvider<F>
where
    F: Fn(usize, usize, usize) -> f64 + Sync,
{
    fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[inline]
    fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        (self.f)(i, j, k)
    }
}

#[cfg(feature = "ndarray")]
impl ValueProvider for ndarray::Array3<f64> {
    fn shape(&self) -> [usize; 3] {
        let s = self.dim();
        [s.0, s.1, s.2]
    }

    #[inline]
    fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self[[i, j, k]]
    }
}

/// The eight sample arrays needed to build a tricubic function:
/// f, df/dx, df/dy, df/dz, d2f/dxdy, d2f/dxdz, d2f/dydz, d3f/dxdydz.
///
/// The order of the fields matches the order of derivative kinds in
/// [`crate::coefficients`].
#[derive(Clone, Copy)]
pub struct SampleBundle<'a> {
    pub providers: [&'a dyn ValueProvider; 8],
}

impl<'a> SampleBundle<'a> {
    /// Names used in error messages, in field order
    const NAMES: [&'static str; 8] = [
        "f", "df/dx", "df/dy", "df/dz", "d2f/dxdy", "d2f/dxdz", "d2f/dydz", "d3f/dxdydz",
    ];

    pub fn new(providers: [&'a dyn ValueProvider; 8]) -> Self {
        Self { providers }
    }

    /// Check that every provider has the given shape.
    ///
    /// # Errors
    /// * If any provider's shape differs
    pub fn check_shape(&self, expected: [usize; 3]) -> Result<()> {
        for (p, name) in self.providers.iter().zip(Self::NAMES) {
            let actual = p.shape();
            if actual != expected {
                return Err(TricubicError::DimensionMismatch {
                    what: name,
                    expected: expected.to_vec(),
                    actual: actual.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Sample of derivative kind `kind` at (i, j, k)
    #[inline(always)]
    pub fn get(&self, kind: usize, i: usize, j: usize, k: usize) -> f64 {
        self.providers[kind].get(i, j, k)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_grid3_ordering() {
        let g = Grid3::from_fn([2, 3, 4], |i, j, k| (100 * i + 10 * j + k) as f64);
        assert_eq!(g.get(1, 2, 3), 123.0);
        assert_eq!(g.as_slice()[1], 1.0); // k fastest
        assert_eq!(g.as_slice()[4], 10.0);
        assert!(Grid3::new([2, 2, 2], vec![0.0; 7]).is_err());
    }

    #[test]
    fn test_bundle_shape_check() {
        let a = Grid3::zeros([3, 3, 3]);
        let b = Grid3::zeros([3, 3, 2]);
        let f = FnProvider::new([3, 3, 3], |_, _, _| 1.0);
        let ok = SampleBundle::new([&a, &f, &a, &a, &a, &a, &a, &a]);
        assert!(ok.check_shape([3, 3, 3]).is_ok());
        assert_eq!(ok.get(1, 0, 0, 0), 1.0);

        let bad = SampleBundle::new([&a, &a, &a, &a, &a, &b, &a, &a]);
        match bad.check_shape([3, 3, 3]) {
            Err(TricubicError::DimensionMismatch {
                what,
                expected,
                actual,
            }) => {
                assert_eq!(what, "d2f/dxdz");
                assert_eq!(expected, vec![3, 3, 3]);
                assert_eq!(actual, vec![3, 3, 2]);
            }
            _ => panic!("expected a dimension mismatch"),
        }
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn test_ndarray_provider() {
        let a =
            ndarray::Array3::from_shape_fn((2, 3, 4), |(i, j, k)| (100 * i + 10 * j + k) as f64);
        let g = Grid3::from_fn([2, 3, 4], |i, j, k| (100 * i + 10 * j + k) as f64);
        assert_eq!(ValueProvider::shape(&a), [2, 3, 4]);
        for (i, j, k) in itertools::iproduct!(0..2, 0..3, 0..4) {
            assert_eq!(ValueProvider::get(&a, i, j, k), g.get(i, j, k));
        }
    }
}
