//! Sample axes and cell index search.
//!
//! An [`Axis`] is a strictly increasing list of sample coordinates along one
//! dimension of the grid. Two properties are derived once at construction
//! and gate the evaluation fast paths:
//! * `uniform`: every spacing matches the first one to a relative tolerance of 1e-6
//! * `integer`: uniform, and the average spacing is 1.0 to within 1e-6
//!
//! On an integer axis the offset of a coordinate from the lower sample of its
//! cell is already in normalized cell units, so no division is needed and
//! derivatives need no rescaling.
use crate::error::{Result, TricubicError};

/// Relative tolerance on the spacing for an axis to count as uniform
const UNIFORM_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance on the average spacing for an axis to count as unit-spaced
const INTEGER_TOLERANCE: f64 = 1e-6;

/// A strictly increasing set of sample coordinates along one dimension.
#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    /// Axis label used in error messages
    name: char,

    /// Sample coordinates, size n >= 2
    values: Vec<f64>,

    /// Width of each cell, size n - 1
    scale: Vec<f64>,

    uniform: bool,
    integer: bool,
}

impl Axis {
    /// Build an axis from its samples.
    ///
    /// # Errors
    /// * If there are fewer than 2 samples
    /// * If any sample is NaN or infinite
    /// * If the samples are not strictly increasing
    pub fn new(name: char, values: &[f64]) -> Result<Self> {
        let n = values.len();
        if n < 2 {
            return Err(TricubicError::TooFewSamples { axis: name, len: n });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(TricubicError::NonFinite { axis: name, index });
        }
        for i in 1..n {
            if values[i] <= values[i - 1] {
                return Err(TricubicError::NonMonotonic {
                    axis: name,
                    index: i,
                    previous: values[i - 1],
                    value: values[i],
                });
            }
        }

        let scale: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
        let uniform = scale
            .iter()
            .all(|&s| (s - scale[0]).abs() <= UNIFORM_TOLERANCE * scale[0]);
        let average = (values[n - 1] - values[0]) / (n - 1) as f64;
        let integer = uniform && (average - 1.0).abs() <= INTEGER_TOLERANCE;

        Ok(Self {
            name,
            values: values.to_vec(),
            scale,
            uniform,
            integer,
        })
    }

    /// Build an axis of `n` unit-spaced samples starting at `start`.
    pub fn integer(name: char, start: f64, n: usize) -> Result<Self> {
        let values: Vec<f64> = (0..n).map(|i| start + i as f64).collect();
        Self::new(name, &values)
    }

    /// Same axis, with the integer fast path switched off.
    pub(crate) fn without_integer_path(mut self) -> Self {
        self.integer = false;
        self
    }

    /// Axis label, like 'x'
    pub fn name(&self) -> char {
        self.name
    }

    /// Number of samples
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Number of cells, one less than the number of samples
    pub fn cells(&self) -> usize {
        self.values.len() - 1
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Sample coordinate at index `i`.
    ///
    /// # Panics
    /// If `i` is not a valid sample index.
    pub fn value(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// Width of cell `i`.
    ///
    /// # Panics
    /// If `i` is not a valid cell index.
    pub fn cell_scale(&self, i: usize) -> f64 {
        self.scale[i]
    }

    pub fn min(&self) -> f64 {
        self.values[0]
    }

    pub fn max(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Largest valid cell index, `len() - 2`
    pub fn max_spline_position(&self) -> usize {
        self.values.len() - 2
    }

    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// The common spacing of a uniform axis.
    ///
    /// # Errors
    /// * If the axis is not uniform
    pub fn scale(&self) -> Result<f64> {
        if !self.uniform {
            return Err(TricubicError::illegal_state(format!(
                "axis {} does not have a uniform spacing",
                self.name
            )));
        }
        Ok(self.scale[0])
    }

    /// Inclusive bounds check.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min() && v <= self.max()
    }

    /// Find the cell containing `v`, such that
    /// `values[i] <= v <= values[i + 1]`.
    ///
    /// Uses the arithmetic fast path on integer axes and a bisection search
    /// otherwise.
    ///
    /// # Errors
    /// * If `v` is outside `[min, max]` or NaN
    #[inline]
    pub fn locate(&self, v: f64) -> Result<usize> {
        if !self.contains(v) {
            return Err(TricubicError::OutOfRange {
                axis: self.name,
                value: v,
                min: self.min(),
                max: self.max(),
            });
        }
        if self.integer {
            Ok(locate_integer(v, &self.values))
        } else {
            Ok(locate_bisect(v, &self.values))
        }
    }

    /// Find the cell containing `v` and the normalized offset within it.
    ///
    /// On integer axes the offset is the raw distance from the lower sample.
    #[inline]
    pub fn normalize(&self, v: f64) -> Result<(usize, f64)> {
        let i = self.locate(v)?;
        let dv = v - self.values[i];
        if self.integer {
            Ok((i, dv))
        } else {
            Ok((i, dv / self.scale[i]))
        }
    }

    /// Map a normalized offset within cell `i` back to the axis coordinate.
    #[inline]
    pub fn denormalize(&self, i: usize, t: f64) -> f64 {
        if self.integer {
            self.values[i] + t
        } else {
            self.values[i] + t * self.scale[i]
        }
    }
}

/// Cell index on a unit-spaced axis, `floor(v - axis[0])`,
/// clamped to the last cell at the top boundary.
///
/// Assumes `v` is inside the axis range.
#[inline]
pub fn locate_integer(v: f64, axis: &[f64]) -> usize {
    let last = axis.len() - 2;
    let floc = (v - axis[0]).floor();
    if floc <= 0.0 {
        0
    } else {
        (floc as usize).min(last)
    }
}

/// Cell index by bisection, the insertion point of `v` minus one,
/// clamped to the last cell at the top boundary.
///
/// Assumes `v` is inside the axis range.
#[inline]
pub fn locate_bisect(v: f64, axis: &[f64]) -> usize {
    let iloc = axis.partition_point(|x| *x <= v);
    iloc.saturating_sub(1).min(axis.len() - 2)
}
