//! Precomputed monomials and cell positions.
//!
//! Evaluating a cell is a dot product between its 64 coefficients and the
//! monomials `x^p * y^q * z^r` of the normalized position. When many cells
//! are evaluated at the same fractional offset (for example when resampling a
//! grid at a fixed sub-cell resolution), the monomials can be computed once
//! in a [`PowerTable`] and reused.
//!
//! Derivative evaluation also needs the monomials multiplied by the
//! power-rule factors 2, 3 and 6. [`ScaledPowerTables`] stores those
//! products so the hot loop has one multiply per coefficient.
use core::ops::Index;

use crate::coefficients::N_COEFFS;

/// Powers 1, t, t^2, t^3
#[inline(always)]
pub(crate) fn powers(t: f64) -> [f64; 4] {
    let t2 = t * t;
    [1.0, t, t2, t2 * t]
}

/// Monomials `x^p * y^q * z^r` at index `p + 4 * q + 16 * r`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerTable {
    table: [f64; N_COEFFS],
}

impl PowerTable {
    /// Build the table for a normalized position in the unit cube.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        let (px, py, pz) = (powers(x), powers(y), powers(z));
        let mut table = [0.0; N_COEFFS];
        for r in 0..4 {
            for q in 0..4 {
                let yz = pz[r] * py[q];
                for p in 0..4 {
                    table[p + 4 * q + 16 * r] = yz * px[p];
                }
            }
        }
        Self { table }
    }

    /// Build the table for a set of precomputed positions.
    #[inline]
    pub fn from_positions(x: &SplinePosition, y: &SplinePosition, z: &SplinePosition) -> Self {
        Self::new(x.offset, y.offset, z.offset)
    }

    /// Every entry multiplied by `factor`.
    #[inline]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut table = self.table;
        table.iter_mut().for_each(|v| *v *= factor);
        Self { table }
    }

    pub fn as_slice(&self) -> &[f64; N_COEFFS] {
        &self.table
    }
}

impl Index<usize> for PowerTable {
    type Output = f64;

    #[inline(always)]
    fn index(&self, n: usize) -> &f64 {
        &self.table[n]
    }
}

/// A power table together with copies multiplied by 2, 3 and 6,
/// for derivative evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaledPowerTables {
    pub table: PowerTable,
    pub table2: PowerTable,
    pub table3: PowerTable,
    pub table6: PowerTable,
}

impl ScaledPowerTables {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self::from_table(PowerTable::new(x, y, z))
    }

    #[inline]
    pub fn from_table(table: PowerTable) -> Self {
        Self {
            table,
            table2: table.scaled(2.0),
            table3: table.scaled(3.0),
            table6: table.scaled(6.0),
        }
    }
}

/// A coordinate resolved to a cell along one axis.
///
/// Holds the cell index, the normalized offset within the cell, and, for
/// axes that are not unit-spaced, the width of the cell so that derivatives
/// can be converted back to axis units.
///
/// A position is only meaningful for the function that created it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplinePosition {
    /// Lower sample index of the cell
    pub index: usize,

    /// Offset within the cell, in [0, 1]
    pub offset: f64,

    /// Cell width, or `None` if derivatives need no rescaling
    pub scale: Option<f64>,
}

impl SplinePosition {
    pub fn new(index: usize, offset: f64, scale: Option<f64>) -> Self {
        Self {
            index,
            offset,
            scale,
        }
    }

    /// Convert a first derivative in cell units to axis units.
    #[inline(always)]
    pub fn scale_derivative1(&self, d: f64) -> f64 {
        match self.scale {
            Some(s) => d / s,
            None => d,
        }
    }

    /// Convert a second derivative in cell units to axis units.
    #[inline(always)]
    pub fn scale_derivative2(&self, d: f64) -> f64 {
        match self.scale {
            Some(s) => d / (s * s),
            None => d,
        }
    }
}
