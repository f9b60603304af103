//! The tricubic polynomial of a single grid cell.
//!
//! A cell holds 64 coefficients `a[p + 4 * q + 16 * r]` and evaluates
//! `sum(a[n] * x^p * y^q * z^r)` at normalized coordinates in the unit cube.
//! Coordinates outside [0, 1] are not rejected here; range checks belong to
//! the grid.
//!
//! Coefficients may be stored in single or double precision. All arithmetic
//! is done in f64 either way. [`Cell`] is the tagged union of both storage
//! variants used by the grid.
//!
//! Every evaluation goes through the power-table kernels, so evaluating at raw
//! coordinates and evaluating with a precomputed [`PowerTable`] for the same
//! coordinates give bit-identical results.
use num_traits::{AsPrimitive, Float};

use crate::coefficients::N_COEFFS;
use crate::error::{Result, TricubicError};
use crate::power_table::{PowerTable, ScaledPowerTables};

/// Location and value of an extremum found by a search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Optimum {
    /// Location as (x, y, z)
    pub position: [f64; 3],
    pub value: f64,
}

/// One cell's polynomial, with coefficients stored as `T`.
#[derive(Clone, Debug, PartialEq)]
pub struct CellFunction<T> {
    a: [T; N_COEFFS],
}

impl<T> CellFunction<T>
where
    T: Float + Into<f64> + 'static,
    f64: AsPrimitive<T>,
{
    /// Build a cell from coefficients in f64, rounding to the storage type.
    pub fn new(a: &[f64; N_COEFFS]) -> Self {
        let mut stored = [T::zero(); N_COEFFS];
        (0..N_COEFFS).for_each(|n| stored[n] = a[n].as_());
        Self { a: stored }
    }

    /// Coefficient `n`, widened to f64.
    ///
    /// # Panics
    /// If `n >= 64`
    #[inline(always)]
    pub fn coefficient(&self, n: usize) -> f64 {
        self.a[n].into()
    }

    /// Copy of all coefficients, widened to f64.
    pub fn coefficients(&self) -> [f64; N_COEFFS] {
        let mut out = [0.0; N_COEFFS];
        (0..N_COEFFS).for_each(|n| out[n] = self.coefficient(n));
        out
    }

    /// The same coefficients in another storage type.
    pub fn convert<U>(&self) -> CellFunction<U>
    where
        U: Float + Into<f64> + 'static,
        f64: AsPrimitive<U>,
    {
        CellFunction::<U>::new(&self.coefficients())
    }

    pub fn to_single_precision(&self) -> CellFunction<f32> {
        self.convert::<f32>()
    }

    pub fn to_double_precision(&self) -> CellFunction<f64> {
        self.convert::<f64>()
    }

    /// Value at (x, y, z)
    #[inline]
    pub fn value(&self, x: f64, y: f64, z: f64) -> f64 {
        self.value_with_table(&PowerTable::new(x, y, z))
    }

    /// Value and gradient at (x, y, z)
    #[inline]
    pub fn value_d1(&self, x: f64, y: f64, z: f64) -> (f64, [f64; 3]) {
        self.value_d1_with_tables(&ScaledPowerTables::new(x, y, z))
    }

    /// Value, gradient, and pure second partials (d2/dx2, d2/dy2, d2/dz2) at (x, y, z)
    #[inline]
    pub fn value_d2(&self, x: f64, y: f64, z: f64) -> (f64, [f64; 3], [f64; 3]) {
        self.value_d2_with_tables(&ScaledPowerTables::new(x, y, z))
    }

    /// Value from precomputed monomials
    #[inline]
    pub fn value_with_table(&self, table: &PowerTable) -> f64 {
        let mut v = 0.0;
        for n in 0..N_COEFFS {
            v += self.coefficient(n) * table[n];
        }
        v
    }

    /// Value and gradient from precomputed monomials
    #[inline]
    pub fn value_d1_with_table(&self, table: &PowerTable) -> (f64, [f64; 3]) {
        self.value_d1_with_tables(&ScaledPowerTables::from_table(*table))
    }

    /// Value, gradient and pure second partials from precomputed monomials
    #[inline]
    pub fn value_d2_with_table(&self, table: &PowerTable) -> (f64, [f64; 3], [f64; 3]) {
        self.value_d2_with_tables(&ScaledPowerTables::from_table(*table))
    }

    /// Value and gradient from precomputed monomials and their multiples
    pub fn value_d1_with_tables(&self, tables: &ScaledPowerTables) -> (f64, [f64; 3]) {
        // d/dt t^p = p * t^(p-1), so the first-derivative term for power p
        // reads the monomial one power lower from the table scaled by p.
        let first = [&tables.table, &tables.table, &tables.table2, &tables.table3];

        let mut v = 0.0;
        let mut d1 = [0.0; 3];
        for r in 0..4 {
            for q in 0..4 {
                for p in 0..4 {
                    let n = p + 4 * q + 16 * r;
                    let a = self.coefficient(n);
                    v += a * tables.table[n];
                    if p > 0 {
                        d1[0] += a * first[p][n - 1];
                    }
                    if q > 0 {
                        d1[1] += a * first[q][n - 4];
                    }
                    if r > 0 {
                        d1[2] += a * first[r][n - 16];
                    }
                }
            }
        }
        (v, d1)
    }

    /// Value, gradient and pure second partials from precomputed monomials
    /// and their multiples
    pub fn value_d2_with_tables(&self, tables: &ScaledPowerTables) -> (f64, [f64; 3], [f64; 3]) {
        let first = [&tables.table, &tables.table, &tables.table2, &tables.table3];
        // d2/dt2 t^2 = 2, d2/dt2 t^3 = 6t
        let second = [&tables.table, &tables.table, &tables.table2, &tables.table6];

        let mut v = 0.0;
        let mut d1 = [0.0; 3];
        let mut d2 = [0.0; 3];
        for r in 0..4 {
            for q in 0..4 {
                for p in 0..4 {
                    let n = p + 4 * q + 16 * r;
                    let a = self.coefficient(n);
                    v += a * tables.table[n];
                    if p > 0 {
                        d1[0] += a * first[p][n - 1];
                        if p > 1 {
                            d2[0] += a * second[p][n - 2];
                        }
                    }
                    if q > 0 {
                        d1[1] += a * first[q][n - 4];
                        if q > 1 {
                            d2[1] += a * second[q][n - 8];
                        }
                    }
                    if r > 0 {
                        d1[2] += a * first[r][n - 16];
                        if r > 1 {
                            d2[2] += a * second[r][n - 32];
                        }
                    }
                }
            }
        }
        (v, d1, d2)
    }

    /// Value at the cell origin (0, 0, 0)
    #[inline]
    pub fn value000(&self) -> f64 {
        self.coefficient(0)
    }

    /// Value and gradient at the cell origin (0, 0, 0)
    #[inline]
    pub fn value000_d1(&self) -> (f64, [f64; 3]) {
        (
            self.coefficient(0),
            [self.coefficient(1), self.coefficient(4), self.coefficient(16)],
        )
    }

    /// Search the cell for an extremum by lattice bisection.
    ///
    /// The first round evaluates the 3x3x3 lattice {0, 0.5, 1}^3. Each of the
    /// `refinements` following rounds halves the lattice spacing and evaluates
    /// the 26 lattice neighbours of the current best point, clamped to the unit
    /// cube. A neighbour replaces the current best only if it is strictly
    /// better. The final location is within `0.5 / 2^refinements` of the
    /// lattice optimum along each axis.
    ///
    /// After each refinement the search stops early if the best value improved
    /// by no more than `relative_error * |value|` or `absolute_error`. A
    /// negative tolerance disables that criterion.
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
        if refinements == 0 {
            return Err(TricubicError::invalid_argument(
                "search requires at least one refinement",
            ));
        }

        let mut best = Optimum {
            position: [0.5; 3],
            value: self.value(0.5, 0.5, 0.5),
        };
        let mut h = 0.5;
        best = self.search_round(best, h, maximum);

        for _ in 0..refinements {
            h *= 0.5;
            let previous = best.value;
            best = self.search_round(best, h, maximum);

            let improvement = (best.value - previous).abs();
            let converged = (relative_error >= 0.0
                && improvement <= relative_error * best.value.abs())
                || (absolute_error >= 0.0 && improvement <= absolute_error);
            if converged {
                break;
            }
        }
        Ok(best)
    }

    /// Evaluate the 26 lattice neighbours of `center` at spacing `h`
    /// and return the best point, keeping `center` on ties.
    fn search_round(&self, center: Optimum, h: f64, maximum: bool) -> Optimum {
        let mut best = center;
        let c = center.position;
        for dz in [-1.0, 0.0, 1.0] {
            for dy in [-1.0, 0.0, 1.0] {
                for dx in [-1.0, 0.0, 1.0] {
                    if dx == 0.0 && dy == 0.0 && dz == 0.0 {
                        continue;
                    }
                    let p = [
                        (c[0] + dx * h).clamp(0.0, 1.0),
                        (c[1] + dy * h).clamp(0.0, 1.0),
                        (c[2] + dz * h).clamp(0.0, 1.0),
                    ];
                    let v = self.value(p[0], p[1], p[2]);
                    let better = if maximum { v > best.value } else { v < best.value };
                    if better {
                        best = Optimum {
                            position: p,
                            value: v,
                        };
                    }
                }
            }
        }
        best
    }
}

/// A cell with either single or double precision coefficient storage.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Double(CellFunction<f64>),
    Single(CellFunction<f32>),
}

/// Forward a method call to whichever storage variant is held
macro_rules! dispatch {
    ($self:ident, $c:ident => $e:expr) => {
        match $self {
            Cell::Double($c) => $e,
            Cell::Single($c) => $e,
        }
    };
}

impl Cell {
    /// Build a cell from f64 coefficients, in single or double precision.
    pub fn new(a: &[f64; N_COEFFS], single_precision: bool) -> Self {
        if single_precision {
            Cell::Single(CellFunction::new(a))
        } else {
            Cell::Double(CellFunction::new(a))
        }
    }

    /// Solve for the coefficients of a cell from its corner values and
    /// derivatives, ordered as in [`crate::coefficients`].
    pub fn from_beta(beta: &[f64; N_COEFFS], single_precision: bool) -> Self {
        Self::new(&crate::coefficients::solve(beta), single_precision)
    }

    pub fn is_single_precision(&self) -> bool {
        matches!(self, Cell::Single(_))
    }

    /// An equivalent cell with f32 storage
    pub fn to_single_precision(&self) -> Cell {
        match self {
            Cell::Double(c) => Cell::Single(c.to_single_precision()),
            Cell::Single(_) => self.clone(),
        }
    }

    /// An equivalent cell with f64 storage
    pub fn to_double_precision(&self) -> Cell {
        match self {
            Cell::Single(c) => Cell::Double(c.to_double_precision()),
            Cell::Double(_) => self.clone(),
        }
    }

    #[inline(always)]
    pub fn coefficient(&self, n: usize) -> f64 {
        dispatch!(self, c => c.coefficient(n))
    }

    pub fn coefficients(&self) -> [f64; N_COEFFS] {
        dispatch!(self, c => c.coefficients())
    }

    #[inline]
    pub fn value(&self, x: f64, y: f64, z: f64) -> f64 {
        dispatch!(self, c => c.value(x, y, z))
    }

    #[inline]
    pub fn value_d1(&self, x: f64, y: f64, z: f64) -> (f64, [f64; 3]) {
        dispatch!(self, c => c.value_d1(x, y, z))
    }

    #[inline]
    pub fn value_d2(&self, x: f64, y: f64, z: f64) -> (f64, [f64; 3], [f64; 3]) {
        dispatch!(self, c => c.value_d2(x, y, z))
    }

    #[inline]
    pub fn value_with_table(&self, table: &PowerTable) -> f64 {
        dispatch!(self, c => c.value_with_table(table))
    }

    #[inline]
    pub fn value_d1_with_table(&self, table: &PowerTable) -> (f64, [f64; 3]) {
        dispatch!(self, c => c.value_d1_with_table(table))
    }

    #[inline]
    pub fn value_d2_with_table(&self, table: &PowerTable) -> (f64, [f64; 3], [f64; 3]) {
        dispatch!(self, c => c.value_d2_with_table(table))
    }

    #[inline]
    pub fn value_d1_with_tables(&self, tables: &ScaledPowerTables) -> (f64, [f64; 3]) {
        dispatch!(self, c => c.value_d1_with_tables(tables))
    }

    #[inline]
    pub fn value_d2_with_tables(&self, tables: &ScaledPowerTables) -> (f64, [f64; 3], [f64; 3]) {
        dispatch!(self, c => c.value_d2_with_tables(tables))
    }

    #[inline]
    pub fn value000(&self) -> f64 {
        dispatch!(self, c => c.value000())
    }

    #[inline]
    pub fn value000_d1(&self) -> (f64, [f64; 3]) {
        dispatch!(self, c => c.value000_d1())
    }

    /// See [`CellFunction::search`]
    pub fn search(
        &self,
        maximum: bool,
        refinements: usize,
        relative_error: f64,
        absolute_error: f64,
    ) -> Result<Optimum> {
        dispatch!(self, c => c.search(maximum, refinements, relative_error, absolute_error))
    }
}
