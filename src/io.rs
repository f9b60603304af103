//! Binary serialization of a [`TricubicFunction`].
//!
//! All numbers are big-endian:
//!
//! | Field                 | Type               | Count                                 |
//! |-----------------------|--------------------|---------------------------------------|
//! | lenX, lenY, lenZ      | i32                | 3                                     |
//! | x, y, z samples       | f64                | lenX + lenY + lenZ                    |
//! | single precision flag | u8 (0 or 1)        | 1                                     |
//! | cell coefficients     | f32 if flag else f64 | 64 per cell, i outer to k inner     |
//!
//! A function is written with the single precision flag only if every one of
//! its cells stores f32 coefficients. Otherwise all cells are written as f64,
//! which is exact for f32 cells too.
use std::io::{Read, Write};

use crate::axis::Axis;
use crate::cell::Cell;
use crate::coefficients::N_COEFFS;
use crate::error::{Result, TricubicError};
use crate::grid::TricubicFunction;

const AXIS_NAMES: [char; 3] = ['x', 'y', 'z'];

fn read_bytes<const N: usize>(r: &mut impl Read) -> Result<[u8; N]> {
    let mut buf = [0_u8; N];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

impl TricubicFunction {
    /// Write the function to `w`.
    ///
    /// # Errors
    /// * If an axis is too long for the i32 length field
    /// * If writing fails
    pub fn write(&self, w: &mut impl Write) -> Result<()> {
        let axes = [self.axis_x(), self.axis_y(), self.axis_z()];
        let single = self.is_single_precision();

        for axis in axes {
            let n = i32::try_from(axis.len()).map_err(|_| {
                TricubicError::invalid_argument(format!(
                    "axis {} has {} samples, more than the format allows",
                    axis.name(),
                    axis.len()
                ))
            })?;
            w.write_all(&n.to_be_bytes())?;
        }
        for axis in axes {
            for v in axis.values() {
                w.write_all(&v.to_be_bytes())?;
            }
        }
        w.write_all(&[u8::from(single)])?;

        let width = if single { 4 } else { 8 };
        let mut buf = Vec::with_capacity(N_COEFFS * width);
        for cell in self.cells() {
            buf.clear();
            for n in 0..N_COEFFS {
                let c = cell.coefficient(n);
                if single {
                    buf.extend_from_slice(&(c as f32).to_be_bytes());
                } else {
                    buf.extend_from_slice(&c.to_be_bytes());
                }
            }
            w.write_all(&buf)?;
        }

        tracing::debug!(
            "Wrote tricubic function {:?} ({} cells, {})",
            self.dims(),
            self.cell_count(),
            if single { "f32" } else { "f64" }
        );
        Ok(())
    }

    /// Read a function written by [`TricubicFunction::write`].
    ///
    /// The axes and cell count go through the same validation as a normal
    /// build, so a corrupted stream fails the same way a bad build would.
    ///
    /// # Errors
    /// * If an axis length is less than 2
    /// * If an axis is not strictly increasing or has non-finite entries
    /// * If the precision flag is neither 0 nor 1
    /// * If the stream ends early or reading fails
    pub fn read(r: &mut impl Read) -> Result<Self> {
        let mut lens = [0_usize; 3];
        for (len, name) in lens.iter_mut().zip(AXIS_NAMES) {
            let n = i32::from_be_bytes(read_bytes(r)?);
            if n < 2 {
                return Err(TricubicError::TooFewSamples {
                    axis: name,
                    len: n.max(0) as usize,
                });
            }
            *len = n as usize;
        }

        // Samples are read one at a time so that a corrupted length cannot
        // force a large allocation ahead of the data
        let mut axes = Vec::with_capacity(3);
        for (&len, name) in lens.iter().zip(AXIS_NAMES) {
            let mut values = Vec::new();
            for _ in 0..len {
                values.push(f64::from_be_bytes(read_bytes(r)?));
            }
            Axis::new(name, &values)?;
            axes.push(values);
        }

        let single = match read_bytes::<1>(r)?[0] {
            0 => false,
            1 => true,
            other => {
                return Err(TricubicError::invalid_argument(format!(
                    "precision flag must be 0 or 1, got {other}"
                )))
            }
        };

        let n_cells = lens
            .iter()
            .try_fold(1_usize, |acc, len| acc.checked_mul(len - 1))
            .ok_or_else(|| TricubicError::invalid_argument("cell count overflows"))?;
        let mut cells = Vec::new();
        let mut a = [0.0; N_COEFFS];
        for _ in 0..n_cells {
            for c in a.iter_mut() {
                *c = if single {
                    f32::from_be_bytes(read_bytes(r)?) as f64
                } else {
                    f64::from_be_bytes(read_bytes(r)?)
                };
            }
            cells.push(Cell::new(&a, single));
        }

        let f = TricubicFunction::from_cells(&axes[0], &axes[1], &axes[2], cells)?;
        tracing::debug!(
            "Read tricubic function {:?} ({} cells, {})",
            f.dims(),
            f.cell_count(),
            if single { "f32" } else { "f64" }
        );
        Ok(f)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::grid::TricubicBuilder;
    use crate::testing::*;

    fn build(single: bool) -> TricubicFunction {
        let x = [0.0, 1.0, 2.0];
        let y = [-1.0, 0.5, 1.0, 4.0];
        let z = [0.0, 0.25];
        let grids = sample_grids(&x, &y, &z, cubic_test_function);
        TricubicBuilder::new(&x, &y, &z)
            .single_precision(single)
            .build(&bundle(&grids))
            .unwrap()
    }

    fn to_bytes(f: &TricubicFunction) -> Vec<u8> {
        let mut buf = Vec::new();
        f.write(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_round_trip_double() {
        let f = build(false);
        let bytes = to_bytes(&f);
        assert_eq!(bytes.len(), 12 + 8 * 9 + 1 + 6 * 64 * 8);
        assert_eq!(bytes[..12], [0_u8, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 2]);
        assert_eq!(bytes[12..20], 0.0_f64.to_be_bytes());
        assert_eq!(bytes[12 + 8 * 9], 0);

        let g = TricubicFunction::read(&mut bytes.as_slice()).unwrap();
        assert_eq!(g, f);
        assert_eq!(g.value_d2(1.5, 0.7, 0.1).unwrap(), f.value_d2(1.5, 0.7, 0.1).unwrap());
    }

    #[test]
    fn test_round_trip_single() {
        let f = build(true);
        let bytes = to_bytes(&f);
        assert_eq!(bytes.len(), 12 + 8 * 9 + 1 + 6 * 64 * 4);
        assert_eq!(bytes[12 + 8 * 9], 1);

        let g = TricubicFunction::read(&mut bytes.as_slice()).unwrap();
        assert!(g.is_single_precision());
        assert_eq!(g, f);

        // f32 coefficients agree with the f64 build to rounding
        let d = build(false);
        let (a, b) = (g.coefficients(1, 2, 0).unwrap(), d.coefficients(1, 2, 0).unwrap());
        (0..N_COEFFS).for_each(|n| assert!((a[n] - b[n]).abs() <= 1e-6 * b[n].abs().max(1.0)));
    }

    #[test]
    fn test_mixed_precision_written_as_double() {
        let f = build(false);
        let mut cells = f.cells().to_vec();
        cells[2] = cells[2].to_single_precision();
        let mixed = TricubicFunction::from_cells(
            f.axis_x().values(),
            f.axis_y().values(),
            f.axis_z().values(),
            cells,
        )
        .unwrap();
        let bytes = to_bytes(&mixed);
        assert_eq!(bytes[12 + 8 * 9], 0);

        let g = TricubicFunction::read(&mut bytes.as_slice()).unwrap();
        assert!(!g.cells()[2].is_single_precision());
        assert_eq!(g.coefficients(0, 2, 0).unwrap(), mixed.coefficients(0, 2, 0).unwrap());
    }

    #[test]
    fn test_corrupted_streams() {
        let bytes = to_bytes(&build(false));

        // Swap the first two x samples
        let mut bad = bytes.clone();
        bad[12..20].copy_from_slice(&1.0_f64.to_be_bytes());
        bad[20..28].copy_from_slice(&0.0_f64.to_be_bytes());
        assert!(matches!(
            TricubicFunction::read(&mut bad.as_slice()),
            Err(TricubicError::NonMonotonic { axis: 'x', index: 1, .. })
        ));

        // Too short an axis is rejected before anything else is read
        let mut bad = bytes.clone();
        bad[4..8].copy_from_slice(&1_i32.to_be_bytes());
        assert!(matches!(
            TricubicFunction::read(&mut bad.as_slice()),
            Err(TricubicError::TooFewSamples { axis: 'y', len: 1 })
        ));
        let mut bad = bytes.clone();
        bad[8..12].copy_from_slice(&(-5_i32).to_be_bytes());
        assert!(matches!(
            TricubicFunction::read(&mut bad.as_slice()),
            Err(TricubicError::TooFewSamples { axis: 'z', len: 0 })
        ));

        // A huge length runs out of data instead of allocating
        let mut bad = bytes.clone();
        bad[0..4].copy_from_slice(&i32::MAX.to_be_bytes());
        assert!(matches!(
            TricubicFunction::read(&mut bad.as_slice()),
            Err(TricubicError::Io(_))
        ));

        let mut bad = bytes.clone();
        bad[12 + 8 * 9] = 7;
        assert!(matches!(
            TricubicFunction::read(&mut bad.as_slice()),
            Err(TricubicError::InvalidArgument(_))
        ));

        let truncated = &bytes[..bytes.len() - 1];
        assert!(matches!(
            TricubicFunction::read(&mut &truncated[..]),
            Err(TricubicError::Io(_))
        ));
    }
}
