//! Convenience methods for constructing grids in a way that echoes,
//! but does not exactly match, methods common in scripting languages.
use itertools::Itertools;
use num_traits::Float;

/// Generates evenly spaced values from start to stop,
/// including the endpoint.
///
/// # Panics
/// If `n < 2`.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float,
{
    let steps = (n - 1) as f64;
    let dx: T = (stop - start) / T::from(steps).unwrap_or_else(T::one);
    (0..n)
        .map(|i| start + T::from(i as f64).unwrap_or_else(T::zero) * dx)
        .collect()
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid<T>(x: Vec<&Vec<T>>) -> Vec<Vec<T>>
where
    T: Float,
{
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}

/// Axis samples for a grid of observation points in C ordering, as three
/// flat coordinate arrays ready for [`crate::TricubicFunction::interp`].
pub fn mesh_points(x: &[f64], y: &[f64], z: &[f64]) -> [Vec<f64>; 3] {
    let (x, y, z) = (x.to_vec(), y.to_vec(), z.to_vec());
    let mesh = meshgrid(vec![&x, &y, &z]);
    let mut out = [
        Vec::with_capacity(mesh.len()),
        Vec::with_capacity(mesh.len()),
        Vec::with_capacity(mesh.len()),
    ];
    for p in mesh {
        for d in 0..3 {
            out[d].push(p[d]);
        }
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_linspace() {
        let v = linspace(-1.0, 1.0, 5);
        assert_eq!(v, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_mesh_points() {
        let [x, y, z] = mesh_points(&[0.0, 1.0], &[2.0, 3.0, 4.0], &[5.0]);
        assert_eq!(x, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        assert_eq!(y, vec![2.0, 3.0, 4.0, 2.0, 3.0, 4.0]);
        assert_eq!(z, vec![5.0; 6]);
    }
}
