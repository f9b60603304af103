use rand::Rng;
use rand::SeedableRng;
use rand::distr::StandardUniform;
use rand::rngs::StdRng;

use crate::provider::{Grid3, SampleBundle, ValueProvider};

/// Fixed random seed to support repeatable testing
const SEED: [u8; 32] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7, 6,
    5, 4, 3, 2, 1,
];

/// Get a random number generator with a const seed for repeatable testing
pub fn rng_fixed_seed() -> StdRng {
    StdRng::from_seed(SEED)
}

/// Generate `n` random numbers using provided generator
pub fn randn<T>(rng: &mut StdRng, n: usize) -> Vec<T>
where
    StandardUniform: rand::distr::Distribution<T>,
{
    std::iter::repeat_with(|| rng.random::<T>())
        .take(n)
        .collect()
}

/// f = x^3 + 2y^2z - z and its derivatives in builder order.
/// Cubic along each axis, so a tricubic fit reproduces it exactly.
pub fn cubic_test_function(x: f64, y: f64, z: f64) -> [f64; 8] {
    [
        x * x * x + 2.0 * y * y * z - z,
        3.0 * x * x,
        4.0 * y * z,
        2.0 * y * y - 1.0,
        0.0,
        0.0,
        4.0 * y,
        0.0,
    ]
}

/// Sample a function returning all eight derivative kinds onto a grid
pub fn sample_grids(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    f: impl Fn(f64, f64, f64) -> [f64; 8],
) -> Vec<Grid3> {
    let shape = [x.len(), y.len(), z.len()];
    let mut grids = vec![Grid3::zeros(shape); 8];
    for (i, j, k) in itertools::iproduct!(0..shape[0], 0..shape[1], 0..shape[2]) {
        let v = f(x[i], y[j], z[k]);
        for (g, v) in grids.iter_mut().zip(v) {
            g.set(i, j, k, v);
        }
    }
    grids
}

/// Borrow eight sampled grids as a bundle
pub fn bundle(grids: &[Grid3]) -> SampleBundle<'_> {
    SampleBundle::new(core::array::from_fn(|n| &grids[n] as &dyn ValueProvider))
}
