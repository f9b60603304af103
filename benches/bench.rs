#![allow(clippy::all)] // Clippy will attempt to remove black_box() internals

use criterion::*;
use gridgen::*;
use tricubic::{
    estimate_derivatives, Grid3, Parallelism, SampledGrid, TricubicBuilder, TricubicFunction,
};

enum Spacing {
    /// Unit spacing, arithmetic index search
    Integer,
    /// Regular spacing other than 1, bisection and rescaling
    Regular,
    /// Randomly perturbed spacing
    Rectilinear,
}

impl Spacing {
    fn name(&self) -> &'static str {
        match self {
            Spacing::Integer => "Integer",
            Spacing::Regular => "Regular",
            Spacing::Rectilinear => "Rectilinear",
        }
    }
}

fn build_function(
    spacing: &Spacing,
    gridsize: usize,
    parallelism: Parallelism,
) -> TricubicFunction {
    let (grids, vals) = gen_grid(spacing, gridsize);
    let f = Grid3::new([gridsize; 3], vals).unwrap();
    let derivs = estimate_derivatives(&grids[0], &grids[1], &grids[2], &f).unwrap();
    TricubicBuilder::new(&grids[0], &grids[1], &grids[2])
        .parallelism(parallelism)
        .build(&derivs.bundle())
        .unwrap()
}

macro_rules! bench_query_specific {
    ($group:ident, $spacing:expr, $gridsize:expr, $size:expr) => {
        let spacing = $spacing;
        let func = build_function(&spacing, $gridsize, Parallelism::default());
        let m: usize = ((*$size as f64).powf(1.0 / 3.0) + 2.0) as usize;
        let gridobs_t = gen_interp_obs_grid(&func, m, true);
        let obs: [&[f64]; 3] = [
            &gridobs_t[0][..*$size],
            &gridobs_t[1][..*$size],
            &gridobs_t[2][..*$size],
        ];

        $group.bench_with_input(
            BenchmarkId::new(format!("value {} {}-grid", spacing.name(), $gridsize), $size),
            $size,
            |b, &size| {
                let mut out = vec![0.0; size];
                b.iter(|| black_box(func.interp(obs, &mut out).unwrap()));
            },
        );

        $group.bench_with_input(
            BenchmarkId::new(format!("value_d2 {} {}-grid", spacing.name(), $gridsize), $size),
            $size,
            |b, &size| {
                b.iter(|| {
                    black_box({
                        let mut acc = 0.0;
                        for i in 0..size {
                            let (v, d1, d2) =
                                func.value_d2(obs[0][i], obs[1][i], obs[2][i]).unwrap();
                            acc += v + d1[0] + d2[2];
                        }
                        acc
                    })
                });
            },
        );
    };
}

fn bench_query(c: &mut Criterion) {
    for gridsize in [10, 50] {
        let mut group = c.benchmark_group(format!("Query_3D_Shuffled_{gridsize}-grid"));
        for size in [1, 100, 100_000].iter() {
            group.throughput(Throughput::Elements(*size as u64));
            bench_query_specific!(group, Spacing::Integer, gridsize, size);
            bench_query_specific!(group, Spacing::Regular, gridsize, size);
            bench_query_specific!(group, Spacing::Rectilinear, gridsize, size);
        }
        group.finish();
    }
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Build_3D");
    for gridsize in [10, 30, 60] {
        let ncells = (gridsize - 1usize).pow(3);
        group.throughput(Throughput::Elements(ncells as u64));
        let (grids, vals) = gen_grid(&Spacing::Rectilinear, gridsize);
        let f = Grid3::new([gridsize; 3], vals).unwrap();
        let derivs = estimate_derivatives(&grids[0], &grids[1], &grids[2], &f).unwrap();
        let samples = derivs.bundle();

        for (name, parallelism) in [
            ("Serial", Parallelism::Serial),
            ("Parallel", Parallelism::Global),
        ] {
            group.bench_with_input(
                BenchmarkId::new(format!("{name} {gridsize}-grid"), ncells),
                &ncells,
                |b, _| {
                    b.iter(|| {
                        black_box(
                            TricubicBuilder::new(&grids[0], &grids[1], &grids[2])
                                .parallelism(parallelism.clone())
                                .build(&samples)
                                .unwrap(),
                        )
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_sample(c: &mut Criterion) {
    let mut group = c.benchmark_group("Sample_3D");
    let func = build_function(&Spacing::Rectilinear, 20, Parallelism::default());
    for steps in [1, 4, 8] {
        let npoints = (steps * 19 + 1usize).pow(3);
        group.throughput(Throughput::Elements(npoints as u64));
        group.bench_with_input(
            BenchmarkId::new("Sample 20-grid", steps),
            &steps,
            |b, &steps| {
                let mut out = SampledGrid::new();
                b.iter(|| black_box(func.sample(steps, steps, steps, &mut out).unwrap()));
            },
        );
    }
    group.finish();
}

criterion_group!(benches_query, bench_query);
criterion_group!(benches_build, bench_build, bench_sample);
criterion_main!(benches_query, benches_build,);

mod randn {
    use rand::distr::{Distribution, StandardUniform};
    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    /// Fixed random seed to support repeatable testing
    const SEED: [u8; 32] = [
        0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 15, 14, 13, 12, 11, 10, 9, 8, 7,
        6, 5, 4, 3, 2, 1,
    ];

    /// Get a random number generator with a const seed for repeatable testing
    pub fn rng_fixed_seed() -> StdRng {
        StdRng::from_seed(SEED)
    }

    /// Generate `n` random numbers using provided generator
    pub fn randn<T>(rng: &mut StdRng, n: usize) -> Vec<T>
    where
        StandardUniform: Distribution<T>,
    {
        let out: Vec<T> = (0..n).map(|_| rng.random::<T>()).collect();
        out
    }
}

mod gridgen {
    use super::randn::*;
    use super::Spacing;
    use rand::seq::SliceRandom;
    use tricubic::utils::*;
    use tricubic::TricubicFunction;

    // Generate a grid to interpolate on, and some fake data values
    // in C order.
    pub fn gen_grid(spacing: &Spacing, size: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut rng = rng_fixed_seed();
        let n = size.pow(3);
        let z = randn::<f64>(&mut rng, n);

        let grids: Vec<Vec<f64>> = (0..3)
            .map(|_| match spacing {
                Spacing::Integer => linspace(0.0, (size - 1) as f64, size),
                Spacing::Regular => linspace(0.0, 100.0, size),
                Spacing::Rectilinear => {
                    let mut x = linspace(0.0, 100.0, size);
                    let dx = randn::<f64>(&mut rng, size);
                    let noise = 10.0 / size as f64;
                    (0..size).for_each(|i| x[i] = x[i] + (dx[i] - 0.5) * noise);
                    x
                }
            })
            .collect();

        (grids, z)
    }

    // Generate a set of shuffled observation points that are entirely
    // inside the interpolation grid.
    //
    // `size` is the size per axis, so the total number of points will be size.pow(3).
    pub fn gen_interp_obs_grid(
        func: &TricubicFunction,
        size: usize,
        shuffled: bool,
    ) -> Vec<Vec<f64>> {
        let mut rng = rng_fixed_seed();
        // Clamp to guard against roundoff past the last sample
        let axis = |lo: f64, hi: f64| -> Vec<f64> {
            linspace(lo, hi, size).into_iter().map(|v| v.clamp(lo, hi)).collect()
        };
        let x = axis(func.min_x(), func.max_x());
        let y = axis(func.min_y(), func.max_y());
        let z = axis(func.min_z(), func.max_z());
        let mut gridobs_t: Vec<Vec<f64>> = mesh_points(&x, &y, &z).into_iter().collect();
        if shuffled {
            (0..3).for_each(|i| gridobs_t[i].shuffle(&mut rng));
        }
        gridobs_t
    }
}
