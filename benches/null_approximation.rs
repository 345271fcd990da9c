//! Cost of the three null approximations on the same test object.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use twosample::{
    generate_mean_data, Features, GaussianKernel, NullApproximation, QuadraticTimeMmd,
    StatisticType, TwoSampleTest,
};

fn build(n: usize) -> QuadraticTimeMmd {
    let mut rng = StdRng::seed_from_u64(0);
    let data = generate_mean_data(n, 2, 0.5, &mut rng).unwrap();
    let features = Features::new(data).unwrap();
    QuadraticTimeMmd::new(GaussianKernel::new(8.0).unwrap(), &features, n)
        .unwrap()
        .with_seed(0)
}

fn bench_null_approximation(c: &mut Criterion) {
    let mut group = c.benchmark_group("null_approximation");
    group.sample_size(10);

    for n in [100usize, 250, 500] {
        let mut mmd = build(n);
        mmd.set_statistic_type(StatisticType::Biased);
        let statistic = mmd.compute_statistic().unwrap();

        group.bench_with_input(BenchmarkId::new("statistic", n), &n, |b, _| {
            b.iter(|| black_box(mmd.compute_statistic().unwrap()))
        });

        mmd.set_null_approximation_method(NullApproximation::Bootstrap);
        mmd.set_bootstrap_iterations(10);
        group.bench_with_input(BenchmarkId::new("bootstrap_10", n), &n, |b, _| {
            b.iter(|| black_box(mmd.compute_p_value(black_box(statistic)).unwrap()))
        });

        mmd.set_null_approximation_method(NullApproximation::Gamma);
        group.bench_with_input(BenchmarkId::new("gamma", n), &n, |b, _| {
            b.iter(|| black_box(mmd.compute_p_value(black_box(statistic)).unwrap()))
        });

        #[cfg(feature = "spectrum")]
        {
            // Fresh object per iteration so the eigen-decomposition is not cached.
            group.bench_with_input(BenchmarkId::new("spectrum_eigen", n), &n, |b, &n| {
                b.iter_batched(
                    || build(n),
                    |mut mmd| black_box(mmd.sample_null_spectrum(50, 10).unwrap()),
                    criterion::BatchSize::LargeInput,
                )
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_null_approximation);
criterion_main!(benches);
