//! Gaussian Gram matrix over a two-sample data set, scalar path vs innr SIMD path.
//!
//! Without the `simd` feature only the scalar path runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, SeedableRng};
use twosample::{generate_mean_data, GaussianKernel};

fn bench_gram_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_gram_scaling");
    let kernel = GaussianKernel::new(8.0).unwrap();

    // n samples per group, so each Gram matrix is 2n x 2n.
    for n in [64usize, 128, 256, 512] {
        let mut rng = StdRng::seed_from_u64(n as u64);
        let data = generate_mean_data(n, 2, 0.5, &mut rng).unwrap();

        group.throughput(Throughput::Elements((4 * n * n) as u64));

        group.bench_with_input(BenchmarkId::new("scalar", n), &n, |b, _| {
            b.iter(|| black_box(kernel.matrix_scalar(black_box(data.view()))))
        });

        #[cfg(feature = "simd")]
        group.bench_with_input(BenchmarkId::new("simd", n), &n, |b, _| {
            b.iter(|| {
                black_box(twosample::simd::gaussian_kernel_matrix_simd(
                    black_box(data.view()),
                    kernel.width(),
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_gram_scaling);
criterion_main!(benches);
