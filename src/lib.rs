//! # twosample
//!
//! Kernel two-sample testing with the quadratic-time Maximum Mean
//! Discrepancy (MMD).
//!
//! ## Intuition
//!
//! MMD embeds two distributions P and Q into a reproducing kernel Hilbert
//! space and measures the distance between their mean embeddings. With a
//! characteristic kernel (the Gaussian kernel is one) the distance is zero
//! iff P = Q, so a large statistic is evidence that the samples come from
//! different distributions.
//!
//! How large is "large" depends on the null distribution of the statistic,
//! which has no closed form. This crate approximates it three ways:
//!
//! | Method | Cost | Statistic |
//! |--------|------|-----------|
//! | [`NullApproximation::Bootstrap`] | O(B·n²) | biased or unbiased |
//! | [`NullApproximation::Spectrum`] | O(n³) eigen-decomposition | biased or unbiased |
//! | [`NullApproximation::Gamma`] | O(n²) | biased only |
//!
//! ## Quick Start
//!
//! ```rust
//! use rand::{rngs::StdRng, SeedableRng};
//! use twosample::{
//!     generate_mean_data, Features, GaussianKernel, NullApproximation, QuadraticTimeMmd,
//!     StatisticType, TwoSampleTest,
//! };
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let data = generate_mean_data(100, 2, 2.0, &mut rng).unwrap();
//! let features = Features::new(data).unwrap();
//!
//! let mut mmd = QuadraticTimeMmd::new(GaussianKernel::new(8.0).unwrap(), &features, 100)
//!     .unwrap()
//!     .with_seed(0);
//! mmd.set_null_approximation_method(NullApproximation::Gamma);
//! mmd.set_statistic_type(StatisticType::Biased);
//!
//! let statistic = mmd.compute_statistic().unwrap();
//! let p_value = mmd.compute_p_value(statistic).unwrap();
//! assert!(p_value < 0.05);
//! ```
//!
//! ## Features
//!
//! - `spectrum` (default): spectral null approximation via faer's
//!   eigen-solver. Without it [`TwoSampleTest::spectrum`] returns `None`.
//! - `simd`: Gram matrices via [`innr`](https://docs.rs/innr) distances.
//!
//! ## What Can Go Wrong
//!
//! 1. **Memory**: the Gram matrix of 2n samples is (2n)² doubles.
//! 2. **Bandwidth**: too small makes the Gram matrix nearly diagonal, too
//!    large makes every pair look alike.
//! 3. **Too few bootstrap iterations**: p-values are quantized to 1/B.

use thiserror::Error;

pub mod data;
pub mod demo;
pub mod hypothesis;
pub mod kernel;
pub mod mmd;

/// SIMD-accelerated Gram matrices using innr.
///
/// Requires the `simd` feature.
#[cfg(feature = "simd")]
pub mod simd;

/// Eigen-decomposition of the centred Gram matrix.
///
/// Requires the `spectrum` feature.
#[cfg(feature = "spectrum")]
pub mod spectrum;

pub use data::{column_means, generate_mean_data, Features};
pub use demo::{run_quadratic_time_mmd_demo, run_with_test, DemoConfig, DemoReport};
pub use hypothesis::{NullApproximation, SpectrumSampling, StatisticType, TwoSampleTest};
pub use kernel::GaussianKernel;
pub use mmd::QuadraticTimeMmd;

/// Errors for kernel two-sample testing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("empty input")]
    EmptyInput,

    #[error("dimension mismatch: {0} vs {1}")]
    DimensionMismatch(usize, usize),

    #[error("invalid bandwidth: {0}")]
    InvalidBandwidth(f64),

    #[error("sample size {n} does not split {total} samples into two groups")]
    SampleSizeMismatch { n: usize, total: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("spectral null approximation unavailable (built without the `spectrum` feature)")]
    SpectrumUnavailable,

    #[error("numerical failure: {0}")]
    Numerical(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
