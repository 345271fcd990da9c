//! Quadratic-time MMD demonstration run.
//!
//! Generates mean-shifted data, computes the MMD statistic once and reports
//! p-values from the bootstrap, spectrum and gamma null approximations,
//! followed by direct samples from the bootstrap and spectral null
//! distributions. Everything goes through [`TwoSampleTest`], so the run can
//! be driven by any implementation of it.

use std::io::Write;

use ndarray::ArrayView1;
use rand::{rngs::StdRng, SeedableRng};

use crate::data::{column_means, generate_mean_data, Features};
use crate::hypothesis::{NullApproximation, StatisticType, TwoSampleTest};
use crate::kernel::GaussianKernel;
use crate::mmd::QuadraticTimeMmd;
use crate::{Error, Result};

/// Parameters of one demonstration run.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    /// Samples per group. The Gram matrix holds (2n)² entries, which bounds n.
    pub n: usize,
    pub dim: usize,
    /// Mean shift of the first dimension of the second group.
    pub difference: f64,
    /// Gaussian width τ in k(x,y) = exp(-||x-y||² / τ). 8 is σ = 2.
    pub kernel_width: f64,
    /// Test level.
    pub alpha: f64,
    /// Iterations for the bootstrap p-value. Far too few for real use, where
    /// 250 or more are appropriate.
    pub bootstrap_iterations: usize,
    /// Null samples drawn for the spectrum p-value.
    pub spectrum_samples: usize,
    /// Iterations when sampling the bootstrap null distribution directly.
    pub null_bootstrap_iterations: usize,
    /// Samples when sampling the spectral null distribution directly.
    pub null_spectrum_samples: usize,
    /// Eigenvalues when sampling the spectral null distribution directly.
    pub null_spectrum_eigenvalues: usize,
    /// Seed for data generation and null sampling. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            n: 500,
            dim: 2,
            difference: 0.5,
            kernel_width: 8.0,
            alpha: 0.05,
            bootstrap_iterations: 10,
            spectrum_samples: 50,
            null_bootstrap_iterations: 10,
            null_spectrum_samples: 50,
            null_spectrum_eigenvalues: 10,
            seed: None,
        }
    }
}

impl DemoConfig {
    /// Eigenvalues used for the spectrum p-value: all but the ten smallest,
    /// and at least one.
    pub fn spectrum_eigenvalues(&self) -> usize {
        self.n.saturating_sub(10).max(1)
    }
}

/// p-value of one null approximation and the test decision at `alpha`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodResult {
    pub method: NullApproximation,
    pub p_value: f64,
    /// `p_value < alpha`, i.e. the test says P ≠ Q.
    pub rejected: bool,
}

/// Mean and population variance of directly drawn null samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NullSummary {
    pub method: NullApproximation,
    pub num_samples: usize,
    pub mean: f64,
    pub variance: f64,
}

/// Everything a demonstration run printed, in structured form.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub statistic: f64,
    pub bootstrap: MethodResult,
    /// `None` when the test lacks the spectral capability.
    pub spectrum: Option<MethodResult>,
    pub gamma: MethodResult,
    pub bootstrap_null: NullSummary,
    pub spectrum_null: NullSummary,
}

/// Run the full demonstration with the quadratic-time MMD engine.
///
/// Generates the data, builds features, the Gaussian kernel and the test
/// object, then hands over to [`run_with_test`].
pub fn run_quadratic_time_mmd_demo<W: Write + ?Sized>(
    config: &DemoConfig,
    out: &mut W,
) -> Result<DemoReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let data = generate_mean_data(config.n, config.dim, config.difference, &mut rng)?;
    let features = Features::new(data)?;
    let kernel = GaussianKernel::new(config.kernel_width)?;

    let mut mmd = QuadraticTimeMmd::new(kernel, &features, config.n)?;
    if let Some(seed) = config.seed {
        mmd = mmd.with_seed(seed.wrapping_add(1));
    }

    run_with_test(config, &features, &mut mmd, out)
}

/// Drive `test` through the demonstration sequence and print the results.
///
/// `features` must hold the `2 · config.n` samples `test` was built from;
/// they are only used to print the per-dimension means of each group.
///
/// Only the spectrum p-value is guarded by the capability check. Sampling
/// the spectral null distribution at the end is not, and fails with
/// [`Error::SpectrumUnavailable`] when the capability is missing.
pub fn run_with_test<T, W>(
    config: &DemoConfig,
    features: &Features,
    test: &mut T,
    out: &mut W,
) -> Result<DemoReport>
where
    T: TwoSampleTest + ?Sized,
    W: Write + ?Sized,
{
    let n = config.n;
    let x_means = column_means(features.p(n)?)?;
    let y_means = column_means(features.q(n)?)?;
    writeln!(out, "dimension means of X {:?}", x_means.to_vec())?;
    writeln!(out, "dimension means of Y {:?}", y_means.to_vec())?;

    let statistic = test.compute_statistic()?;
    log::info!("MMD statistic: {}", statistic);

    writeln!(out, "computing p-value using bootstrapping")?;
    test.set_null_approximation_method(NullApproximation::Bootstrap);
    test.set_bootstrap_iterations(config.bootstrap_iterations);
    test.set_statistic_type(StatisticType::Unbiased);
    let bootstrap = report_p_value(test, NullApproximation::Bootstrap, statistic, config.alpha, out)?;

    let spectrum = if test.spectrum().is_some() {
        writeln!(out, "computing p-value using spectrum method")?;
        test.set_null_approximation_method(NullApproximation::Spectrum);
        if let Some(spectrum) = test.spectrum() {
            spectrum.set_num_samples_spectrum(config.spectrum_samples);
            spectrum.set_num_eigenvalues_spectrum(config.spectrum_eigenvalues());
        }
        test.set_statistic_type(StatisticType::Biased);
        Some(report_p_value(test, NullApproximation::Spectrum, statistic, config.alpha, out)?)
    } else {
        log::debug!("spectral capability absent, skipping spectrum p-value");
        None
    };

    writeln!(out, "computing p-value using gamma method")?;
    test.set_null_approximation_method(NullApproximation::Gamma);
    test.set_statistic_type(StatisticType::Biased);
    let gamma = report_p_value(test, NullApproximation::Gamma, statistic, config.alpha, out)?;

    writeln!(out, "sampling null distribution using bootstrapping")?;
    test.set_null_approximation_method(NullApproximation::Bootstrap);
    test.set_statistic_type(StatisticType::Biased);
    test.set_bootstrap_iterations(config.null_bootstrap_iterations);
    let samples = test.bootstrap_null()?;
    let bootstrap_null = report_null(NullApproximation::Bootstrap, &samples, out)?;

    writeln!(out, "sampling null distribution using spectrum method")?;
    test.set_null_approximation_method(NullApproximation::Spectrum);
    test.set_statistic_type(StatisticType::Biased);
    let samples = test
        .spectrum()
        .ok_or(Error::SpectrumUnavailable)?
        .sample_null_spectrum(config.null_spectrum_samples, config.null_spectrum_eigenvalues)?;
    let spectrum_null = report_null(NullApproximation::Spectrum, &samples, out)?;

    Ok(DemoReport {
        statistic,
        bootstrap,
        spectrum,
        gamma,
        bootstrap_null,
        spectrum_null,
    })
}

fn report_p_value<T, W>(
    test: &mut T,
    method: NullApproximation,
    statistic: f64,
    alpha: f64,
    out: &mut W,
) -> Result<MethodResult>
where
    T: TwoSampleTest + ?Sized,
    W: Write + ?Sized,
{
    let p_value = test.compute_p_value(statistic)?;
    let rejected = p_value < alpha;
    log::debug!("{} p-value {}", method, p_value);

    writeln!(out, "p_value: {}", p_value)?;
    writeln!(
        out,
        "p_value < {} , i.e. test sais p!=q: {}",
        alpha,
        if rejected { "True" } else { "False" }
    )?;

    Ok(MethodResult {
        method,
        p_value,
        rejected,
    })
}

fn report_null<W: Write + ?Sized>(
    method: NullApproximation,
    samples: &[f64],
    out: &mut W,
) -> Result<NullSummary> {
    let (mean, variance) = mean_and_variance(samples)?;
    writeln!(out, "null mean: {}", mean)?;
    writeln!(out, "null variance: {}", variance)?;

    Ok(NullSummary {
        method,
        num_samples: samples.len(),
        mean,
        variance,
    })
}

/// Arithmetic mean and population variance (divisor N).
pub fn mean_and_variance(samples: &[f64]) -> Result<(f64, f64)> {
    let view = ArrayView1::from(samples);
    let mean = view.mean().ok_or(Error::EmptyInput)?;
    Ok((mean, view.var(0.0)))
}
