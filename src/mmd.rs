//! Quadratic-time Maximum Mean Discrepancy two-sample test.
//!
//! The test stores the full Gram matrix of the pooled samples, so memory is
//! O(n²) in the sample size. Statistics are reported scaled by the group size
//! m, i.e. `m · MMD²`, the quantity whose null distribution converges as m
//! grows.
//!
//! # References
//!
//! - Gretton et al. (2012). "A Kernel Two-Sample Test" (JMLR)
//! - Gretton et al. (2009). "A Fast, Consistent Kernel Two-Sample Test" (NIPS)

use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use statrs::distribution::{ContinuousCDF, Gamma};

use crate::data::Features;
use crate::hypothesis::{NullApproximation, SpectrumSampling, StatisticType, TwoSampleTest};
use crate::kernel::GaussianKernel;
use crate::{Error, Result};

/// Bootstrap iteration count below which null samples are too coarse for
/// anything but a demonstration.
pub const RECOMMENDED_BOOTSTRAP_ITERATIONS: usize = 250;

/// Quadratic-time MMD test between the first `m` and the last `m` samples of
/// a feature set.
///
/// # Example
///
/// ```rust
/// use ndarray::array;
/// use twosample::{Features, GaussianKernel, QuadraticTimeMmd, StatisticType, TwoSampleTest};
///
/// let data = array![[0.0], [0.1], [0.2], [10.0], [10.1], [10.2]];
/// let features = Features::new(data).unwrap();
/// let kernel = GaussianKernel::new(2.0).unwrap();
///
/// let mut mmd = QuadraticTimeMmd::new(kernel, &features, 3).unwrap().with_seed(1);
/// mmd.set_statistic_type(StatisticType::Biased);
/// let statistic = mmd.compute_statistic().unwrap();
/// assert!(statistic > 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct QuadraticTimeMmd {
    kernel: GaussianKernel,
    gram: Array2<f64>,
    m: usize,
    method: NullApproximation,
    statistic_type: StatisticType,
    bootstrap_iterations: usize,
    num_samples_spectrum: usize,
    num_eigenvalues_spectrum: usize,
    #[cfg_attr(not(feature = "spectrum"), allow(dead_code))]
    eigenvalues: Option<Vec<f64>>,
    rng: StdRng,
}

impl QuadraticTimeMmd {
    /// Build the test and precompute the `2m × 2m` Gram matrix.
    ///
    /// `m` is the size of each group; the features must hold exactly `2m`
    /// samples.
    pub fn new(kernel: GaussianKernel, features: &Features, m: usize) -> Result<Self> {
        if m < 2 {
            return Err(Error::EmptyInput);
        }
        if 2 * m != features.num_vectors() {
            return Err(Error::SampleSizeMismatch {
                n: m,
                total: features.num_vectors(),
            });
        }

        log::debug!(
            "building {}x{} Gram matrix (width {}, {} MiB)",
            2 * m,
            2 * m,
            kernel.width(),
            (4 * m * m * std::mem::size_of::<f64>()) >> 20
        );
        let gram = kernel.matrix(features.view());

        Ok(Self {
            kernel,
            gram,
            m,
            method: NullApproximation::default(),
            statistic_type: StatisticType::default(),
            bootstrap_iterations: RECOMMENDED_BOOTSTRAP_ITERATIONS,
            num_samples_spectrum: 0,
            num_eigenvalues_spectrum: 0,
            eigenvalues: None,
            rng: StdRng::from_os_rng(),
        })
    }

    /// Reseed the internal generator used for null sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn kernel(&self) -> &GaussianKernel {
        &self.kernel
    }

    pub fn gram(&self) -> &Array2<f64> {
        &self.gram
    }

    /// Samples per group.
    pub fn m(&self) -> usize {
        self.m
    }

    pub fn null_approximation_method(&self) -> NullApproximation {
        self.method
    }

    pub fn statistic_type(&self) -> StatisticType {
        self.statistic_type
    }

    pub fn bootstrap_iterations(&self) -> usize {
        self.bootstrap_iterations
    }

    pub fn set_num_samples_spectrum(&mut self, num_samples: usize) {
        self.num_samples_spectrum = num_samples;
    }

    pub fn set_num_eigenvalues_spectrum(&mut self, num_eigenvalues: usize) {
        self.num_eigenvalues_spectrum = num_eigenvalues;
    }

    /// Compute the statistic and its p-value in one go.
    pub fn perform_test(&mut self) -> Result<f64> {
        let statistic = self.statistic_with(&self.identity(), self.statistic_type);
        self.p_value(statistic)
    }

    /// Test threshold: the (1 - alpha) quantile of the approximated null
    /// distribution. H₀ is rejected when the statistic exceeds it.
    pub fn compute_threshold(&mut self, alpha: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(Error::InvalidParameter(format!("alpha {} not in [0, 1]", alpha)));
        }

        match self.method {
            NullApproximation::Bootstrap => {
                let samples = self.sample_bootstrap()?;
                Ok(upper_quantile(samples, alpha))
            }
            NullApproximation::Spectrum => {
                let samples =
                    self.spectrum_samples(self.num_samples_spectrum, self.num_eigenvalues_spectrum)?;
                Ok(upper_quantile(samples, alpha))
            }
            NullApproximation::Gamma => {
                let dist = self.gamma_null()?;
                Ok(dist.inverse_cdf(1.0 - alpha))
            }
        }
    }

    /// Shape and scale of the gamma distribution matched to the first two
    /// null moments of `m · MMD²_b`.
    pub fn gamma_parameters(&self) -> Result<(f64, f64)> {
        let m = self.m;
        let mf = m as f64;
        let k = &self.gram;

        let mut traces = 0.0;
        for i in 0..m {
            traces += k[[i, i]] + k[[m + i, m + i]] - 2.0 * k[[i, m + i]];
        }
        let mean = traces / (mf * mf);

        let mut var = 0.0;
        for i in 0..m {
            for j in 0..m {
                if i == j {
                    continue;
                }
                let h = k[[i, j]] + k[[m + i, m + j]] - k[[i, m + j]] - k[[m + i, j]];
                var += h * h;
            }
        }
        var *= 2.0 / (mf * (mf - 1.0)).powi(2);

        if !(mean > 0.0) || !(var > 0.0) {
            return Err(Error::Numerical(format!(
                "degenerate null moments: mean {}, variance {}",
                mean, var
            )));
        }

        let shape = mean * mean / var;
        let scale = var * mf / mean;
        Ok((shape, scale))
    }

    /// Draw spectral null samples with the given sample and eigenvalue count.
    ///
    /// Fails with [`Error::SpectrumUnavailable`] when the crate was built
    /// without the `spectrum` feature.
    pub fn sample_null_spectrum(
        &mut self,
        num_samples: usize,
        num_eigenvalues: usize,
    ) -> Result<Vec<f64>> {
        self.spectrum_samples(num_samples, num_eigenvalues)
    }

    fn identity(&self) -> Vec<usize> {
        (0..2 * self.m).collect()
    }

    /// `m · MMD²` between the samples indexed by `idx[..m]` and `idx[m..]`.
    fn statistic_with(&self, idx: &[usize], statistic_type: StatisticType) -> f64 {
        let k = &self.gram;
        let mf = self.m as f64;
        let (x, y) = idx.split_at(self.m);

        let block = |a: &[usize], b: &[usize]| -> f64 {
            a.iter()
                .map(|&i| b.iter().map(|&j| k[[i, j]]).sum::<f64>())
                .sum()
        };
        let trace = |a: &[usize]| -> f64 { a.iter().map(|&i| k[[i, i]]).sum() };

        let kxx = block(x, x);
        let kyy = block(y, y);
        let kxy = block(x, y);

        let mmd2 = match statistic_type {
            // E[k(X,X')] + E[k(Y,Y')] - 2E[k(X,Y)]
            StatisticType::Biased => (kxx + kyy - 2.0 * kxy) / (mf * mf),
            StatisticType::Unbiased => {
                let within = mf * (mf - 1.0);
                (kxx - trace(x)) / within + (kyy - trace(y)) / within - 2.0 * kxy / (mf * mf)
            }
        };

        mf * mmd2
    }

    fn sample_bootstrap(&mut self) -> Result<Vec<f64>> {
        let iterations = self.bootstrap_iterations;
        if iterations == 0 {
            return Err(Error::InvalidParameter(
                "bootstrap iterations must be positive".into(),
            ));
        }
        if iterations < RECOMMENDED_BOOTSTRAP_ITERATIONS {
            log::warn!(
                "{} bootstrap iterations; at least {} are recommended",
                iterations,
                RECOMMENDED_BOOTSTRAP_ITERATIONS
            );
        }
        log::debug!(
            "bootstrapping null distribution: {} iterations, {} statistic",
            iterations,
            self.statistic_type
        );

        let mut pooled = self.identity();
        let mut samples = Vec::with_capacity(iterations);

        for _ in 0..iterations {
            // Shuffle
            for i in (1..pooled.len()).rev() {
                let j = self.rng.random_range(0..=i);
                pooled.swap(i, j);
            }
            samples.push(self.statistic_with(&pooled, self.statistic_type));
        }

        Ok(samples)
    }

    #[cfg(feature = "spectrum")]
    fn eigenvalues(&mut self) -> Result<&[f64]> {
        if self.eigenvalues.is_none() {
            self.eigenvalues = Some(crate::spectrum::centered_eigenvalues(&self.gram)?);
        }
        Ok(self.eigenvalues.as_deref().unwrap_or_default())
    }

    #[cfg(not(feature = "spectrum"))]
    fn eigenvalues(&mut self) -> Result<&[f64]> {
        Err(Error::SpectrumUnavailable)
    }

    fn spectrum_samples(&mut self, num_samples: usize, num_eigenvalues: usize) -> Result<Vec<f64>> {
        if num_samples == 0 {
            return Err(Error::InvalidParameter(
                "number of spectrum samples must be positive".into(),
            ));
        }
        if num_eigenvalues == 0 || num_eigenvalues > 2 * self.m {
            return Err(Error::InvalidParameter(format!(
                "number of eigenvalues {} not in 1..={}",
                num_eigenvalues,
                2 * self.m
            )));
        }
        log::debug!(
            "sampling spectral null distribution: {} samples, {} eigenvalues, {} statistic",
            num_samples,
            num_eigenvalues,
            self.statistic_type
        );

        let mf = self.m as f64;
        let weights: Vec<f64> = self
            .eigenvalues()?
            .iter()
            .take(num_eigenvalues)
            .map(|l| l.abs() / mf)
            .collect();

        // The unbiased statistic is centred: each χ² term loses its mean.
        let offset = match self.statistic_type {
            StatisticType::Biased => 0.0,
            StatisticType::Unbiased => 1.0,
        };

        let mut samples = Vec::with_capacity(num_samples);
        for _ in 0..num_samples {
            let sample: f64 = weights
                .iter()
                .map(|w| {
                    let z: f64 = StandardNormal.sample(&mut self.rng);
                    w * (z * z - offset)
                })
                .sum();
            samples.push(sample);
        }

        Ok(samples)
    }

    fn gamma_null(&self) -> Result<Gamma> {
        if self.statistic_type != StatisticType::Biased {
            return Err(Error::InvalidParameter(
                "gamma approximation requires the biased statistic".into(),
            ));
        }
        let (shape, scale) = self.gamma_parameters()?;
        log::debug!("gamma null approximation: shape {:.6}, scale {:.6}", shape, scale);
        Gamma::new(shape, 1.0 / scale).map_err(|e| Error::Numerical(e.to_string()))
    }

    fn p_value(&mut self, statistic: f64) -> Result<f64> {
        if !statistic.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "statistic {} is not finite",
                statistic
            )));
        }

        match self.method {
            NullApproximation::Bootstrap => {
                let samples = self.sample_bootstrap()?;
                Ok(p_value_from_samples(&samples, statistic))
            }
            NullApproximation::Spectrum => {
                let samples =
                    self.spectrum_samples(self.num_samples_spectrum, self.num_eigenvalues_spectrum)?;
                Ok(p_value_from_samples(&samples, statistic))
            }
            NullApproximation::Gamma => {
                let dist = self.gamma_null()?;
                if statistic <= 0.0 {
                    return Ok(1.0);
                }
                Ok((1.0 - dist.cdf(statistic)).clamp(0.0, 1.0))
            }
        }
    }
}

impl TwoSampleTest for QuadraticTimeMmd {
    fn compute_statistic(&mut self) -> Result<f64> {
        Ok(self.statistic_with(&self.identity(), self.statistic_type))
    }

    fn set_null_approximation_method(&mut self, method: NullApproximation) {
        log::debug!("null approximation: {}", method);
        self.method = method;
    }

    fn set_statistic_type(&mut self, statistic_type: StatisticType) {
        self.statistic_type = statistic_type;
    }

    fn set_bootstrap_iterations(&mut self, iterations: usize) {
        self.bootstrap_iterations = iterations;
    }

    fn compute_p_value(&mut self, statistic: f64) -> Result<f64> {
        self.p_value(statistic)
    }

    fn bootstrap_null(&mut self) -> Result<Vec<f64>> {
        self.sample_bootstrap()
    }

    fn spectrum(&mut self) -> Option<&mut dyn SpectrumSampling> {
        #[cfg(feature = "spectrum")]
        {
            Some(self as &mut dyn SpectrumSampling)
        }
        #[cfg(not(feature = "spectrum"))]
        {
            None
        }
    }
}

#[cfg(feature = "spectrum")]
impl SpectrumSampling for QuadraticTimeMmd {
    fn set_num_samples_spectrum(&mut self, num_samples: usize) {
        QuadraticTimeMmd::set_num_samples_spectrum(self, num_samples);
    }

    fn set_num_eigenvalues_spectrum(&mut self, num_eigenvalues: usize) {
        QuadraticTimeMmd::set_num_eigenvalues_spectrum(self, num_eigenvalues);
    }

    fn sample_null_spectrum(
        &mut self,
        num_samples: usize,
        num_eigenvalues: usize,
    ) -> Result<Vec<f64>> {
        QuadraticTimeMmd::sample_null_spectrum(self, num_samples, num_eigenvalues)
    }
}

/// Empirical tail fraction: #{s > statistic} / N.
fn p_value_from_samples(samples: &[f64], statistic: f64) -> f64 {
    let count_greater = samples.iter().filter(|&&s| s > statistic).count();
    count_greater as f64 / samples.len() as f64
}

fn upper_quantile(mut samples: Vec<f64>, alpha: f64) -> f64 {
    samples.sort_by(|a, b| a.total_cmp(b));
    let idx = ((1.0 - alpha) * samples.len() as f64).floor() as usize;
    samples[idx.min(samples.len() - 1)]
}
