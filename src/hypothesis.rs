//! The two-sample test interface the demo drives.
//!
//! A test object carries mutable configuration (null-approximation method,
//! statistic type, iteration counts). Setters overwrite whatever was set
//! before; there is no rollback.

use std::fmt;

use crate::Result;

/// How the distribution of the statistic under H₀: P = Q is approximated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullApproximation {
    /// Recompute the statistic on random re-partitions of the pooled samples.
    #[default]
    Bootstrap,
    /// Weighted sum of χ² variables from the Gram-matrix eigenvalues.
    Spectrum,
    /// Moment-matched gamma distribution. Biased statistic only.
    Gamma,
}

/// Which MMD² estimator the statistic is computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatisticType {
    /// V-statistic, includes the kernel diagonal.
    Biased,
    /// U-statistic, excludes the within-sample diagonals.
    #[default]
    Unbiased,
}

impl fmt::Display for NullApproximation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bootstrap => f.write_str("bootstrap"),
            Self::Spectrum => f.write_str("spectrum"),
            Self::Gamma => f.write_str("gamma"),
        }
    }
}

impl fmt::Display for StatisticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Biased => f.write_str("biased"),
            Self::Unbiased => f.write_str("unbiased"),
        }
    }
}

/// A kernel two-sample test with configurable null approximation.
pub trait TwoSampleTest {
    /// The test statistic for the data the test was built with.
    fn compute_statistic(&mut self) -> Result<f64>;

    fn set_null_approximation_method(&mut self, method: NullApproximation);

    fn set_statistic_type(&mut self, statistic_type: StatisticType);

    fn set_bootstrap_iterations(&mut self, iterations: usize);

    /// p-value of `statistic` under the currently configured null
    /// approximation. Always in [0, 1].
    fn compute_p_value(&mut self, statistic: f64) -> Result<f64>;

    /// Samples of the statistic under H₀ drawn by bootstrapping, using the
    /// configured statistic type and iteration count.
    fn bootstrap_null(&mut self) -> Result<Vec<f64>>;

    /// Spectral null sampling, when the test supports it.
    ///
    /// `None` means the capability is absent (for [`crate::QuadraticTimeMmd`]:
    /// built without the `spectrum` feature).
    fn spectrum(&mut self) -> Option<&mut dyn SpectrumSampling>;
}

/// Optional capability: null approximation from the kernel spectrum.
pub trait SpectrumSampling {
    /// Number of null samples drawn when a p-value is computed.
    fn set_num_samples_spectrum(&mut self, num_samples: usize);

    /// Number of leading eigenvalues used when a p-value is computed.
    fn set_num_eigenvalues_spectrum(&mut self, num_eigenvalues: usize);

    fn sample_null_spectrum(
        &mut self,
        num_samples: usize,
        num_eigenvalues: usize,
    ) -> Result<Vec<f64>>;
}
