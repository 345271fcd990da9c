//! Kernel functions and Gram matrices.
//!
//! The two-sample test uses the Gaussian kernel in the *width*
//! parametrization
//!
//! ```text
//! k(x, y) = exp(-||x - y||² / τ),    τ = 2σ²
//! ```
//!
//! which differs from the textbook RBF form `exp(-||x - y||² / (2σ²))` only
//! in how the bandwidth is written down. [`GaussianKernel::from_sigma`]
//! accepts the σ form.

use ndarray::{Array2, ArrayView2};

use crate::{Error, Result};

#[inline]
fn sq_dist(x: &[f64], y: &[f64]) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - yi).powi(2))
        .sum()
}

/// Gaussian kernel with width τ: k(x, y) = exp(-||x-y||² / τ).
///
/// A width of 8 corresponds to σ = 2 in the standard parametrization.
///
/// ```rust
/// use twosample::GaussianKernel;
///
/// let kernel = GaussianKernel::from_sigma(2.0).unwrap();
/// assert_eq!(kernel.width(), 8.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianKernel {
    width: f64,
}

impl GaussianKernel {
    /// Create a kernel with width τ. The width must be finite and positive.
    pub fn new(width: f64) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(Error::InvalidBandwidth(width));
        }
        Ok(Self { width })
    }

    /// Create a kernel from the standard deviation σ, i.e. τ = 2σ².
    pub fn from_sigma(sigma: f64) -> Result<Self> {
        Self::new(2.0 * sigma * sigma)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Equivalent standard deviation σ = sqrt(τ / 2).
    pub fn sigma(&self) -> f64 {
        (self.width / 2.0).sqrt()
    }

    pub fn eval(&self, x: &[f64], y: &[f64]) -> f64 {
        (-sq_dist(x, y) / self.width).exp()
    }

    /// Gram matrix K[i,j] = k(row_i, row_j) over the rows of `data`.
    ///
    /// Memory is O(n²) in the number of rows; this is what bounds the sample
    /// size of the quadratic-time test.
    pub fn matrix(&self, data: ArrayView2<f64>) -> Array2<f64> {
        #[cfg(feature = "simd")]
        {
            crate::simd::gaussian_kernel_matrix_simd(data, self.width)
        }
        #[cfg(not(feature = "simd"))]
        {
            self.matrix_scalar(data)
        }
    }

    /// Scalar Gram matrix, used by [`GaussianKernel::matrix`] unless the
    /// `simd` feature is enabled.
    pub fn matrix_scalar(&self, data: ArrayView2<f64>) -> Array2<f64> {
        let n = data.nrows();
        let mut k = Array2::zeros((n, n));

        for i in 0..n {
            k[[i, i]] = 1.0; // k(x, x) = 1
            let xi = data.row(i);
            for j in (i + 1)..n {
                let xj = data.row(j);
                let d: f64 = xi
                    .iter()
                    .zip(xj.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum();
                let kij = (-d / self.width).exp();
                k[[i, j]] = kij;
                k[[j, i]] = kij;
            }
        }

        k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_from_sigma_matches_standard_form() {
        let x: [f64; 2] = [0.3, -1.2];
        let y: [f64; 2] = [1.5, 0.4];
        let kernel = GaussianKernel::from_sigma(2.0).unwrap();
        let sq: f64 = x.iter().zip(y.iter()).map(|(a, b)| (a - b).powi(2)).sum();
        let expected = (-sq / (2.0 * 2.0 * 2.0)).exp();
        assert!((kernel.eval(&x, &y) - expected).abs() < 1e-12);
        assert!((kernel.sigma() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_eval_self_is_one() {
        let x = [1.0, 2.0, 3.0];
        let kernel = GaussianKernel::new(8.0).unwrap();
        assert!((kernel.eval(&x, &x) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gaussian_rejects_bad_width() {
        assert!(matches!(
            GaussianKernel::new(0.0),
            Err(Error::InvalidBandwidth(_))
        ));
        assert!(GaussianKernel::new(f64::NAN).is_err());
        assert!(GaussianKernel::new(-8.0).is_err());
    }

    #[test]
    fn test_gaussian_distant() {
        let kernel = GaussianKernel::new(1.0).unwrap();
        let k = kernel.eval(&[0.0, 0.0], &[100.0, 100.0]);
        assert!(k < 1e-10, "distant points should have ~0 similarity");
    }

    #[test]
    fn test_matrix_symmetric_unit_diagonal() {
        let data = array![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [2.0, 2.0]];
        let kernel = GaussianKernel::new(8.0).unwrap();
        let k = kernel.matrix(data.view());

        assert_eq!(k.shape(), &[4, 4]);
        for i in 0..4 {
            assert!((k[[i, i]] - 1.0).abs() < 1e-6);
            for j in 0..4 {
                assert!(
                    (k[[i, j]] - k[[j, i]]).abs() < 1e-10,
                    "kernel matrix should be symmetric"
                );
            }
        }
        assert!((k[[0, 1]] - (-1.0f64 / 8.0).exp()).abs() < 1e-6);
    }
}
