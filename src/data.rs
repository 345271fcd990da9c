//! Synthetic two-sample data and the feature container fed to the test.
//!
//! Samples are stored one per row. A two-sample data set holds the samples
//! of P in rows `0..n` and the samples of Q in rows `n..2n`.

use ndarray::{concatenate, s, Array1, Array2, ArrayView2, Axis};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::{Error, Result};

/// Generate `2n` samples of dimension `dim` for a mean-shift problem.
///
/// Rows `0..n` are drawn from N(0, I). Rows `n..2n` are drawn from N(0, I)
/// with the first coordinate shifted by `difference`, so the two halves only
/// differ in the mean of dimension 0.
///
/// ```rust
/// use rand::{rngs::StdRng, SeedableRng};
/// use twosample::data::generate_mean_data;
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let data = generate_mean_data(100, 2, 0.5, &mut rng).unwrap();
/// assert_eq!(data.shape(), &[200, 2]);
/// ```
pub fn generate_mean_data<R: Rng + ?Sized>(
    n: usize,
    dim: usize,
    difference: f64,
    rng: &mut R,
) -> Result<Array2<f64>> {
    if n == 0 || dim == 0 {
        return Err(Error::EmptyInput);
    }

    let mut data: Array2<f64> = Array2::from_shape_simple_fn((2 * n, dim), || {
        StandardNormal.sample(&mut *rng)
    });
    data.slice_mut(s![n.., 0]).mapv_inplace(|v| v + difference);

    Ok(data)
}

/// Dense real-valued features, one sample per row.
#[derive(Debug, Clone)]
pub struct Features {
    data: Array2<f64>,
}

impl Features {
    pub fn new(data: Array2<f64>) -> Result<Self> {
        if data.nrows() == 0 || data.ncols() == 0 {
            return Err(Error::EmptyInput);
        }
        Ok(Self { data })
    }

    /// Stack the samples of P on top of the samples of Q.
    pub fn from_samples<'a>(p: ArrayView2<'a, f64>, q: ArrayView2<'a, f64>) -> Result<Self> {
        if p.ncols() != q.ncols() {
            return Err(Error::DimensionMismatch(p.ncols(), q.ncols()));
        }
        let data = concatenate(Axis(0), &[p, q]).map_err(|_| Error::EmptyInput)?;
        Self::new(data)
    }

    /// Total number of samples (rows), both groups together.
    pub fn num_vectors(&self) -> usize {
        self.data.nrows()
    }

    pub fn dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Samples of P: the first `n` rows.
    pub fn p(&self, n: usize) -> Result<ArrayView2<'_, f64>> {
        self.check_split(n)?;
        Ok(self.data.slice(s![..n, ..]))
    }

    /// Samples of Q: every row after the first `n`.
    pub fn q(&self, n: usize) -> Result<ArrayView2<'_, f64>> {
        self.check_split(n)?;
        Ok(self.data.slice(s![n.., ..]))
    }

    fn check_split(&self, n: usize) -> Result<()> {
        if n == 0 || n >= self.num_vectors() {
            return Err(Error::SampleSizeMismatch {
                n,
                total: self.num_vectors(),
            });
        }
        Ok(())
    }
}

/// Per-dimension mean of a set of samples.
pub fn column_means(samples: ArrayView2<f64>) -> Result<Array1<f64>> {
    samples.mean_axis(Axis(0)).ok_or(Error::EmptyInput)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_generate_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let data = generate_mean_data(50, 3, 0.5, &mut rng).unwrap();
        assert_eq!(data.shape(), &[100, 3]);
    }

    #[test]
    fn test_generate_shifts_first_dimension_only() {
        let mut rng = StdRng::seed_from_u64(2);
        let n = 4000;
        let data = generate_mean_data(n, 2, 3.0, &mut rng).unwrap();

        let mx = column_means(data.slice(s![..n, ..])).unwrap();
        let my = column_means(data.slice(s![n.., ..])).unwrap();

        assert!((my[0] - mx[0] - 3.0).abs() < 0.15, "shift {}", my[0] - mx[0]);
        assert!((my[1] - mx[1]).abs() < 0.15, "no shift {}", my[1] - mx[1]);
    }

    #[test]
    fn test_generate_rejects_empty() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            generate_mean_data(0, 2, 0.5, &mut rng),
            Err(Error::EmptyInput)
        ));
        assert!(generate_mean_data(10, 0, 0.5, &mut rng).is_err());
    }

    #[test]
    fn test_generate_is_seeded() {
        let a = generate_mean_data(10, 2, 0.5, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate_mean_data(10, 2, 0.5, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_features_split() {
        let features = Features::new(array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0], [7.0, 8.0]]).unwrap();
        assert_eq!(features.num_vectors(), 4);
        assert_eq!(features.dim(), 2);

        let p = features.p(2).unwrap();
        let q = features.q(2).unwrap();
        assert_eq!(column_means(p).unwrap(), array![2.0, 3.0]);
        assert_eq!(column_means(q).unwrap(), array![6.0, 7.0]);

        assert!(features.p(0).is_err());
        assert!(features.q(4).is_err());
    }

    #[test]
    fn test_features_from_samples() {
        let p = array![[1.0, 2.0], [3.0, 4.0]];
        let q = array![[5.0, 6.0]];
        let features = Features::from_samples(p.view(), q.view()).unwrap();
        assert_eq!(features.num_vectors(), 3);
        assert_eq!(features.q(2).unwrap(), array![[5.0, 6.0]]);

        let bad = array![[1.0, 2.0, 3.0]];
        assert!(matches!(
            Features::from_samples(p.view(), bad.view()),
            Err(Error::DimensionMismatch(2, 3))
        ));
    }
}
