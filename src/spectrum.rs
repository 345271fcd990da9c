//! Eigenvalues of the centred Gram matrix.
//!
//! Requires the `spectrum` feature (faer's self-adjoint eigen-solver).

use faer::{Mat, Side};
use ndarray::{Array2, Axis};

use crate::{Error, Result};

/// Eigenvalues of H K H, H = I - 11ᵀ/n, sorted in descending order.
pub fn centered_eigenvalues(gram: &Array2<f64>) -> Result<Vec<f64>> {
    let n = gram.nrows();
    if n == 0 || gram.ncols() != n {
        return Err(Error::DimensionMismatch(gram.nrows(), gram.ncols()));
    }

    let row_means = gram.mean_axis(Axis(1)).ok_or(Error::EmptyInput)?;
    let grand_mean = row_means.mean().ok_or(Error::EmptyInput)?;

    // K is symmetric, so row means double as column means.
    let centered = Mat::<f64>::from_fn(n, n, |i, j| {
        gram[[i, j]] - row_means[i] - row_means[j] + grand_mean
    });

    let mut eigenvalues: Vec<f64> = centered.selfadjoint_eigenvalues(Side::Lower);
    if eigenvalues.iter().any(|l| !l.is_finite()) {
        return Err(Error::Numerical("non-finite eigenvalue".into()));
    }
    eigenvalues.sort_by(|a, b| b.total_cmp(a));

    log::debug!(
        "eigen-decomposition of {}x{} centred Gram matrix, largest eigenvalue {:.6}",
        n,
        n,
        eigenvalues[0]
    );

    Ok(eigenvalues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_centering_kills_constant_direction() {
        // Constant matrix: centring leaves the zero matrix.
        let gram = Array2::from_elem((4, 4), 0.7);
        let ev = centered_eigenvalues(&gram).unwrap();
        assert_eq!(ev.len(), 4);
        for l in ev {
            assert!(l.abs() < 1e-10, "eigenvalue {}", l);
        }
    }

    #[test]
    fn test_sorted_descending_and_trace() {
        let gram = array![
            [1.0, 0.5, 0.1],
            [0.5, 1.0, 0.2],
            [0.1, 0.2, 1.0],
        ];
        let ev = centered_eigenvalues(&gram).unwrap();
        assert!(ev.windows(2).all(|w| w[0] >= w[1]));

        // trace(HKH) = trace(K) - sum(K)/n
        let expected_trace = 3.0 - gram.sum() / 3.0;
        let trace: f64 = ev.iter().sum();
        assert!((trace - expected_trace).abs() < 1e-10);
    }

    #[test]
    fn test_rejects_non_square() {
        let gram = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            centered_eigenvalues(&gram),
            Err(Error::DimensionMismatch(2, 3))
        ));
    }
}
