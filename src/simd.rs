//! SIMD-accelerated Gram matrices.
//!
//! Uses [`innr`] for the squared L2 distances. Distances are computed in
//! `f32` and the kernel values are widened back to `f64`, so expect
//! agreement with the scalar path to roughly 1e-6.
//!
//! For large matrices (n > 100), SIMD can provide 2-4x speedup depending on
//! hardware.

use ndarray::{Array2, ArrayView2};

/// Gaussian Gram matrix K[i,j] = exp(-||x_i - x_j||² / width) over the rows
/// of `data`.
pub fn gaussian_kernel_matrix_simd(data: ArrayView2<f64>, width: f64) -> Array2<f64> {
    let rows: Vec<Vec<f32>> = data
        .rows()
        .into_iter()
        .map(|r| r.iter().map(|&v| v as f32).collect())
        .collect();

    let n = rows.len();
    let mut k = Array2::zeros((n, n));

    for i in 0..n {
        k[[i, i]] = 1.0;

        for j in (i + 1)..n {
            let sq_dist = innr::l2_distance_squared(&rows[i], &rows[j]) as f64;
            let kij = (-sq_dist / width).exp();
            k[[i, j]] = kij;
            k[[j, i]] = kij;
        }
    }

    k
}
