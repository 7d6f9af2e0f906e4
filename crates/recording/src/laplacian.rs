//! Surface-Laplacian Spatial Filter
//!
//! Current-source-density sharpening applied before connectivity
//! estimation. Without montage geometry the reference surface is the full
//! channel set, so the filter is the complete-graph Laplacian: each channel
//! minus the mean of all other channels. Volume-conducted activity common
//! to the montage cancels; focal activity is preserved.

use ndarray::{Array1, Array2, Axis};

/// Apply the surface-Laplacian transform to `data` ([channels, samples]).
///
/// Recordings with fewer than two channels are returned unchanged.
pub fn surface_laplacian(data: &Array2<f64>) -> Array2<f64> {
    let n_ch = data.nrows();
    if n_ch < 2 {
        return data.clone();
    }

    // Per-timepoint channel sum; mean of the others for channel i is
    // (sum - x_i) / (n - 1).
    let sums: Array1<f64> = data.sum_axis(Axis(0));
    let mut out = data.clone();
    let denom = (n_ch - 1) as f64;
    for mut row in out.rows_mut() {
        for (t, value) in row.iter_mut().enumerate() {
            let others_mean = (sums[t] - *value) / denom;
            *value -= others_mean;
        }
    }
    out
}
