//! Fixed-length Epoching

use ndarray::{s, Array2, Array3};

/// Segment `data` ([channels, samples]) into non-overlapping windows of
/// `epoch_samples` samples, returned as `[epochs, channels, epoch_samples]`.
/// Trailing samples that do not fill a complete window are discarded.
pub fn epoch_fixed_length(data: &Array2<f64>, epoch_samples: usize) -> Array3<f64> {
    let (n_ch, n_t) = data.dim();
    if epoch_samples == 0 {
        return Array3::zeros((0, n_ch, 0));
    }
    let n_epochs = n_t / epoch_samples;

    let mut out = Array3::<f64>::zeros((n_epochs, n_ch, epoch_samples));
    for e in 0..n_epochs {
        let start = e * epoch_samples;
        out.slice_mut(s![e, .., ..])
            .assign(&data.slice(s![.., start..start + epoch_samples]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_count_and_shape() {
        let data = Array2::from_elem((8, 750), 1.0);
        let epochs = epoch_fixed_length(&data, 250);
        assert_eq!(epochs.shape(), &[3, 8, 250]);
    }

    #[test]
    fn test_trailing_samples_dropped() {
        // 260 samples at 250 per epoch: one epoch, 10 samples discarded.
        let data = Array2::from_elem((4, 260), 0.5);
        let epochs = epoch_fixed_length(&data, 250);
        assert_eq!(epochs.shape()[0], 1);
    }

    #[test]
    fn test_epoch_content_preserved() {
        let data = Array2::from_shape_fn((2, 6), |(c, t)| (c * 10 + t) as f64);
        let epochs = epoch_fixed_length(&data, 3);
        assert_eq!(epochs[[0, 0, 2]], 2.0);
        assert_eq!(epochs[[1, 1, 0]], 13.0);
    }

    #[test]
    fn test_zero_epoch_length() {
        let data = Array2::from_elem((2, 100), 1.0);
        let epochs = epoch_fixed_length(&data, 0);
        assert_eq!(epochs.shape()[0], 0);
    }
}
