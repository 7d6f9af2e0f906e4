//! Connectivity Matrix Builder
//!
//! Builds symmetric channel-by-channel functional-connectivity matrices
//! from cleaned recordings: surface-Laplacian sharpening, fixed-length
//! epoching, debiased weighted phase-lag-index estimation averaged over a
//! frequency band, and `M + Mᵀ` symmetrization. Matrices are persisted as
//! headerless delimited tables.

mod matrix;
mod wpli;

pub use matrix::{read_matrix, symmetrize, write_matrix, MatrixError};
pub use wpli::{wpli_debiased, ConnectivityError};

use ndarray::Array2;
use recording::{epoch_fixed_length, surface_laplacian, CleanedRecording};
use tracing::debug;

/// Build the symmetric connectome of `rec` for the band `[low_hz, high_hz]`.
///
/// Epoch length is given in seconds; epochs are non-overlapping and
/// trailing samples are discarded.
pub fn build_connectome(
    rec: &CleanedRecording,
    epoch_secs: f64,
    low_hz: f64,
    high_hz: f64,
) -> Result<Array2<f64>, ConnectivityError> {
    let sharpened = surface_laplacian(&rec.data);
    let epoch_samples = (epoch_secs * rec.sfreq).round() as usize;
    let epochs = epoch_fixed_length(&sharpened, epoch_samples);

    let directional = wpli_debiased(&epochs, rec.sfreq, low_hz, high_hz)?;
    let connectome = symmetrize(&directional);

    debug!(
        channels = connectome.nrows(),
        epochs = epochs.shape()[0],
        low_hz,
        high_hz,
        "connectome built"
    );
    Ok(connectome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn lagged_pair_recording() -> CleanedRecording {
        // Two strongly coupled channels at a quarter-cycle lag, two silent-ish
        // independent channels.
        let sfreq = 250.0;
        let n = 2500;
        let data = Array2::from_shape_fn((4, n), |(c, t)| {
            let t = t as f64 / sfreq;
            let w = 2.0 * std::f64::consts::PI * 10.0;
            match c {
                0 => (w * t).sin(),
                1 => (w * t - std::f64::consts::FRAC_PI_2).sin(),
                2 => (2.0 * std::f64::consts::PI * 3.0 * t).sin(),
                _ => (2.0 * std::f64::consts::PI * 7.0 * t + 1.1).sin(),
            }
        });
        CleanedRecording::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            sfreq,
            data,
        )
    }

    #[test]
    fn test_connectome_is_symmetric() {
        let rec = lagged_pair_recording();
        let m = build_connectome(&rec, 1.0, 8.0, 13.0).unwrap();
        assert_eq!(m.nrows(), 4);
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(m[[i, j]], m[[j, i]]);
            }
        }
    }

    #[test]
    fn test_connectome_deterministic() {
        let rec = lagged_pair_recording();
        let a = build_connectome(&rec, 1.0, 8.0, 13.0).unwrap();
        let b = build_connectome(&rec, 1.0, 8.0, 13.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_recording_shorter_than_epoch() {
        let data = Array2::from_elem((3, 100), 1.0);
        let rec = CleanedRecording::new(vec!["a".into(), "b".into(), "c".into()], 250.0, data);
        assert!(matches!(
            build_connectome(&rec, 1.0, 8.0, 13.0),
            Err(ConnectivityError::NoEpochs)
        ));
    }
}
