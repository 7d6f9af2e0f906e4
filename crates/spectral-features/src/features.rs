//! Spectral Edge Frequency and Relative Band Power

use thiserror::Error;
use tracing::debug;

use crate::band::Band;
use crate::welch::PsdEstimate;

/// Errors during spectral estimation
#[derive(Debug, Clone, Error)]
pub enum SpectralError {
    /// Recording has no samples
    #[error("recording contains no samples")]
    EmptyRecording,

    /// No frequency bins fall inside the configured range
    #[error("no frequency bins inside [{fmin}, {fmax}] Hz")]
    NoBinsInRange { fmin: f64, fmax: f64 },
}

/// Cross-channel summary of the two spectral biomarkers.
#[derive(Debug, Clone)]
pub struct SpectralSummary {
    /// Mean spectral edge frequency across channels (Hz)
    pub sef_mean: f64,
    /// Relative band power per band, aligned with the band slice passed in
    pub band_power: Vec<f64>,
}

/// Per-channel spectral edge frequency: the lowest frequency below which
/// `threshold` of the channel's total spectral power is contained.
///
/// A channel with zero (or non-finite) total power yields NaN rather than
/// panicking; the NaN propagates into any downstream mean.
pub fn spectral_edge_frequency(psd: &PsdEstimate, threshold: f64) -> Vec<f64> {
    psd.power
        .rows()
        .into_iter()
        .map(|row| {
            let mut cumulative = 0.0;
            let total: f64 = row.sum();
            if !(total > 0.0) || !total.is_finite() {
                return f64::NAN;
            }
            let target = threshold * total;
            for (i, &p) in row.iter().enumerate() {
                cumulative += p;
                if cumulative >= target {
                    return psd.freqs[i];
                }
            }
            // Rounding can leave the target just above the final cumulative
            // sum; the edge is then the last bin.
            *psd.freqs.last().expect("psd has at least one bin")
        })
        .collect()
}

/// Relative power per band: trapezoidal integral of the PSD over the band's
/// bins divided by the integral over the full range, averaged across
/// channels. Zero total power in a channel contributes NaN.
pub fn relative_band_power(psd: &PsdEstimate, bands: &[Band]) -> Vec<f64> {
    let n_ch = psd.power.nrows();

    let totals: Vec<f64> = psd
        .power
        .rows()
        .into_iter()
        .map(|row| trapezoid(row.as_slice().expect("contiguous psd row"), &psd.freqs))
        .collect();

    bands
        .iter()
        .map(|band| {
            let idx: Vec<usize> = (0..psd.n_bins())
                .filter(|&i| band.contains(psd.freqs[i]))
                .collect();
            let band_freqs: Vec<f64> = idx.iter().map(|&i| psd.freqs[i]).collect();

            let mut acc = 0.0;
            for ch in 0..n_ch {
                let band_psd: Vec<f64> = idx.iter().map(|&i| psd.power[[ch, i]]).collect();
                let band_power = trapezoid(&band_psd, &band_freqs);
                let proportion = if totals[ch] > 0.0 {
                    band_power / totals[ch]
                } else {
                    f64::NAN
                };
                acc += proportion;
            }
            acc / n_ch as f64
        })
        .collect()
}

/// Compute both biomarkers from one PSD estimate.
pub fn summarize(psd: &PsdEstimate, threshold: f64, bands: &[Band]) -> SpectralSummary {
    let sef = spectral_edge_frequency(psd, threshold);
    let sef_mean = sef.iter().sum::<f64>() / sef.len() as f64;
    let band_power = relative_band_power(psd, bands);

    debug!(sef_mean, ?band_power, "spectral summary computed");
    SpectralSummary {
        sef_mean,
        band_power,
    }
}

/// Trapezoidal integral of `y` over `x`. Fewer than two points integrate
/// to zero.
fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    debug_assert_eq!(y.len(), x.len());
    let mut area = 0.0;
    for i in 1..y.len() {
        area += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
    }
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::welch::{WelchConfig, WelchPsd};
    use ndarray::Array2;
    use recording::CleanedRecording;

    fn flat_psd(n_ch: usize, n_bins: usize) -> PsdEstimate {
        PsdEstimate {
            freqs: (0..n_bins).map(|i| i as f64).collect(),
            power: Array2::from_elem((n_ch, n_bins), 1.0),
        }
    }

    #[test]
    fn test_sef_on_flat_spectrum() {
        // Uniform power: 90% of cumulative sum is reached at bin 90 of 101.
        let psd = flat_psd(2, 101);
        let sef = spectral_edge_frequency(&psd, 0.9);
        assert_eq!(sef.len(), 2);
        assert!((sef[0] - 90.0).abs() <= 1.0);
        assert_eq!(sef[0], sef[1]);
    }

    #[test]
    fn test_sef_zero_power_is_nan() {
        let psd = PsdEstimate {
            freqs: vec![1.0, 2.0, 3.0],
            power: Array2::zeros((1, 3)),
        };
        let sef = spectral_edge_frequency(&psd, 0.9);
        assert!(sef[0].is_nan());
    }

    #[test]
    fn test_relative_power_bounds_and_partition() {
        let psd = flat_psd(3, 101);
        let bands = vec![
            Band::new("low", 0.0, 30.0),
            Band::new("mid", 30.0, 60.0),
            Band::new("high", 60.0, 100.0),
        ];
        let rel = relative_band_power(&psd, &bands);
        for &p in &rel {
            assert!(p >= 0.0 && p <= 1.0);
        }
        // Contiguous bands covering the range: proportions sum to ~1
        // (boundary bins are double-counted, so allow slack).
        let sum: f64 = rel.iter().sum();
        assert!((sum - 1.0).abs() < 0.05, "sum was {sum}");
    }

    #[test]
    fn test_zero_power_channel_poisons_mean() {
        let mut power = Array2::from_elem((2, 10), 1.0);
        power.row_mut(1).fill(0.0);
        let psd = PsdEstimate {
            freqs: (0..10).map(|i| i as f64).collect(),
            power,
        };
        let rel = relative_band_power(&psd, &[Band::new("all", 0.0, 9.0)]);
        assert!(rel[0].is_nan());
    }

    #[test]
    fn test_delta_dominates_with_strong_slow_component() {
        // 4 channels, 10 s at 250 Hz: large 2 Hz plus small 10 Hz component.
        let sfreq = 250.0;
        let n = 2500;
        let data = Array2::from_shape_fn((4, n), |(_, t)| {
            let t = t as f64 / sfreq;
            3.0 * (2.0 * std::f64::consts::PI * 2.0 * t).sin()
                + 0.5 * (2.0 * std::f64::consts::PI * 10.0 * t).sin()
        });
        let rec = CleanedRecording::new(
            vec!["C1".into(), "C2".into(), "C3".into(), "C4".into()],
            sfreq,
            data,
        );
        let psd = WelchPsd::new(WelchConfig::default()).estimate(&rec).unwrap();
        let bands = vec![Band::new("delta", 0.5, 4.0), Band::new("alpha", 8.0, 13.0)];
        let rel = relative_band_power(&psd, &bands);
        assert!(rel[0] > rel[1], "delta {} vs alpha {}", rel[0], rel[1]);
    }

    #[test]
    fn test_alpha_dominates_with_strong_fast_component() {
        let sfreq = 250.0;
        let n = 2500;
        let data = Array2::from_shape_fn((4, n), |(_, t)| {
            let t = t as f64 / sfreq;
            0.5 * (2.0 * std::f64::consts::PI * 2.0 * t).sin()
                + 3.0 * (2.0 * std::f64::consts::PI * 10.0 * t).sin()
        });
        let rec = CleanedRecording::new(
            vec!["C1".into(), "C2".into(), "C3".into(), "C4".into()],
            sfreq,
            data,
        );
        let psd = WelchPsd::new(WelchConfig::default()).estimate(&rec).unwrap();
        let bands = vec![Band::new("delta", 0.5, 4.0), Band::new("alpha", 8.0, 13.0)];
        let rel = relative_band_power(&psd, &bands);
        assert!(rel[1] > rel[0], "alpha {} vs delta {}", rel[1], rel[0]);
    }

    #[test]
    fn test_summary_mean_matches_channels() {
        let psd = flat_psd(2, 101);
        let summary = summarize(&psd, 0.9, &[Band::new("low", 0.0, 50.0)]);
        let sef = spectral_edge_frequency(&psd, 0.9);
        assert_eq!(summary.sef_mean, (sef[0] + sef[1]) / 2.0);
        assert_eq!(summary.band_power.len(), 1);
    }
}
