//! Welch-method PSD Estimation

use ndarray::Array2;
use recording::CleanedRecording;
use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::features::SpectralError;

/// Welch estimation constants.
///
/// Frequency resolution is `sfreq / n_fft`; a 2048-point FFT at typical EEG
/// rates resolves the alpha/beta boundary without hand-tuning per subject.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WelchConfig {
    /// Lower bound of the analyzed frequency range (Hz)
    pub fmin: f64,
    /// Upper bound of the analyzed frequency range (Hz)
    pub fmax: f64,
    /// FFT length (samples per segment)
    pub n_fft: usize,
}

impl Default for WelchConfig {
    fn default() -> Self {
        Self {
            fmin: 0.5,
            fmax: 100.0,
            n_fft: 2048,
        }
    }
}

/// Per-channel power spectral density over a shared frequency axis.
#[derive(Debug, Clone)]
pub struct PsdEstimate {
    /// Frequency axis (Hz), restricted to [fmin, fmax]
    pub freqs: Vec<f64>,
    /// Power values, shape [channels, freq_bins]
    pub power: Array2<f64>,
}

impl PsdEstimate {
    /// Number of frequency bins; equals `power.ncols()` by construction.
    pub fn n_bins(&self) -> usize {
        self.freqs.len()
    }
}

/// Welch PSD estimator.
pub struct WelchPsd {
    /// FFT planner for efficient computation
    planner: FftPlanner<f64>,
    /// Estimation constants
    config: WelchConfig,
}

impl WelchPsd {
    /// Create a new estimator
    pub fn new(config: WelchConfig) -> Self {
        Self {
            planner: FftPlanner::new(),
            config,
        }
    }

    /// Estimate the PSD of every channel in `rec`.
    ///
    /// Segments of `n_fft` samples with 50% overlap, Hann taper per
    /// segment, periodograms averaged. Recordings shorter than `n_fft`
    /// fall back to a single zero-padded segment.
    pub fn estimate(&mut self, rec: &CleanedRecording) -> Result<PsdEstimate, SpectralError> {
        let n_samples = rec.n_samples();
        if n_samples == 0 {
            return Err(SpectralError::EmptyRecording);
        }

        let n_fft = self.config.n_fft;
        let seg_len = n_fft.min(n_samples);
        let step = (seg_len / 2).max(1);
        let window = hann(seg_len);
        let window_norm: f64 = window.iter().map(|w| w * w).sum();

        // One-sided axis at full n_fft resolution, then restrict to range.
        let freq_resolution = rec.sfreq / n_fft as f64;
        let keep: Vec<usize> = (0..=n_fft / 2)
            .filter(|&k| {
                let f = k as f64 * freq_resolution;
                f >= self.config.fmin && f <= self.config.fmax
            })
            .collect();
        if keep.is_empty() {
            return Err(SpectralError::NoBinsInRange {
                fmin: self.config.fmin,
                fmax: self.config.fmax,
            });
        }
        let freqs: Vec<f64> = keep.iter().map(|&k| k as f64 * freq_resolution).collect();

        let fft = self.planner.plan_fft_forward(n_fft);
        let n_ch = rec.n_channels();
        let mut power = Array2::<f64>::zeros((n_ch, keep.len()));

        for (ch, signal) in rec.data.rows().into_iter().enumerate() {
            let mut acc = vec![0.0f64; n_fft / 2 + 1];
            let mut n_segments = 0usize;

            let mut start = 0usize;
            while start + seg_len <= n_samples {
                let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); n_fft];
                for i in 0..seg_len {
                    buffer[i] = Complex::new(signal[start + i] * window[i], 0.0);
                }
                fft.process(&mut buffer);

                // One-sided density scaling: 1 / (sfreq * sum(w^2)), interior
                // bins doubled to account for negative frequencies.
                let scale = 1.0 / (rec.sfreq * window_norm);
                for (k, slot) in acc.iter_mut().enumerate() {
                    let mut p = buffer[k].norm_sqr() * scale;
                    if k != 0 && k != n_fft / 2 {
                        p *= 2.0;
                    }
                    *slot += p;
                }
                n_segments += 1;
                start += step;
            }

            debug_assert!(n_segments > 0);
            for (out, &k) in power.row_mut(ch).iter_mut().zip(&keep) {
                *out = acc[k] / n_segments as f64;
            }
        }

        debug!(
            channels = n_ch,
            bins = freqs.len(),
            resolution = freq_resolution,
            "welch psd estimated"
        );

        Ok(PsdEstimate { freqs, power })
    }
}

/// Hann taper of length `n`
fn hann(n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    (0..n)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64).cos()))
        .collect()
}
