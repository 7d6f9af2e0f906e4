//! Debiased Weighted Phase-Lag-Index Estimation
//!
//! Multitaper cross-spectra are computed per epoch with a small sine-taper
//! set; each (epoch, taper) pair contributes one sample of the imaginary
//! cross-spectrum. The debiased wPLI² statistic is formed per channel pair
//! and frequency bin, then averaged over the requested band. Output fills
//! the upper triangle (j > i); the caller symmetrizes.

use ndarray::{Array2, Array3};
use rustfft::{num_complex::Complex, FftPlanner};
use thiserror::Error;
use tracing::trace;

/// Number of sine tapers per epoch
const N_TAPERS: usize = 3;

/// Errors during connectivity estimation
#[derive(Debug, Clone, Error)]
pub enum ConnectivityError {
    /// Recording produced no complete epochs
    #[error("no complete epochs to estimate from")]
    NoEpochs,

    /// Connectivity needs at least two channels
    #[error("need at least 2 channels, got {0}")]
    TooFewChannels(usize),

    /// Epoch length cannot resolve any bin inside the band
    #[error("no frequency bins inside [{low_hz}, {high_hz}] Hz at this epoch length")]
    NoBinsInBand { low_hz: f64, high_hz: f64 },

    /// Every pair/bin had a degenerate denominator (e.g. perfectly
    /// synchronous or silent channels)
    #[error("estimator degenerate: no channel pair carried phase-lag information")]
    Degenerate,
}

/// Estimate band-averaged debiased wPLI² for every channel pair.
///
/// `epochs` is `[epochs, channels, samples]`. Returns a square matrix with
/// the estimate at `[i, j]` for `j > i` and zeros elsewhere. Pairs whose
/// debiasing denominator vanishes contribute zero for that bin.
pub fn wpli_debiased(
    epochs: &Array3<f64>,
    sfreq: f64,
    low_hz: f64,
    high_hz: f64,
) -> Result<Array2<f64>, ConnectivityError> {
    let (n_epochs, n_ch, n_samples) = epochs.dim();
    if n_epochs == 0 || n_samples == 0 {
        return Err(ConnectivityError::NoEpochs);
    }
    if n_ch < 2 {
        return Err(ConnectivityError::TooFewChannels(n_ch));
    }

    let resolution = sfreq / n_samples as f64;
    let bins: Vec<usize> = (0..=n_samples / 2)
        .filter(|&k| {
            let f = k as f64 * resolution;
            f >= low_hz && f <= high_hz
        })
        .collect();
    if bins.is_empty() {
        return Err(ConnectivityError::NoBinsInBand { low_hz, high_hz });
    }

    let n_pairs = n_ch * (n_ch - 1) / 2;
    let n_bins = bins.len();
    let mut sum_im = vec![0.0f64; n_pairs * n_bins];
    let mut sum_abs = vec![0.0f64; n_pairs * n_bins];
    let mut sum_sq = vec![0.0f64; n_pairs * n_bins];

    let tapers = sine_tapers(N_TAPERS, n_samples);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_samples);
    let mut spectra: Vec<Vec<Complex<f64>>> = vec![Vec::new(); n_ch];

    for e in 0..n_epochs {
        for taper in &tapers {
            for (c, spectrum) in spectra.iter_mut().enumerate() {
                let mut buffer: Vec<Complex<f64>> = (0..n_samples)
                    .map(|t| Complex::new(epochs[[e, c, t]] * taper[t], 0.0))
                    .collect();
                fft.process(&mut buffer);
                *spectrum = buffer;
            }

            let mut pair = 0usize;
            for i in 0..n_ch {
                for j in (i + 1)..n_ch {
                    for (b, &k) in bins.iter().enumerate() {
                        let cross = spectra[i][k] * spectra[j][k].conj();
                        let im = cross.im;
                        let idx = pair * n_bins + b;
                        sum_im[idx] += im;
                        sum_abs[idx] += im.abs();
                        sum_sq[idx] += im * im;
                    }
                    pair += 1;
                }
            }
        }
    }

    let mut out = Array2::<f64>::zeros((n_ch, n_ch));
    let mut any_valid = false;
    let mut pair = 0usize;
    for i in 0..n_ch {
        for j in (i + 1)..n_ch {
            let mut acc = 0.0;
            for b in 0..n_bins {
                let idx = pair * n_bins + b;
                let num = sum_im[idx] * sum_im[idx] - sum_sq[idx];
                let den = sum_abs[idx] * sum_abs[idx] - sum_sq[idx];
                if den > 0.0 {
                    acc += num / den;
                    any_valid = true;
                }
            }
            out[[i, j]] = acc / n_bins as f64;
            pair += 1;
        }
    }

    if !any_valid {
        return Err(ConnectivityError::Degenerate);
    }

    trace!(n_epochs, n_ch, n_bins, "wpli estimated");
    Ok(out)
}

/// Sine taper set: `w_k[t] = sqrt(2/(N+1)) * sin(pi*(k+1)*(t+1)/(N+1))`.
fn sine_tapers(n_tapers: usize, n_samples: usize) -> Vec<Vec<f64>> {
    let norm = (2.0 / (n_samples as f64 + 1.0)).sqrt();
    (1..=n_tapers)
        .map(|k| {
            (0..n_samples)
                .map(|t| {
                    norm * (std::f64::consts::PI * k as f64 * (t as f64 + 1.0)
                        / (n_samples as f64 + 1.0))
                        .sin()
                })
                .collect()
        })
        .collect()
}
