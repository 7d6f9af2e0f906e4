//! Spectral Feature Engine
//!
//! Welch-method power spectral density estimation plus the two spectral
//! biomarkers derived from it: spectral edge frequency and relative
//! per-band power.

mod band;
mod features;
mod welch;

pub use band::Band;
pub use features::{
    relative_band_power, spectral_edge_frequency, summarize, SpectralError, SpectralSummary,
};
pub use welch::{PsdEstimate, WelchConfig, WelchPsd};
