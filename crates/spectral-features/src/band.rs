//! Frequency Band Definitions

use serde::{Deserialize, Serialize};

/// A named frequency interval (Hz), `low_hz < high_hz`.
///
/// Bin membership is inclusive on both bounds, so adjacent bands may share
/// their boundary bin; that overlap is tolerated by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Band name (e.g. "delta")
    pub name: String,
    /// Lower bound (Hz)
    pub low_hz: f64,
    /// Upper bound (Hz)
    pub high_hz: f64,
}

impl Band {
    /// Create a band definition
    pub fn new(name: &str, low_hz: f64, high_hz: f64) -> Self {
        debug_assert!(low_hz < high_hz);
        Self {
            name: name.to_string(),
            low_hz,
            high_hz,
        }
    }

    /// Inclusive membership test for a frequency bin
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz <= self.high_hz
    }
}
