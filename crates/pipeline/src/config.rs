//! Analysis Configuration
//!
//! One immutable structure built at startup and passed into every
//! component; the `Default` impl carries the canonical study constants and
//! a TOML file can override individual fields.

use serde::{Deserialize, Serialize};
use spectral_features::{Band, WelchConfig};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Fixed electrode groupings for the hemisphere average-strength metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HemisphereGroups {
    /// Right anterior electrodes
    pub right_anterior: Vec<String>,
    /// Right temporal electrodes
    pub right_temporal: Vec<String>,
    /// Left anterior electrodes
    pub left_anterior: Vec<String>,
    /// Left temporal electrodes
    pub left_temporal: Vec<String>,
}

impl Default for HemisphereGroups {
    fn default() -> Self {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            right_anterior: names(&["Fp2", "AF4", "AF8", "F2", "F4", "F6", "F8"]),
            right_temporal: names(&["FC6", "C6", "FT8", "T8", "TP8"]),
            left_anterior: names(&["Fp1", "AF3", "AF7", "F1", "F3", "F5", "F7"]),
            left_temporal: names(&["FC5", "C5", "FT7", "T7", "TP7"]),
        }
    }
}

/// Process-wide analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory of cleaned recordings (`{subject}_clean.csv`)
    pub clean_root: PathBuf,
    /// Directory for aggregated output tables
    pub data_root: PathBuf,
    /// Root of the persisted connectome store (`{band}/{subject}.csv`)
    pub connectome_root: PathBuf,
    /// Subject whose channel ordering defines the electrode map
    pub reference_subject: String,
    /// Spectral edge frequency threshold (proportion of total power)
    pub sef_threshold: f64,
    /// Epoch length for connectivity estimation (seconds)
    pub epoch_secs: f64,
    /// Worker-pool size for connectome generation
    pub matrix_workers: usize,
    /// Worker-pool size for feature aggregation
    pub feature_workers: usize,
    /// Welch PSD constants
    pub welch: WelchConfig,
    /// Bands for the spectral table
    pub spectral_bands: Vec<Band>,
    /// Bands for connectome generation and metrics
    pub connectivity_bands: Vec<Band>,
    /// Electrode groupings for the hemisphere strength metrics
    pub hemispheres: HemisphereGroups,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            clean_root: PathBuf::from("data/clean"),
            data_root: PathBuf::from("data"),
            connectome_root: PathBuf::from("data/connectomes"),
            reference_subject: "N01".to_string(),
            sef_threshold: 0.9,
            epoch_secs: 1.0,
            matrix_workers: 4,
            feature_workers: 16,
            welch: WelchConfig::default(),
            spectral_bands: vec![
                Band::new("delta", 0.5, 4.0),
                Band::new("theta", 4.0, 8.0),
                Band::new("alpha", 8.0, 13.0),
                Band::new("beta", 13.0, 30.0),
            ],
            connectivity_bands: vec![
                Band::new("delta", 0.5, 4.0),
                Band::new("theta", 4.0, 8.0),
                Band::new("alpha", 8.0, 13.0),
            ],
            hemispheres: HemisphereGroups::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load the configuration: defaults, optionally overridden by a TOML file.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let defaults = ::config::Config::try_from(&AnalysisConfig::default())?;
        let mut builder = ::config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Path of a subject's cleaned recording
    pub fn clean_path(&self, subject: &str) -> PathBuf {
        self.clean_root.join(format!("{subject}_clean.csv"))
    }

    /// Path of a persisted connectome
    pub fn connectome_path(&self, band: &str, subject: &str) -> PathBuf {
        self.connectome_root.join(band).join(format!("{subject}.csv"))
    }

    /// Path of the aggregated spectral table
    pub fn spectral_table_path(&self) -> PathBuf {
        self.data_root.join("spectral.csv")
    }

    /// Path of the aggregated connectome-metrics table
    pub fn metrics_table_path(&self) -> PathBuf {
        self.data_root.join("connectome_metrics.csv")
    }
}
