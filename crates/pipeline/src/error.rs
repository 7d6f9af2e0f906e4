//! Pipeline Error Types
//!
//! Two tiers: `PipelineError` is configuration/startup-fatal and halts the
//! run before any unit is dispatched; `UnitFailure` is caught at the unit
//! boundary, logged, and converted to NaN sentinels so sibling units keep
//! running.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors that abort the run before (or between) batch phases
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The clean-recordings directory cannot be listed
    #[error("cannot read clean root {path}: {source}")]
    CleanRootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The reference recording for the electrode map cannot be loaded
    #[error("cannot load reference recording for {subject:?}: {source}")]
    ReferenceRecording {
        subject: String,
        #[source]
        source: recording::RecordingError,
    },

    /// Configuration file missing/invalid
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// An output directory cannot be created
    #[error("cannot prepare output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A per-band connectome directory cannot be scanned
    #[error("cannot scan connectome directory {path}: {source}")]
    ConnectomeScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An aggregated table cannot be written
    #[error("cannot write table {path}: {source}")]
    TableWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Per-unit failures; the tagged reason lets tests distinguish a missing
/// file from a numerically degenerate estimate.
#[derive(Debug, Error)]
pub enum UnitFailure {
    /// Recording missing or malformed
    #[error("recording unreadable: {0}")]
    Recording(#[from] recording::RecordingError),

    /// Spectral estimation failed
    #[error("spectral estimation failed: {0}")]
    Spectral(#[from] spectral_features::SpectralError),

    /// Connectivity estimation failed or degenerate
    #[error("connectivity estimation failed: {0}")]
    Connectivity(#[from] connectivity::ConnectivityError),

    /// Connectome matrix missing, malformed, or unwritable
    #[error("connectome matrix error: {0}")]
    Matrix(#[from] connectivity::MatrixError),
}
