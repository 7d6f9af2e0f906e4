//! Units of Work
//!
//! One function per unit the orchestrator dispatches. Each reads one input
//! and produces one self-contained output; failures are returned as typed
//! `UnitFailure` values (or degraded to NaN cells in place for the metrics
//! unit) and never touch sibling units.

use connectivity::{build_connectome, read_matrix, write_matrix};
use graph_metrics::{average_strength, clustering_coefficient, global_efficiency, ElectrodeMap};
use ndarray::Array2;
use recording::CleanedRecording;
use spectral_features::{summarize, Band, WelchPsd};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, UnitFailure};
use crate::subjects::group_label;
use crate::tables::{MetricsRow, SpectralRow};

/// Build the electrode map from the reference subject's channel ordering.
/// Must run before any region-pair metric; failure is startup-fatal.
pub fn reference_electrode_map(cfg: &AnalysisConfig) -> Result<ElectrodeMap, PipelineError> {
    let path = cfg.clean_path(&cfg.reference_subject);
    let rec = CleanedRecording::load(&path).map_err(|source| PipelineError::ReferenceRecording {
        subject: cfg.reference_subject.clone(),
        source,
    })?;
    Ok(ElectrodeMap::from_channels(&rec.channels))
}

/// Spectral unit: one subject's recording to one feature row.
pub fn spectral_unit(cfg: &AnalysisConfig, subject: &str) -> Result<SpectralRow, UnitFailure> {
    let rec = CleanedRecording::load(&cfg.clean_path(subject))?;
    let psd = WelchPsd::new(cfg.welch).estimate(&rec)?;
    let summary = summarize(&psd, cfg.sef_threshold, &cfg.spectral_bands);

    Ok(SpectralRow {
        id: subject.to_string(),
        group: group_label(subject),
        sef: summary.sef_mean,
        band_power: summary.band_power,
    })
}

/// Connectome unit: one (subject, band) to one persisted matrix.
pub fn connectome_unit(
    cfg: &AnalysisConfig,
    subject: &str,
    band: &Band,
) -> Result<PathBuf, UnitFailure> {
    let rec = CleanedRecording::load(&cfg.clean_path(subject))?;
    let matrix = build_connectome(&rec, cfg.epoch_secs, band.low_hz, band.high_hz)?;

    let path = cfg.connectome_path(&band.name, subject);
    write_matrix(&path, &matrix)?;
    info!(subject, band = %band.name, path = %path.display(), "connectome saved");
    Ok(path)
}

/// Metrics unit: one persisted matrix to one metrics row. Never fails:
/// load errors substitute the empty-matrix sentinel and every metric on it
/// degrades to NaN.
pub fn metrics_unit(
    cfg: &AnalysisConfig,
    electrodes: &ElectrodeMap,
    band: &str,
    matrix_path: &Path,
) -> MetricsRow {
    let subject = matrix_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();

    let matrix = match read_matrix(matrix_path) {
        Ok(m) => m,
        Err(e) => {
            warn!(path = %matrix_path.display(), error = %e, "connectome load failed, using sentinel");
            Array2::zeros((0, 0))
        }
    };

    let h = &cfg.hemispheres;
    MetricsRow {
        group: group_label(&subject),
        band: band.to_string(),
        ge: metric_or_nan(global_efficiency(&matrix), "global efficiency", &subject),
        cc: metric_or_nan(
            clustering_coefficient(&matrix),
            "clustering coefficient",
            &subject,
        ),
        cas_r: metric_or_nan(
            average_strength(&matrix, &h.right_anterior, &h.right_temporal, electrodes),
            "right hemisphere strength",
            &subject,
        ),
        cas_l: metric_or_nan(
            average_strength(&matrix, &h.left_anterior, &h.left_temporal, electrodes),
            "left hemisphere strength",
            &subject,
        ),
        id: subject,
    }
}

fn metric_or_nan(result: Result<f64, graph_metrics::GraphError>, what: &str, subject: &str) -> f64 {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(subject, error = %e, "{what} degraded to NaN");
            f64::NAN
        }
    }
}
