//! Aggregated Feature Tables
//!
//! Long-format delimited tables with a header row, one row per
//! (subject[, band]). NaN cells are valid output: they mark units that
//! degraded to the sentinel. Files are overwritten on each run.

use serde::Serialize;
use spectral_features::Band;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::error::PipelineError;

/// One spectral-features record per subject
#[derive(Debug, Clone, Serialize)]
pub struct SpectralRow {
    /// Subject identifier
    pub id: String,
    /// Cohort label (0 control, 1 exposed)
    pub group: u8,
    /// Mean spectral edge frequency (Hz)
    pub sef: f64,
    /// Relative band power, aligned with the configured spectral bands
    pub band_power: Vec<f64>,
}

impl SpectralRow {
    /// Sentinel row for a failed unit: identity preserved, features NaN.
    pub fn failed(subject: &str, group: u8, n_bands: usize) -> Self {
        Self {
            id: subject.to_string(),
            group,
            sef: f64::NAN,
            band_power: vec![f64::NAN; n_bands],
        }
    }
}

/// One connectome-metrics record per (subject, band)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRow {
    /// Subject identifier
    pub id: String,
    /// Cohort label (0 control, 1 exposed)
    pub group: u8,
    /// Band name
    pub band: String,
    /// Global efficiency
    pub ge: f64,
    /// Mean clustering coefficient
    pub cc: f64,
    /// Right-hemisphere average inter-regional strength
    pub cas_r: f64,
    /// Left-hemisphere average inter-regional strength
    pub cas_l: f64,
}

/// Write the spectral table: `id,group,sef,<band columns>`.
pub fn write_spectral_table(
    path: &Path,
    bands: &[Band],
    rows: &[SpectralRow],
) -> Result<(), PipelineError> {
    let mut out = String::from("id,group,sef");
    for band in bands {
        let _ = write!(out, ",{}", band.name);
    }
    out.push('\n');

    for row in rows {
        let _ = write!(out, "{},{},{}", row.id, row.group, row.sef);
        for power in &row.band_power {
            let _ = write!(out, ",{}", power);
        }
        out.push('\n');
    }

    std::fs::write(path, out).map_err(|source| PipelineError::TableWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = rows.len(), "spectral table written");
    Ok(())
}

/// Write the connectome-metrics table:
/// `id,group,band,ge,cc,cas_r,cas_l`.
pub fn write_metrics_table(path: &Path, rows: &[MetricsRow]) -> Result<(), PipelineError> {
    let mut out = String::from("id,group,band,ge,cc,cas_r,cas_l\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            row.id, row.group, row.band, row.ge, row.cc, row.cas_r, row.cas_l
        );
    }

    std::fs::write(path, out).map_err(|source| PipelineError::TableWrite {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), rows = rows.len(), "connectome metrics table written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tables-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_spectral_table_layout() {
        let bands = vec![Band::new("delta", 0.5, 4.0), Band::new("theta", 4.0, 8.0)];
        let rows = vec![
            SpectralRow {
                id: "N01".into(),
                group: 0,
                sef: 12.5,
                band_power: vec![0.4, 0.2],
            },
            SpectralRow::failed("S01", 1, 2),
        ];
        let path = temp_path("spectral.csv");
        write_spectral_table(&path, &bands, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,group,sef,delta,theta");
        assert_eq!(lines[1], "N01,0,12.5,0.4,0.2");
        assert_eq!(lines[2], "S01,1,NaN,NaN,NaN");
    }

    #[test]
    fn test_metrics_table_layout() {
        let rows = vec![MetricsRow {
            id: "S02".into(),
            group: 1,
            band: "alpha".into(),
            ge: 0.5,
            cc: 0.25,
            cas_r: 0.1,
            cas_l: f64::NAN,
        }];
        let path = temp_path("metrics.csv");
        write_metrics_table(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "id,group,band,ge,cc,cas_r,cas_l");
        assert_eq!(lines[1], "S02,1,alpha,0.5,0.25,0.1,NaN");
    }

    #[test]
    fn test_tables_overwritten() {
        let path = temp_path("overwrite.csv");
        write_metrics_table(&path, &[]).unwrap();
        write_metrics_table(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
