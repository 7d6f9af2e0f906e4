//! Batch Orchestration
//!
//! Two task shapes over the same semaphore-bounded fan-out: connectome
//! generation (no collected result, one file write per task) and feature
//! aggregation (one row per task, collected over an mpsc channel). Units
//! run on blocking threads; a unit's failure or panic is caught, logged
//! and recorded without unwinding the pool. Row order in the aggregated
//! output is pool arrival order, so consumers key on the embedded
//! (subject[, band]) fields only.

use graph_metrics::ElectrodeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use crate::subjects::list_subjects;
use crate::tables::{MetricsRow, SpectralRow};
use crate::units;

/// Generate one connectome file per (band, subject) pair across the full
/// cartesian product. Returns the number of matrices written; failed units
/// are logged and skipped.
pub async fn generate_connectomes(cfg: Arc<AnalysisConfig>) -> Result<usize, PipelineError> {
    // Band directories are created idempotently ahead of any dispatch.
    for band in &cfg.connectivity_bands {
        let dir = cfg.connectome_root.join(&band.name);
        std::fs::create_dir_all(&dir).map_err(|source| PipelineError::OutputDir {
            path: dir.clone(),
            source,
        })?;
    }

    let subjects = list_subjects(&cfg.clean_root)?;
    let permits = Arc::new(Semaphore::new(cfg.matrix_workers.max(1)));
    let mut handles = Vec::with_capacity(cfg.connectivity_bands.len() * subjects.len());

    for band in cfg.connectivity_bands.clone() {
        for subject in subjects.iter().cloned() {
            let cfg = Arc::clone(&cfg);
            let permits = Arc::clone(&permits);
            let band = band.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                let unit_subject = subject.clone();
                let unit_band = band.clone();
                let unit_cfg = Arc::clone(&cfg);
                let result = tokio::task::spawn_blocking(move || {
                    units::connectome_unit(&unit_cfg, &unit_subject, &unit_band)
                })
                .await;

                match result {
                    Ok(Ok(_path)) => true,
                    Ok(Err(failure)) => {
                        warn!(subject = %subject, band = %band.name, error = %failure,
                            "connectome unit failed");
                        false
                    }
                    Err(join) => {
                        warn!(subject = %subject, band = %band.name, error = %join,
                            "connectome unit panicked");
                        false
                    }
                }
            }));
        }
    }

    let mut saved = 0usize;
    for handle in handles {
        if handle.await.unwrap_or(false) {
            saved += 1;
        }
    }
    info!(saved, "all connectomes generated");
    Ok(saved)
}

/// Compute one spectral feature row per subject. Units that fail are
/// degraded to NaN rows so the table still carries every subject.
pub async fn collect_spectral_rows(
    cfg: Arc<AnalysisConfig>,
) -> Result<Vec<SpectralRow>, PipelineError> {
    let subjects = list_subjects(&cfg.clean_root)?;
    let permits = Arc::new(Semaphore::new(cfg.feature_workers.max(1)));
    let (tx, mut rx) = mpsc::channel::<SpectralRow>(subjects.len().max(1));

    for subject in subjects {
        let cfg = Arc::clone(&cfg);
        let permits = Arc::clone(&permits);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .expect("semaphore never closed");
            let unit_subject = subject.clone();
            let unit_cfg = Arc::clone(&cfg);
            let result =
                tokio::task::spawn_blocking(move || units::spectral_unit(&unit_cfg, &unit_subject))
                    .await;

            let row = match result {
                Ok(Ok(row)) => row,
                Ok(Err(failure)) => {
                    warn!(subject = %subject, error = %failure, "spectral unit degraded to NaN");
                    SpectralRow::failed(
                        &subject,
                        crate::subjects::group_label(&subject),
                        cfg.spectral_bands.len(),
                    )
                }
                Err(join) => {
                    warn!(subject = %subject, error = %join, "spectral unit panicked");
                    SpectralRow::failed(
                        &subject,
                        crate::subjects::group_label(&subject),
                        cfg.spectral_bands.len(),
                    )
                }
            };
            let _ = tx.send(row).await;
        });
    }
    drop(tx);

    let mut rows = Vec::new();
    while let Some(row) = rx.recv().await {
        rows.push(row);
    }
    info!(rows = rows.len(), "spectral rows collected");
    Ok(rows)
}

/// Compute one metrics row per persisted connectome across all
/// connectivity bands. The scan runs against the matrix store, so it works
/// without re-enumerating the clean root.
pub async fn collect_metric_rows(
    cfg: Arc<AnalysisConfig>,
    electrodes: Arc<ElectrodeMap>,
) -> Result<Vec<MetricsRow>, PipelineError> {
    let mut files: Vec<(String, PathBuf)> = Vec::new();
    for band in &cfg.connectivity_bands {
        let dir = cfg.connectome_root.join(&band.name);
        let entries = std::fs::read_dir(&dir).map_err(|source| PipelineError::ConnectomeScan {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| PipelineError::ConnectomeScan {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "csv") {
                files.push((band.name.clone(), path));
            }
        }
    }

    let permits = Arc::new(Semaphore::new(cfg.feature_workers.max(1)));
    let (tx, mut rx) = mpsc::channel::<MetricsRow>(files.len().max(1));

    for (band, path) in files {
        let cfg = Arc::clone(&cfg);
        let electrodes = Arc::clone(&electrodes);
        let permits = Arc::clone(&permits);
        let tx = tx.clone();
        tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .expect("semaphore never closed");
            let row = tokio::task::spawn_blocking(move || {
                units::metrics_unit(&cfg, &electrodes, &band, &path)
            })
            .await;

            if let Ok(row) = row {
                let _ = tx.send(row).await;
            }
        });
    }
    drop(tx);

    let mut rows = Vec::new();
    while let Some(row) = rx.recv().await {
        rows.push(row);
    }
    info!(rows = rows.len(), "metric rows collected");
    Ok(rows)
}
