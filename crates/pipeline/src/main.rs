//! Neuromark EEG Biomarker Pipeline - Main Entry Point

use anyhow::{bail, Context};
use pipeline::{config::AnalysisConfig, init_logging, orchestrator, tables, units};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    info!("=== Neuromark EEG Biomarker Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let phase = std::env::args().nth(1).unwrap_or_else(|| "all".to_string());
    let config_path = std::env::var_os("NEUROMARK_CONFIG").map(PathBuf::from);
    let cfg = Arc::new(
        AnalysisConfig::load(config_path.as_deref()).context("loading analysis configuration")?,
    );

    std::fs::create_dir_all(&cfg.data_root)
        .with_context(|| format!("preparing data root {}", cfg.data_root.display()))?;

    match phase.as_str() {
        "connectomes" => run_connectomes(&cfg).await?,
        "spectral" => run_spectral(&cfg).await?,
        "metrics" => run_metrics(&cfg).await?,
        "all" => {
            run_connectomes(&cfg).await?;
            run_spectral(&cfg).await?;
            run_metrics(&cfg).await?;
        }
        other => bail!("unknown phase {other:?}; expected connectomes|spectral|metrics|all"),
    }

    Ok(())
}

async fn run_connectomes(cfg: &Arc<AnalysisConfig>) -> anyhow::Result<()> {
    info!("generating connectome matrices");
    let saved = orchestrator::generate_connectomes(Arc::clone(cfg)).await?;
    info!(saved, "connectome generation finished");
    Ok(())
}

async fn run_spectral(cfg: &Arc<AnalysisConfig>) -> anyhow::Result<()> {
    info!("computing spectral features");
    let rows = orchestrator::collect_spectral_rows(Arc::clone(cfg)).await?;
    tables::write_spectral_table(&cfg.spectral_table_path(), &cfg.spectral_bands, &rows)?;
    Ok(())
}

async fn run_metrics(cfg: &Arc<AnalysisConfig>) -> anyhow::Result<()> {
    info!("computing connectome metrics");
    // The electrode map must exist before any region-pair metric runs;
    // a missing reference recording aborts here, before dispatch.
    let electrodes = Arc::new(units::reference_electrode_map(cfg)?);
    let rows = orchestrator::collect_metric_rows(Arc::clone(cfg), electrodes).await?;
    tables::write_metrics_table(&cfg.metrics_table_path(), &rows)?;
    Ok(())
}
