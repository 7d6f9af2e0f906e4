//! EEG Biomarker Pipeline
//!
//! Batch orchestration over the subject/band cartesian product: connectome
//! generation (fire-and-forget file writes) and feature aggregation
//! (spectral and graph-metric rows collected into long-format tables).

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod subjects;
pub mod tables;
pub mod units;

pub use config::AnalysisConfig;
pub use error::{PipelineError, UnitFailure};

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Initialize logging for the pipeline binary
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
