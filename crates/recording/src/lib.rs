//! Cleaned Recording Handling
//!
//! Provides the cleaned-recording data model, the delimited on-disk loader,
//! fixed-length epoching and the surface-Laplacian spatial filter applied
//! ahead of connectivity estimation.

mod epoch;
mod laplacian;
mod record;

pub use epoch::epoch_fixed_length;
pub use laplacian::surface_laplacian;
pub use record::{CleanedRecording, RecordingError};
