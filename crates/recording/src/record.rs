//! Cleaned Recording Model and Loader

use ndarray::Array2;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors while reading a cleaned recording
#[derive(Debug, Error)]
pub enum RecordingError {
    /// File could not be opened or read
    #[error("cannot read recording file: {0}")]
    Io(#[from] std::io::Error),

    /// First line did not carry a `# sfreq=<Hz>` declaration
    #[error("missing sampling rate declaration on first line")]
    MissingSampleRate,

    /// Sampling rate was not a positive number
    #[error("invalid sampling rate: {0}")]
    InvalidSampleRate(String),

    /// No channel names declared
    #[error("missing channel header line")]
    MissingChannels,

    /// Sample row has a different column count than the channel header
    #[error("sample row {row} has {got} values, expected {expected}")]
    ChannelCountMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A sample value failed to parse
    #[error("invalid sample value {value:?} at row {row}")]
    InvalidSample { row: usize, value: String },

    /// File contained no sample rows
    #[error("recording contains no samples")]
    Empty,
}

/// An immutable, uniformly-sampled multichannel recording.
///
/// `data` is laid out `[channels, samples]`. Produced by an external
/// cleaning stage; this crate never mutates it.
#[derive(Debug, Clone)]
pub struct CleanedRecording {
    /// Channel names, in matrix row order
    pub channels: Vec<String>,
    /// Sampling rate (Hz)
    pub sfreq: f64,
    /// Signal data, shape [channels, samples]
    pub data: Array2<f64>,
}

impl CleanedRecording {
    /// Build a recording from in-memory parts (used by tests and fixtures).
    pub fn new(channels: Vec<String>, sfreq: f64, data: Array2<f64>) -> Self {
        debug_assert_eq!(channels.len(), data.nrows());
        Self {
            channels,
            sfreq,
            data,
        }
    }

    /// Number of channels
    pub fn n_channels(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples per channel
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Recording duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.n_samples() as f64 / self.sfreq
    }

    /// Load a cleaned recording from its delimited on-disk form.
    ///
    /// Format: first line `# sfreq=<Hz>`, second line comma-separated
    /// channel names, then one comma-separated row of samples per time
    /// point (rows are time, columns are channels).
    pub fn load(path: &Path) -> Result<Self, RecordingError> {
        let text = std::fs::read_to_string(path)?;
        let mut lines = text.lines();

        let sfreq_line = lines.next().ok_or(RecordingError::MissingSampleRate)?;
        let sfreq = parse_sfreq(sfreq_line)?;

        let header = lines.next().ok_or(RecordingError::MissingChannels)?;
        let channels: Vec<String> = header
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if channels.is_empty() {
            return Err(RecordingError::MissingChannels);
        }
        let n_ch = channels.len();

        let mut samples: Vec<f64> = Vec::new();
        let mut n_rows = 0usize;
        for (row, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let values: Vec<&str> = line.split(',').collect();
            if values.len() != n_ch {
                return Err(RecordingError::ChannelCountMismatch {
                    row: row + 1,
                    expected: n_ch,
                    got: values.len(),
                });
            }
            for value in values {
                let parsed =
                    value
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| RecordingError::InvalidSample {
                            row: row + 1,
                            value: value.trim().to_string(),
                        })?;
                samples.push(parsed);
            }
            n_rows += 1;
        }
        if n_rows == 0 {
            return Err(RecordingError::Empty);
        }

        // Rows on disk are time points; transpose into [channels, samples].
        let by_time = Array2::from_shape_vec((n_rows, n_ch), samples)
            .expect("row count verified during parse");
        let data = by_time.t().to_owned();

        debug!(
            path = %path.display(),
            channels = n_ch,
            samples = n_rows,
            sfreq,
            "loaded cleaned recording"
        );

        Ok(Self {
            channels,
            sfreq,
            data,
        })
    }

    /// Write the recording back out in the loader's format.
    pub fn save(&self, path: &Path) -> Result<(), RecordingError> {
        use std::fmt::Write as _;

        let mut out = format!("# sfreq={}\n{}\n", self.sfreq, self.channels.join(","));
        for t in 0..self.n_samples() {
            for c in 0..self.n_channels() {
                if c > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}", self.data[[c, t]]);
            }
            out.push('\n');
        }
        std::fs::write(path, out)?;
        Ok(())
    }
}

fn parse_sfreq(line: &str) -> Result<f64, RecordingError> {
    let trimmed = line.trim_start_matches('#').trim();
    let value = trimmed
        .strip_prefix("sfreq=")
        .ok_or(RecordingError::MissingSampleRate)?;
    let sfreq = value
        .trim()
        .parse::<f64>()
        .map_err(|_| RecordingError::InvalidSampleRate(value.to_string()))?;
    if !sfreq.is_finite() || sfreq <= 0.0 {
        return Err(RecordingError::InvalidSampleRate(value.to_string()));
    }
    Ok(sfreq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("recording-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_roundtrip() {
        let path = write_temp("roundtrip.csv", "# sfreq=250\nFp1,Fp2\n1.0,2.0\n3.0,4.0\n");
        let rec = CleanedRecording::load(&path).unwrap();

        assert_eq!(rec.channels, vec!["Fp1", "Fp2"]);
        assert_eq!(rec.sfreq, 250.0);
        assert_eq!(rec.data.shape(), &[2, 2]);
        assert_eq!(rec.data[[0, 1]], 3.0);
        assert_eq!(rec.data[[1, 0]], 2.0);

        let out = path.with_extension("copy.csv");
        rec.save(&out).unwrap();
        let again = CleanedRecording::load(&out).unwrap();
        assert_eq!(again.data, rec.data);
    }

    #[test]
    fn test_missing_sfreq() {
        let path = write_temp("nosfreq.csv", "Fp1,Fp2\n1.0,2.0\n");
        assert!(matches!(
            CleanedRecording::load(&path),
            Err(RecordingError::MissingSampleRate)
        ));
    }

    #[test]
    fn test_column_mismatch() {
        let path = write_temp("mismatch.csv", "# sfreq=250\nFp1,Fp2\n1.0,2.0\n3.0\n");
        assert!(matches!(
            CleanedRecording::load(&path),
            Err(RecordingError::ChannelCountMismatch { row: 2, .. })
        ));
    }

    #[test]
    fn test_empty_recording() {
        let path = write_temp("empty.csv", "# sfreq=250\nFp1,Fp2\n");
        assert!(matches!(
            CleanedRecording::load(&path),
            Err(RecordingError::Empty)
        ));
    }

    #[test]
    fn test_duration() {
        let data = Array2::zeros((4, 500));
        let rec = CleanedRecording::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            250.0,
            data,
        );
        assert!((rec.duration_secs() - 2.0).abs() < 1e-12);
    }
}
