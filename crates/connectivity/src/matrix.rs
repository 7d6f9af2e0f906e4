//! Connectome Matrix Persistence
//!
//! Headerless delimited tables, one row per matrix row, comma separated.
//! Float formatting uses the shortest round-trip representation, so a
//! write/read cycle reproduces the matrix exactly.

use ndarray::Array2;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors while reading a persisted connectome
#[derive(Debug, Error)]
pub enum MatrixError {
    /// File could not be opened or read
    #[error("cannot read matrix file: {0}")]
    Io(#[from] std::io::Error),

    /// A cell failed to parse as a number
    #[error("invalid value {value:?} at row {row}")]
    InvalidValue { row: usize, value: String },

    /// Row lengths differ
    #[error("row {row} has {got} values, expected {expected}")]
    RowLength {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// Matrix is not square
    #[error("matrix is {rows}x{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },

    /// File contained no rows
    #[error("matrix file is empty")]
    Empty,
}

/// Enforce symmetry by summing the matrix with its transpose. The raw
/// estimator output is triangular/directional; the sum fills both
/// triangles identically.
pub fn symmetrize(m: &Array2<f64>) -> Array2<f64> {
    m + &m.t()
}

/// Write `m` as a headerless delimited table.
pub fn write_matrix(path: &Path, m: &Array2<f64>) -> Result<(), MatrixError> {
    use std::fmt::Write as _;

    let mut out = String::new();
    for row in m.rows() {
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}", value);
        }
        out.push('\n');
    }
    std::fs::write(path, out)?;
    debug!(path = %path.display(), shape = ?m.dim(), "matrix written");
    Ok(())
}

/// Read a square matrix from its delimited form.
pub fn read_matrix(path: &Path) -> Result<Array2<f64>, MatrixError> {
    let text = std::fs::read_to_string(path)?;

    let mut values: Vec<f64> = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0usize;
    for (row, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cells: Vec<&str> = line.split(',').collect();
        let expected = *n_cols.get_or_insert(cells.len());
        if cells.len() != expected {
            return Err(MatrixError::RowLength {
                row: row + 1,
                expected,
                got: cells.len(),
            });
        }
        for cell in cells {
            let parsed = cell
                .trim()
                .parse::<f64>()
                .map_err(|_| MatrixError::InvalidValue {
                    row: row + 1,
                    value: cell.trim().to_string(),
                })?;
            values.push(parsed);
        }
        n_rows += 1;
    }

    let n_cols = n_cols.ok_or(MatrixError::Empty)?;
    if n_rows != n_cols {
        return Err(MatrixError::NotSquare {
            rows: n_rows,
            cols: n_cols,
        });
    }

    Ok(Array2::from_shape_vec((n_rows, n_cols), values).expect("row lengths verified"))
}
