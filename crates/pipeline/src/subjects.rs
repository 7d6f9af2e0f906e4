//! Subject Enumeration and Cohort Labelling

use std::path::Path;

use crate::error::PipelineError;

/// Filename suffix of cleaned recordings
pub const CLEAN_SUFFIX: &str = "_clean.csv";

/// List subject identifiers in `clean_root`: regular files matching
/// `*_clean.csv`, suffix stripped, sorted for deterministic enumeration.
/// An unreadable directory is fatal; no partial enumeration is attempted.
pub fn list_subjects(clean_root: &Path) -> Result<Vec<String>, PipelineError> {
    let unreadable = |source| PipelineError::CleanRootUnreadable {
        path: clean_root.to_path_buf(),
        source,
    };

    let mut subjects = Vec::new();
    for entry in std::fs::read_dir(clean_root).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(subject) = name.strip_suffix(CLEAN_SUFFIX) {
            if !subject.is_empty() {
                subjects.push(subject.to_string());
            }
        }
    }
    subjects.sort();
    Ok(subjects)
}

/// Canonical cohort rule, shared by every table that carries a group
/// column: identifiers starting with `N` are controls (0), all others are
/// the exposed cohort (1).
pub fn group_label(subject: &str) -> u8 {
    if subject.starts_with('N') {
        0
    } else {
        1
    }
}
