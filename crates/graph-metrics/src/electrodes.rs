//! Electrode Name-to-Index Map

use std::collections::HashMap;

use crate::metrics::GraphError;

/// Bijection from electrode name to 1-based connectome row/column index,
/// built once from the reference recording's channel ordering.
#[derive(Debug, Clone)]
pub struct ElectrodeMap {
    indices: HashMap<String, usize>,
}

impl ElectrodeMap {
    /// Build the map from a channel-name ordering. Index i+1 is assigned
    /// to the i-th channel.
    pub fn from_channels(channels: &[String]) -> Self {
        let indices = channels
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i + 1))
            .collect();
        Self { indices }
    }

    /// 1-based index of `name`; unknown names are an error surfaced to the
    /// caller rather than a silent skip.
    pub fn index(&self, name: &str) -> Result<usize, GraphError> {
        self.indices
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::UnknownElectrode(name.to_string()))
    }

    /// Number of mapped electrodes
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
