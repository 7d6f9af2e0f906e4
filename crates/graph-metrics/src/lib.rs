//! Graph Metric Engine
//!
//! Weighted-graph summaries of connectome matrices: global efficiency,
//! mean clustering coefficient and region-pair average connection
//! strength, plus the electrode name-to-index map they key on.

mod electrodes;
mod metrics;

pub use electrodes::ElectrodeMap;
pub use metrics::{average_strength, clustering_coefficient, global_efficiency, GraphError};
