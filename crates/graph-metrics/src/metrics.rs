//! Weighted Graph Metrics
//!
//! Global efficiency and clustering follow the standard weighted-network
//! definitions (connection lengths are inverse weights; clustering is the
//! geometric-mean triangle intensity). Degenerate inputs surface as typed
//! errors so the caller can convert them to NaN sentinels explicitly.

use ndarray::Array2;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use thiserror::Error;
use tracing::trace;

use crate::electrodes::ElectrodeMap;

/// Errors during graph metric computation
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    /// Matrix has no rows (the load-failure sentinel)
    #[error("matrix is empty")]
    EmptyMatrix,

    /// Matrix is not square
    #[error("matrix is {rows}x{cols}, expected square")]
    NotSquare { rows: usize, cols: usize },

    /// Matrix contains NaN or infinite entries
    #[error("matrix contains non-finite entries")]
    NonFinite,

    /// Metric needs at least two nodes
    #[error("need at least 2 nodes, got {0}")]
    TooFewNodes(usize),

    /// Electrode name missing from the index map
    #[error("unknown electrode {0:?}")]
    UnknownElectrode(String),

    /// Mapped index exceeds the matrix dimensions
    #[error("electrode {electrode:?} maps to index {index}, matrix has {size} rows")]
    IndexOutOfBounds {
        electrode: String,
        index: usize,
        size: usize,
    },

    /// An electrode set was empty
    #[error("electrode set is empty")]
    EmptySet,
}

fn validate(m: &Array2<f64>) -> Result<usize, GraphError> {
    let (rows, cols) = m.dim();
    if rows == 0 {
        return Err(GraphError::EmptyMatrix);
    }
    if rows != cols {
        return Err(GraphError::NotSquare { rows, cols });
    }
    if m.iter().any(|v| !v.is_finite()) {
        return Err(GraphError::NonFinite);
    }
    Ok(rows)
}

/// Heap entry for Dijkstra; min-heap on distance.
#[derive(Debug, Copy, Clone, PartialEq)]
struct State {
    dist: f64,
    node: usize,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior (shortest distance first).
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Global efficiency of a weighted network: mean inverse shortest path
/// length over all ordered node pairs. Connection lengths are inverse
/// weights; non-positive weights are treated as absent edges and
/// unreachable pairs contribute zero.
pub fn global_efficiency(m: &Array2<f64>) -> Result<f64, GraphError> {
    let n = validate(m)?;
    if n < 2 {
        return Err(GraphError::TooFewNodes(n));
    }

    let mut total_inverse = 0.0;
    for source in 0..n {
        let dist = dijkstra(m, source);
        for (target, &d) in dist.iter().enumerate() {
            if target != source && d.is_finite() && d > 0.0 {
                total_inverse += 1.0 / d;
            }
        }
    }

    let efficiency = total_inverse / (n * (n - 1)) as f64;
    trace!(n, efficiency, "global efficiency");
    Ok(efficiency)
}

fn dijkstra(m: &Array2<f64>, source: usize) -> Vec<f64> {
    let n = m.nrows();
    let mut dist = vec![f64::INFINITY; n];
    let mut done = vec![false; n];
    dist[source] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(State {
        dist: 0.0,
        node: source,
    });

    while let Some(State { dist: d, node }) = heap.pop() {
        if done[node] {
            continue;
        }
        done[node] = true;

        for next in 0..n {
            let weight = m[[node, next]];
            if next == node || weight <= 0.0 {
                continue;
            }
            let candidate = d + 1.0 / weight;
            if candidate < dist[next] {
                dist[next] = candidate;
                heap.push(State {
                    dist: candidate,
                    node: next,
                });
            }
        }
    }
    dist
}

/// Mean weighted clustering coefficient. Per node, the ratio of the
/// geometric-mean intensity of closed triangles to the number of possible
/// triangles `k(k-1)`; nodes without triangles contribute zero.
pub fn clustering_coefficient(m: &Array2<f64>) -> Result<f64, GraphError> {
    let n = validate(m)?;
    if n < 2 {
        return Err(GraphError::TooFewNodes(n));
    }

    // Element-wise cube roots with a zeroed diagonal; the matrix cube's
    // diagonal counts triangle intensities.
    let mut roots = m.mapv(f64::cbrt);
    for i in 0..n {
        roots[[i, i]] = 0.0;
    }
    let cubed = roots.dot(&roots).dot(&roots);

    let mut acc = 0.0;
    for i in 0..n {
        let degree = (0..n).filter(|&j| j != i && m[[i, j]] != 0.0).count() as f64;
        let cyc3 = cubed[[i, i]];
        if degree >= 2.0 && cyc3 != 0.0 {
            acc += cyc3 / (degree * (degree - 1.0));
        }
    }

    Ok(acc / n as f64)
}

/// Mean connection strength between two electrode sets over the full
/// cartesian product (both orderings; symmetric entries are deliberately
/// double-counted, which leaves the mean unchanged on symmetric matrices).
pub fn average_strength(
    m: &Array2<f64>,
    set_a: &[String],
    set_b: &[String],
    electrodes: &ElectrodeMap,
) -> Result<f64, GraphError> {
    let n = validate(m)?;
    if set_a.is_empty() || set_b.is_empty() {
        return Err(GraphError::EmptySet);
    }

    let mut strengths = Vec::with_capacity(set_a.len() * set_b.len());
    for a in set_a {
        for b in set_b {
            let ia = bounded_index(a, n, electrodes)?;
            let ib = bounded_index(b, n, electrodes)?;
            strengths.push(m[[ia - 1, ib - 1]]);
        }
    }

    Ok(strengths.iter().sum::<f64>() / strengths.len() as f64)
}

fn bounded_index(name: &str, n: usize, electrodes: &ElectrodeMap) -> Result<usize, GraphError> {
    let index = electrodes.index(name)?;
    if index > n {
        return Err(GraphError::IndexOutOfBounds {
            electrode: name.to_string(),
            index,
            size: n,
        });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_node_efficiency() {
        let mut m = Array2::zeros((2, 2));
        m[[0, 1]] = 1.0;
        m[[1, 0]] = 1.0;
        // Single edge of weight 1: distance 1 both ways, efficiency 1.
        assert!((global_efficiency(&m).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_indirect_path_used() {
        // 0-1 and 1-2 strong, 0-2 absent: d(0,2) = 1/2 + 1/2 = 1.
        let mut m = Array2::zeros((3, 3));
        for (i, j) in [(0, 1), (1, 2)] {
            m[[i, j]] = 2.0;
            m[[j, i]] = 2.0;
        }
        let ge = global_efficiency(&m).unwrap();
        // Pairs: (0,1),(1,2) at d=0.5 and (0,2) at d=1.0, both directions.
        let expected = (1.0 / 0.5 + 1.0 / 0.5 + 1.0 / 1.0) * 2.0 / 6.0;
        assert!((ge - expected).abs() < 1e-12, "ge {ge} expected {expected}");
    }

    #[test]
    fn test_zero_matrix_degenerates_to_zero() {
        let m = Array2::zeros((4, 4));
        assert_eq!(global_efficiency(&m).unwrap(), 0.0);
        assert_eq!(clustering_coefficient(&m).unwrap(), 0.0);
    }

    #[test]
    fn test_diagonal_only_matrix() {
        // Nonzero diagonal, zero off-diagonal: no edges, no triangles.
        let mut m = Array2::zeros((4, 4));
        for i in 0..4 {
            m[[i, i]] = 1.0;
        }
        assert_eq!(global_efficiency(&m).unwrap(), 0.0);
        assert_eq!(clustering_coefficient(&m).unwrap(), 0.0);

        let map = ElectrodeMap::from_channels(&names(&["a", "b", "c", "d"]));
        let s = average_strength(&m, &names(&["a", "b"]), &names(&["c", "d"]), &map).unwrap();
        assert_eq!(s, 0.0);
    }

    #[test]
    fn test_unit_triangle_clustering() {
        // Complete triangle with unit weights clusters perfectly.
        let m = Array2::from_shape_fn((3, 3), |(i, j)| if i == j { 0.0 } else { 1.0 });
        assert!((clustering_coefficient(&m).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sentinel_rejected() {
        let m = Array2::zeros((0, 0));
        assert!(matches!(
            global_efficiency(&m),
            Err(GraphError::EmptyMatrix)
        ));
        assert!(matches!(
            clustering_coefficient(&m),
            Err(GraphError::EmptyMatrix)
        ));
    }

    #[test]
    fn test_nan_matrix_rejected() {
        let mut m = Array2::zeros((3, 3));
        m[[0, 1]] = f64::NAN;
        assert!(matches!(global_efficiency(&m), Err(GraphError::NonFinite)));
    }

    #[test]
    fn test_average_strength_known_value() {
        let mut m = Array2::zeros((3, 3));
        m[[0, 2]] = 0.6;
        m[[2, 0]] = 0.6;
        m[[1, 2]] = 0.2;
        m[[2, 1]] = 0.2;
        let map = ElectrodeMap::from_channels(&names(&["a", "b", "c"]));
        let s = average_strength(&m, &names(&["a", "b"]), &names(&["c"]), &map).unwrap();
        assert!((s - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_average_strength_out_of_bounds() {
        let m = Array2::zeros((2, 2));
        let map = ElectrodeMap::from_channels(&names(&["a", "b", "c"]));
        assert!(matches!(
            average_strength(&m, &names(&["c"]), &names(&["a"]), &map),
            Err(GraphError::IndexOutOfBounds { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_average_strength_swap_invariant(seed in 0u64..1000) {
            // Symmetric 4x4 matrix derived from the seed.
            let mut m = Array2::zeros((4, 4));
            let mut x = seed as f64 + 1.0;
            for i in 0..4 {
                for j in (i + 1)..4 {
                    x = (x * 1.7 + 0.3).sin().abs();
                    m[[i, j]] = x;
                    m[[j, i]] = x;
                }
            }
            let map = ElectrodeMap::from_channels(&names(&["a", "b", "c", "d"]));
            let a = names(&["a", "b"]);
            let b = names(&["c", "d"]);
            let ab = average_strength(&m, &a, &b, &map).unwrap();
            let ba = average_strength(&m, &b, &a, &map).unwrap();
            prop_assert!((ab - ba).abs() < 1e-12);
        }
    }
}
