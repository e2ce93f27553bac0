//! Degree-based metrics: hubs and the degree-centrality fallback.
//!
//! These count raw edges, so parallel relation edges between the same pair
//! (an `imports` and a `calls`, say) each add to a node's degree.

use petgraph::graph::NodeIndex;

use crate::graph::build::CodeGraph;

/// Raw total degree (in + out, every edge counted) per dense node id.
#[must_use]
pub fn total_degree(graph: &CodeGraph) -> Vec<usize> {
    (0..graph.node_count())
        .map(|id| {
            let idx = NodeIndex::new(id);
            graph.in_degree(idx) + graph.out_degree(idx)
        })
        .collect()
}

/// Degree centrality: total degree divided by the maximum total degree.
///
/// All zeros when the graph has no edges.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn degree_centrality(degrees: &[usize]) -> Vec<f64> {
    let max = degrees.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return vec![0.0; degrees.len()];
    }
    degrees.iter().map(|&d| d as f64 / max as f64).collect()
}
