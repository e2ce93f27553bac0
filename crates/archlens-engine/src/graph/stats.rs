//! Basic statistics for a code graph.
//!
//! # Statistics Provided
//!
//! - **node_types**: histogram of node kinds.
//! - **component_types**: histogram of component subtypes (`unknown` when
//!   extraction reported none).
//! - **avg_dependencies** / **max_dependencies**: mean and maximum raw
//!   out-degree.
//! - **hotspots**: nodes whose raw in-degree exceeds twice the mean
//!   in-degree, in insertion order.
//! - **max_layer_depth**: deepest entry of [`layer_depths`].
//!
//! # Layer Depth
//!
//! A node with no incoming edge sits at layer 0; any other node sits one
//! layer below its deepest predecessor. Depths are computed over the
//! condensation, so every member of a cycle shares one layer and edges
//! inside the cycle do not count.

use std::collections::BTreeMap;

use archlens_core::model::NodeKind;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::graph::build::CodeGraph;
use crate::graph::cycles::strongly_connected;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a code graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub node_types: BTreeMap<String, usize>,
    pub component_types: BTreeMap<String, usize>,
    pub avg_dependencies: f64,
    pub max_dependencies: usize,
    /// Nodes with in-degree above twice the average.
    pub hotspots: Vec<String>,
    pub max_layer_depth: usize,
}

impl GraphStats {
    /// Compute statistics from a [`CodeGraph`].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_graph(graph: &CodeGraph) -> Self {
        let n = graph.node_count();
        let mut node_types: BTreeMap<String, usize> = BTreeMap::new();
        let mut component_types: BTreeMap<String, usize> = BTreeMap::new();

        for node in graph.nodes() {
            *node_types.entry(node.kind.as_str().to_string()).or_default() += 1;
            if node.kind == NodeKind::Component {
                let subtype = if node.attrs.component_type.is_empty() {
                    "unknown"
                } else {
                    node.attrs.component_type.as_str()
                };
                *component_types.entry(subtype.to_string()).or_default() += 1;
            }
        }

        let out_degrees: Vec<usize> = (0..n)
            .map(|id| graph.out_degree(NodeIndex::new(id)))
            .collect();
        let in_degrees: Vec<usize> = (0..n)
            .map(|id| graph.in_degree(NodeIndex::new(id)))
            .collect();

        let avg_dependencies = if n == 0 {
            0.0
        } else {
            out_degrees.iter().sum::<usize>() as f64 / n as f64
        };
        let max_dependencies = out_degrees.iter().copied().max().unwrap_or(0);

        let avg_in = in_degrees.iter().sum::<usize>() as f64 / n.max(1) as f64;
        let hotspots = in_degrees
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d as f64 > avg_in * 2.0)
            .map(|(id, _)| graph.key_at(id).to_string())
            .collect();

        let max_layer_depth = layer_depths(graph).into_iter().max().unwrap_or(0);

        Self {
            total_nodes: n,
            total_edges: graph.edge_count(),
            node_types,
            component_types,
            avg_dependencies,
            max_dependencies,
            hotspots,
            max_layer_depth,
        }
    }
}

/// Layer depth of every node, indexed by dense node id.
#[must_use]
pub fn layer_depths(graph: &CodeGraph) -> Vec<usize> {
    let adj = graph.adjacency();
    let n = adj.len();
    let members: Vec<usize> = (0..n).collect();
    // Tarjan emits sinks first, so the reverse visits sources first.
    let components = strongly_connected(&adj, &members, &vec![true; n]);

    let mut component_of = vec![0_usize; n];
    for (c, component) in components.iter().enumerate() {
        for &v in component {
            component_of[v] = c;
        }
    }

    let mut component_depth = vec![0_usize; components.len()];
    for (c, component) in components.iter().enumerate().rev() {
        let depth = component
            .iter()
            .flat_map(|&v| adj.predecessors(v))
            .filter(|&&p| component_of[p] != c)
            .map(|&p| component_depth[component_of[p]] + 1)
            .max()
            .unwrap_or(0);
        component_depth[c] = depth;
    }

    component_of.into_iter().map(|c| component_depth[c]).collect()
}
