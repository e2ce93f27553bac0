//! Graph-wide complexity figures.
//!
//! - `cyclomatic_complexity = max(0, E - N + 2 * WCC)`, counting every
//!   relation-tagged edge.
//! - `max_depth` is the longest path in edges when the graph is acyclic,
//!   otherwise 0.
//! - Fan-out is the raw out-degree.

use petgraph::{
    Direction,
    algo::{connected_components, toposort},
    visit::EdgeRef,
};
use serde::Serialize;

use crate::graph::build::CodeGraph;
use crate::quality::round2;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComplexityReport {
    pub cyclomatic_complexity: usize,
    pub max_depth: usize,
    pub avg_fanout: f64,
    pub max_fanout: usize,
    /// Weakly connected components.
    pub total_components: usize,
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn complexity_report(graph: &CodeGraph) -> ComplexityReport {
    let inner = graph.inner();
    let n = inner.node_count();
    if n == 0 {
        return ComplexityReport::default();
    }

    // petgraph's connected_components ignores direction.
    let wcc = connected_components(inner);
    let cyclomatic = (inner.edge_count() + 2 * wcc).saturating_sub(n);

    let fanouts: Vec<usize> = inner
        .node_indices()
        .map(|idx| graph.out_degree(idx))
        .collect();
    let max_fanout = fanouts.iter().copied().max().unwrap_or(0);
    let avg_fanout = round2(fanouts.iter().sum::<usize>() as f64 / n as f64);

    ComplexityReport {
        cyclomatic_complexity: cyclomatic,
        max_depth: longest_path(graph),
        avg_fanout,
        max_fanout,
        total_components: wcc,
    }
}

/// Longest path in edges over a topological order, or 0 with a cycle.
fn longest_path(graph: &CodeGraph) -> usize {
    let inner = graph.inner();
    let Ok(order) = toposort(inner, None) else {
        return 0;
    };

    let mut depth = vec![0_usize; inner.node_count()];
    for idx in order {
        let here = depth[idx.index()];
        for edge in inner.edges_directed(idx, Direction::Outgoing) {
            let next = &mut depth[edge.target().index()];
            *next = (*next).max(here + 1);
        }
    }
    depth.into_iter().max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};

    use super::*;

    fn chain(keys: &[&str]) -> CodeGraph {
        let mut graph = CodeGraph::new();
        for key in keys {
            graph.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        for pair in keys.windows(2) {
            graph.add_edge(pair[0], pair[1], Relation::Imports);
        }
        graph
    }

    #[test]
    fn empty_graph_is_zero() {
        assert_eq!(complexity_report(&CodeGraph::new()), ComplexityReport::default());
    }

    #[test]
    fn chain_figures() {
        let report = complexity_report(&chain(&["a", "b", "c", "d"]));
        // E=3, N=4, WCC=1 → 3 - 4 + 2 = 1
        assert_eq!(report.cyclomatic_complexity, 1);
        assert_eq!(report.max_depth, 3);
        assert_eq!(report.max_fanout, 1);
        assert!((report.avg_fanout - 0.75).abs() < 1e-12);
        assert_eq!(report.total_components, 1);
    }

    #[test]
    fn cycle_has_no_depth() {
        let mut graph = chain(&["a", "b"]);
        graph.add_edge("b", "a", Relation::Imports);
        let report = complexity_report(&graph);
        assert_eq!(report.max_depth, 0);
        assert_eq!(report.cyclomatic_complexity, 2);
    }

    #[test]
    fn isolated_nodes_are_components() {
        let mut graph = chain(&["a", "b", "c"]);
        graph.add_node("z", NodeKind::Component, NodeAttrs::default());
        let report = complexity_report(&graph);
        assert_eq!(report.total_components, 2);
        // E=2, N=4, WCC=2 → 2
        assert_eq!(report.cyclomatic_complexity, 2);
    }
}
