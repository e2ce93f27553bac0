//! Cohesion of module nodes.
//!
//! The children of a module are its distinct `contains` successors. The
//! score is the share of ordered child pairs `(a, b)`, `a != b`, joined by
//! at least one edge of any relation: `internal / (k * (k - 1))`.

use std::collections::BTreeMap;

use archlens_core::model::Relation;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::graph::adjacency::Adjacency;
use crate::graph::build::CodeGraph;
use crate::quality::{module_ids, round2};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleCohesion {
    pub cohesion_score: f64,
    pub component_count: usize,
    pub internal_connections: usize,
}

impl ModuleCohesion {
    /// Whether the score says anything: fewer than two children always
    /// score 0.
    #[must_use]
    pub const fn is_scored(&self) -> bool {
        self.component_count >= 2
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CohesionReport {
    pub modules: BTreeMap<String, ModuleCohesion>,
    /// Mean score over modules with at least two children.
    pub average_cohesion: f64,
    /// Number of modules contributing to the average.
    pub scored_modules: usize,
}

impl CohesionReport {
    /// Scored modules whose cohesion is below `threshold`.
    #[must_use]
    pub fn below(&self, threshold: f64) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|(_, m)| m.is_scored() && m.cohesion_score < threshold)
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cohesion_report(graph: &CodeGraph, adj: &Adjacency) -> CohesionReport {
    let modules: BTreeMap<String, ModuleCohesion> = module_ids(graph)
        .map(|id| {
            let children = graph.targets_by_relation(NodeIndex::new(id), Relation::Contains);
            (graph.key_at(id).to_string(), score(&children, adj))
        })
        .collect();

    let scored: Vec<f64> = modules
        .values()
        .filter(|m| m.is_scored())
        .map(|m| m.cohesion_score)
        .collect();
    let average_cohesion = if scored.is_empty() {
        0.0
    } else {
        round2(scored.iter().sum::<f64>() / scored.len() as f64)
    };

    CohesionReport {
        modules,
        average_cohesion,
        scored_modules: scored.len(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn score(children: &[usize], adj: &Adjacency) -> ModuleCohesion {
    let k = children.len();
    // `children` is sorted, so membership is a binary search.
    let internal = children
        .iter()
        .map(|&a| {
            adj.successors(a)
                .iter()
                .filter(|&&b| b != a && children.binary_search(&b).is_ok())
                .count()
        })
        .sum();

    let cohesion_score = if k < 2 {
        0.0
    } else {
        round2(internal as f64 / (k * (k - 1)) as f64)
    };

    ModuleCohesion {
        cohesion_score,
        component_count: k,
        internal_connections: internal,
    }
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, NodeKind};

    use super::*;

    fn module_with_children(children: &[&str], links: &[(&str, &str)]) -> CodeGraph {
        let mut graph = CodeGraph::new();
        graph.add_node("M", NodeKind::Container, NodeAttrs::default());
        for child in children {
            graph.add_node(child, NodeKind::Component, NodeAttrs::default());
            graph.add_edge("M", child, Relation::Contains);
        }
        for (from, to) in links {
            graph.add_edge(from, to, Relation::Imports);
        }
        graph
    }

    #[test]
    fn one_link_between_two_children_is_half() {
        let graph = module_with_children(&["a", "b"], &[("a", "b")]);
        let report = cohesion_report(&graph, &graph.adjacency());
        let m = &report.modules["M"];
        assert!((m.cohesion_score - 0.5).abs() < 1e-12);
        assert_eq!(m.component_count, 2);
        assert_eq!(m.internal_connections, 1);
        assert!((report.average_cohesion - 0.5).abs() < 1e-12);
        assert_eq!(report.scored_modules, 1);
    }

    #[test]
    fn single_child_scores_zero_and_is_not_averaged() {
        let graph = module_with_children(&["a"], &[]);
        let report = cohesion_report(&graph, &graph.adjacency());
        assert!(report.modules["M"].cohesion_score.abs() < f64::EPSILON);
        assert_eq!(report.scored_modules, 0);
        assert!(report.below(0.3).is_empty());
    }

    #[test]
    fn edges_to_outsiders_do_not_count() {
        let mut graph = module_with_children(&["a", "b"], &[]);
        graph.add_node("x", NodeKind::Component, NodeAttrs::default());
        graph.add_edge("a", "x", Relation::Imports);
        let report = cohesion_report(&graph, &graph.adjacency());
        assert_eq!(report.modules["M"].internal_connections, 0);
        assert_eq!(report.below(0.3), vec!["M"]);
    }

    #[test]
    fn fully_connected_children_score_one() {
        let graph = module_with_children(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "a"), ("a", "c"), ("c", "a"), ("b", "c"), ("c", "b")],
        );
        let report = cohesion_report(&graph, &graph.adjacency());
        assert!((report.modules["M"].cohesion_score - 1.0).abs() < 1e-12);
    }
}
