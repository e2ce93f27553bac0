//! Afferent/efferent coupling of module nodes.
//!
//! `Ca` counts distinct predecessors, `Ce` distinct successors.
//! Instability is `Ce / (Ca + Ce)`, or 0 for an isolated module.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::graph::adjacency::Adjacency;
use crate::graph::build::CodeGraph;
use crate::quality::{module_ids, round2};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleCoupling {
    pub afferent: usize,
    pub efferent: usize,
    pub instability: f64,
    pub stability: f64,
}

impl ModuleCoupling {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(afferent: usize, efferent: usize) -> Self {
        let total = afferent + efferent;
        let instability = if total == 0 {
            0.0
        } else {
            efferent as f64 / total as f64
        };
        Self {
            afferent,
            efferent,
            instability: round2(instability),
            stability: round2(1.0 - instability),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CouplingAverages {
    pub afferent: f64,
    pub efferent: f64,
    pub instability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CouplingReport {
    pub modules: BTreeMap<String, ModuleCoupling>,
    pub averages: CouplingAverages,
}

impl CouplingReport {
    /// Modules whose efferent coupling exceeds `limit`.
    #[must_use]
    pub fn over_efferent_limit(&self, limit: usize) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|(_, m)| m.efferent > limit)
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn coupling_report(graph: &CodeGraph, adj: &Adjacency) -> CouplingReport {
    let modules: BTreeMap<String, ModuleCoupling> = module_ids(graph)
        .map(|id| {
            (
                graph.key_at(id).to_string(),
                ModuleCoupling::new(adj.in_degree(id), adj.out_degree(id)),
            )
        })
        .collect();

    if modules.is_empty() {
        return CouplingReport::default();
    }

    let n = modules.len() as f64;
    let sum = |f: fn(&ModuleCoupling) -> f64| modules.values().map(f).sum::<f64>() / n;
    let averages = CouplingAverages {
        afferent: round2(sum(|m| m.afferent as f64)),
        efferent: round2(sum(|m| m.efferent as f64)),
        instability: round2(sum(|m| m.instability)),
    };

    CouplingReport { modules, averages }
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};

    use super::*;

    #[test]
    fn three_in_one_out() {
        let mut graph = CodeGraph::new();
        for key in ["m", "a", "b", "c", "d"] {
            graph.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        for from in ["a", "b", "c"] {
            graph.add_edge(from, "m", Relation::Imports);
        }
        graph.add_edge("m", "d", Relation::Imports);

        let report = coupling_report(&graph, &graph.adjacency());
        let m = &report.modules["m"];
        assert_eq!((m.afferent, m.efferent), (3, 1));
        assert!((m.instability - 0.25).abs() < 1e-12);
        assert!((m.stability - 0.75).abs() < 1e-12);
    }

    #[test]
    fn parallel_relations_count_once() {
        let mut graph = CodeGraph::new();
        graph.add_node("a", NodeKind::Container, NodeAttrs::default());
        graph.add_node("b", NodeKind::Component, NodeAttrs::default());
        graph.add_edge("a", "b", Relation::Contains);
        graph.add_edge("a", "b", Relation::Imports);

        let report = coupling_report(&graph, &graph.adjacency());
        assert_eq!(report.modules["a"].efferent, 1);
        assert_eq!(report.modules["b"].afferent, 1);
    }

    #[test]
    fn isolated_module_is_stable() {
        let coupling = ModuleCoupling::new(0, 0);
        assert!(coupling.instability.abs() < f64::EPSILON);
        assert!((coupling.stability - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn declarations_are_not_modules() {
        let mut graph = CodeGraph::new();
        graph.add_node("pkg.f", NodeKind::Function, NodeAttrs::default());
        let report = coupling_report(&graph, &graph.adjacency());
        assert!(report.modules.is_empty());
        assert_eq!(report.averages, CouplingAverages::default());
    }

    #[test]
    fn averages_over_modules() {
        let mut graph = CodeGraph::new();
        graph.add_node("a", NodeKind::Component, NodeAttrs::default());
        graph.add_node("b", NodeKind::Component, NodeAttrs::default());
        graph.add_edge("a", "b", Relation::Imports);

        let report = coupling_report(&graph, &graph.adjacency());
        assert!((report.averages.afferent - 0.5).abs() < 1e-12);
        assert!((report.averages.efferent - 0.5).abs() < 1e-12);
        assert!((report.averages.instability - 0.5).abs() < 1e-12);
        assert_eq!(report.over_efferent_limit(0), vec!["a"]);
    }
}
