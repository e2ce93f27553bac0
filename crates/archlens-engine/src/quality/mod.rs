//! Dependency-quality diagnostics.
//!
//! # Overview
//!
//! [`analyze_dependencies`] derives a read-only [`DependencyReport`] from
//! the current graph:
//!
//! | section           | source                                          |
//! |-------------------|-------------------------------------------------|
//! | `cycles`          | Johnson's simple cycles, graded by length/count |
//! | `coupling`        | afferent/efferent coupling per module node      |
//! | `cohesion`        | `contains` children that talk to each other     |
//! | `complexity`      | cyclomatic number, depth and fan-out            |
//! | `recommendations` | ordered rule table over the sections above      |
//!
//! Module nodes are `container` and `component` nodes. Ratios and averages
//! are rounded to two decimals.

pub mod cohesion;
pub mod complexity;
pub mod coupling;
pub mod cycles;
pub mod recommend;

use archlens_core::config::QualityConfig;
use serde::Serialize;
use tracing::instrument;

use crate::graph::build::CodeGraph;

pub use cohesion::{CohesionReport, ModuleCohesion, cohesion_report};
pub use complexity::{ComplexityReport, complexity_report};
pub use coupling::{CouplingAverages, CouplingReport, ModuleCoupling, coupling_report};
pub use cycles::{CycleEntry, CycleReport, cycle_report};
pub use recommend::{Priority, Recommendation, recommendations};

/// Graded severity used by cycle diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Full dependency-quality report for one graph state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyReport {
    pub cycles: CycleReport,
    pub coupling: CouplingReport,
    pub cohesion: CohesionReport,
    pub complexity: ComplexityReport,
    pub recommendations: Vec<Recommendation>,
}

/// Run every diagnostic and derive recommendations from the results.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
pub fn analyze_dependencies(graph: &CodeGraph, config: &QualityConfig) -> DependencyReport {
    let adj = graph.adjacency();

    let cycles = cycle_report(graph, &adj, config.max_cycles);
    let coupling = coupling_report(graph, &adj);
    let cohesion = cohesion_report(graph, &adj);
    let complexity = complexity_report(graph);

    let mut report = DependencyReport {
        cycles,
        coupling,
        cohesion,
        complexity,
        recommendations: Vec::new(),
    };
    report.recommendations = recommendations(&report, config);
    report
}

/// Module-type nodes as dense ids, in insertion order.
pub(crate) fn module_ids(graph: &CodeGraph) -> impl Iterator<Item = usize> + '_ {
    graph
        .nodes()
        .enumerate()
        .filter(|(_, node)| node.kind.is_module())
        .map(|(id, _)| id)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};

    use super::*;

    #[test]
    fn empty_graph_has_clean_report() {
        let report = analyze_dependencies(&CodeGraph::new(), &QualityConfig::default());
        assert_eq!(report.cycles.total_cycles, 0);
        assert_eq!(report.cycles.severity, Severity::None);
        assert!(report.coupling.modules.is_empty());
        assert!(report.cohesion.modules.is_empty());
        assert_eq!(report.complexity.total_components, 0);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn two_cycle_yields_high_priority_recommendation() {
        let mut graph = CodeGraph::new();
        graph.add_node("a", NodeKind::Component, NodeAttrs::default());
        graph.add_node("b", NodeKind::Component, NodeAttrs::default());
        graph.add_edge("a", "b", Relation::Imports);
        graph.add_edge("b", "a", Relation::Imports);

        let report = analyze_dependencies(&graph, &QualityConfig::default());
        assert_eq!(report.cycles.total_cycles, 1);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].priority, Priority::High);
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert!((round2(0.125) - 0.13).abs() < 1e-12);
        assert!((round2(2.0 / 3.0) - 0.67).abs() < 1e-12);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Medium).expect("serialize");
        assert_eq!(json, "\"medium\"");
    }
}
