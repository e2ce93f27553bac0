//! Cycle diagnostics.
//!
//! Per cycle: length 2 is `high`, any other length up to 4 (self-loops
//! included) is `medium`, longer cycles are `low`. The aggregate grade
//! follows the cycle count: 0 none, 1–2 low, 3–5 medium, more is high.

use serde::Serialize;

use crate::graph::adjacency::Adjacency;
use crate::graph::build::CodeGraph;
use crate::graph::cycles::simple_cycles;
use crate::quality::Severity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleEntry {
    /// Node keys, starting at the earliest inserted node of the cycle.
    pub nodes: Vec<String>,
    pub length: usize,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub total_cycles: usize,
    pub cycles: Vec<CycleEntry>,
    pub severity: Severity,
    /// `true` when enumeration stopped at the configured cap.
    pub truncated: bool,
}

#[must_use]
pub const fn cycle_severity(length: usize) -> Severity {
    match length {
        2 => Severity::High,
        0..=4 => Severity::Medium,
        _ => Severity::Low,
    }
}

#[must_use]
pub const fn aggregate_severity(count: usize) -> Severity {
    match count {
        0 => Severity::None,
        1..=2 => Severity::Low,
        3..=5 => Severity::Medium,
        _ => Severity::High,
    }
}

/// Enumerate cycles up to `max_cycles` and grade them.
#[must_use]
pub fn cycle_report(graph: &CodeGraph, adj: &Adjacency, max_cycles: usize) -> CycleReport {
    let found = simple_cycles(adj, max_cycles);

    let cycles: Vec<CycleEntry> = found
        .cycles
        .iter()
        .map(|ids| CycleEntry {
            nodes: ids.iter().map(|&id| graph.key_at(id).to_string()).collect(),
            length: ids.len(),
            severity: cycle_severity(ids.len()),
        })
        .collect();

    CycleReport {
        total_cycles: cycles.len(),
        severity: aggregate_severity(cycles.len()),
        cycles,
        truncated: found.truncated,
    }
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};

    use super::*;

    fn graph_with(keys: &[&str], edges: &[(&str, &str)]) -> CodeGraph {
        let mut graph = CodeGraph::new();
        for key in keys {
            graph.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        for (from, to) in edges {
            graph.add_edge(from, to, Relation::Imports);
        }
        graph
    }

    #[test]
    fn per_cycle_grades() {
        assert_eq!(cycle_severity(1), Severity::Medium);
        assert_eq!(cycle_severity(2), Severity::High);
        assert_eq!(cycle_severity(3), Severity::Medium);
        assert_eq!(cycle_severity(4), Severity::Medium);
        assert_eq!(cycle_severity(5), Severity::Low);
    }

    #[test]
    fn aggregate_grades() {
        assert_eq!(aggregate_severity(0), Severity::None);
        assert_eq!(aggregate_severity(2), Severity::Low);
        assert_eq!(aggregate_severity(3), Severity::Medium);
        assert_eq!(aggregate_severity(5), Severity::Medium);
        assert_eq!(aggregate_severity(6), Severity::High);
    }

    #[test]
    fn two_cycle_report() {
        let graph = graph_with(&["A", "B"], &[("A", "B"), ("B", "A")]);
        let report = cycle_report(&graph, &graph.adjacency(), 100);
        assert_eq!(report.total_cycles, 1);
        assert_eq!(report.cycles[0].nodes, vec!["A", "B"]);
        assert_eq!(report.cycles[0].severity, Severity::High);
        assert_eq!(report.severity, Severity::Low);
        assert!(!report.truncated);
    }

    #[test]
    fn cap_marks_report_truncated() {
        let graph = graph_with(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "b"), ("c", "a"), ("a", "c")],
        );
        let report = cycle_report(&graph, &graph.adjacency(), 2);
        assert!(report.truncated);
        assert_eq!(report.total_cycles, 2);
    }
}
