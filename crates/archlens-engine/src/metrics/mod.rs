//! Centrality and community metrics for the code graph.
//!
//! # Overview
//!
//! Each metric answers a different question about which nodes matter:
//!
//! - **Importance** (`pagerank`): which nodes does dependency flow settle
//!   on? Falls back to degree centrality.
//! - **Bottleneck** (`betweenness`): which nodes sit on many shortest
//!   paths?
//! - **Hub** (`basic`): which nodes have the most raw connections?
//! - **Communities** (`community`): which nodes cluster together? Louvain,
//!   falling back to connected components.
//!
//! [`compute_metrics`] runs all of them on the current graph and records
//! which algorithm produced each category in [`AlgorithmReport`]. Every
//! fallback is logged with `warn!`.

pub mod basic;
pub mod betweenness;
pub mod community;
pub mod pagerank;

use std::cmp::Ordering;

use archlens_core::config::{CommunityAlgorithm, CommunityConfig, ImportanceAlgorithm, MetricsConfig};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::graph::adjacency::Adjacency;
use crate::graph::build::CodeGraph;
use crate::metrics::basic::{degree_centrality, total_degree};
use crate::metrics::betweenness::betweenness_centrality;
use crate::metrics::community::{Partition, connected_components, louvain, modularity};
use crate::metrics::pagerank::{PageRankConfig, pagerank};

// ---------------------------------------------------------------------------
// Snapshot types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredNode {
    pub node: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubNode {
    pub node: String,
    pub connections: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Community {
    pub id: usize,
    pub components: Vec<String>,
    pub size: usize,
}

/// Which algorithm produced the importance ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportanceMethod {
    Pagerank,
    Degree,
}

/// Which algorithm produced the community partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunityMethod {
    Louvain,
    ConnectedComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceReport {
    pub method: ImportanceMethod,
    pub fallback_reason: Option<String>,
    /// PageRank iterations run (0 when PageRank was not attempted).
    pub iterations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityReport {
    pub method: CommunityMethod,
    pub fallback_reason: Option<String>,
    /// Louvain aggregation levels (0 for connected components).
    pub levels: usize,
    /// Modularity of the full partition, singletons included.
    pub modularity: f64,
}

/// Algorithms used for a snapshot, and why any fallback was taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlgorithmReport {
    pub importance: ImportanceReport,
    pub communities: CommunityReport,
}

/// Read-only metrics derived from one graph state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub num_communities: usize,
    pub important_components: Vec<ScoredNode>,
    pub bottleneck_components: Vec<ScoredNode>,
    pub hub_components: Vec<HubNode>,
    pub communities: Vec<Community>,
    pub algorithms: AlgorithmReport,
}

impl MetricsSnapshot {
    /// `true` when `key` is a reported bottleneck with a non-zero score.
    #[must_use]
    pub fn is_bottleneck(&self, key: &str) -> bool {
        self.bottleneck_components
            .iter()
            .any(|b| b.node == key && b.score > 0.0)
    }
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Compute a fresh metrics snapshot.
#[must_use]
#[instrument(skip_all, fields(nodes = graph.node_count(), edges = graph.edge_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn compute_metrics(
    graph: &CodeGraph,
    metrics: &MetricsConfig,
    communities: &CommunityConfig,
) -> MetricsSnapshot {
    let adj = graph.adjacency();
    let degrees = total_degree(graph);

    let (importance_scores, importance) = importance(&adj, &degrees, metrics);
    let bottleneck_scores = betweenness_centrality(&adj);

    let hub_scores: Vec<f64> = degrees.iter().map(|&d| d as f64).collect();
    let hub_components = top_k(graph, &hub_scores, metrics.top_hubs)
        .into_iter()
        .map(|(id, _)| HubNode {
            node: graph.key_at(id).to_string(),
            connections: degrees[id],
        })
        .collect();

    let (partition, community_report) = partition(&adj, communities);
    let community_list: Vec<Community> = partition
        .groups
        .iter()
        .filter(|group| group.len() > 1)
        .enumerate()
        .map(|(id, group)| Community {
            id,
            components: group.iter().map(|&v| graph.key_at(v).to_string()).collect(),
            size: group.len(),
        })
        .collect();

    MetricsSnapshot {
        total_nodes: graph.node_count(),
        total_edges: graph.edge_count(),
        num_communities: community_list.len(),
        important_components: scored(graph, &importance_scores, metrics.top_important),
        bottleneck_components: scored(graph, &bottleneck_scores, metrics.top_bottlenecks),
        hub_components,
        communities: community_list,
        algorithms: AlgorithmReport {
            importance,
            communities: community_report,
        },
    }
}

fn importance(
    adj: &Adjacency,
    degrees: &[usize],
    config: &MetricsConfig,
) -> (Vec<f64>, ImportanceReport) {
    let fallback = |reason: String, iterations: usize, converged: bool| {
        warn!(%reason, "importance falling back to degree centrality");
        (
            degree_centrality(degrees),
            ImportanceReport {
                method: ImportanceMethod::Degree,
                fallback_reason: Some(reason),
                iterations,
                converged,
            },
        )
    };

    if config.importance == ImportanceAlgorithm::Degree {
        return fallback("configured".to_string(), 0, false);
    }

    let result = pagerank(adj, &PageRankConfig::from(config));
    if !result.converged {
        return fallback(
            format!("pagerank did not converge in {} iterations", result.iterations),
            result.iterations,
            false,
        );
    }
    if !result.is_finite() {
        return fallback(
            "pagerank produced non-finite scores".to_string(),
            result.iterations,
            true,
        );
    }

    let report = ImportanceReport {
        method: ImportanceMethod::Pagerank,
        fallback_reason: None,
        iterations: result.iterations,
        converged: true,
    };
    (result.scores, report)
}

fn partition(adj: &Adjacency, config: &CommunityConfig) -> (Partition, CommunityReport) {
    let reason = match config.algorithm {
        CommunityAlgorithm::ConnectedComponents => Some("configured".to_string()),
        CommunityAlgorithm::Louvain if adj.len() > config.louvain_max_nodes => Some(format!(
            "{} nodes exceed louvain_max_nodes={}",
            adj.len(),
            config.louvain_max_nodes
        )),
        CommunityAlgorithm::Louvain => None,
    };

    if let Some(reason) = reason {
        warn!(%reason, "communities falling back to connected components");
        let partition = connected_components(adj);
        let report = CommunityReport {
            method: CommunityMethod::ConnectedComponents,
            fallback_reason: Some(reason),
            levels: 0,
            modularity: modularity(adj, &partition.groups),
        };
        return (partition, report);
    }

    let partition = louvain(adj, config.seed);
    let report = CommunityReport {
        method: CommunityMethod::Louvain,
        fallback_reason: None,
        levels: partition.levels,
        modularity: modularity(adj, &partition.groups),
    };
    (partition, report)
}

/// Highest `k` scores, descending, ties broken by key.
fn top_k(graph: &CodeGraph, scores: &[f64], k: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| graph.key_at(a.0).cmp(graph.key_at(b.0)))
    });
    ranked.truncate(k);
    ranked
}

fn scored(graph: &CodeGraph, scores: &[f64], k: usize) -> Vec<ScoredNode> {
    top_k(graph, scores, k)
        .into_iter()
        .map(|(id, score)| ScoredNode {
            node: graph.key_at(id).to_string(),
            score,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::model::{NodeAttrs, NodeKind, Relation};

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> CodeGraph {
        let mut g = CodeGraph::new();
        for key in nodes {
            g.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        for (a, b) in edges {
            g.add_edge(a, b, Relation::Imports);
        }
        g
    }

    #[test]
    fn empty_graph_has_empty_categories() {
        let snapshot = compute_metrics(
            &CodeGraph::new(),
            &MetricsConfig::default(),
            &CommunityConfig::default(),
        );
        assert_eq!(snapshot.total_nodes, 0);
        assert!(snapshot.important_components.is_empty());
        assert!(snapshot.bottleneck_components.is_empty());
        assert!(snapshot.hub_components.is_empty());
        assert!(snapshot.communities.is_empty());
        assert_eq!(snapshot.num_communities, 0);
    }

    #[test]
    fn ties_break_by_key() {
        let g = graph(&["b", "a", "c"], &[]);
        let snapshot = compute_metrics(&g, &MetricsConfig::default(), &CommunityConfig::default());
        let order: Vec<&str> = snapshot
            .important_components
            .iter()
            .map(|s| s.node.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn configured_degree_is_reported_as_fallback() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("c", "b")]);
        let config = MetricsConfig {
            importance: ImportanceAlgorithm::Degree,
            ..MetricsConfig::default()
        };
        let snapshot = compute_metrics(&g, &config, &CommunityConfig::default());
        assert_eq!(snapshot.algorithms.importance.method, ImportanceMethod::Degree);
        assert_eq!(
            snapshot.algorithms.importance.fallback_reason.as_deref(),
            Some("configured")
        );
        assert_eq!(snapshot.important_components[0].node, "b");
        assert!((snapshot.important_components[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn non_convergence_falls_back_to_degree() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        let config = MetricsConfig {
            max_iter: 1,
            ..MetricsConfig::default()
        };
        let snapshot = compute_metrics(&g, &config, &CommunityConfig::default());
        let report = &snapshot.algorithms.importance;
        assert_eq!(report.method, ImportanceMethod::Degree);
        assert!(!report.converged);
        assert!(
            report
                .fallback_reason
                .as_deref()
                .is_some_and(|r| r.contains("did not converge"))
        );
    }

    #[test]
    fn oversized_graph_skips_louvain() {
        let g = graph(&["a", "b", "c"], &[("a", "b")]);
        let config = CommunityConfig {
            louvain_max_nodes: 2,
            ..CommunityConfig::default()
        };
        let snapshot = compute_metrics(&g, &MetricsConfig::default(), &config);
        assert_eq!(
            snapshot.algorithms.communities.method,
            CommunityMethod::ConnectedComponents
        );
        assert_eq!(snapshot.communities.len(), 1);
        assert_eq!(snapshot.communities[0].components, vec!["a", "b"]);
    }

    #[test]
    fn hubs_count_every_relation_edge() {
        let mut g = graph(&["a", "b"], &[("a", "b")]);
        g.add_edge("a", "b", Relation::Calls);
        let snapshot = compute_metrics(&g, &MetricsConfig::default(), &CommunityConfig::default());
        assert_eq!(snapshot.hub_components[0].connections, 2);
        assert_eq!(snapshot.total_edges, 2);
    }
}
