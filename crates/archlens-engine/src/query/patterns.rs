//! Design-pattern heuristics.
//!
//! Each rule looks only at the node key and its distinct in/out neighbour
//! counts. Rules are evaluated in table order and several may match.

use archlens_core::model::NodeKind;
use serde::Serialize;

use crate::graph::build::CodeGraph;
use crate::query::resolve::resolve;

/// Inputs every pattern rule sees.
#[derive(Debug, Clone, Copy)]
pub struct PatternInput<'a> {
    pub key: &'a str,
    pub preds: usize,
    pub succs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternConfidence {
    Medium,
    High,
}

pub struct PatternRule {
    pub pattern: &'static str,
    pub confidence: PatternConfidence,
    pub applies: fn(&PatternInput<'_>) -> bool,
    pub reason: fn(&PatternInput<'_>) -> String,
}

pub const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        pattern: "Singleton",
        confidence: PatternConfidence::Medium,
        applies: |n| n.preds > 5 && n.succs <= 2,
        reason: |n| format!("{} callers, {} dependencies", n.preds, n.succs),
    },
    PatternRule {
        pattern: "Factory/Builder",
        confidence: PatternConfidence::Medium,
        applies: |n| n.preds > 8,
        reason: |n| format!("High coupling: {} dependents", n.preds),
    },
    PatternRule {
        pattern: "Repository",
        confidence: PatternConfidence::High,
        applies: |n| {
            let lower = n.key.to_lowercase();
            lower.contains("repository") || lower.contains("repo")
        },
        reason: |_| "Naming convention + data access pattern".to_string(),
    },
    PatternRule {
        pattern: "Service/Orchestrator",
        confidence: PatternConfidence::Medium,
        applies: |n| n.succs > 10,
        reason: |n| format!("High fan-out: {} dependencies", n.succs),
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub confidence: PatternConfidence,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternMetrics {
    pub dependencies_out: usize,
    pub dependencies_in: usize,
    pub complexity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternAnalysis {
    pub component: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeKind>,
    pub patterns: Vec<PatternMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PatternMetrics>,
}

/// Apply [`PATTERN_RULES`] in order.
#[must_use]
pub fn match_patterns(input: &PatternInput<'_>) -> Vec<PatternMatch> {
    PATTERN_RULES
        .iter()
        .filter(|rule| (rule.applies)(input))
        .map(|rule| PatternMatch {
            pattern: rule.pattern.to_string(),
            confidence: rule.confidence,
            reason: (rule.reason)(input),
        })
        .collect()
}

#[must_use]
pub fn design_patterns(graph: &CodeGraph, name: &str) -> PatternAnalysis {
    let Some(resolved) = resolve(graph, name) else {
        return PatternAnalysis {
            component: name.to_string(),
            found: false,
            node_type: None,
            patterns: Vec::new(),
            metrics: None,
        };
    };

    let adj = graph.adjacency();
    let input = PatternInput {
        key: &resolved.key,
        preds: adj.in_degree(resolved.id),
        succs: adj.out_degree(resolved.id),
    };

    PatternAnalysis {
        component: resolved.key.clone(),
        found: true,
        node_type: graph.node_by_key(&resolved.key).map(|node| node.kind),
        patterns: match_patterns(&input),
        metrics: Some(PatternMetrics {
            dependencies_out: input.succs,
            dependencies_in: input.preds,
            complexity: input.succs + input.preds,
        }),
    }
}
