//! Judgment-enriched tools for an exploring agent.
//!
//! [`Agent`] owns one graph and wraps each atomic tool with the fields a
//! caller needs to decide what to look at next: impact and risk grades,
//! bottleneck flags, human-readable descriptions. Metrics are memoized in
//! a [`SnapshotCache`] keyed by the graph content hash.
//!
//! [`Agent::query`] answers free text by classifying it with
//! [`crate::query::intent`] and dispatching to the matching tool.

use std::collections::HashSet;
use std::sync::Arc;

use archlens_core::config::ProjectConfig;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::cache::SnapshotCache;
use crate::graph::build::CodeGraph;
use crate::graph::stats::layer_depths;
use crate::metrics::{Community, MetricsSnapshot, compute_metrics};
use crate::quality::{CycleReport, DependencyReport, analyze_dependencies, cycle_report};
use crate::query::intent::{Classification, HELP_TEXT, Intent, classify};
use crate::query::patterns::{PatternAnalysis, design_patterns};
use crate::query::resolve::{Resolution, resolve};
use crate::query::tools::{self, ImpactAnalysis, ModuleStructure, NodeInfo, RiskLevel};

/// Bounds for how widely a node is used.
pub const CALLER_IMPACT_BOUNDS: (usize, usize, usize) = (10, 5, 2);

/// Default depth for impact exploration.
pub const DEFAULT_IMPACT_DEPTH: usize = 2;

/// Default size of the critical-node list.
pub const DEFAULT_CRITICAL_NODES: usize = 5;

/// Entries per category in [`GraphSummary`].
const SUMMARY_TOP: usize = 3;

// ---------------------------------------------------------------------------
// Answer types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyAnswer {
    pub target: String,
    /// Key the target resolved to, when it resolved.
    pub resolved: Option<String>,
    /// Number of keys that matched the target.
    pub candidates: usize,
    /// More than one key matched and the shortest was picked.
    pub ambiguous: bool,
    pub dependencies: Vec<String>,
    pub count: usize,
    /// Dependencies that are also bottlenecks.
    pub critical: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallersAnswer {
    pub target: String,
    pub resolved: Option<String>,
    pub candidates: usize,
    pub ambiguous: bool,
    pub callers: Vec<String>,
    pub count: usize,
    pub impact: RiskLevel,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureAnswer {
    #[serde(flatten)]
    pub structure: ModuleStructure,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactAnswer {
    #[serde(flatten)]
    pub impact: ImpactAnalysis,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathAnswer {
    pub source: String,
    pub target: String,
    pub path: Vec<String>,
    pub length: usize,
    pub exists: bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalReason {
    HighPagerank,
    Bottleneck,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalNode {
    pub name: String,
    pub score: f64,
    pub reason: CriticalReason,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalNodes {
    pub critical_nodes: Vec<CriticalNode>,
    pub count: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityOverview {
    pub communities: Vec<Community>,
    pub count: usize,
    pub largest: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSummary {
    pub total_nodes: usize,
    pub total_edges: usize,
    pub communities: usize,
    pub top_important: Vec<String>,
    pub top_bottlenecks: Vec<String>,
    pub top_hubs: Vec<String>,
    /// Deepest layer in the import hierarchy.
    pub max_layer_depth: usize,
    pub description: String,
}

/// Catalog entry describing one tool to the calling agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [&'static str],
    pub example: &'static str,
}

pub const TOOL_CATALOG: &[ToolSpec] = &[
    ToolSpec {
        name: "dependencies",
        description: "What does this component depend on?",
        params: &["node: string"],
        example: "archlens tool deps facts.json UserRepository",
    },
    ToolSpec {
        name: "callers",
        description: "Who uses this component, class or function?",
        params: &["node: string"],
        example: "archlens tool callers facts.json authenticate",
    },
    ToolSpec {
        name: "structure",
        description: "How is this module organised?",
        params: &["module: string (optional)"],
        example: "archlens tool structure facts.json auth",
    },
    ToolSpec {
        name: "patterns",
        description: "Which design patterns does this component suggest?",
        params: &["node: string"],
        example: "archlens tool patterns facts.json UserController",
    },
    ToolSpec {
        name: "impact",
        description: "What would be affected by changing this component?",
        params: &["node: string", "depth: integer = 2"],
        example: "archlens tool impact facts.json Database --depth 3",
    },
    ToolSpec {
        name: "path",
        description: "How are two components connected?",
        params: &["source: string", "target: string"],
        example: "archlens tool path facts.json Controller Database",
    },
    ToolSpec {
        name: "info",
        description: "Attributes and neighbours of one node.",
        params: &["node: string"],
        example: "archlens tool info facts.json UserService",
    },
    ToolSpec {
        name: "critical",
        description: "Which components should be reviewed first?",
        params: &["top_n: integer = 5"],
        example: "archlens tool critical facts.json --top 10",
    },
    ToolSpec {
        name: "communities",
        description: "How does the code cluster?",
        params: &[],
        example: "archlens tool communities facts.json",
    },
    ToolSpec {
        name: "summary",
        description: "Key figures of the whole graph.",
        params: &[],
        example: "archlens tool summary facts.json",
    },
    ToolSpec {
        name: "query",
        description: "Ask the graph a question in plain English.",
        params: &["question: string"],
        example: "archlens query facts.json \"Are there circular dependencies?\"",
    },
];

/// Typed answer to a free-text question.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum Answer {
    Dependencies(DependencyAnswer),
    Callers(CallersAnswer),
    Structure(StructureAnswer),
    Patterns(PatternAnalysis),
    Path(PathAnswer),
    Info(NodeInfo),
    Cycles(CycleReport),
    Critical(CriticalNodes),
    Communities(CommunityOverview),
    Clarify(String),
    Help(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub question: String,
    pub understood: bool,
    pub answer: Answer,
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Agent {
    graph: CodeGraph,
    config: ProjectConfig,
    cache: SnapshotCache,
}

impl Agent {
    #[must_use]
    pub fn new(graph: CodeGraph, config: ProjectConfig) -> Self {
        Self {
            graph,
            config,
            cache: SnapshotCache::new(),
        }
    }

    #[must_use]
    pub const fn graph(&self) -> &CodeGraph {
        &self.graph
    }

    /// Mutable access for enrichment. The cached snapshot is dropped, since
    /// it describes the graph as it was before.
    pub fn graph_mut(&mut self) -> &mut CodeGraph {
        self.cache.invalidate();
        &mut self.graph
    }

    #[must_use]
    pub const fn config(&self) -> &ProjectConfig {
        &self.config
    }

    #[must_use]
    pub const fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Current metrics snapshot, computed at most once per graph state.
    pub fn metrics(&mut self) -> Arc<MetricsSnapshot> {
        let config = &self.config;
        let (snapshot, source) = self.cache.get_or_compute(&self.graph, |graph| {
            compute_metrics(graph, &config.metrics, &config.communities)
        });
        debug!(?source, "metrics snapshot");
        snapshot
    }

    #[must_use]
    pub fn dependency_report(&self) -> DependencyReport {
        analyze_dependencies(&self.graph, &self.config.quality)
    }

    // --- atomic tools with judgment ---

    pub fn get_dependencies(&mut self, target: &str) -> DependencyAnswer {
        let metrics = self.metrics();
        let resolved = resolve(&self.graph, target);
        let dependencies = tools::dependencies(&self.graph, target);
        let critical = dependencies
            .iter()
            .filter(|dep| metrics.is_bottleneck(dep))
            .cloned()
            .collect();

        DependencyAnswer {
            target: target.to_string(),
            candidates: resolved.as_ref().map_or(0, |r| r.candidates),
            ambiguous: resolved.as_ref().is_some_and(Resolution::is_ambiguous),
            resolved: resolved.map(|r| r.key),
            count: dependencies.len(),
            description: format!("{target} depends on {} component(s)", dependencies.len()),
            dependencies,
            critical,
        }
    }

    #[must_use]
    pub fn find_callers(&self, target: &str) -> CallersAnswer {
        let resolved = resolve(&self.graph, target);
        let callers = tools::callers(&self.graph, target);

        CallersAnswer {
            target: target.to_string(),
            candidates: resolved.as_ref().map_or(0, |r| r.candidates),
            ambiguous: resolved.as_ref().is_some_and(Resolution::is_ambiguous),
            resolved: resolved.map(|r| r.key),
            count: callers.len(),
            impact: RiskLevel::grade(callers.len(), CALLER_IMPACT_BOUNDS),
            description: format!("{target} is used by {} component(s)", callers.len()),
            callers,
        }
    }

    #[must_use]
    pub fn module_structure(&self, module: Option<&str>) -> StructureAnswer {
        let structure =
            tools::module_structure(&self.graph, module, self.config.query.structure_limit);
        StructureAnswer {
            description: format!(
                "Module '{}' with {} node(s)",
                structure.module, structure.total_nodes
            ),
            structure,
        }
    }

    #[must_use]
    pub fn design_patterns(&self, component: &str) -> PatternAnalysis {
        design_patterns(&self.graph, component)
    }

    #[must_use]
    pub fn explore_impact(&self, node: &str, depth: usize) -> ImpactAnswer {
        let impact =
            tools::explore_impact(&self.graph, node, depth, self.config.query.max_impact_depth);
        ImpactAnswer {
            description: format!(
                "Changing {} would affect {} component(s)",
                impact.node, impact.total_affected
            ),
            impact,
        }
    }

    #[must_use]
    pub fn find_path(&self, source: &str, target: &str) -> PathAnswer {
        let path = tools::shortest_path(&self.graph, source, target);
        let description = if path.is_empty() {
            format!("No path from {source} to {target}")
        } else {
            format!("Path from {source} to {target}: {}", path.join(" → "))
        };
        PathAnswer {
            source: source.to_string(),
            target: target.to_string(),
            length: path.len(),
            exists: !path.is_empty(),
            path,
            description,
        }
    }

    #[must_use]
    pub fn node_info(&self, node: &str) -> NodeInfo {
        tools::node_info(&self.graph, node)
    }

    // --- graph-wide views ---

    /// Top PageRank nodes, then non-zero bottlenecks, deduplicated by name
    /// and cut to `top_n`.
    pub fn critical_nodes(&mut self, top_n: usize) -> CriticalNodes {
        let metrics = self.metrics();

        let important = metrics
            .important_components
            .iter()
            .take(top_n)
            .map(|n| CriticalNode {
                name: n.node.clone(),
                score: n.score,
                reason: CriticalReason::HighPagerank,
                description: "Central component of the system".to_string(),
            });
        let bottlenecks = metrics
            .bottleneck_components
            .iter()
            .take(top_n)
            .filter(|n| n.score > 0.0)
            .map(|n| CriticalNode {
                name: n.node.clone(),
                score: n.score,
                reason: CriticalReason::Bottleneck,
                description: "Critical bottleneck".to_string(),
            });

        let mut seen = HashSet::new();
        let critical_nodes: Vec<CriticalNode> = important
            .chain(bottlenecks)
            .filter(|n| seen.insert(n.name.clone()))
            .take(top_n)
            .collect();

        CriticalNodes {
            count: critical_nodes.len(),
            critical_nodes,
            description: format!("Top {top_n} critical components"),
        }
    }

    pub fn communities(&mut self) -> CommunityOverview {
        let metrics = self.metrics();
        let communities = metrics.communities.clone();
        CommunityOverview {
            count: communities.len(),
            largest: communities.iter().map(|c| c.size).max().unwrap_or(0),
            description: format!("System organised in {} communities", communities.len()),
            communities,
        }
    }

    pub fn summarize(&mut self) -> GraphSummary {
        let metrics = self.metrics();
        let max_layer_depth = layer_depths(&self.graph).into_iter().max().unwrap_or(0);
        GraphSummary {
            total_nodes: metrics.total_nodes,
            total_edges: metrics.total_edges,
            communities: metrics.num_communities,
            top_important: top_keys(metrics.important_components.iter().map(|n| &n.node)),
            top_bottlenecks: top_keys(metrics.bottleneck_components.iter().map(|n| &n.node)),
            top_hubs: top_keys(metrics.hub_components.iter().map(|n| &n.node)),
            max_layer_depth,
            description: format!(
                "System with {} nodes in {} communities, max layer depth {max_layer_depth}",
                metrics.total_nodes, metrics.num_communities
            ),
        }
    }

    #[must_use]
    pub fn cycles(&self) -> CycleReport {
        cycle_report(
            &self.graph,
            &self.graph.adjacency(),
            self.config.quality.max_cycles,
        )
    }

    #[must_use]
    pub const fn available_tools() -> &'static [ToolSpec] {
        TOOL_CATALOG
    }

    // --- natural language ---

    #[instrument(skip(self))]
    pub fn query(&mut self, question: &str) -> QueryAnswer {
        let (understood, answer) = match classify(question) {
            Classification::Unknown => (false, Answer::Help(HELP_TEXT.to_string())),
            Classification::NeedsEntity { intent, required } => {
                (true, Answer::Clarify(clarification(intent, required)))
            }
            Classification::Ready { intent, entities } => (true, self.dispatch(intent, &entities)),
        };

        QueryAnswer {
            question: question.to_string(),
            understood,
            answer,
        }
    }

    fn dispatch(&mut self, intent: Intent, entities: &[String]) -> Answer {
        let first = entities.first().map(String::as_str);
        match (intent, first, entities.get(1)) {
            (Intent::Cycles, ..) => Answer::Cycles(self.cycles()),
            (Intent::Communities, ..) => Answer::Communities(self.communities()),
            (Intent::Critical, ..) => Answer::Critical(self.critical_nodes(DEFAULT_CRITICAL_NODES)),
            (Intent::Structure, module, _) => Answer::Structure(self.module_structure(module)),
            (Intent::Callers, Some(node), _) => Answer::Callers(self.find_callers(node)),
            (Intent::Dependencies, Some(node), _) => Answer::Dependencies(self.get_dependencies(node)),
            (Intent::Patterns, Some(node), _) => Answer::Patterns(self.design_patterns(node)),
            (Intent::Info, Some(node), _) => Answer::Info(self.node_info(node)),
            (Intent::Path, Some(source), Some(target)) => Answer::Path(self.find_path(source, target)),
            (intent, ..) => Answer::Clarify(clarification(intent, 1)),
        }
    }
}

fn top_keys<'a>(nodes: impl Iterator<Item = &'a String>) -> Vec<String> {
    nodes.take(SUMMARY_TOP).cloned().collect()
}

fn clarification(intent: Intent, required: usize) -> String {
    if required > 1 {
        format!(
            "The {} question needs {required} component names, e.g. 'How does Controller reach Database?'",
            intent.as_str()
        )
    } else {
        format!(
            "Which component? Name it with a capitalised or snake_case identifier, e.g. 'Who calls UserService?' ({} question)",
            intent.as_str()
        )
    }
}
