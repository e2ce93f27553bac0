//! Atomic graph queries.
//!
//! Every tool resolves its arguments with [`resolve`] and answers an
//! unresolved name with an empty result or a `found: false` sentinel.
//! Neighbour lists are distinct and ordered by node insertion.

use std::collections::{HashSet, VecDeque};

use archlens_core::model::NodeKind;
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::graph::adjacency::Adjacency;
use crate::graph::build::{CodeGraph, GraphNode};
use crate::graph::stats::layer_depths;
use crate::query::resolve::resolve;

// ---------------------------------------------------------------------------
// Risk grading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Grade a count against `(critical, high, medium)` exclusive bounds.
    #[must_use]
    pub const fn grade(count: usize, bounds: (usize, usize, usize)) -> Self {
        if count > bounds.0 {
            Self::Critical
        } else if count > bounds.1 {
            Self::High
        } else if count > bounds.2 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Bounds for the blast radius of a change.
pub const IMPACT_RISK_BOUNDS: (usize, usize, usize) = (20, 10, 5);

// ---------------------------------------------------------------------------
// Neighbours
// ---------------------------------------------------------------------------

fn keys(graph: &CodeGraph, ids: &[usize]) -> Vec<String> {
    ids.iter().map(|&id| graph.key_at(id).to_string()).collect()
}

/// Keys the node depends on (distinct successors).
#[must_use]
pub fn dependencies(graph: &CodeGraph, name: &str) -> Vec<String> {
    resolve(graph, name).map_or_else(Vec::new, |r| {
        keys(graph, graph.adjacency().successors(r.id))
    })
}

/// Keys depending on the node (distinct predecessors).
#[must_use]
pub fn callers(graph: &CodeGraph, name: &str) -> Vec<String> {
    resolve(graph, name).map_or_else(Vec::new, |r| {
        keys(graph, graph.adjacency().predecessors(r.id))
    })
}

// ---------------------------------------------------------------------------
// Module structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSummary {
    pub name: String,
    /// Distinct successors of the class node.
    pub methods: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSummary {
    pub name: String,
    pub calls: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub component_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternalEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStructure {
    /// The module asked for, or `"project"`.
    pub module: String,
    pub total_nodes: usize,
    pub classes: Vec<ClassSummary>,
    pub functions: Vec<FunctionSummary>,
    pub components: Vec<ComponentSummary>,
    pub dependencies: Vec<InternalEdge>,
}

/// Classes, functions, components and internal edges of a module.
///
/// A node belongs to `module` when its `module` attribute equals it or its
/// key contains it. Without a module the first `limit` nodes are used.
#[must_use]
pub fn module_structure(graph: &CodeGraph, module: Option<&str>, limit: usize) -> ModuleStructure {
    let members: Vec<usize> = match module {
        Some(name) => graph
            .nodes()
            .enumerate()
            .filter(|(_, node)| node.attrs.module == name || node.key.contains(name))
            .map(|(id, _)| id)
            .collect(),
        None => (0..graph.node_count().min(limit)).collect(),
    };
    let in_module: HashSet<usize> = members.iter().copied().collect();
    let adj = graph.adjacency();

    let mut structure = ModuleStructure {
        module: module.unwrap_or("project").to_string(),
        total_nodes: members.len(),
        classes: Vec::new(),
        functions: Vec::new(),
        components: Vec::new(),
        dependencies: Vec::new(),
    };

    for (id, node) in members.iter().filter_map(|&id| node_at(graph, id).map(|n| (id, n))) {
        match node.kind {
            NodeKind::Class => structure.classes.push(ClassSummary {
                name: node.key.clone(),
                methods: adj.out_degree(id),
            }),
            NodeKind::Function => structure.functions.push(FunctionSummary {
                name: node.key.clone(),
                calls: adj.out_degree(id),
            }),
            NodeKind::Component => structure.components.push(ComponentSummary {
                name: node.key.clone(),
                component_type: if node.attrs.component_type.is_empty() {
                    "unknown".to_string()
                } else {
                    node.attrs.component_type.clone()
                },
            }),
            NodeKind::Container => {}
        }
    }

    for (from, to, relation) in graph.edges() {
        let (Some(a), Some(b)) = (graph.node_index(from), graph.node_index(to)) else {
            continue;
        };
        if in_module.contains(&a.index()) && in_module.contains(&b.index()) {
            structure.dependencies.push(InternalEdge {
                from: from.to_string(),
                to: to.to_string(),
                relation: relation.as_str().to_string(),
            });
        }
    }

    structure
}

fn node_at(graph: &CodeGraph, id: usize) -> Option<&GraphNode> {
    graph.node(NodeIndex::new(id))
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// Shortest directed path from `source` to `target` as keys, or `[]`.
#[must_use]
pub fn shortest_path(graph: &CodeGraph, source: &str, target: &str) -> Vec<String> {
    let (Some(from), Some(to)) = (resolve(graph, source), resolve(graph, target)) else {
        return Vec::new();
    };
    bfs_path(&graph.adjacency(), from.id, to.id)
        .map_or_else(Vec::new, |ids| keys(graph, &ids))
}

fn bfs_path(adj: &Adjacency, from: usize, to: usize) -> Option<Vec<usize>> {
    if from == to {
        return Some(vec![from]);
    }

    let mut parent = vec![usize::MAX; adj.len()];
    let mut queue = VecDeque::from([from]);
    parent[from] = from;

    while let Some(v) = queue.pop_front() {
        for &w in adj.successors(v) {
            if parent[w] != usize::MAX {
                continue;
            }
            parent[w] = v;
            if w == to {
                let mut path = vec![to];
                let mut cur = to;
                while cur != from {
                    cur = parent[cur];
                    path.push(cur);
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(w);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Node info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDetails {
    pub name: String,
    pub attributes: GraphNode,
    pub dependencies_out: Vec<String>,
    pub dependencies_in: Vec<String>,
    pub degree_out: usize,
    pub degree_in: usize,
    /// Longest import chain above the node; cycles count as one layer.
    pub layer_depth: usize,
}

/// Details of one node; `details` is absent when nothing matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeInfo {
    pub found: bool,
    pub searched: String,
    #[serde(flatten)]
    pub details: Option<NodeDetails>,
}

#[must_use]
pub fn node_info(graph: &CodeGraph, name: &str) -> NodeInfo {
    let details = resolve(graph, name).and_then(|r| {
        let node = node_at(graph, r.id)?;
        let adj = graph.adjacency();
        let layer_depth = layer_depths(graph).get(r.id).copied()?;
        Some(NodeDetails {
            name: r.key,
            attributes: node.clone(),
            dependencies_out: keys(graph, adj.successors(r.id)),
            dependencies_in: keys(graph, adj.predecessors(r.id)),
            degree_out: adj.out_degree(r.id),
            degree_in: adj.in_degree(r.id),
            layer_depth,
        })
    });

    NodeInfo {
        found: details.is_some(),
        searched: name.to_string(),
        details,
    }
}

// ---------------------------------------------------------------------------
// Impact
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactAnalysis {
    /// Resolved key, or the searched name when unresolved.
    pub node: String,
    pub direct_impact: Vec<String>,
    pub indirect_impact: Vec<String>,
    pub total_affected: usize,
    pub risk_level: RiskLevel,
    /// Depth actually explored after clamping.
    pub depth: usize,
}

/// Nodes affected by a change to `name`.
///
/// Breadth-first over predecessors: level 1 is the direct impact, levels
/// 2 up to `depth` the indirect impact. `depth` is clamped to
/// `1..=max_depth` and the node itself is never counted.
#[must_use]
pub fn explore_impact(graph: &CodeGraph, name: &str, depth: usize, max_depth: usize) -> ImpactAnalysis {
    let depth = depth.clamp(1, max_depth.max(1));
    let Some(root) = resolve(graph, name) else {
        return ImpactAnalysis {
            node: name.to_string(),
            direct_impact: Vec::new(),
            indirect_impact: Vec::new(),
            total_affected: 0,
            risk_level: RiskLevel::Low,
            depth,
        };
    };

    let adj = graph.adjacency();
    let mut seen = vec![false; adj.len()];
    seen[root.id] = true;

    let mut levels: Vec<Vec<usize>> = Vec::new();
    let mut frontier = vec![root.id];
    for _ in 0..depth {
        let mut next = Vec::new();
        for &v in &frontier {
            for &u in adj.predecessors(v) {
                if !seen[u] {
                    seen[u] = true;
                    next.push(u);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        levels.push(next.clone());
        frontier = next;
    }

    let direct: Vec<usize> = levels.first().cloned().unwrap_or_default();
    let indirect: Vec<usize> = levels.iter().skip(1).flatten().copied().collect();
    let total = direct.len() + indirect.len();

    ImpactAnalysis {
        node: root.key,
        direct_impact: keys(graph, &direct),
        indirect_impact: keys(graph, &indirect),
        total_affected: total,
        risk_level: RiskLevel::grade(total, IMPACT_RISK_BOUNDS),
        depth,
    }
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, Relation};

    use super::*;

    fn graph(keys: &[&str], edges: &[(&str, &str)]) -> CodeGraph {
        let mut g = CodeGraph::new();
        for key in keys {
            g.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        for (from, to) in edges {
            g.add_edge(from, to, Relation::Imports);
        }
        g
    }

    #[test]
    fn neighbours_are_distinct() {
        let mut g = graph(&["a", "b"], &[("a", "b")]);
        g.add_edge("a", "b", Relation::Calls);
        assert_eq!(dependencies(&g, "a"), vec!["b"]);
        assert_eq!(callers(&g, "b"), vec!["a"]);
        assert!(dependencies(&g, "missing").is_empty());
    }

    #[test]
    fn path_through_chain() {
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        assert_eq!(shortest_path(&g, "A", "C"), vec!["A", "B", "C"]);
        assert!(shortest_path(&g, "C", "A").is_empty());
        assert!(shortest_path(&g, "A", "nowhere").is_empty());
        assert_eq!(shortest_path(&g, "B", "B"), vec!["B"]);
    }

    #[test]
    fn impact_levels() {
        let g = graph(
            &["X", "Y", "Z", "W"],
            &[("Y", "X"), ("Z", "X"), ("W", "Y")],
        );
        let impact = explore_impact(&g, "X", 2, 6);
        assert_eq!(impact.direct_impact, vec!["Y", "Z"]);
        assert_eq!(impact.indirect_impact, vec!["W"]);
        assert_eq!(impact.total_affected, 3);
        assert_eq!(impact.risk_level, RiskLevel::Low);

        let shallow = explore_impact(&g, "X", 1, 6);
        assert!(shallow.indirect_impact.is_empty());
        assert_eq!(shallow.total_affected, 2);
    }

    #[test]
    fn impact_ignores_cycles_back_to_root() {
        let g = graph(&["a", "b"], &[("a", "b"), ("b", "a")]);
        let impact = explore_impact(&g, "a", 6, 6);
        assert_eq!(impact.direct_impact, vec!["b"]);
        assert_eq!(impact.total_affected, 1);
    }

    #[test]
    fn impact_depth_is_capped() {
        let g = graph(&["a", "b", "c", "d"], &[("b", "a"), ("c", "b"), ("d", "c")]);
        let impact = explore_impact(&g, "a", 50, 2);
        assert_eq!(impact.depth, 2);
        assert_eq!(impact.total_affected, 2);
    }

    #[test]
    fn risk_grades() {
        assert_eq!(RiskLevel::grade(21, IMPACT_RISK_BOUNDS), RiskLevel::Critical);
        assert_eq!(RiskLevel::grade(11, IMPACT_RISK_BOUNDS), RiskLevel::High);
        assert_eq!(RiskLevel::grade(6, IMPACT_RISK_BOUNDS), RiskLevel::Medium);
        assert_eq!(RiskLevel::grade(5, IMPACT_RISK_BOUNDS), RiskLevel::Low);
    }

    #[test]
    fn node_info_sentinel() {
        let g = graph(&["a"], &[]);
        let info = node_info(&g, "zzz");
        assert!(!info.found);
        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["found"], false);
        assert_eq!(json["searched"], "zzz");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn node_info_found() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        let info = node_info(&g, "a");
        let details = info.details.expect("found");
        assert_eq!(details.dependencies_out, vec!["b"]);
        assert_eq!(details.degree_out, 1);
        assert_eq!(details.layer_depth, 0);
        assert_eq!(node_info(&g, "b").details.map(|d| d.layer_depth), Some(1));
        assert_eq!(details.degree_in, 0);
    }

    #[test]
    fn structure_of_module() {
        let mut g = CodeGraph::new();
        g.add_node(
            "pkg/app.py",
            NodeKind::Component,
            NodeAttrs {
                component_type: "service".to_string(),
                ..NodeAttrs::default()
            },
        );
        g.add_node(
            "app.Service",
            NodeKind::Class,
            NodeAttrs {
                module: "app".to_string(),
                ..NodeAttrs::default()
            },
        );
        g.add_node(
            "app.run",
            NodeKind::Function,
            NodeAttrs {
                module: "app".to_string(),
                ..NodeAttrs::default()
            },
        );
        g.add_node("other.x", NodeKind::Function, NodeAttrs::default());
        g.add_edge("pkg/app.py", "app.Service", Relation::Contains);
        g.add_edge("app.run", "app.Service", Relation::Calls);
        g.add_edge("app.run", "other.x", Relation::Calls);

        let s = module_structure(&g, Some("app"), 50);
        assert_eq!(s.module, "app");
        assert_eq!(s.total_nodes, 3);
        assert_eq!(s.classes.len(), 1);
        assert_eq!(s.functions[0].calls, 2);
        assert_eq!(s.components[0].component_type, "service");
        assert_eq!(s.dependencies.len(), 2);

        let project = module_structure(&g, None, 2);
        assert_eq!(project.module, "project");
        assert_eq!(project.total_nodes, 2);
    }
}
