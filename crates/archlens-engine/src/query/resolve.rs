//! Name resolution for tool arguments.
//!
//! 1. Exact key match.
//! 2. Otherwise every key containing the name is a candidate. The shortest
//!    candidate wins, ties broken lexicographically, and the candidate
//!    count is reported so callers can flag ambiguity.

use serde::Serialize;

use crate::graph::build::CodeGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub key: String,
    #[serde(skip)]
    pub id: usize,
    pub exact: bool,
    /// Keys that matched; 1 for an exact match.
    pub candidates: usize,
}

impl Resolution {
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        self.candidates > 1
    }
}

/// Resolve `name` to a node, or `None` when nothing matches.
#[must_use]
pub fn resolve(graph: &CodeGraph, name: &str) -> Option<Resolution> {
    if name.is_empty() {
        return None;
    }

    if let Some(idx) = graph.node_index(name) {
        return Some(Resolution {
            key: name.to_string(),
            id: idx.index(),
            exact: true,
            candidates: 1,
        });
    }

    let mut candidates = 0;
    let mut best: Option<(usize, &str)> = None;
    for (id, node) in graph.nodes().enumerate() {
        let key = node.key.as_str();
        if !key.contains(name) {
            continue;
        }
        candidates += 1;
        let better = best.is_none_or(|(_, current)| {
            (key.len(), key) < (current.len(), current)
        });
        if better {
            best = Some((id, key));
        }
    }

    best.map(|(id, key)| Resolution {
        key: key.to_string(),
        id,
        exact: false,
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use archlens_core::model::{NodeAttrs, NodeKind};

    use super::*;

    fn graph(keys: &[&str]) -> CodeGraph {
        let mut graph = CodeGraph::new();
        for key in keys {
            graph.add_node(key, NodeKind::Component, NodeAttrs::default());
        }
        graph
    }

    #[test]
    fn exact_match_wins_over_substrings() {
        let g = graph(&["UserService", "User"]);
        let r = resolve(&g, "User").expect("resolves");
        assert_eq!(r.key, "User");
        assert!(r.exact);
        assert_eq!(r.candidates, 1);
    }

    #[test]
    fn shortest_then_lexicographic() {
        let g = graph(&["src/zeta/user.py", "src/a/user.py", "src/b/user.py"]);
        let r = resolve(&g, "user").expect("resolves");
        assert_eq!(r.key, "src/a/user.py");
        assert_eq!(r.candidates, 3);
        assert!(r.is_ambiguous());
        assert!(!r.exact);
    }

    #[test]
    fn no_match() {
        assert!(resolve(&graph(&["a"]), "zzz").is_none());
        assert!(resolve(&graph(&["a"]), "").is_none());
    }
}
