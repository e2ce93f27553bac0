//! Flat JSON-friendly export of a code graph.

use archlens_core::model::Relation;
use serde::Serialize;

use crate::graph::build::{CodeGraph, GraphNode};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedEdge {
    pub from: String,
    pub to: String,
    pub relation: Relation,
}

/// Every node with its attributes and every edge with its relation tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport {
    pub content_hash: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<ExportedEdge>,
}

impl GraphExport {
    #[must_use]
    pub fn from_graph(graph: &CodeGraph) -> Self {
        Self {
            content_hash: graph.content_hash(),
            nodes: graph.nodes().cloned().collect(),
            edges: graph
                .edges()
                .map(|(from, to, relation)| ExportedEdge {
                    from: from.to_string(),
                    to: to.to_string(),
                    relation,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use archlens_core::model::{NodeAttrs, NodeKind};

    #[test]
    fn export_lists_nodes_and_tagged_edges() {
        let mut graph = CodeGraph::new();
        graph.add_node(
            "/app",
            NodeKind::Container,
            NodeAttrs {
                technology: "python".into(),
                ..NodeAttrs::default()
            },
        );
        graph.add_node("/app/a.py", NodeKind::Component, NodeAttrs::default());
        graph.add_edge("/app", "/app/a.py", Relation::Contains);

        let export = GraphExport::from_graph(&graph);
        let json = serde_json::to_value(&export).expect("serialize");

        assert_eq!(json["nodes"][0]["key"], "/app");
        assert_eq!(json["nodes"][0]["node_type"], "container");
        assert_eq!(json["nodes"][0]["technology"], "python");
        assert_eq!(json["edges"][0]["relation"], "contains");
        assert_eq!(export.edges.len(), 1);
    }
}
