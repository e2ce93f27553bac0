//! Graph construction from a fact bundle.
//!
//! # Overview
//!
//! [`CodeGraph`] is the owned arena every analysis runs on: a petgraph
//! [`DiGraph`] whose node indices are dense integer ids (nodes are never
//! removed) plus a key → id map. Nodes are keyed by resource path for
//! containers/components and by `module.name` for declarations.
//!
//! ## Edge Direction
//!
//! An edge `A → B` means "A depends on B" for `imports`, `calls` and
//! `inherits`, and "A holds B" for `contains`. Several relation-tagged
//! edges may connect the same ordered pair; an identical
//! `(from, to, relation)` triple is stored once.
//!
//! ## Build Rules
//!
//! 1. One `container` node per container and one `component` node per
//!    component, keyed by path. Entries with an empty path are skipped.
//! 2. `contains` container → component whenever the component path is
//!    string-prefixed by the container path. Nested containers each get an
//!    edge; there is no single-parent rule.
//! 3. Each relation `{from, to}` is resolved against component *names* by
//!    exact match (first component in bundle order wins). Unresolved
//!    relations are dropped and counted, never raised.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use archlens_core::model::{FactBundle, NodeAttrs, NodeKind, Relation};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::graph::adjacency::Adjacency;

// ---------------------------------------------------------------------------
// CodeGraph
// ---------------------------------------------------------------------------

/// A node stored in the arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub key: String,
    #[serde(rename = "node_type")]
    pub kind: NodeKind,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
}

/// Directed attributed graph of a codebase.
///
/// Node ids are the petgraph indices, assigned in insertion order. Every
/// algorithm in the crate iterates in that order, so results are
/// deterministic for a given fact bundle.
#[derive(Debug, Clone, Default)]
pub struct CodeGraph {
    graph: DiGraph<GraphNode, Relation>,
    node_map: HashMap<String, NodeIndex>,
}

/// Counters collected while building a graph from facts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Distinct nodes in the resulting graph.
    pub nodes: usize,
    pub containment_edges: usize,
    pub import_edges: usize,
    /// Relations whose `from` or `to` matched no component name.
    pub dropped_relations: usize,
    /// Containers/components skipped for lacking a path.
    pub skipped_entries: usize,
}

impl CodeGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a fact bundle.
    ///
    /// Never fails: missing fields are empty, unresolved relations are
    /// counted in the returned [`BuildReport`].
    #[must_use]
    #[instrument(skip(bundle), fields(
        containers = bundle.containers.len(),
        components = bundle.components.len(),
        relations = bundle.relations.len(),
    ))]
    pub fn from_facts(bundle: &FactBundle) -> (Self, BuildReport) {
        let mut graph = Self::new();
        let mut report = BuildReport::default();

        for container in &bundle.containers {
            if container.path.is_empty() {
                report.skipped_entries += 1;
                continue;
            }
            graph.add_node(
                &container.path,
                NodeKind::Container,
                NodeAttrs {
                    name: container.kind.clone(),
                    path: container.path.clone(),
                    technology: container.technology.clone(),
                    confidence: container.confidence.clone(),
                    ..NodeAttrs::default()
                },
            );
        }

        for component in &bundle.components {
            if component.path.is_empty() {
                report.skipped_entries += 1;
                continue;
            }
            graph.add_node(
                &component.path,
                NodeKind::Component,
                NodeAttrs {
                    name: component.name.clone(),
                    path: component.path.clone(),
                    component_type: component.kind.clone(),
                    classes: component.classes.clone(),
                    entry_points: component.entry_points.clone(),
                    ..NodeAttrs::default()
                },
            );
        }

        // Containment by path prefix.
        for component in bundle.components.iter().filter(|c| !c.path.is_empty()) {
            for container in bundle.containers.iter().filter(|c| !c.path.is_empty()) {
                if component.path != container.path
                    && component.path.starts_with(&container.path)
                    && graph.add_edge(&container.path, &component.path, Relation::Contains)
                {
                    report.containment_edges += 1;
                }
            }
        }

        // Component name → path, first occurrence wins.
        let mut by_name: HashMap<&str, &str> = HashMap::new();
        for component in &bundle.components {
            if !component.name.is_empty() && !component.path.is_empty() {
                by_name
                    .entry(component.name.as_str())
                    .or_insert(component.path.as_str());
            }
        }

        for relation in &bundle.relations {
            let from = by_name.get(relation.from.as_str());
            let to = by_name.get(relation.to.as_str());
            match (from, to) {
                (Some(from), Some(to)) => {
                    if graph.add_edge(from, to, Relation::Imports) {
                        report.import_edges += 1;
                    }
                }
                _ => {
                    report.dropped_relations += 1;
                    debug!(
                        from = %relation.from,
                        to = %relation.to,
                        "dropping relation with unresolved endpoint"
                    );
                }
            }
        }

        report.nodes = graph.node_count();
        info!(
            nodes = report.nodes,
            edges = graph.edge_count(),
            dropped = report.dropped_relations,
            "built code graph"
        );

        (graph, report)
    }

    /// Add a node, or update it when the key already exists.
    ///
    /// On update the kind is replaced and non-empty attribute fields of
    /// `attrs` overwrite the stored ones.
    pub fn add_node(&mut self, key: &str, kind: NodeKind, attrs: NodeAttrs) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(key) {
            if let Some(node) = self.graph.node_weight_mut(idx) {
                node.kind = kind;
                node.attrs.merge(attrs);
            }
            return idx;
        }

        let idx = self.graph.add_node(GraphNode {
            key: key.to_string(),
            kind,
            attrs,
        });
        self.node_map.insert(key.to_string(), idx);
        idx
    }

    /// Add a relation-tagged edge between two existing nodes.
    ///
    /// Returns `true` only when a new edge was stored: a missing endpoint
    /// or an already present `(from, to, relation)` triple is a no-op.
    pub fn add_edge(&mut self, from: &str, to: &str, relation: Relation) -> bool {
        match (self.node_index(from), self.node_index(to)) {
            (Some(a), Some(b)) => self.add_edge_between(a, b, relation),
            _ => false,
        }
    }

    /// Index-based variant of [`CodeGraph::add_edge`].
    pub fn add_edge_between(&mut self, from: NodeIndex, to: NodeIndex, relation: Relation) -> bool {
        if self.graph.node_weight(from).is_none() || self.graph.node_weight(to).is_none() {
            return false;
        }
        if self.has_edge_between(from, to, relation) {
            return false;
        }
        self.graph.add_edge(from, to, relation);
        true
    }

    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str, relation: Relation) -> bool {
        match (self.node_index(from), self.node_index(to)) {
            (Some(a), Some(b)) => self.has_edge_between(a, b, relation),
            _ => false,
        }
    }

    fn has_edge_between(&self, from: NodeIndex, to: NodeIndex, relation: Relation) -> bool {
        self.graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == relation)
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of edges, counting every relation tag.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the `NodeIndex` for a key.
    #[must_use]
    pub fn node_index(&self, key: &str) -> Option<NodeIndex> {
        self.node_map.get(key).copied()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.node_map.contains_key(key)
    }

    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    #[must_use]
    pub fn node_by_key(&self, key: &str) -> Option<&GraphNode> {
        self.node_index(key).and_then(|idx| self.graph.node_weight(idx))
    }

    /// Key of the node with dense id `id`, or `""` when out of range.
    #[must_use]
    pub fn key_at(&self, id: usize) -> &str {
        self.graph
            .node_weight(NodeIndex::new(id))
            .map_or("", |node| node.key.as_str())
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.raw_nodes().iter().map(|node| &node.weight)
    }

    /// Edges as `(from_key, to_key, relation)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, Relation)> + '_ {
        self.graph.edge_references().map(move |edge| {
            (
                self.key_at(edge.source().index()),
                self.key_at(edge.target().index()),
                *edge.weight(),
            )
        })
    }

    /// Outgoing edges of `idx` carrying `relation`, as target ids.
    #[must_use]
    pub fn targets_by_relation(&self, idx: NodeIndex, relation: Relation) -> Vec<usize> {
        let mut targets: Vec<usize> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|edge| *edge.weight() == relation)
            .map(|edge| edge.target().index())
            .collect();
        targets.sort_unstable();
        targets.dedup();
        targets
    }

    /// Raw in-degree, every relation edge counted.
    #[must_use]
    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// Raw out-degree, every relation edge counted.
    #[must_use]
    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges_directed(idx, Direction::Outgoing).count()
    }

    /// Borrow the underlying petgraph graph for library algorithms.
    #[must_use]
    pub const fn inner(&self) -> &DiGraph<GraphNode, Relation> {
        &self.graph
    }

    /// Distinct, sorted successor/predecessor lists over dense ids.
    #[must_use]
    pub fn adjacency(&self) -> Adjacency {
        Adjacency::from_edges(
            self.node_count(),
            self.graph
                .edge_references()
                .map(|edge| (edge.source().index(), edge.target().index())),
        )
    }

    /// BLAKE3 hash over sorted node keys/kinds and sorted edge triples.
    ///
    /// Insertion order does not affect the hash; attribute values do not
    /// either, since no metric reads them.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut nodes: Vec<(&str, &str)> = self
            .nodes()
            .map(|node| (node.key.as_str(), node.kind.as_str()))
            .collect();
        nodes.sort_unstable();

        let mut edges: Vec<(&str, &str, &str)> = self
            .edges()
            .map(|(from, to, relation)| (from, to, relation.as_str()))
            .collect();
        edges.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        for (key, kind) in nodes {
            hasher.update(key.as_bytes());
            hasher.update(b"\x00");
            hasher.update(kind.as_bytes());
            hasher.update(b"\x00");
        }
        hasher.update(b"\x01");
        for (from, to, relation) in edges {
            hasher.update(from.as_bytes());
            hasher.update(b"\x00");
            hasher.update(to.as_bytes());
            hasher.update(b"\x00");
            hasher.update(relation.as_bytes());
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
