//! Code graph construction, enrichment and structural helpers.
//!
//! # Overview
//!
//! ```text
//! FactBundle
//!        ↓  build::CodeGraph::from_facts()
//! CodeGraph (containers, components, contains/imports)
//!        ↓  enrich::Enricher::enrich()            (optional)
//! CodeGraph (+ classes, functions, calls/inherits)
//!        ↓  CodeGraph::adjacency()
//! Adjacency (distinct sorted successor/predecessor lists)
//!        ↓  cycles / metrics / quality / query
//! ```
//!
//! ## Cache Invalidation
//!
//! [`CodeGraph::content_hash`] is a BLAKE3 hash of the node and edge sets.
//! [`crate::cache::SnapshotCache`] keys metric snapshots on it.

pub mod adjacency;
pub mod build;
pub mod cycles;
pub mod enrich;
pub mod export;
pub mod stats;

pub use adjacency::Adjacency;
pub use build::{BuildReport, CodeGraph, GraphNode};
pub use cycles::{CycleEnumeration, simple_cycles, strongly_connected};
pub use enrich::{EnrichReport, Enricher, SourceFile};
pub use export::GraphExport;
pub use stats::{GraphStats, layer_depths};
