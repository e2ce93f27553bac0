//! Memoized metrics snapshots.
//!
//! A snapshot is reused while the graph's content hash is unchanged. Any
//! node or edge change alters the hash and forces a recompute on the next
//! request; [`SnapshotCache::invalidate`] drops the entry explicitly when
//! the agent hands out mutable access to its graph.

use std::sync::Arc;

use tracing::debug;

use crate::graph::build::CodeGraph;
use crate::metrics::MetricsSnapshot;

/// Where a snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Cached,
    Computed,
}

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entry: Option<(String, Arc<MetricsSnapshot>)>,
    hits: u64,
    misses: u64,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached snapshot for `graph`, computing it when stale.
    pub fn get_or_compute<F>(
        &mut self,
        graph: &CodeGraph,
        compute: F,
    ) -> (Arc<MetricsSnapshot>, SnapshotSource)
    where
        F: FnOnce(&CodeGraph) -> MetricsSnapshot,
    {
        let hash = graph.content_hash();
        if let Some((cached, snapshot)) = &self.entry {
            if *cached == hash {
                self.hits += 1;
                return (Arc::clone(snapshot), SnapshotSource::Cached);
            }
        }

        debug!(%hash, "metrics snapshot stale, recomputing");
        self.misses += 1;
        let snapshot = Arc::new(compute(graph));
        self.entry = Some((hash, Arc::clone(&snapshot)));
        (snapshot, SnapshotSource::Computed)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Hash of the graph the cached snapshot was computed from.
    #[must_use]
    pub fn cached_hash(&self) -> Option<&str> {
        self.entry.as_ref().map(|(hash, _)| hash.as_str())
    }

    /// `(hits, misses)` since creation.
    #[must_use]
    pub const fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
