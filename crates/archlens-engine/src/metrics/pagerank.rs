//! PageRank importance over the distinct directed adjacency.
//!
//! # Algorithm
//!
//! Power iteration:
//!
//! ```text
//! PR(v) = (1 - d) / N + d * (Σ PR(u) / out_degree(u) + dangling / N)   for each u → v
//! ```
//!
//! where `d` is the damping factor (default 0.85) and `dangling` is the
//! rank mass of nodes without successors, spread uniformly. Iteration stops
//! when the L1 norm of the rank delta drops below `N * tolerance`.
//!
//! # Output
//!
//! A [`PageRankResult`] with one score per dense node id plus iteration and
//! convergence metadata. Choosing a fallback on non-convergence is left to
//! the caller (see [`crate::metrics::compute_metrics`]).

use archlens_core::config::MetricsConfig;
use tracing::instrument;

use crate::graph::adjacency::Adjacency;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    /// Default: 0.85.
    pub damping: f64,
    /// Per-node convergence threshold; the L1 delta is compared against
    /// `N * tolerance`. Default: 1e-6.
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

impl From<&MetricsConfig> for PageRankConfig {
    fn from(config: &MetricsConfig) -> Self {
        Self {
            damping: config.damping,
            tolerance: config.tolerance,
            max_iter: config.max_iter,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of a PageRank computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// Score per dense node id.
    pub scores: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
}

impl PageRankResult {
    /// `true` when every score is a finite number.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.scores.iter().all(|s| s.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Full PageRank
// ---------------------------------------------------------------------------

/// Compute PageRank from scratch.
#[must_use]
#[instrument(skip(adj, config), fields(nodes = adj.len()))]
#[allow(clippy::cast_precision_loss)]
pub fn pagerank(adj: &Adjacency, config: &PageRankConfig) -> PageRankResult {
    let n = adj.len();

    if n == 0 {
        return PageRankResult {
            scores: Vec::new(),
            iterations: 0,
            converged: true,
        };
    }

    let n_f64 = n as f64;
    let base = (1.0 - config.damping) / n_f64;
    let threshold = n_f64 * config.tolerance;

    // Initialize ranks uniformly.
    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;

    for _ in 0..config.max_iter {
        iterations += 1;

        let dangling: f64 = (0..n)
            .filter(|&v| adj.out_degree(v) == 0)
            .map(|v| ranks[v])
            .sum();
        let dangling_share = config.damping * dangling / n_f64;

        for r in &mut new_ranks {
            *r = base + dangling_share;
        }

        for (v, &rank) in ranks.iter().enumerate() {
            let succ = adj.successors(v);
            if succ.is_empty() {
                continue;
            }
            let share = config.damping * rank / succ.len() as f64;
            for &w in succ {
                new_ranks[w] += share;
            }
        }

        // Check convergence: L1 norm of delta.
        let delta: f64 = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);

        if delta < threshold {
            converged = true;
            break;
        }
    }

    PageRankResult {
        scores: ranks,
        iterations,
        converged,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
