//! Community detection on the undirected projection.
//!
//! # Algorithms
//!
//! - **Louvain** (Blondel et al. 2008): repeated local moving of nodes to
//!   the neighbouring community with the best modularity gain, followed by
//!   aggregation of communities into super-nodes, until a level produces no
//!   merge. Node visiting order is shuffled with a seeded RNG so results are
//!   reproducible.
//! - **Connected components**: the fallback partition. Strictly weaker, only
//!   fully disconnected islands separate.
//!
//! The projection has unit weights, distinct unordered pairs and no
//! self-loops (see [`Adjacency::undirected`]).

use std::collections::{HashMap, VecDeque};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, instrument};

use crate::graph::adjacency::Adjacency;

/// Local-moving sweeps per level before giving up on further gains.
const MAX_SWEEPS: usize = 100;

/// Gains below this are treated as ties with staying put.
const GAIN_EPSILON: f64 = 1e-12;

/// A partition of dense node ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Groups ordered by their lowest member; members sorted by id.
    pub groups: Vec<Vec<usize>>,
    /// Aggregation levels run (0 for connected components).
    pub levels: usize,
}

// ---------------------------------------------------------------------------
// Louvain
// ---------------------------------------------------------------------------

/// Weighted graph for one Louvain level.
struct Level {
    /// Neighbour lists without self-loops.
    adj: Vec<Vec<(usize, f64)>>,
    /// Self-loop weight per node (internal weight of collapsed communities).
    self_loops: Vec<f64>,
}

impl Level {
    fn from_projection(projection: &[Vec<usize>]) -> Self {
        Self {
            adj: projection
                .iter()
                .map(|nbrs| nbrs.iter().map(|&w| (w, 1.0)).collect())
                .collect(),
            self_loops: vec![0.0; projection.len()],
        }
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    /// Weighted degree; a self-loop counts twice.
    fn degree(&self, v: usize) -> f64 {
        self.adj[v].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.self_loops[v]
    }

    /// Move nodes between communities until no move improves modularity.
    ///
    /// Returns the community label of every node, renumbered densely in
    /// order of first appearance.
    fn local_moving(&self, rng: &mut StdRng) -> Vec<usize> {
        let n = self.len();
        let degrees: Vec<f64> = (0..n).map(|v| self.degree(v)).collect();
        let m2: f64 = degrees.iter().sum();

        let mut community: Vec<usize> = (0..n).collect();
        if m2 <= 0.0 {
            return community;
        }

        let mut totals = degrees.clone();
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);

        let mut weight_to: HashMap<usize, f64> = HashMap::new();
        let mut seen: Vec<usize> = Vec::new();

        for _ in 0..MAX_SWEEPS {
            let mut moved = false;

            for &v in &order {
                let current = community[v];
                let k = degrees[v];

                weight_to.clear();
                seen.clear();
                for &(w, weight) in &self.adj[v] {
                    let c = community[w];
                    let entry = weight_to.entry(c).or_insert_with(|| {
                        seen.push(c);
                        0.0
                    });
                    *entry += weight;
                }

                totals[current] -= k;

                let gain = |c: usize, totals: &[f64]| {
                    weight_to.get(&c).copied().unwrap_or(0.0) - totals[c] * k / m2
                };

                let mut best = current;
                let mut best_gain = gain(current, totals.as_slice());
                for &c in &seen {
                    let g = gain(c, totals.as_slice());
                    if g > best_gain + GAIN_EPSILON {
                        best = c;
                        best_gain = g;
                    }
                }

                totals[best] += k;
                if best != current {
                    community[v] = best;
                    moved = true;
                }
            }

            if !moved {
                break;
            }
        }

        renumber(&mut community);
        community
    }

    /// Collapse each community into one node.
    fn aggregate(&self, community: &[usize], count: usize) -> Self {
        let mut adj_maps: Vec<HashMap<usize, f64>> = vec![HashMap::new(); count];
        let mut self_loops = vec![0.0; count];

        for v in 0..self.len() {
            let cv = community[v];
            self_loops[cv] += self.self_loops[v];
            for &(w, weight) in &self.adj[v] {
                let cw = community[w];
                if cv == cw {
                    // Each internal edge is seen from both ends.
                    self_loops[cv] += weight / 2.0;
                } else {
                    *adj_maps[cv].entry(cw).or_insert(0.0) += weight;
                }
            }
        }

        let adj = adj_maps
            .into_iter()
            .map(|map| {
                let mut nbrs: Vec<(usize, f64)> = map.into_iter().collect();
                nbrs.sort_unstable_by_key(|&(w, _)| w);
                nbrs
            })
            .collect();

        Self { adj, self_loops }
    }
}

/// Relabel communities densely in order of first appearance.
fn renumber(labels: &mut [usize]) {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    for label in labels.iter_mut() {
        let next = mapping.len();
        *label = *mapping.entry(*label).or_insert(next);
    }
}

/// Louvain modularity clustering of the undirected projection.
#[must_use]
#[instrument(skip(adj), fields(nodes = adj.len()))]
pub fn louvain(adj: &Adjacency, seed: u64) -> Partition {
    let n = adj.len();
    let projection = adj.undirected();
    let mut rng = StdRng::seed_from_u64(seed);

    // Input node → current super-node.
    let mut membership: Vec<usize> = (0..n).collect();
    let mut level = Level::from_projection(&projection);
    let mut levels = 0;

    loop {
        let community = level.local_moving(&mut rng);
        let count = community.iter().copied().max().map_or(0, |m| m + 1);
        levels += 1;

        for label in &mut membership {
            *label = community[*label];
        }

        if count == level.len() {
            break;
        }
        debug!(level = levels, communities = count, "louvain level aggregated");
        level = level.aggregate(&community, count);
    }

    Partition {
        groups: groups_from_labels(&membership),
        levels,
    }
}

// ---------------------------------------------------------------------------
// Connected components
// ---------------------------------------------------------------------------

/// Connected components of the undirected projection, by BFS.
#[must_use]
pub fn connected_components(adj: &Adjacency) -> Partition {
    let projection = adj.undirected();
    let n = projection.len();
    let mut labels = vec![usize::MAX; n];
    let mut next = 0;
    let mut queue = VecDeque::new();

    for root in 0..n {
        if labels[root] != usize::MAX {
            continue;
        }
        labels[root] = next;
        queue.push_back(root);
        while let Some(v) = queue.pop_front() {
            for &w in &projection[v] {
                if labels[w] == usize::MAX {
                    labels[w] = next;
                    queue.push_back(w);
                }
            }
        }
        next += 1;
    }

    Partition {
        groups: groups_from_labels(&labels),
        levels: 0,
    }
}

fn groups_from_labels(labels: &[usize]) -> Vec<Vec<usize>> {
    let mut slot: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (v, &label) in labels.iter().enumerate() {
        let index = *slot.entry(label).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(v);
    }
    groups
}

// ---------------------------------------------------------------------------
// Modularity
// ---------------------------------------------------------------------------

/// Newman modularity of `groups` on the undirected projection of `adj`.
///
/// Nodes missing from every group count as singletons. Zero for a graph
/// without edges.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn modularity(adj: &Adjacency, groups: &[Vec<usize>]) -> f64 {
    let projection = adj.undirected();
    let n = projection.len();
    let m2: usize = projection.iter().map(Vec::len).sum();
    if m2 == 0 {
        return 0.0;
    }
    let m2 = m2 as f64;

    let mut label = vec![usize::MAX; n];
    for (g, members) in groups.iter().enumerate() {
        for &v in members {
            if v < n {
                label[v] = g;
            }
        }
    }

    let mut q = 0.0;
    for members in groups {
        let mut internal = 0.0;
        let mut degree_sum = 0.0;
        for &v in members.iter().filter(|&&v| v < n) {
            degree_sum += projection[v].len() as f64;
            internal += projection[v]
                .iter()
                .filter(|&&w| label[w] == label[v])
                .count() as f64;
        }
        // `internal` counts each edge twice, matching `m2`.
        q += internal / m2 - (degree_sum / m2).powi(2);
    }
    q
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
