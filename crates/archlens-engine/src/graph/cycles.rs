//! Simple-cycle enumeration and strongly connected components.
//!
//! # Algorithm
//!
//! Johnson's algorithm over the distinct adjacency:
//!
//! 1. Self-loops are reported first as length-1 cycles.
//! 2. Take a non-trivial SCC, start at its lowest id and enumerate every
//!    elementary circuit through that node with the blocked-set DFS.
//! 3. Remove the start node, recompute SCCs of the remainder, repeat.
//!
//! Every cycle therefore begins at its lowest node id. The enumeration is
//! bounded by a caller-supplied limit because the number of simple cycles
//! can grow exponentially.

#![allow(clippy::module_name_repetitions)]

use std::collections::{HashMap, HashSet};

use tracing::{instrument, warn};

use crate::graph::adjacency::Adjacency;

/// Cycles found by [`simple_cycles`], each a sequence of dense node ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleEnumeration {
    /// Sorted lexicographically; each cycle starts at its lowest id.
    pub cycles: Vec<Vec<usize>>,
    /// `true` when enumeration stopped at the limit.
    pub truncated: bool,
}

/// Enumerate all simple directed cycles, stopping after `limit`.
#[must_use]
#[instrument(skip(adj), fields(nodes = adj.len()))]
pub fn simple_cycles(adj: &Adjacency, limit: usize) -> CycleEnumeration {
    let mut out = CycleEnumeration::default();
    if enumerate(adj, limit, &mut out.cycles) {
        out.truncated = true;
        warn!(limit, "cycle enumeration truncated");
    }
    out.cycles.sort_unstable();
    out
}

/// Returns `true` when the limit cut enumeration short.
fn enumerate(adj: &Adjacency, limit: usize, cycles: &mut Vec<Vec<usize>>) -> bool {
    let n = adj.len();

    for v in 0..n {
        if adj.has_self_loop(v) {
            if cycles.len() >= limit {
                return true;
            }
            cycles.push(vec![v]);
        }
    }

    let mut mask = vec![true; n];
    let all: Vec<usize> = (0..n).collect();
    let mut pending: Vec<Vec<usize>> = strongly_connected(adj, &all, &mask)
        .into_iter()
        .filter(|scc| scc.len() > 1)
        .collect();
    mask.fill(false);

    while let Some(scc) = pending.pop() {
        for &v in &scc {
            mask[v] = true;
        }

        let start = scc[0];
        if circuits_from(adj, start, &mask, limit, cycles) {
            return true;
        }

        mask[start] = false;
        pending.extend(
            strongly_connected(adj, &scc[1..], &mask)
                .into_iter()
                .filter(|sub| sub.len() > 1),
        );
        for &v in &scc {
            mask[v] = false;
        }
    }

    false
}

/// Successors of `v` inside the mask, self-loop excluded, reversed so that
/// popping yields the smallest id first.
fn masked_successors(adj: &Adjacency, v: usize, mask: &[bool]) -> Vec<usize> {
    adj.successors(v)
        .iter()
        .rev()
        .copied()
        .filter(|&w| w != v && mask[w])
        .collect()
}

/// Johnson's circuit search rooted at `start` within `mask`.
fn circuits_from(
    adj: &Adjacency,
    start: usize,
    mask: &[bool],
    limit: usize,
    cycles: &mut Vec<Vec<usize>>,
) -> bool {
    let mut path: Vec<usize> = vec![start];
    let mut blocked: HashSet<usize> = HashSet::from([start]);
    let mut closed: HashSet<usize> = HashSet::new();
    let mut blocked_by: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut stack: Vec<(usize, Vec<usize>)> = vec![(start, masked_successors(adj, start, mask))];

    while let Some((this, nbrs)) = stack.last_mut() {
        let this = *this;
        if let Some(next) = nbrs.pop() {
            if next == start {
                if cycles.len() >= limit {
                    return true;
                }
                cycles.push(path.clone());
                closed.extend(path.iter().copied());
            } else if !blocked.contains(&next) {
                path.push(next);
                stack.push((next, masked_successors(adj, next, mask)));
                closed.remove(&next);
                blocked.insert(next);
            }
            continue;
        }

        if closed.contains(&this) {
            unblock(this, &mut blocked, &mut blocked_by);
        } else {
            for w in masked_successors(adj, this, mask) {
                blocked_by.entry(w).or_default().insert(this);
            }
        }
        stack.pop();
        path.pop();
    }

    false
}

fn unblock(
    node: usize,
    blocked: &mut HashSet<usize>,
    blocked_by: &mut HashMap<usize, HashSet<usize>>,
) {
    let mut work = vec![node];
    while let Some(v) = work.pop() {
        if blocked.remove(&v) {
            if let Some(waiting) = blocked_by.get_mut(&v) {
                work.extend(waiting.drain());
            }
        }
    }
}

/// Tarjan's SCC restricted to `members` and edges inside `mask`.
///
/// Iterative, so deep chains do not overflow the stack. Each component is
/// returned sorted by id.
#[must_use]
pub fn strongly_connected(adj: &Adjacency, members: &[usize], mask: &[bool]) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = adj.len();
    let mut index = vec![UNVISITED; n];
    let mut low = vec![0_usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0_usize;
    let mut components = Vec::new();

    for &root in members {
        if index[root] != UNVISITED || !mask[root] {
            continue;
        }

        index[root] = next_index;
        low[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;

        // (node, position of the next successor to inspect)
        let mut work: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            if let Some(&w) = adj.successors(v).get(frame.1) {
                frame.1 += 1;
                if !mask[w] {
                    continue;
                }
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    low[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    low[v] = low[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                low[parent] = low[parent].min(low[v]);
            }

            if low[v] == index[v] {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cycles_of(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        simple_cycles(&Adjacency::from_edges(n, edges.iter().copied()), usize::MAX).cycles
    }

    #[test]
    fn dag_has_no_cycles() {
        assert!(cycles_of(3, &[(0, 1), (1, 2), (0, 2)]).is_empty());
    }

    #[test]
    fn two_cycle() {
        assert_eq!(cycles_of(2, &[(0, 1), (1, 0)]), vec![vec![0, 1]]);
    }

    #[test]
    fn self_loop_is_length_one_cycle() {
        assert_eq!(cycles_of(2, &[(1, 1), (0, 1)]), vec![vec![1]]);
    }

    #[test]
    fn cycle_starts_at_lowest_id() {
        assert_eq!(cycles_of(3, &[(2, 0), (0, 1), (1, 2)]), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn overlapping_cycles_are_all_found() {
        // 0→1→0, 1→2→1, 0→1→2→0
        let cycles = cycles_of(3, &[(0, 1), (1, 0), (1, 2), (2, 1), (2, 0)]);
        assert_eq!(cycles, vec![vec![0, 1], vec![0, 1, 2], vec![1, 2]]);
    }

    #[test]
    fn complete_graph_on_four_nodes() {
        // K4 directed both ways has 20 simple cycles: 6 of length 2,
        // 8 of length 3 and 6 of length 4.
        let mut edges = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    edges.push((a, b));
                }
            }
        }
        let cycles = cycles_of(4, &edges);
        assert_eq!(cycles.len(), 20);
        assert_eq!(cycles.iter().filter(|c| c.len() == 2).count(), 6);
        assert_eq!(cycles.iter().filter(|c| c.len() == 3).count(), 8);
        assert_eq!(cycles.iter().filter(|c| c.len() == 4).count(), 6);
        assert!(cycles.iter().all(|c| c[0] == *c.iter().min().expect("non-empty")));
    }

    #[test]
    fn limit_truncates() {
        let mut edges = Vec::new();
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    edges.push((a, b));
                }
            }
        }
        let result = simple_cycles(&Adjacency::from_edges(4, edges), 5);
        assert!(result.truncated);
        assert_eq!(result.cycles.len(), 5);
    }

    #[test]
    fn scc_splits_disjoint_rings() {
        let adj = Adjacency::from_edges(5, [(0, 1), (1, 0), (2, 3), (3, 2), (1, 2), (4, 4)]);
        let all: Vec<usize> = (0..5).collect();
        let mut sccs = strongly_connected(&adj, &all, &[true; 5]);
        sccs.sort();
        assert_eq!(sccs, vec![vec![0, 1], vec![2, 3], vec![4]]);
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let n = 50_000;
        let adj = Adjacency::from_edges(n, (0..n - 1).map(|i| (i, i + 1)).chain([(n - 1, 0)]));
        let result = simple_cycles(&adj, 10);
        assert_eq!(result.cycles.len(), 1);
        assert_eq!(result.cycles[0].len(), n);
    }
}
