//! Dense-id adjacency view shared by the pure graph algorithms.
//!
//! Successor and predecessor lists are distinct and sorted by node id, so
//! parallel relation edges between one pair count once and every traversal
//! visits neighbours in insertion order.

/// Distinct successor/predecessor lists indexed by dense node id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Build from `n` nodes and directed `(from, to)` pairs.
    ///
    /// Pairs referencing ids `>= n` are ignored.
    #[must_use]
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut succ = vec![Vec::new(); n];
        let mut pred = vec![Vec::new(); n];
        for (from, to) in edges {
            if from < n && to < n {
                succ[from].push(to);
                pred[to].push(from);
            }
        }
        for list in succ.iter_mut().chain(pred.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }
        Self { succ, pred }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.succ.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.succ.is_empty()
    }

    #[must_use]
    pub fn successors(&self, id: usize) -> &[usize] {
        self.succ.get(id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn predecessors(&self, id: usize) -> &[usize] {
        self.pred.get(id).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn out_degree(&self, id: usize) -> usize {
        self.successors(id).len()
    }

    #[must_use]
    pub fn in_degree(&self, id: usize) -> usize {
        self.predecessors(id).len()
    }

    /// `true` when `id` has an edge to itself.
    #[must_use]
    pub fn has_self_loop(&self, id: usize) -> bool {
        self.successors(id).binary_search(&id).is_ok()
    }

    /// Undirected projection: distinct unordered neighbours, self-loops
    /// dropped.
    #[must_use]
    pub fn undirected(&self) -> Vec<Vec<usize>> {
        (0..self.len())
            .map(|id| {
                let mut neighbours: Vec<usize> = self
                    .successors(id)
                    .iter()
                    .chain(self.predecessors(id))
                    .copied()
                    .filter(|&other| other != id)
                    .collect();
                neighbours.sort_unstable();
                neighbours.dedup();
                neighbours
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_edges_collapse() {
        let adj = Adjacency::from_edges(2, [(0, 1), (0, 1), (1, 0)]);
        assert_eq!(adj.successors(0), &[1]);
        assert_eq!(adj.predecessors(0), &[1]);
        assert_eq!(adj.out_degree(0), 1);
    }

    #[test]
    fn out_of_range_ids_are_ignored() {
        let adj = Adjacency::from_edges(1, [(0, 5), (3, 0)]);
        assert!(adj.successors(0).is_empty());
        assert!(adj.predecessors(0).is_empty());
        assert!(adj.successors(9).is_empty());
    }

    #[test]
    fn undirected_drops_self_loops_and_merges_directions() {
        let adj = Adjacency::from_edges(3, [(0, 0), (0, 1), (2, 0), (1, 0)]);
        assert!(adj.has_self_loop(0));
        let und = adj.undirected();
        assert_eq!(und[0], vec![1, 2]);
        assert_eq!(und[1], vec![0]);
        assert_eq!(und[2], vec![0]);
    }
}
