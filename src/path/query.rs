//! Time-indexed queries over a path
//!
//! A path's clocks are non-decreasing from root to tip, so "find the node
//! at simulated time t" is a monotonic boundary search. The walk skips
//! whole blocks in O(1) by comparing their first and last clocks, and only
//! descends into the one block that actually brackets the target, where a
//! binary search finishes in O(log block-size).

use crate::search::{self, Resolved, Rounding};
use crate::tree::{NodeId, Segment, Tree};
use crate::{HistoryError, WorldState};

use super::Path;

impl Path {
    /// Find the boundary around `value` under `function`, which must be
    /// non-decreasing along the path, and resolve it under `rounding`.
    ///
    /// Cost is O(blocks on the path) plus one O(log block-size) search in
    /// the bracketing block. Fails with [`HistoryError::EmptyPath`] on a
    /// rootless path.
    pub fn by_monotonic_function<S, F>(
        &mut self,
        tree: &Tree<S>,
        function: F,
        value: f64,
        rounding: Rounding,
    ) -> Result<Resolved<NodeId>, HistoryError>
    where
        F: Fn(&S) -> f64,
    {
        let root = self.root.ok_or(HistoryError::EmptyPath)?;
        let eval = |id: &NodeId| -> Result<f64, HistoryError> {
            Ok(function(tree.node(*id)?.state()))
        };

        if eval(&root)? >= value {
            return search::resolve((None, Some(root)), &eval, value, rounding);
        }

        // Low-water mark: the last element known to be below the target.
        let mut low = root;
        let mut iter = self.iter_blockwise(tree, None);
        while let Some(seg) = iter.next() {
            match seg? {
                Segment::Block(bid) => {
                    let block = tree.block(bid)?;
                    let first = block.first();
                    if eval(&first)? >= value {
                        return search::resolve((Some(low), Some(first)), &eval, value, rounding);
                    }
                    let last = block.last();
                    if eval(&last)? < value {
                        // The whole block is below the target; skip it.
                        low = last;
                        continue;
                    }
                    let (lo, hi) = search::boundary_in_slice(block.nodes(), &eval, value)?;
                    let pair = (
                        lo.map(|i| block.nodes()[i]),
                        hi.map(|i| block.nodes()[i]),
                    );
                    return search::resolve(pair, &eval, value, rounding);
                }
                Segment::Node(id) => {
                    if eval(&id)? >= value {
                        return search::resolve((Some(low), Some(id)), &eval, value, rounding);
                    }
                    low = id;
                }
            }
        }

        // Even the last node lies below the target.
        search::resolve((Some(low), None), &eval, value, rounding)
    }
}

impl Path {
    /// [`Path::by_monotonic_function`] with the state's clock.
    pub fn by_clock<S: WorldState>(
        &mut self,
        tree: &Tree<S>,
        clock: f64,
        rounding: Rounding,
    ) -> Result<Resolved<NodeId>, HistoryError> {
        self.by_monotonic_function(tree, WorldState::clock, clock, rounding)
    }

    /// The node whose state is in effect at `timepoint`: the latest node
    /// with clock ≤ `timepoint`, provided the timepoint does not lie past
    /// the recorded span. `None` when the timepoint falls outside it.
    pub fn node_occupying_timepoint<S: WorldState>(
        &mut self,
        tree: &Tree<S>,
        timepoint: f64,
    ) -> Result<Option<NodeId>, HistoryError> {
        let (low, high) = self
            .by_clock(tree, timepoint, Rounding::Both)?
            .pair();
        match (low, high) {
            // An exact hit occupies the timepoint itself.
            (_, Some(h)) if tree.clock(h)? == timepoint => Ok(Some(h)),
            // Strictly between two recorded clocks: the earlier state
            // still holds.
            (Some(l), Some(_)) => Ok(Some(l)),
            // Before the first or after the last recorded clock.
            _ => Ok(None),
        }
    }

    /// Intersection of the path's recorded clock span with
    /// `[start_time, end_time]`, or `None` when they do not overlap.
    ///
    /// A path spanning clocks [3.2, 7.6] queried with (2, 5) yields
    /// (3.2, 5). An empty path has no defined segment.
    pub fn existing_time_segment<S: WorldState>(
        &mut self,
        tree: &Tree<S>,
        start_time: f64,
        end_time: f64,
    ) -> Result<Option<(f64, f64)>, HistoryError> {
        let Some(root) = self.root else {
            return Ok(None);
        };
        let first = tree.clock(root)?;
        let last = tree.clock(self.last_node(tree, None)?)?;

        if first <= end_time && last >= start_time {
            Ok(Some((first.max(start_time), last.min(end_time))))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Tick(f64);

    impl WorldState for Tick {
        fn clock(&self) -> f64 {
            self.0
        }
    }

    fn chain_tree(clocks: &[f64]) -> (Tree<Tick>, Vec<NodeId>) {
        let mut tree = Tree::new();
        let mut ids = vec![tree.add_root(Tick(clocks[0]))];
        for &c in &clocks[1..] {
            let id = tree.attach_child(*ids.last().unwrap(), Tick(c)).unwrap();
            ids.push(id);
        }
        (tree, ids)
    }

    #[test]
    fn boundary_pair_brackets_the_value_inside_a_block() {
        let (tree, ids) = chain_tree(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.6]);
        let mut path = Path::new(ids[0]);

        let got = path.by_clock(&tree, 5.5, Rounding::Both).unwrap();
        assert_eq!(got, Resolved::Pair(Some(ids[5]), Some(ids[6])));
    }

    #[test]
    fn query_at_root_clock_has_no_low_side() {
        let (tree, ids) = chain_tree(&[0.0, 1.0, 2.0]);
        let mut path = Path::new(ids[0]);

        let got = path.by_clock(&tree, 0.0, Rounding::Both).unwrap();
        assert_eq!(got, Resolved::Pair(None, Some(ids[0])));
        assert!(matches!(
            path.by_clock(&tree, -1.0, Rounding::Low),
            Err(HistoryError::OutOfTimespan { .. })
        ));
    }

    #[test]
    fn query_past_the_tip_has_no_high_side() {
        let (tree, ids) = chain_tree(&[0.0, 1.0, 2.0]);
        let mut path = Path::new(ids[0]);

        let got = path.by_clock(&tree, 9.0, Rounding::Both).unwrap();
        assert_eq!(got, Resolved::Pair(Some(ids[2]), None));
        assert_eq!(
            path.by_clock(&tree, 9.0, Rounding::Closest).unwrap(),
            Resolved::Single(ids[2])
        );
    }

    #[test]
    fn boundary_across_a_fork_spans_the_gap() {
        // Two blocks with a fork between them; the target falls in the
        // seam between block boundaries.
        let (mut tree, ids) = chain_tree(&[0.0, 1.0, 2.0]);
        tree.attach_child(ids[2], Tick(3.0)).unwrap();
        let b = tree.attach_child(ids[2], Tick(4.0)).unwrap();
        let b2 = tree.attach_child(b, Tick(5.0)).unwrap();

        let mut path = Path::new(ids[0]);
        let got = path.by_clock(&tree, 3.5, Rounding::Both).unwrap();
        assert_eq!(got, Resolved::Pair(Some(ids[2]), Some(b)));
        let got = path.by_clock(&tree, 4.5, Rounding::Both).unwrap();
        assert_eq!(got, Resolved::Pair(Some(b), Some(b2)));
    }

    #[test]
    fn monotonic_function_other_than_clock() {
        let (tree, ids) = chain_tree(&[0.0, 1.0, 2.0, 3.0]);
        let mut path = Path::new(ids[0]);

        // Twice the clock is still monotonic.
        let got = path
            .by_monotonic_function(&tree, |s: &Tick| s.0 * 2.0, 5.0, Rounding::High)
            .unwrap();
        assert_eq!(got, Resolved::Single(ids[3]));
    }

    #[test]
    fn occupying_timepoint_decides_by_clock_value() {
        let (tree, ids) = chain_tree(&[0.0, 1.0, 2.0, 3.0]);
        let mut path = Path::new(ids[0]);

        // Exact hit, including at the very first clock.
        assert_eq!(path.node_occupying_timepoint(&tree, 2.0).unwrap(), Some(ids[2]));
        assert_eq!(path.node_occupying_timepoint(&tree, 0.0).unwrap(), Some(ids[0]));
        // Between two clocks the earlier state is still in effect.
        assert_eq!(path.node_occupying_timepoint(&tree, 2.5).unwrap(), Some(ids[2]));
        // Outside the recorded span.
        assert_eq!(path.node_occupying_timepoint(&tree, -0.5).unwrap(), None);
        assert_eq!(path.node_occupying_timepoint(&tree, 3.5).unwrap(), None);
    }

    #[test]
    fn empty_path_queries() {
        let tree: Tree<Tick> = Tree::new();
        let mut path = Path::empty();
        assert!(matches!(
            path.by_clock(&tree, 1.0, Rounding::Closest),
            Err(HistoryError::EmptyPath)
        ));
        assert_eq!(
            path.existing_time_segment(&tree, 0.0, 1.0).unwrap(),
            None
        );
    }
}
