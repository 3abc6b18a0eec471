//! Deterministic linear views through a branching tree
//!
//! A [`Tree`](crate::Tree) may fork at many points; a [`Path`] threads one
//! straight line through it. At every fork the path either replays a
//! recorded decision or commits, lazily on first visit, to the **last**
//! child in creation order — "the most recently created branch". Once
//! recorded, a decision is stable for the path's lifetime, so repeated
//! traversal replays the same route even after new forks appear.
//!
//! Traversal is blockwise wherever possible: cost scales with the number
//! of unbranched runs, not with the number of nodes.

mod query;

use std::collections::HashMap;

use tracing::trace;

use crate::tree::{NodeId, Segment, Tree};
use crate::HistoryError;

/// A decision-recording linear walk through a tree.
///
/// Paths do not own (or even hold) the tree; every operation takes the
/// tree as an argument, so a path is cheap to keep around and many paths
/// can diverge over one tree after a shared prefix. Each path owns its own
/// decision map and shares nothing mutable with other paths.
///
/// Path equality is identity; two paths are never compared by value.
#[derive(Debug, Default)]
pub struct Path {
    root: Option<NodeId>,
    decisions: HashMap<NodeId, NodeId>,
}

impl Path {
    /// A path beginning at `root`.
    pub fn new(root: NodeId) -> Self {
        Self {
            root: Some(root),
            decisions: HashMap::new(),
        }
    }

    /// A path with no root. Its length is 0 and it contains nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The starting node, if any.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The recorded choice at `fork`, if one has been made.
    pub fn decided(&self, fork: NodeId) -> Option<NodeId> {
        self.decisions.get(&fork).copied()
    }

    /// Record (or overwrite) the choice of `child` at `fork`.
    ///
    /// Collaborators use this to steer a path down a branch other than the
    /// default before traversing it.
    pub fn decide(&mut self, fork: NodeId, child: NodeId) {
        trace!(fork = %fork, child = %child, "explicit decision");
        self.decisions.insert(fork, child);
    }

    /// The next node on the path after `seg`.
    ///
    /// Resolution order: a recorded decision for the segment's terminal
    /// node wins; otherwise the terminal's last child in creation order is
    /// chosen and recorded; otherwise the traversal is exhausted and
    /// `Ok(None)` is returned. Exhaustion is normal termination, never an
    /// error. A decision leading into pruned structure fails with
    /// [`HistoryError::Pruned`].
    pub fn next_node<S>(
        &mut self,
        tree: &Tree<S>,
        seg: Segment,
    ) -> Result<Option<NodeId>, HistoryError> {
        let terminal = seg.terminal(tree)?;

        if let Some(&next) = self.decisions.get(&terminal) {
            tree.node(next)?; // stale decisions must fail, not dangle
            return Ok(Some(next));
        }

        match tree.node(terminal)?.children().last() {
            Some(&kid) => {
                self.decisions.insert(terminal, kid);
                trace!(fork = %terminal, child = %kid, "default decision recorded");
                Ok(Some(kid))
            }
            None => Ok(None),
        }
    }

    /// Number of nodes on the path, summed blockwise. 0 for an empty path.
    pub fn length<S>(&mut self, tree: &Tree<S>) -> Result<usize, HistoryError> {
        let mut total = 0;
        let mut iter = self.iter_blockwise(tree, None);
        while let Some(seg) = iter.next() {
            total += seg?.len(tree)?;
        }
        Ok(total)
    }

    /// Node-by-node traversal from the root to exhaustion.
    ///
    /// The iterator is finite and restartable: a fresh call starts again
    /// at the root, it does not resume an exhausted one.
    pub fn iter<'a, S>(&'a mut self, tree: &'a Tree<S>) -> PathIter<'a, S> {
        PathIter {
            cursor: match self.root {
                Some(root) => Cursor::Start(root),
                None => Cursor::Done,
            },
            path: self,
            tree,
        }
    }

    /// Blockwise traversal: each yielded [`Segment`] is a whole block
    /// where one exists, a bare node where not. `starting_at` resumes from
    /// mid-path instead of the root.
    pub fn iter_blockwise<'a, S>(
        &'a mut self,
        tree: &'a Tree<S>,
        starting_at: Option<NodeId>,
    ) -> BlockwiseIter<'a, S> {
        BlockwiseIter {
            cursor: match starting_at.or(self.root) {
                Some(node) => BlockCursor::Start(node),
                None => BlockCursor::Done,
            },
            path: self,
            tree,
        }
    }

    /// Whether the path passes through `seg`, by identity or by block
    /// membership.
    pub fn contains<S>(&mut self, tree: &Tree<S>, seg: Segment) -> Result<bool, HistoryError> {
        let mut iter = self.iter_blockwise(tree, None);
        while let Some(walked) = iter.next() {
            let walked = walked?;
            if walked == seg {
                return Ok(true);
            }
            if let Segment::Node(node) = seg {
                if walked.covers(tree, node)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Node at position `i`. 0-based from the root; `-1` is the last
    /// node, other negative indices count back via `length() + i`.
    pub fn get<S>(&mut self, tree: &Tree<S>, i: i64) -> Result<NodeId, HistoryError> {
        if i == -1 {
            // Indexing an empty path is an index error, not a path error.
            return self.last_node(tree, None).map_err(|e| match e {
                HistoryError::EmptyPath => HistoryError::OutOfRange {
                    index: -1,
                    length: 0,
                },
                other => other,
            });
        }
        let wanted = if i < 0 {
            let length = self.length(tree)?;
            let adjusted = length as i64 + i;
            if adjusted < 0 {
                return Err(HistoryError::OutOfRange { index: i, length });
            }
            adjusted as usize
        } else {
            i as usize
        };

        // Accumulate block lengths until the cumulative count covers the
        // target, then index into the covering segment from its far end.
        let mut covered: usize = 0;
        let mut iter = self.iter_blockwise(tree, None);
        while let Some(seg) = iter.next() {
            let seg = seg?;
            let seg_len = seg.len(tree)?;
            covered += seg_len;
            if covered > wanted {
                return seg.get(tree, seg_len - (covered - wanted));
            }
        }
        Err(HistoryError::OutOfRange {
            index: i,
            length: covered,
        })
    }

    /// Slice indexing is reserved for a future extension.
    pub fn slice<S>(
        &mut self,
        _tree: &Tree<S>,
        _range: std::ops::Range<i64>,
    ) -> Result<Vec<NodeId>, HistoryError> {
        Err(HistoryError::Unsupported("slice indexing"))
    }

    /// The final node reached by walking to exhaustion, optionally from
    /// `starting_at` instead of the root. A terminal block is unwrapped to
    /// its last member.
    pub fn last_node<S>(
        &mut self,
        tree: &Tree<S>,
        starting_at: Option<NodeId>,
    ) -> Result<NodeId, HistoryError> {
        let mut last: Option<Segment> = None;
        let mut iter = self.iter_blockwise(tree, starting_at);
        while let Some(seg) = iter.next() {
            last = Some(seg?);
        }
        match last {
            Some(seg) => seg.terminal(tree),
            None => Err(HistoryError::EmptyPath),
        }
    }
}

#[derive(Debug)]
enum Cursor {
    Start(NodeId),
    At(NodeId),
    Done,
}

/// Node-by-node iterator over a path. See [`Path::iter`].
#[derive(Debug)]
pub struct PathIter<'a, S> {
    path: &'a mut Path,
    tree: &'a Tree<S>,
    cursor: Cursor,
}

impl<S> Iterator for PathIter<'_, S> {
    type Item = Result<NodeId, HistoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor {
            Cursor::Start(root) => match self.tree.node(root) {
                Ok(_) => {
                    self.cursor = Cursor::At(root);
                    Some(Ok(root))
                }
                Err(e) => {
                    self.cursor = Cursor::Done;
                    Some(Err(e))
                }
            },
            Cursor::At(current) => {
                match self.path.next_node(self.tree, Segment::Node(current)) {
                    Ok(Some(next)) => {
                        self.cursor = Cursor::At(next);
                        Some(Ok(next))
                    }
                    Ok(None) => {
                        self.cursor = Cursor::Done;
                        None
                    }
                    Err(e) => {
                        self.cursor = Cursor::Done;
                        Some(Err(e))
                    }
                }
            }
            Cursor::Done => None,
        }
    }
}

#[derive(Debug)]
enum BlockCursor {
    Start(NodeId),
    At(Segment),
    Done,
}

/// Blockwise iterator over a path. See [`Path::iter_blockwise`].
#[derive(Debug)]
pub struct BlockwiseIter<'a, S> {
    path: &'a mut Path,
    tree: &'a Tree<S>,
    cursor: BlockCursor,
}

impl<S> Iterator for BlockwiseIter<'_, S> {
    type Item = Result<Segment, HistoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor {
            BlockCursor::Start(node) => match self.tree.soft_get_block(node) {
                Ok(seg) => {
                    self.cursor = BlockCursor::At(seg);
                    Some(Ok(seg))
                }
                Err(e) => {
                    self.cursor = BlockCursor::Done;
                    Some(Err(e))
                }
            },
            BlockCursor::At(seg) => match self.path.next_node(self.tree, seg) {
                Ok(Some(next)) => match self.tree.soft_get_block(next) {
                    Ok(next_seg) => {
                        self.cursor = BlockCursor::At(next_seg);
                        Some(Ok(next_seg))
                    }
                    Err(e) => {
                        self.cursor = BlockCursor::Done;
                        Some(Err(e))
                    }
                },
                Ok(None) => {
                    self.cursor = BlockCursor::Done;
                    None
                }
                Err(e) => {
                    self.cursor = BlockCursor::Done;
                    Some(Err(e))
                }
            },
            BlockCursor::Done => None,
        }
    }
}
