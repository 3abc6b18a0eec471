//! Block compression of unbranched runs
//!
//! A long stretch of history where nothing forks is the common case. A
//! [`Block`] stores such a run as one unit so traversal and length
//! accounting cost O(1) per run instead of O(1) per node. Blocks are pure
//! optimization: every operation on a block is equivalent to the same
//! operation on its node sequence.

use std::fmt;

use crate::HistoryError;

use super::{NodeId, Tree};

/// Arena index of a block. Like node ids, block ids are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct BlockId(pub(crate) usize);

impl BlockId {
    /// Raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A maximal unbranched run of nodes stored as one unit.
///
/// Invariants, maintained by [`Tree`]:
/// - at least 2 members (a 1-node block is dissolved to a bare node)
/// - every member but the last has exactly one child, which is the next
///   member
/// - a fork node may only ever be the last member
#[derive(Debug)]
pub struct Block {
    pub(crate) nodes: Vec<NodeId>,
}

impl Block {
    /// Number of nodes in the run.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Blocks are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Member nodes, root-most first.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// First (root-most) member.
    pub fn first(&self) -> NodeId {
        self.nodes[0]
    }

    /// Last (leaf-most) member; the only member allowed to fork.
    pub fn last(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// Membership test by identity.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }
}

/// One unit of blockwise traversal: a bare node or a whole block.
///
/// This is the closed set traversal code dispatches over, instead of
/// runtime type tests. All operations are uniform across the two variants
/// and equivalent to the same operation on the underlying node sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A node with no owning block.
    Node(NodeId),
    /// A compressed unbranched run.
    Block(BlockId),
}

impl Segment {
    /// Number of nodes this segment covers.
    pub fn len<S>(&self, tree: &Tree<S>) -> Result<usize, HistoryError> {
        match *self {
            Segment::Node(id) => {
                tree.node(id)?;
                Ok(1)
            }
            Segment::Block(id) => Ok(tree.block(id)?.len()),
        }
    }

    /// First node of the segment.
    pub fn first<S>(&self, tree: &Tree<S>) -> Result<NodeId, HistoryError> {
        match *self {
            Segment::Node(id) => {
                tree.node(id)?;
                Ok(id)
            }
            Segment::Block(id) => Ok(tree.block(id)?.first()),
        }
    }

    /// Terminal node: the one whose children decide where the path goes
    /// next.
    pub fn terminal<S>(&self, tree: &Tree<S>) -> Result<NodeId, HistoryError> {
        match *self {
            Segment::Node(id) => {
                tree.node(id)?;
                Ok(id)
            }
            Segment::Block(id) => Ok(tree.block(id)?.last()),
        }
    }

    /// Node at `index` within the segment, counting from the first member.
    pub fn get<S>(
        &self,
        tree: &Tree<S>,
        index: usize,
    ) -> Result<NodeId, HistoryError> {
        match *self {
            Segment::Node(id) => {
                tree.node(id)?;
                if index == 0 {
                    Ok(id)
                } else {
                    Err(HistoryError::OutOfRange {
                        index: index as i64,
                        length: 1,
                    })
                }
            }
            Segment::Block(id) => {
                let block = tree.block(id)?;
                block
                    .nodes
                    .get(index)
                    .copied()
                    .ok_or(HistoryError::OutOfRange {
                        index: index as i64,
                        length: block.len(),
                    })
            }
        }
    }

    /// Whether the segment covers `node`, by identity or block membership.
    pub fn covers<S>(
        &self,
        tree: &Tree<S>,
        node: NodeId,
    ) -> Result<bool, HistoryError> {
        match *self {
            Segment::Node(id) => Ok(id == node),
            Segment::Block(id) => Ok(tree.block(id)?.contains(node)),
        }
    }
}
