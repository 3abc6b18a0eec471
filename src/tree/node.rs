//! Tree node representation
//!
//! Nodes live in the [`Tree`](super::Tree) arena and refer to each other
//! by index, so parent/child navigation is O(1) without reference cycles.

use std::fmt;

use super::BlockId;

/// Arena index of a node.
///
/// Ids are never reused: a pruned node's slot stays vacant, so a stale id
/// held by a path fails loudly instead of aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "visualize", derive(serde::Serialize))]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One recorded state plus its structural links.
///
/// Immutable after creation except for child-list growth (new forks) and
/// block membership. Node equality is identity: two ids name the same node
/// iff they are the same index.
#[derive(Debug)]
pub struct Node<S> {
    pub(crate) state: S,
    pub(crate) parent: Option<NodeId>,
    /// Children in creation order. Order is semantically significant:
    /// paths default to the last (most recently created) child.
    pub(crate) children: Vec<NodeId>,
    pub(crate) block: Option<BlockId>,
}

impl<S> Node<S> {
    pub(crate) fn new(state: S, parent: Option<NodeId>) -> Self {
        Self {
            state,
            parent,
            children: Vec::new(),
            block: None,
        }
    }

    /// The recorded state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Parent node, absent for a root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in creation order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Owning block, if this node is part of a compressed run.
    pub fn block(&self) -> Option<BlockId> {
        self.block
    }

    /// A fork point has more than one child.
    pub fn is_fork(&self) -> bool {
        self.children.len() > 1
    }

    /// A leaf has no children yet.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
