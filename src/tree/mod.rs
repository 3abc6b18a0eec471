//! Branching history tree
//!
//! The tree is the structural source of truth for a simulation run: every
//! recorded state is a [`Node`], unbranched stretches are compressed into
//! [`Block`]s, and all of it lives in one arena owned by [`Tree`].
//!
//! Growth model: external collaborators produce states and attach them
//! under existing leaves. The tree is append-oriented; the only structural
//! removal is an explicit whole-subtree [`Tree::prune`].
//!
//! Concurrency discipline: growth and pruning take `&mut Tree`, queries
//! take `&Tree`, so the borrow checker enforces the required atomicity
//! (readers never observe a half-updated child list, concurrent forks from
//! one node are serialized). Collaborators that share a tree across
//! threads wrap it in `Arc<RwLock<Tree<S>>>` at their own boundary; none
//! of the algorithms here block on I/O or suspend internally.

mod block;
mod node;

pub use block::{Block, BlockId, Segment};
pub use node::{Node, NodeId};

use tracing::debug;

use crate::HistoryError;

/// Arena owner of a simulation run's complete branching history.
///
/// Node and block slots are tombstoned on prune and never reused, so any
/// id that escaped before a prune either still resolves to the same
/// element or fails with [`HistoryError::Pruned`].
#[derive(Debug)]
pub struct Tree<S> {
    nodes: Vec<Option<Node<S>>>,
    blocks: Vec<Option<Block>>,
    roots: Vec<NodeId>,
    live_nodes: usize,
}

impl<S> Default for Tree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Tree<S> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            blocks: Vec::new(),
            roots: Vec::new(),
            live_nodes: 0,
        }
    }

    /// Record a fresh root state, starting a new line of history.
    pub fn add_root(&mut self, state: S) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(state, None)));
        self.roots.push(id);
        self.live_nodes += 1;
        debug!(root = %id, "added root");
        id
    }

    /// Attach a new child state under `parent`, in creation order.
    ///
    /// Maintains block compression as a side effect: an unbranched chain
    /// grows its block, and a node that just became a fork is split out to
    /// a block boundary.
    pub fn attach_child(&mut self, parent: NodeId, state: S) -> Result<NodeId, HistoryError> {
        self.node(parent)?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(state, Some(parent))));
        self.live_nodes += 1;

        let sibling_count = {
            let parent_node = self.node_mut(parent)?;
            parent_node.children.push(id);
            parent_node.children.len()
        };

        match sibling_count {
            1 => self.absorb_into_block(parent, id)?,
            2 => self.split_fork_to_boundary(parent)?,
            _ => {} // already a fork, already at a block boundary
        }

        debug!(parent = %parent, child = %id, siblings = sibling_count, "attached child");
        Ok(id)
    }

    /// Remove `target` and every descendant. Returns the number of nodes
    /// removed.
    ///
    /// This is an explicit administrative edit, never implicit. Paths that
    /// recorded decisions into the removed region fail with
    /// [`HistoryError::Pruned`] on their next traversal.
    pub fn prune(&mut self, target: NodeId) -> Result<usize, HistoryError> {
        let parent = self.node(target)?.parent;

        // Detach from the structure above the cut.
        match parent {
            Some(p) => {
                let parent_node = self.node_mut(p)?;
                parent_node.children.retain(|&c| c != target);
            }
            None => self.roots.retain(|&r| r != target),
        }

        // A block straddling the cut keeps only the members above it.
        if let Some(bid) = self.node(target)?.block {
            let pos = self
                .blocks[bid.0]
                .as_ref()
                .map(|b| b.nodes.iter().position(|&n| n == target))
                .ok_or(HistoryError::UnknownBlock(bid))?
                .ok_or(HistoryError::UnknownBlock(bid))?;
            self.truncate_block(bid, pos);
        }

        // Tombstone the whole subtree. A removed node's block dies with it
        // unless it was already truncated down to the surviving prefix, in
        // which case the node no longer appears in it.
        let mut removed = 0;
        let mut stack = vec![target];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes[id.0].take() {
                if let Some(bid) = node.block {
                    let still_member = self.blocks[bid.0]
                        .as_ref()
                        .is_some_and(|b| b.contains(id));
                    if still_member {
                        self.blocks[bid.0] = None;
                    }
                }
                stack.extend(node.children.iter().copied());
                removed += 1;
            }
        }
        self.live_nodes -= removed;

        debug!(target = %target, removed, "pruned subtree");
        Ok(removed)
    }

    /// Root nodes in creation order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Number of live (non-pruned) nodes.
    pub fn live_nodes(&self) -> usize {
        self.live_nodes
    }

    /// Whether `id` currently resolves to a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).map_or(false, Option::is_some)
    }

    /// Resolve a node id, failing loudly on unknown or pruned ids.
    pub fn node(&self, id: NodeId) -> Result<&Node<S>, HistoryError> {
        match self.nodes.get(id.0) {
            Some(Some(node)) => Ok(node),
            Some(None) => Err(HistoryError::Pruned(id)),
            None => Err(HistoryError::UnknownNode(id)),
        }
    }

    /// Resolve a block id.
    pub fn block(&self, id: BlockId) -> Result<&Block, HistoryError> {
        self.blocks
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(HistoryError::UnknownBlock(id))
    }

    /// The segment `id` travels in: its owning block if it has one, else
    /// the bare node itself.
    pub fn soft_get_block(&self, id: NodeId) -> Result<Segment, HistoryError> {
        Ok(match self.node(id)?.block {
            Some(bid) => Segment::Block(bid),
            None => Segment::Node(id),
        })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<S>, HistoryError> {
        match self.nodes.get_mut(id.0) {
            Some(Some(node)) => Ok(node),
            Some(None) => Err(HistoryError::Pruned(id)),
            None => Err(HistoryError::UnknownNode(id)),
        }
    }

    /// `child` is `parent`'s only child: grow `parent`'s block, or start a
    /// fresh 2-node block.
    fn absorb_into_block(&mut self, parent: NodeId, child: NodeId) -> Result<(), HistoryError> {
        match self.node(parent)?.block {
            Some(bid) => {
                // An interior member always has a child already, so a
                // blocked parent gaining its first child is the last
                // member.
                if let Some(block) = self.blocks[bid.0].as_mut() {
                    block.nodes.push(child);
                }
                self.node_mut(child)?.block = Some(bid);
                debug!(block = %bid, node = %child, "extended block");
            }
            None => {
                let bid = BlockId(self.blocks.len());
                self.blocks.push(Some(Block {
                    nodes: vec![parent, child],
                }));
                self.node_mut(parent)?.block = Some(bid);
                self.node_mut(child)?.block = Some(bid);
                debug!(block = %bid, first = %parent, last = %child, "started block");
            }
        }
        Ok(())
    }

    /// `fork` just gained a second child. A fork may only be the last
    /// member of a block, so split its block after it if it sits interior.
    fn split_fork_to_boundary(&mut self, fork: NodeId) -> Result<(), HistoryError> {
        let Some(bid) = self.node(fork)?.block else {
            return Ok(());
        };
        let block = self.block(bid)?;
        let pos = block
            .nodes
            .iter()
            .position(|&n| n == fork)
            .ok_or(HistoryError::UnknownBlock(bid))?;
        if pos + 1 == block.len() {
            return Ok(()); // already the last member
        }

        let suffix: Vec<NodeId> = block.nodes[pos + 1..].to_vec();
        self.truncate_block(bid, pos + 1);

        if suffix.len() >= 2 {
            let new_bid = BlockId(self.blocks.len());
            self.blocks.push(Some(Block {
                nodes: suffix.clone(),
            }));
            for &member in &suffix {
                self.node_mut(member)?.block = Some(new_bid);
            }
            debug!(old = %bid, new = %new_bid, at = %fork, "split block at fork");
        } else {
            self.node_mut(suffix[0])?.block = None;
            debug!(old = %bid, at = %fork, "trimmed block at fork");
        }
        Ok(())
    }

    /// Keep only the first `keep` members of a block; a leftover shorter
    /// than 2 dissolves to bare nodes.
    fn truncate_block(&mut self, bid: BlockId, keep: usize) {
        let Some(block) = self.blocks[bid.0].as_mut() else {
            return;
        };
        block.nodes.truncate(keep);
        if block.len() < 2 {
            let leftovers = std::mem::take(&mut block.nodes);
            self.blocks[bid.0] = None;
            for member in leftovers {
                if let Some(Some(node)) = self.nodes.get_mut(member.0) {
                    node.block = None;
                }
            }
        }
    }
}

impl<S: crate::WorldState> Tree<S> {
    /// Clock reading of a node's state.
    pub fn clock(&self, id: NodeId) -> Result<f64, HistoryError> {
        Ok(self.node(id)?.state().clock())
    }
}
