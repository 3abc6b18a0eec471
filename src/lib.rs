//! # Timeloom: branching simulation history
//!
//! A framework core for discrete-step simulations whose history is a tree
//! rather than a single timeline: at any recorded state you may fork into
//! a new line of future states while the original keeps existing.
//!
//! ## Components
//!
//! 1. **Tree / Node / Block**: arena-owned branching history, with
//!    unbranched stretches run-length compressed into blocks
//! 2. **Path**: a deterministic linear view through the tree that records
//!    which child it committed to at every fork
//! 3. **Search**: monotonic boundary binary search with rounding policies,
//!    powering queries by simulated time
//! 4. **Simulation**: a thin driver that grows the tree with a
//!    caller-supplied step function
//!
//! ## Usage Example
//!
//! ```
//! use timeloom::{Path, Rounding, Simulation, WorldState};
//!
//! #[derive(Clone)]
//! struct Counter { t: f64 }
//! impl WorldState for Counter {
//!     fn clock(&self) -> f64 { self.t }
//! }
//!
//! let step = |s: &Counter| Counter { t: s.t + 1.0 };
//! let mut sim = Simulation::new(step);
//! let root = sim.begin(Counter { t: 0.0 });
//! let tip = sim.simulate(root, 10).unwrap();
//!
//! let mut path = Path::new(root);
//! assert_eq!(path.last_node(sim.tree(), None).unwrap(), tip);
//! let hit = path.by_clock(sim.tree(), 4.0, Rounding::Exact).unwrap();
//! assert_eq!(sim.tree().clock(hit.single().unwrap()).unwrap(), 4.0);
//! ```

#![warn(missing_docs, missing_debug_implementations)]
#![allow(clippy::new_without_default)]

// Core modules - leaves first
pub mod state; // clock and step contracts with collaborators
pub mod tree; // arena-owned branching history
pub mod search; // monotonic boundary search and rounding
pub mod path; // deterministic linear views and time queries
pub mod simpacks; // bundled demo simulation packages

// Re-exports for convenience
pub use path::{BlockwiseIter, Path, PathIter};
pub use search::{BoundaryPair, Resolved, Rounding};
pub use state::{Step, WorldState};
pub use tree::{Block, BlockId, Node, NodeId, Segment, Tree};

use thiserror::Error;
use tracing::debug;

/// Errors surfaced by history-tree and path operations.
///
/// Exhausted traversal is deliberately not here: running off the end of a
/// path is normal termination (`Ok(None)` / iterator end), never an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    /// Node id was never issued by this tree.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Node existed but was removed by a prune.
    #[error("node {0} was pruned")]
    Pruned(NodeId),

    /// Block id does not resolve to a live block.
    #[error("unknown or dissolved block {0}")]
    UnknownBlock(BlockId),

    /// Integer index outside the path.
    #[error("index {index} out of range for path of length {length}")]
    OutOfRange {
        /// Requested index (possibly negative).
        index: i64,
        /// Path length at query time.
        length: usize,
    },

    /// Operation is reserved but not implemented.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// `Exact` rounding found no element matching the value.
    #[error("no element with value exactly {value}")]
    NoExactMatch {
        /// The requested value.
        value: f64,
    },

    /// `Low`/`High` rounding fell off the recorded span.
    #[error("value {value} lies outside the recorded span")]
    OutOfTimespan {
        /// The requested value.
        value: f64,
    },

    /// Query on a path with no root.
    #[error("path has no root")]
    EmptyPath,
}

/// Drives a tree with a caller-supplied step function.
///
/// This is the glue a GUI or worker layer would use: it owns the tree and
/// grows it, but every state transition comes from the [`Step`]
/// implementation. Forking is just stepping from a non-leaf node.
#[derive(Debug)]
pub struct Simulation<S, F> {
    tree: Tree<S>,
    stepper: F,
}

impl<S: WorldState, F: Step<S>> Simulation<S, F> {
    /// A simulation with an empty tree.
    pub fn new(stepper: F) -> Self {
        Self {
            tree: Tree::new(),
            stepper,
        }
    }

    /// Record `state` as a new root and return it.
    pub fn begin(&mut self, state: S) -> NodeId {
        self.tree.add_root(state)
    }

    /// Grow a chain of `steps` successors under `from`; returns the tip.
    ///
    /// When `from` already has children this diverges into a new branch,
    /// which a fresh [`Path`] will prefer (newest child wins).
    pub fn simulate(&mut self, from: NodeId, steps: usize) -> Result<NodeId, HistoryError> {
        let mut current = from;
        for _ in 0..steps {
            let next_state = self.stepper.step(self.tree.node(current)?.state());
            current = self.tree.attach_child(current, next_state)?;
        }
        debug!(from = %from, steps, tip = %current, "simulated chain");
        Ok(current)
    }

    /// Fork at `node`: grow a divergent chain of `steps` states and return
    /// a path that follows the new branch from the path's root.
    pub fn fork(
        &mut self,
        root: NodeId,
        node: NodeId,
        steps: usize,
    ) -> Result<(Path, NodeId), HistoryError> {
        let tip = self.simulate(node, steps)?;
        let mut path = Path::new(root);
        if let Some(&first_new) = self.tree.node(node)?.children().last() {
            path.decide(node, first_new);
        }
        Ok((path, tip))
    }

    /// The history grown so far.
    pub fn tree(&self) -> &Tree<S> {
        &self.tree
    }

    /// Mutable access, for structural edits like [`Tree::prune`].
    pub fn tree_mut(&mut self) -> &mut Tree<S> {
        &mut self.tree
    }
}
