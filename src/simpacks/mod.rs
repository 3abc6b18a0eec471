//! Bundled simulation packages
//!
//! Small, self-contained simulations used by the demo CLI and the test
//! suite. A simpack supplies a [`WorldState`](crate::WorldState) type and
//! a [`Step`](crate::Step) implementation; the history core stays
//! oblivious to what the states mean.

pub mod life;

pub use life::LifeState;
