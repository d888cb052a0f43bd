//! Branch-and-bound search tree management.

mod branching;
mod events;
mod node;
mod pseudocost;
mod queue;
mod tree;

pub use branching::{BranchDecision, BranchingSelector, NodeLp, ScoringContext};
pub use events::{NoopObserver, TreeEvent, TreeObserver};
pub use node::{
    BranchRecord, BranchSense, Infeasibility, NodeArena, NodeId, NodeStatus, SearchNode,
};
pub use pseudocost::{Pseudocost, PseudocostTable};
pub use queue::Frontier;
pub use tree::{BranchAndBound, SearchState};
