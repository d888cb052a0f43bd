//! Tree event stream for external renderers.

use super::node::{BranchRecord, Infeasibility, NodeId, NodeStatus};

/// One step of the search, in processing order.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeEvent {
    /// A node was created (root included).
    NodeCreated {
        /// Node id.
        id: NodeId,
        /// Parent id (None for root).
        parent: Option<NodeId>,
        /// Depth in the tree.
        depth: usize,
        /// Bound added by the branch (None for root).
        branch: Option<BranchRecord>,
    },

    /// A node was processed and classified.
    NodeUpdated {
        /// Node id.
        id: NodeId,
        /// Classification of the node.
        status: NodeStatus,
        /// LP bound, or the parent's bound for infeasible nodes.
        bound: f64,
        /// LP integer infeasibility; infeasible nodes repeat their
        /// parent's, integer nodes have none.
        infeasibility: Option<Infeasibility>,
    },

    /// A node improved the incumbent.
    IncumbentUpdated {
        /// Node that produced the solution.
        id: NodeId,
        /// New incumbent objective.
        objective: f64,
    },
}

/// Append-only sink of [`TreeEvent`]s.
pub trait TreeObserver {
    /// Receive the next event.
    fn on_event(&mut self, event: TreeEvent);
}

/// Observer that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TreeObserver for NoopObserver {
    fn on_event(&mut self, _event: TreeEvent) {}
}

impl TreeObserver for Vec<TreeEvent> {
    fn on_event(&mut self, event: TreeEvent) {
        self.push(event);
    }
}

impl<T: TreeObserver + ?Sized> TreeObserver for &mut T {
    fn on_event(&mut self, event: TreeEvent) {
        (**self).on_event(event);
    }
}
