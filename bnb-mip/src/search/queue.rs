//! Node priority queue for B&B tree exploration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::node::NodeId;

/// Entry in the frontier.
#[derive(Debug, Clone, Copy)]
struct QueuedNode {
    node: NodeId,
    priority: f64, // Lower = selected first
    seq: u64,
    bound: f64,
}

impl PartialEq for QueuedNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedNode {}

impl PartialOrd for QueuedNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: reverse so the smallest (priority, seq)
        // comes out first.
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending nodes ordered by `(priority, insertion sequence)`, minimum first.
#[derive(Debug, Default)]
pub struct Frontier {
    heap: BinaryHeap<QueuedNode>,

    /// Count of nodes added.
    nodes_added: u64,

    /// Count of nodes popped.
    nodes_popped: u64,
}

impl Frontier {
    /// Create an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its priority key and inherited bound.
    pub fn push(&mut self, node: NodeId, priority: f64, bound: f64) {
        self.heap.push(QueuedNode {
            node,
            priority,
            seq: self.nodes_added,
            bound,
        });
        self.nodes_added += 1;
    }

    /// Remove the node with the smallest key. Returns `(id, inherited bound)`.
    pub fn pop(&mut self) -> Option<(NodeId, f64)> {
        let queued = self.heap.pop()?;
        self.nodes_popped += 1;
        Some((queued.node, queued.bound))
    }

    /// Largest inherited bound among pending nodes (`-inf` when empty).
    pub fn best_bound(&self) -> f64 {
        self.heap
            .iter()
            .map(|q| q.bound)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of pending nodes.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if no node is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total nodes ever pushed.
    pub fn nodes_added(&self) -> u64 {
        self.nodes_added
    }

    /// Total nodes popped.
    pub fn nodes_popped(&self) -> u64 {
        self.nodes_popped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_priority_first() {
        let mut q = Frontier::new();
        q.push(1, -5.0, 5.0);
        q.push(2, -10.0, 10.0);
        q.push(3, -7.0, 7.0);

        assert_eq!(q.pop(), Some((2, 10.0)));
        assert_eq!(q.pop(), Some((3, 7.0)));
        assert_eq!(q.pop(), Some((1, 5.0)));
        assert!(q.pop().is_none());
        assert_eq!(q.nodes_added(), 3);
        assert_eq!(q.nodes_popped(), 3);
    }

    #[test]
    fn test_ties_are_fifo() {
        let mut q = Frontier::new();
        q.push(1, -2.0, 0.0);
        q.push(2, -2.0, 0.0);
        q.push(3, -3.0, 0.0);
        q.push(4, -3.0, 0.0);

        // Depth-first keys: deeper children first, down child before up
        let order: Vec<_> = std::iter::from_fn(|| q.pop().map(|(id, _)| id)).collect();
        assert_eq!(order, vec![3, 4, 1, 2]);
    }

    #[test]
    fn test_best_bound() {
        let mut q = Frontier::new();
        assert_eq!(q.best_bound(), f64::NEG_INFINITY);

        q.push(1, 0.0, 4.0);
        q.push(2, 1.0, 9.0);
        q.push(3, 2.0, f64::INFINITY);
        assert_eq!(q.best_bound(), f64::INFINITY);

        q.pop();
        q.pop();
        q.pop();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
    }
}
