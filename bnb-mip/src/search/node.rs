//! Search node representation and the node arena.

use std::fmt;

use crate::master::NodeBounds;

/// Index of a node in the [`NodeArena`].
pub type NodeId = usize;

/// Status of a search node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Waiting in the frontier, or processed and branched.
    Candidate,

    /// Node LP relaxation is infeasible.
    Infeasible,

    /// Node produced an integer-feasible solution.
    Integer,

    /// Node was discarded by bound or depth.
    Fathomed,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::Candidate => write!(f, "candidate"),
            NodeStatus::Infeasible => write!(f, "infeasible"),
            NodeStatus::Integer => write!(f, "integer"),
            NodeStatus::Fathomed => write!(f, "fathomed"),
        }
    }
}

/// Direction of a branching bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSense {
    /// `x <= rhs`
    Down,

    /// `x >= rhs`
    Up,
}

impl fmt::Display for BranchSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchSense::Down => write!(f, "<="),
            BranchSense::Up => write!(f, ">="),
        }
    }
}

/// Integer infeasibility of a node's LP solution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Infeasibility {
    /// Integer variables away from an integer value.
    pub count: usize,

    /// Sum of their distances to the nearest integer.
    pub sum: f64,
}

/// The single bound a node adds to its parent's subproblem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchRecord {
    /// Variable index.
    pub var: usize,

    /// Parent LP value of the variable before branching.
    pub value: f64,

    /// Direction of the bound.
    pub sense: BranchSense,

    /// Integer bound imposed.
    pub rhs: f64,
}

impl BranchRecord {
    /// Create a "down" branch: x <= floor(value).
    pub fn down(var: usize, value: f64) -> Self {
        Self {
            var,
            value,
            sense: BranchSense::Down,
            rhs: value.floor(),
        }
    }

    /// Create an "up" branch: x >= ceil(value).
    pub fn up(var: usize, value: f64) -> Self {
        Self {
            var,
            value,
            sense: BranchSense::Up,
            rhs: value.ceil(),
        }
    }

    /// Distance the bound moves the variable away from its parent value.
    pub fn distance(&self) -> f64 {
        (self.value - self.rhs).abs()
    }

    /// Apply this bound to a bound set.
    pub fn apply(&self, bounds: &mut NodeBounds) {
        match self.sense {
            BranchSense::Down => bounds.tighten_upper(self.var, self.rhs),
            BranchSense::Up => bounds.tighten_lower(self.var, self.rhs),
        }
    }
}

impl fmt::Display for BranchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{} {} {}", self.var, self.sense, self.rhs)
    }
}

/// A node in the B&B search tree.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Unique node identifier.
    pub id: NodeId,

    /// Parent node ID (None for root).
    pub parent_id: Option<NodeId>,

    /// Depth in the tree (0 for root).
    pub depth: usize,

    /// Bound added by the branch that created this node (None for root).
    pub branch: Option<BranchRecord>,

    /// LP objective at this node, or the bound inherited from the parent
    /// until the node is solved.
    pub relax_bound: f64,

    /// Node processing status.
    pub status: NodeStatus,

    /// Integer infeasibility of the node's LP solution, once known.
    pub infeasibility: Option<Infeasibility>,
}

impl SearchNode {
    /// Create the root node.
    pub fn root() -> Self {
        Self {
            id: 0,
            parent_id: None,
            depth: 0,
            branch: None,
            relax_bound: f64::INFINITY,
            status: NodeStatus::Candidate,
            infeasibility: None,
        }
    }

    /// Create a child node from a branching bound.
    pub fn child(&self, id: NodeId, branch: BranchRecord) -> Self {
        Self {
            id,
            parent_id: Some(self.id),
            depth: self.depth + 1,
            branch: Some(branch),
            relax_bound: self.relax_bound, // Inherit parent's bound initially
            status: NodeStatus::Candidate,
            infeasibility: None,
        }
    }

    /// Check if this node can be pruned by an incumbent.
    ///
    /// A node can be pruned if its bound cannot beat the incumbent.
    pub fn can_prune(&self, incumbent_obj: f64) -> bool {
        self.relax_bound <= incumbent_obj
    }
}

/// Every node of one search, indexed by id.
///
/// Nodes store only their own branching bound; the bound set of a node is
/// rebuilt by walking parent links back to the root.
#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the root node. Must be called on an empty arena.
    pub fn add_root(&mut self) -> NodeId {
        debug_assert!(self.nodes.is_empty());
        let root = SearchNode::root();
        self.nodes.push(root);
        0
    }

    /// Create a child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, branch: BranchRecord) -> NodeId {
        let id = self.nodes.len();
        let child = self.nodes[parent].child(id, branch);
        self.nodes.push(child);
        id
    }

    /// Get a node.
    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id]
    }

    /// Get a node mutably.
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id]
    }

    /// Number of nodes created.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SearchNode> {
        self.nodes.iter()
    }

    /// Branching bounds from `id` up to the root, nearest first.
    pub fn path(&self, id: NodeId) -> Vec<BranchRecord> {
        let mut path = Vec::with_capacity(self.nodes[id].depth);
        let mut cur = Some(id);
        // Depth strictly decreases along parent links, so this terminates.
        while let Some(node_id) = cur {
            let node = &self.nodes[node_id];
            if let Some(branch) = node.branch {
                path.push(branch);
            }
            cur = node.parent_id;
        }
        path
    }

    /// Rebuild the bound set of `id` by replaying its path over `root`.
    pub fn bounds(&self, id: NodeId, root: &NodeBounds) -> NodeBounds {
        let mut bounds = root.clone();
        for branch in self.path(id) {
            branch.apply(&mut bounds);
        }
        bounds
    }
}
