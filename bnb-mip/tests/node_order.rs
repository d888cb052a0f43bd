//! Node selection order, checked by replaying the event stream against an
//! independent model of the frontier.

use std::collections::HashMap;

use bnb_mip::search::{BranchRecord, BranchSense, NodeId, NodeStatus, TreeEvent};
use bnb_mip::{
    solve_mip_with, BranchingRule, MipProblem, MipSettings, MipStatus, NodeSelection,
    SimplexMasterBackend,
};

/// max 10x0 + 13x1 + 7x2 + 8x3 + 5x4 + 9x5
/// s.t. 4x0 + 6x1 + 3x2 + 5x3 + 2x4 + 5x5 <= 12, x binary
fn knapsack() -> MipProblem {
    MipProblem::from_dense(
        vec![10.0, 13.0, 7.0, 8.0, 5.0, 9.0],
        &[vec![4.0, 6.0, 3.0, 5.0, 2.0, 5.0]],
        vec![12.0],
    )
    .unwrap()
}

/// Running pseudocost averages seeded with |c|.
struct Estimates {
    down: Vec<(f64, u64)>,
    up: Vec<(f64, u64)>,
}

impl Estimates {
    fn new(objective: &[f64]) -> Self {
        let seeds: Vec<(f64, u64)> = objective.iter().map(|c| (c.abs(), 0)).collect();
        Self {
            down: seeds.clone(),
            up: seeds,
        }
    }

    fn observe(&mut self, branch: &BranchRecord, parent_obj: f64, child_obj: f64) {
        let dist = (branch.value - branch.rhs).abs();
        let degradation = (parent_obj - child_obj) / dist;
        let (est, n) = match branch.sense {
            BranchSense::Down => &mut self.down[branch.var],
            BranchSense::Up => &mut self.up[branch.var],
        };
        *est = (*est * *n as f64 + degradation) / (*n as f64 + 1.0);
        *n += 1;
    }

    fn key(&self, branch: &BranchRecord, parent_bound: f64) -> f64 {
        let v = branch.value;
        match branch.sense {
            BranchSense::Down => -parent_bound + self.down[branch.var].0 * (v - v.floor()),
            BranchSense::Up => -parent_bound + self.up[branch.var].0 * (v.ceil() - v),
        }
    }
}

/// Minimum `(key, seq)` first.
#[derive(Default)]
struct ModelFrontier {
    entries: Vec<(f64, u64, NodeId)>,
    seq: u64,
}

impl ModelFrontier {
    fn push(&mut self, key: f64, id: NodeId) {
        self.entries.push((key, self.seq, id));
        self.seq += 1;
    }

    fn pop(&mut self) -> Option<NodeId> {
        let best = (0..self.entries.len()).min_by(|&a, &b| {
            let (ka, sa, _) = self.entries[a];
            let (kb, sb, _) = self.entries[b];
            ka.total_cmp(&kb).then(sa.cmp(&sb))
        })?;
        Some(self.entries.remove(best).2)
    }
}

/// Replay `events` and return how many nodes were popped.
fn replay(prob: &MipProblem, selection: NodeSelection, events: &[TreeEvent]) -> usize {
    let mut frontier = ModelFrontier::default();
    let mut estimates = Estimates::new(&prob.objective);
    let mut depth_of: HashMap<NodeId, usize> = HashMap::new();
    let mut bound_of: HashMap<NodeId, f64> = HashMap::new();
    let mut branch_of: HashMap<NodeId, (NodeId, BranchRecord)> = HashMap::new();
    let mut popped = 0;

    for event in events {
        match *event {
            TreeEvent::NodeCreated {
                id,
                parent: None,
                depth,
                ..
            } => {
                depth_of.insert(id, depth);
                frontier.push(f64::NEG_INFINITY, id);
            }
            TreeEvent::NodeCreated {
                id,
                parent: Some(parent),
                depth,
                branch: Some(branch),
            } => {
                let parent_depth = depth_of[&parent];
                let parent_bound = bound_of[&parent];
                assert_eq!(depth, parent_depth + 1);
                let key = match selection {
                    NodeSelection::DepthFirst => -(parent_depth as f64) - 1.0,
                    NodeSelection::BestFirst => -parent_bound,
                    NodeSelection::BestEstimate => estimates.key(&branch, parent_bound),
                };
                depth_of.insert(id, depth);
                branch_of.insert(id, (parent, branch));
                frontier.push(key, id);
            }
            TreeEvent::NodeCreated { .. } => panic!("child without a branch: {:?}", event),
            TreeEvent::NodeUpdated {
                id,
                status,
                bound,
                infeasibility,
            } => {
                assert_eq!(frontier.pop(), Some(id), "{}", selection);
                popped += 1;

                let solved = match status {
                    NodeStatus::Integer | NodeStatus::Candidate => true,
                    // Pruned before solving when no infeasibility was measured
                    NodeStatus::Fathomed => infeasibility.is_some(),
                    _ => false,
                };
                if solved {
                    bound_of.insert(id, bound);
                    if let Some(&(parent, branch)) = branch_of.get(&id) {
                        estimates.observe(&branch, bound_of[&parent], bound);
                    }
                }
            }
            TreeEvent::IncumbentUpdated { .. } => {}
        }
    }
    assert!(frontier.entries.is_empty());
    popped
}

#[test]
fn test_pop_order_matches_keys() {
    let prob = knapsack();
    for selection in [
        NodeSelection::DepthFirst,
        NodeSelection::BestFirst,
        NodeSelection::BestEstimate,
    ] {
        let settings = MipSettings::default()
            .with_branching(BranchingRule::MostFractional)
            .with_node_selection(selection);
        let mut events: Vec<TreeEvent> = Vec::new();
        let sol = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut events)
            .unwrap();
        assert_eq!(sol.status, MipStatus::Optimal);

        let popped = replay(&prob, selection, &events);
        assert!(popped >= 3, "{}", selection);
        assert_eq!(popped as u64, sol.stats.nodes_processed + sol.stats.nodes_pruned);
    }
}

#[test]
fn test_depth_first_dives_before_backtracking() {
    let prob = knapsack();
    let settings = MipSettings::default()
        .with_branching(BranchingRule::MostFractional)
        .with_node_selection(NodeSelection::DepthFirst);
    let mut events: Vec<TreeEvent> = Vec::new();
    solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut events).unwrap();

    let depths: HashMap<NodeId, usize> = events
        .iter()
        .filter_map(|e| match *e {
            TreeEvent::NodeCreated { id, depth, .. } => Some((id, depth)),
            _ => None,
        })
        .collect();
    let order: Vec<NodeId> = events
        .iter()
        .filter_map(|e| match *e {
            TreeEvent::NodeUpdated { id, .. } => Some(id),
            _ => None,
        })
        .collect();

    // Root, then its down child: the deeper key wins and siblings tie FIFO
    assert_eq!(order[0], 0);
    assert_eq!(order[1], 1);
    assert_eq!(depths[&order[1]], 1);
}

#[test]
fn test_zero_time_limit() {
    let prob = knapsack();
    let settings = MipSettings::default().with_time_limit(0.0);
    let mut events: Vec<TreeEvent> = Vec::new();
    let sol = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut events)
        .unwrap();

    assert_eq!(sol.status, MipStatus::TimeLimit);
    assert_eq!(sol.stats.nodes_processed, 0);
    assert_eq!(sol.stats.nodes_created, 1);
    assert!(!sol.has_solution());
    assert_eq!(sol.bound, f64::INFINITY);
    assert_eq!(events.len(), 1);
}
