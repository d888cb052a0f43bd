//! Branch-and-bound driver.

use std::time::Instant;

use super::branching::{BranchingSelector, NodeLp, ScoringContext};
use super::events::{TreeEvent, TreeObserver};
use super::node::{Infeasibility, NodeArena, NodeId, NodeStatus};
use super::pseudocost::PseudocostTable;
use super::queue::Frontier;
use crate::error::{MipError, MipResult};
use crate::master::{MasterBackend, MasterStatus, NodeBounds, RelaxationOracle};
use crate::model::{IncumbentTracker, MipProblem, MipSolution, MipStatus, SearchStats};
use crate::settings::{MipSettings, NodeSelection};

/// Mutable state of one run.
#[derive(Debug)]
pub struct SearchState {
    /// Every node created so far.
    pub arena: NodeArena,

    /// Pending nodes.
    pub frontier: Frontier,

    /// Best integer solution.
    pub incumbent: IncumbentTracker,

    /// Pseudocosts, alive for the whole run.
    pub pseudocosts: PseudocostTable,

    /// Run counters.
    pub stats: SearchStats,
}

impl SearchState {
    fn new(prob: &MipProblem) -> Self {
        Self {
            arena: NodeArena::new(),
            frontier: Frontier::new(),
            incumbent: IncumbentTracker::new(),
            pseudocosts: PseudocostTable::from_objective(&prob.objective),
            stats: SearchStats::default(),
        }
    }
}

/// Branch-and-bound tree controller.
///
/// Owns the search state, the LP oracle and the event sink for one run of
/// a maximization problem.
pub struct BranchAndBound<'a, B, O> {
    prob: &'a MipProblem,
    settings: MipSettings,
    oracle: RelaxationOracle<B>,
    observer: O,
    selector: BranchingSelector,
    state: SearchState,

    /// Bounds every node path is replayed over.
    root_bounds: NodeBounds,

    /// Depth at which a fractional node is fathomed.
    depth_limit: Option<usize>,

    /// Start time.
    start_time: Option<Instant>,
}

impl<'a, B: MasterBackend, O: TreeObserver> BranchAndBound<'a, B, O> {
    /// Create a new B&B controller.
    pub fn new(prob: &'a MipProblem, settings: MipSettings, backend: B, observer: O) -> Self {
        let mut oracle = RelaxationOracle::new(backend);
        oracle.backend_mut().set_mode(settings.lp_mode);

        let n = prob.num_vars();
        let depth_limit = settings
            .depth_limit
            .or_else(|| prob.is_binary_domain(settings.binary_vars).then_some(n));

        Self {
            prob,
            selector: BranchingSelector::new(settings.branching_rule, n),
            root_bounds: NodeBounds::root(prob, settings.binary_vars),
            state: SearchState::new(prob),
            depth_limit,
            oracle,
            observer,
            settings,
            start_time: None,
        }
    }

    /// State of the run (after or during [`BranchAndBound::solve`]).
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// Run the search until the frontier is exhausted or a budget is hit.
    pub fn solve(&mut self) -> MipResult<MipSolution> {
        self.start_time = Some(Instant::now());
        log::info!(
            "Starting branch and bound: {} vars ({} integer), {} constraints",
            self.prob.num_vars(),
            self.prob.num_integers(),
            self.prob.num_constraints()
        );
        log::info!(
            "Branching: {}; search: {}{}",
            self.settings.branching_rule,
            self.settings.node_selection,
            if self.settings.complete_enumeration {
                "; complete enumeration"
            } else {
                ""
            }
        );

        let root = self.state.arena.add_root();
        self.observer.on_event(TreeEvent::NodeCreated {
            id: root,
            parent: None,
            depth: 0,
            branch: None,
        });
        self.state.frontier.push(root, f64::NEG_INFINITY, f64::INFINITY);

        let status = loop {
            if let Some(status) = self.check_termination() {
                break status;
            }
            let Some((id, inherited)) = self.state.frontier.pop() else {
                continue;
            };
            self.process_node(id, inherited)?;
        };

        let solution = self.finalize(status);
        log::info!(
            "Branch and bound finished in {}ms: {:?}, objective {}",
            solution.stats.solve_time_ms,
            solution.status,
            solution.obj_val
        );
        log::info!(
            "{} nodes created, {} processed, {} LPs solved",
            solution.stats.nodes_created,
            solution.stats.nodes_processed,
            solution.stats.lp_solves
        );
        if self.settings.branching_rule.uses_resolves() {
            log::info!(
                "Scoring resolves: {} full, {} partial; {} LPs solved for bounds",
                solution.stats.full_resolves,
                solution.stats.partial_resolves,
                solution.stats.bound_lp_solves()
            );
        }
        Ok(solution)
    }

    fn process_node(&mut self, id: NodeId, inherited: f64) -> MipResult<()> {
        let complete = self.settings.complete_enumeration;
        let lb = self.state.incumbent.obj_val;

        if !complete && self.state.arena.get(id).can_prune(lb) {
            self.state.stats.nodes_pruned += 1;
            self.state.arena.get_mut(id).status = NodeStatus::Fathomed;
            log::debug!("Node {} pruned before solving ({} <= {})", id, inherited, lb);
            self.observer.on_event(TreeEvent::NodeUpdated {
                id,
                status: NodeStatus::Fathomed,
                bound: inherited,
                infeasibility: None,
            });
            return Ok(());
        }

        let (depth, parent, branch, parent_obj) = {
            let node = self.state.arena.get(id);
            (node.depth, node.parent_id, node.branch, node.relax_bound)
        };
        self.state.stats.nodes_processed += 1;
        self.state.stats.max_depth = self.state.stats.max_depth.max(depth);

        let bounds = self.state.arena.bounds(id, &self.root_bounds);
        let res = self.oracle.solve_node(self.prob, &bounds)?;

        if res.status != MasterStatus::Optimal {
            let infeasibility = parent.and_then(|p| self.state.arena.get(p).infeasibility);
            let node = self.state.arena.get_mut(id);
            node.status = NodeStatus::Infeasible;
            node.infeasibility = infeasibility;
            log::debug!("Node {} (depth {}): infeasible", id, depth);
            self.observer.on_event(TreeEvent::NodeUpdated {
                id,
                status: NodeStatus::Infeasible,
                bound: parent_obj,
                infeasibility,
            });
            self.log_progress();
            return Ok(());
        }

        let relax = res.obj_val;
        if let Some(branch) = branch {
            self.state.pseudocosts.update(&branch, parent_obj, relax);
        }

        let integer = self
            .prob
            .is_integer_feasible(&res.x, self.settings.int_feas_tol);
        let status = if integer {
            NodeStatus::Integer
        } else if !complete && relax <= lb {
            log::debug!("Node {} fathomed by bound ({} <= {})", id, relax, lb);
            NodeStatus::Fathomed
        } else if self.depth_limit.is_some_and(|limit| depth >= limit) {
            log::debug!("Node {} fathomed at depth {}", id, depth);
            NodeStatus::Fathomed
        } else {
            NodeStatus::Candidate
        };

        if status == NodeStatus::Fathomed && !self.state.incumbent.has_incumbent() {
            log::warn!(
                "Node {} fathomed before the first incumbent; the model may be infeasible or malformed",
                id
            );
        }

        let infeasibility = if integer {
            None
        } else {
            let (count, sum) = self.prob.integer_infeasibility(&res.x);
            Some(Infeasibility { count, sum })
        };
        {
            let node = self.state.arena.get_mut(id);
            node.relax_bound = relax;
            node.status = status;
            node.infeasibility = infeasibility;
        }
        log::debug!(
            "Node {} (depth {}): {}, bound {}, LB {}",
            id,
            depth,
            status,
            relax,
            lb
        );
        self.observer.on_event(TreeEvent::NodeUpdated {
            id,
            status,
            bound: relax,
            infeasibility,
        });

        if integer && self.state.incumbent.update(&res.x, relax) {
            self.state.stats.incumbent_updates += 1;
            log::info!("New incumbent at node {}: objective {}", id, relax);
            self.observer.on_event(TreeEvent::IncumbentUpdated {
                id,
                objective: relax,
            });
        }

        if status == NodeStatus::Candidate {
            // Complete enumeration keeps every child below the incumbent.
            let bound = if complete {
                self.state.incumbent.obj_val - 1.0
            } else {
                relax
            };
            self.branch(id, depth, &bounds, &res.x, relax, bound)?;
        }

        self.log_progress();
        Ok(())
    }

    fn branch(
        &mut self,
        id: NodeId,
        depth: usize,
        bounds: &NodeBounds,
        x: &[f64],
        relax: f64,
        bound: f64,
    ) -> MipResult<()> {
        let node = NodeLp {
            bounds,
            x,
            relax,
            depth,
        };
        let mut ctx = ScoringContext {
            prob: self.prob,
            pseudocosts: &mut self.state.pseudocosts,
            oracle: &mut self.oracle,
            stats: &mut self.state.stats,
        };
        let decision = self.selector.select(&node, &mut ctx)?.ok_or_else(|| {
            MipError::InternalError(format!("node {} has no fractional integer variable", id))
        })?;
        log::debug!(
            "Branching on x{} = {} (score {:.6})",
            decision.var,
            decision.value,
            decision.score
        );

        let (down_key, up_key) = match self.settings.node_selection {
            NodeSelection::DepthFirst => {
                let key = -(depth as f64) - 1.0;
                (key, key)
            }
            NodeSelection::BestFirst => (-bound, -bound),
            NodeSelection::BestEstimate => {
                let (qm, qp) = self.state.pseudocosts.gains(decision.var, decision.value);
                (-bound + qm, -bound + qp)
            }
        };

        for (branch, key) in [(decision.down(), down_key), (decision.up(), up_key)] {
            let child = self.state.arena.add_child(id, branch);
            self.state.frontier.push(child, key, bound);
            self.observer.on_event(TreeEvent::NodeCreated {
                id: child,
                parent: Some(id),
                depth: depth + 1,
                branch: Some(branch),
            });
        }
        Ok(())
    }

    /// Get elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0)
    }

    /// Check if time limit is exceeded.
    fn time_limit_exceeded(&self) -> bool {
        if let Some(limit) = self.settings.time_limit_ms {
            self.elapsed_ms() >= limit
        } else {
            false
        }
    }

    /// Check termination conditions.
    ///
    /// Returns Some(status) if we should terminate, None otherwise.
    fn check_termination(&self) -> Option<MipStatus> {
        // Frontier exhausted
        if self.state.frontier.is_empty() {
            return Some(if self.state.incumbent.has_incumbent() {
                MipStatus::Optimal
            } else {
                MipStatus::Infeasible
            });
        }

        if self.time_limit_exceeded() {
            return Some(MipStatus::TimeLimit);
        }

        if self.state.stats.nodes_processed >= self.settings.max_nodes {
            return Some(MipStatus::NodeLimit);
        }

        None
    }

    /// Best bound on the optimum given the pending nodes.
    fn best_bound(&self) -> f64 {
        self.state
            .frontier
            .best_bound()
            .max(self.state.incumbent.obj_val)
    }

    fn finalize(&mut self, status: MipStatus) -> MipSolution {
        let solve_time_ms = self.elapsed_ms();
        let stats = &mut self.state.stats;
        stats.nodes_created = self.state.arena.len() as u64;
        stats.lp_solves = self.oracle.lp_solves();
        stats.lp_iterations = self.oracle.iterations();
        stats.solve_time_ms = solve_time_ms;

        let bound = self.best_bound();
        MipSolution {
            status,
            x: self.state.incumbent.solution.clone().unwrap_or_default(),
            obj_val: self.state.incumbent.obj_val,
            bound,
            gap: self.state.incumbent.gap(bound),
            stats: self.state.stats.clone(),
        }
    }

    /// Log progress (if verbose).
    fn log_progress(&self) {
        if !self.settings.verbose {
            return;
        }

        let processed = self.state.stats.nodes_processed;
        if processed == 0 || processed % self.settings.log_freq != 0 {
            return;
        }

        let bound = self.best_bound();
        log::info!(
            "Nodes: {} ({} open) | Bound: {:.6e} | Incumbent: {:.6e} | Gap: {:.2}% | LPs: {} | Time: {:.1}s",
            processed,
            self.state.frontier.len(),
            bound,
            self.state.incumbent.obj_val,
            self.state.incumbent.gap(bound) * 100.0,
            self.oracle.lp_solves(),
            self.elapsed_ms() as f64 / 1000.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::SimplexMasterBackend;
    use crate::search::events::NoopObserver;

    fn simple_milp() -> MipProblem {
        // max 3x0 + 2x1 s.t. 2x0 + x1 <= 4, x0 + 2x1 <= 4
        MipProblem::from_dense(
            vec![3.0, 2.0],
            &[vec![2.0, 1.0], vec![1.0, 2.0]],
            vec![4.0, 4.0],
        )
        .unwrap()
    }

    #[test]
    fn test_root_integer_solution() {
        let prob = simple_milp();
        let mut bb = BranchAndBound::new(
            &prob,
            MipSettings::default(),
            SimplexMasterBackend::default(),
            NoopObserver,
        );
        let sol = bb.solve().unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 5.0).abs() < 1e-6);
        assert_eq!(sol.stats.nodes_created, 1);
        assert_eq!(sol.stats.lp_solves, 1);
        assert_eq!(sol.gap, 0.0);
        assert_eq!(bb.state().arena.get(0).status, NodeStatus::Integer);
    }

    #[test]
    fn test_general_integer_branching() {
        // max x0 + x1 s.t. 2x0 + 2x1 <= 3: LP optimum 1.5, integer optimum 1
        let prob = MipProblem::from_dense(vec![1.0, 1.0], &[vec![2.0, 2.0]], vec![3.0]).unwrap();
        let settings = MipSettings::default().general_integer();
        let mut events: Vec<TreeEvent> = Vec::new();
        let sol = BranchAndBound::new(&prob, settings, SimplexMasterBackend::default(), &mut events)
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::Optimal);
        assert!((sol.obj_val - 1.0).abs() < 1e-6);
        assert!(sol.stats.nodes_created >= 3);
        assert!(matches!(events[0], TreeEvent::NodeCreated { id: 0, .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e, TreeEvent::IncumbentUpdated { .. })));
    }

    #[test]
    fn test_node_limit() {
        let prob = MipProblem::from_dense(vec![1.0, 1.0], &[vec![2.0, 2.0]], vec![3.0]).unwrap();
        let settings = MipSettings::default().general_integer().with_max_nodes(1);
        let sol = BranchAndBound::new(&prob, settings, SimplexMasterBackend::default(), NoopObserver)
            .solve()
            .unwrap();

        assert_eq!(sol.status, MipStatus::NodeLimit);
        assert_eq!(sol.stats.nodes_processed, 1);
        assert!(!sol.has_solution());
        assert!((sol.bound - 1.5).abs() < 1e-6);
    }
}
