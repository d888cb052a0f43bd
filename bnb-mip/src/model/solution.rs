//! MIP solution types.

use serde::{Deserialize, Serialize};

/// Status of the MIP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MipStatus {
    /// Frontier exhausted with an incumbent: the incumbent is optimal.
    Optimal,

    /// Frontier exhausted without any integer solution.
    Infeasible,

    /// Node limit reached, best solution returned.
    NodeLimit,

    /// Time limit reached, best solution returned.
    TimeLimit,
}

impl MipStatus {
    /// Returns true if optimality (or infeasibility) was proven.
    pub fn is_finished(&self) -> bool {
        matches!(self, MipStatus::Optimal | MipStatus::Infeasible)
    }

    /// Returns true if optimality was proven.
    pub fn is_optimal(&self) -> bool {
        matches!(self, MipStatus::Optimal)
    }
}

/// Counters collected over one branch-and-bound run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes created, root included.
    pub nodes_created: u64,

    /// Nodes popped from the frontier and processed.
    pub nodes_processed: u64,

    /// Nodes discarded at pop time because their inherited bound could not
    /// beat the incumbent.
    pub nodes_pruned: u64,

    /// LP relaxations solved to completion: node solves plus fully solved
    /// scoring resolves.
    pub lp_solves: u64,

    /// Simplex iterations over every LP call.
    pub lp_iterations: u64,

    /// Scoring resolves that reached an optimal basis.
    pub full_resolves: u64,

    /// Scoring resolves stopped by the iteration cap.
    pub partial_resolves: u64,

    /// Deepest node processed.
    pub max_depth: usize,

    /// Number of times the incumbent improved.
    pub incumbent_updates: u64,

    /// Wall-clock time in milliseconds.
    pub solve_time_ms: u64,
}

impl SearchStats {
    /// LP solves spent on node bounds rather than branching scores.
    pub fn bound_lp_solves(&self) -> u64 {
        self.lp_solves - self.full_resolves
    }
}

/// Complete MIP solution with diagnostics.
#[derive(Debug, Clone)]
pub struct MipSolution {
    /// Solve status.
    pub status: MipStatus,

    /// Best integer assignment (empty if none was found).
    pub x: Vec<f64>,

    /// Objective of the best integer solution (`-inf` if none).
    pub obj_val: f64,

    /// Best remaining upper bound when the run stopped.
    pub bound: f64,

    /// Relative optimality gap: (bound - obj_val) / |obj_val|.
    pub gap: f64,

    /// Run statistics.
    pub stats: SearchStats,
}

impl Default for MipSolution {
    fn default() -> Self {
        Self {
            status: MipStatus::Infeasible,
            x: Vec::new(),
            obj_val: f64::NEG_INFINITY,
            bound: f64::NEG_INFINITY,
            gap: f64::INFINITY,
            stats: SearchStats::default(),
        }
    }
}

impl MipSolution {
    /// Returns true if an integer solution was found.
    pub fn has_solution(&self) -> bool {
        self.obj_val > f64::NEG_INFINITY
    }

    /// Compute relative gap between an upper bound and an incumbent.
    pub fn compute_gap(primal: f64, bound: f64) -> f64 {
        if primal.is_infinite() || bound.is_infinite() {
            return f64::INFINITY;
        }
        let denom = primal.abs().max(1e-10);
        ((bound - primal) / denom).max(0.0)
    }
}

/// Tracks the best known integer solution (incumbent) of a maximization.
#[derive(Debug, Clone)]
pub struct IncumbentTracker {
    /// Current best solution (if any).
    pub solution: Option<Vec<f64>>,

    /// Objective value of incumbent (LB).
    /// Initialized to -inf.
    pub obj_val: f64,
}

impl Default for IncumbentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl IncumbentTracker {
    /// Create a new incumbent tracker.
    pub fn new() -> Self {
        Self {
            solution: None,
            obj_val: f64::NEG_INFINITY,
        }
    }

    /// Check if we have an incumbent.
    pub fn has_incumbent(&self) -> bool {
        self.solution.is_some()
    }

    /// Try to update incumbent with a new solution.
    ///
    /// Only strictly greater objectives are accepted. Returns true if the
    /// incumbent was improved.
    pub fn update(&mut self, x: &[f64], obj: f64) -> bool {
        if obj > self.obj_val {
            self.solution = Some(x.to_vec());
            self.obj_val = obj;
            true
        } else {
            false
        }
    }

    /// Compute relative gap to an upper bound.
    pub fn gap(&self, bound: f64) -> f64 {
        MipSolution::compute_gap(self.obj_val, bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incumbent_tracker() {
        let mut tracker = IncumbentTracker::new();

        assert!(!tracker.has_incumbent());
        assert_eq!(tracker.obj_val, f64::NEG_INFINITY);

        // First solution
        assert!(tracker.update(&[1.0, 2.0], 10.0));
        assert!(tracker.has_incumbent());
        assert_eq!(tracker.obj_val, 10.0);

        // Worse solution (rejected)
        assert!(!tracker.update(&[2.0, 3.0], 5.0));
        assert_eq!(tracker.obj_val, 10.0);

        // Equal solution (rejected, improvement must be strict)
        assert!(!tracker.update(&[0.0, 5.0], 10.0));
        assert_eq!(tracker.solution.as_deref(), Some(&[1.0, 2.0][..]));

        // Better solution (accepted)
        assert!(tracker.update(&[0.5, 1.0], 15.0));
        assert_eq!(tracker.obj_val, 15.0);
    }

    #[test]
    fn test_gap_computation() {
        // Gap = |12 - 10| / |10| = 0.2
        let gap = MipSolution::compute_gap(10.0, 12.0);
        assert!((gap - 0.2).abs() < 1e-10);

        assert_eq!(MipSolution::compute_gap(f64::NEG_INFINITY, 3.0), f64::INFINITY);
        assert_eq!(MipSolution::compute_gap(5.0, 5.0), 0.0);
    }

    #[test]
    fn test_status_methods() {
        assert!(MipStatus::Optimal.is_finished());
        assert!(MipStatus::Infeasible.is_finished());
        assert!(!MipStatus::NodeLimit.is_finished());

        assert!(MipStatus::Optimal.is_optimal());
        assert!(!MipStatus::TimeLimit.is_optimal());
    }

    #[test]
    fn test_stats_bound_solves() {
        let stats = SearchStats {
            lp_solves: 12,
            full_resolves: 5,
            ..Default::default()
        };
        assert_eq!(stats.bound_lp_solves(), 7);
    }
}
