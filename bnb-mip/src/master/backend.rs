//! Master problem backend trait and types.

use crate::error::MipResult;
use crate::model::MipProblem;
use crate::settings::LpMode;

/// Status of master problem solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterStatus {
    /// Optimal solution found.
    Optimal,

    /// No optimal solution: infeasible, unbounded or numerically failed.
    /// The node can be discarded.
    Infeasible,

    /// Iteration cap reached; `obj_val` is still a valid upper bound.
    IterationLimit,
}

/// Result from solving the master problem.
#[derive(Debug, Clone)]
pub struct MasterResult {
    /// Solve status.
    pub status: MasterStatus,

    /// Primal solution x.
    pub x: Vec<f64>,

    /// Objective value of the maximization.
    pub obj_val: f64,

    /// Simplex iterations spent.
    pub iterations: usize,
}

impl MasterResult {
    /// Create an infeasible result.
    pub fn infeasible(iterations: usize) -> Self {
        Self {
            status: MasterStatus::Infeasible,
            x: Vec::new(),
            obj_val: f64::NEG_INFINITY,
            iterations,
        }
    }

    /// Whether the solve reached an optimal basis.
    pub fn is_optimal(&self) -> bool {
        self.status == MasterStatus::Optimal
    }

    /// Whether the objective is usable as a bound.
    pub fn has_bound(&self) -> bool {
        matches!(self.status, MasterStatus::Optimal | MasterStatus::IterationLimit)
    }
}

/// Variable bounds of one subproblem.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBounds {
    /// Lower bounds.
    pub lb: Vec<f64>,

    /// Upper bounds.
    pub ub: Vec<f64>,
}

impl NodeBounds {
    /// Root bounds of a problem.
    pub fn root(prob: &MipProblem, binary_vars: bool) -> Self {
        let (lb, ub) = prob.root_bounds(binary_vars);
        Self { lb, ub }
    }

    /// Tighten the upper bound of `var` to at most `value`.
    pub fn tighten_upper(&mut self, var: usize, value: f64) {
        self.ub[var] = self.ub[var].min(value);
    }

    /// Tighten the lower bound of `var` to at least `value`.
    pub fn tighten_lower(&mut self, var: usize, value: f64) {
        self.lb[var] = self.lb[var].max(value);
    }

    /// Copy with `var <= value`.
    pub fn with_upper(&self, var: usize, value: f64) -> Self {
        let mut b = self.clone();
        b.tighten_upper(var, value);
        b
    }

    /// Copy with `var >= value`.
    pub fn with_lower(&self, var: usize, value: f64) -> Self {
        let mut b = self.clone();
        b.tighten_lower(var, value);
        b
    }

    /// Check if the bound set leaves every domain nonempty.
    pub fn is_consistent(&self) -> bool {
        self.lb.iter().zip(&self.ub).all(|(l, u)| l <= u)
    }
}

/// Trait for master problem backends (LP solvers).
///
/// A backend solves the LP relaxation of the MIP under a given set of
/// variable bounds. Each call is an independent solve; a backend may keep
/// internal state for warm starts as long as results do not depend on it.
pub trait MasterBackend {
    /// Solve the relaxation of `prob` under `bounds`.
    ///
    /// `iteration_cap` limits the number of simplex iterations; a capped
    /// solve must report `IterationLimit` with a valid upper bound.
    fn solve(
        &mut self,
        prob: &MipProblem,
        bounds: &NodeBounds,
        iteration_cap: Option<usize>,
    ) -> MipResult<MasterResult>;

    /// Select the simplex variant used for subsequent solves.
    fn set_mode(&mut self, _mode: LpMode) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_tightening() {
        let mut b = NodeBounds {
            lb: vec![0.0, 0.0],
            ub: vec![1.0, f64::INFINITY],
        };

        b.tighten_upper(1, 3.0);
        assert_eq!(b.ub[1], 3.0);

        // Looser bounds never widen the domain
        b.tighten_upper(1, 5.0);
        assert_eq!(b.ub[1], 3.0);
        b.tighten_lower(0, -1.0);
        assert_eq!(b.lb[0], 0.0);

        let down = b.with_upper(0, 0.0);
        assert_eq!(down.ub[0], 0.0);
        assert_eq!(b.ub[0], 1.0);
        assert!(down.is_consistent());

        let crossed = down.with_lower(0, 1.0);
        assert!(!crossed.is_consistent());
    }

    #[test]
    fn test_result_predicates() {
        let r = MasterResult::infeasible(4);
        assert!(!r.is_optimal());
        assert!(!r.has_bound());
        assert_eq!(r.iterations, 4);
    }
}
