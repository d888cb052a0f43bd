//! Pseudocost estimates.
//!
//! One running average per variable and direction of the objective
//! degradation per unit of bound movement. The table lives for one run and
//! is never reset.

use super::node::{BranchRecord, BranchSense};

/// Running degradation average for one variable and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pseudocost {
    /// Current estimate.
    pub estimate: f64,

    /// Number of observations averaged into `estimate`.
    pub count: u64,
}

impl Pseudocost {
    fn seed(coef: f64) -> Self {
        Self {
            estimate: coef.abs(),
            count: 0,
        }
    }

    fn observe(&mut self, degradation: f64) {
        let n = self.count as f64;
        self.estimate = (self.estimate * n + degradation) / (n + 1.0);
        self.count += 1;
    }
}

/// Up and down pseudocosts of every variable.
#[derive(Debug, Clone)]
pub struct PseudocostTable {
    down: Vec<Pseudocost>,
    up: Vec<Pseudocost>,
}

impl PseudocostTable {
    /// Seed both directions with the objective coefficient magnitudes.
    pub fn from_objective(objective: &[f64]) -> Self {
        let seeds: Vec<Pseudocost> = objective.iter().map(|&c| Pseudocost::seed(c)).collect();
        Self {
            down: seeds.clone(),
            up: seeds,
        }
    }

    /// Down-direction entry of `var`.
    pub fn down(&self, var: usize) -> Pseudocost {
        self.down[var]
    }

    /// Up-direction entry of `var`.
    pub fn up(&self, var: usize) -> Pseudocost {
        self.up[var]
    }

    /// Record the degradation `parent_obj - child_obj` of an optimal child.
    ///
    /// The degradation is normalized by the distance the branch moved the
    /// variable. Zero distances carry no information and are ignored.
    pub fn update(&mut self, branch: &BranchRecord, parent_obj: f64, child_obj: f64) {
        let dist = branch.distance();
        if dist <= 0.0 || !parent_obj.is_finite() || !child_obj.is_finite() {
            return;
        }
        let degradation = (parent_obj - child_obj) / dist;
        let entry = match branch.sense {
            BranchSense::Down => &mut self.down[branch.var],
            BranchSense::Up => &mut self.up[branch.var],
        };
        entry.observe(degradation);
        log::trace!(
            "pseudocost x{} {}: {:.6} after {} samples",
            branch.var,
            branch.sense,
            entry.estimate,
            entry.count
        );
    }

    /// Predicted child gains `(q_down, q_up)` for branching `var` at `value`.
    pub fn gains(&self, var: usize, value: f64) -> (f64, f64) {
        let frac_down = value - value.floor();
        let frac_up = value.ceil() - value;
        (
            self.down[var].estimate * frac_down,
            self.up[var].estimate * frac_up,
        )
    }

    /// Classic pseudocost score: the smaller of the two predicted gains.
    pub fn score(&self, var: usize, value: f64) -> f64 {
        let (qm, qp) = self.gains(var, value);
        qm.min(qp)
    }

    /// Whether both directions have at least `min_count` observations.
    pub fn is_reliable(&self, var: usize, min_count: u64) -> bool {
        self.down[var].count.min(self.up[var].count) >= min_count
    }
}
