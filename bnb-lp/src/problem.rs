//! LP data, settings and result types.
//!
//! The engine works with the canonical bounded form
//!
//! ```text
//! minimize    c^T x
//! subject to  A x <= b
//!             lb <= x <= ub
//! ```
//!
//! Maximization is expressed by negating `c`.

use std::fmt;

/// Sparse constraint matrix (either CSR or CSC storage is accepted).
pub type SparseMatrix = sprs::CsMatI<f64, usize>;

/// Linear program in canonical bounded form.
#[derive(Debug, Clone)]
#[allow(non_snake_case)] // A is standard notation
pub struct LpData {
    /// Linear cost vector (length n).
    pub c: Vec<f64>,

    /// Constraint matrix (m × n).
    pub A: SparseMatrix,

    /// Right-hand side (length m).
    pub b: Vec<f64>,

    /// Lower bounds (length n, `-inf` allowed).
    pub lb: Vec<f64>,

    /// Upper bounds (length n, `+inf` allowed).
    pub ub: Vec<f64>,
}

impl LpData {
    /// Number of structural variables.
    pub fn num_vars(&self) -> usize {
        self.c.len()
    }

    /// Number of inequality rows.
    pub fn num_constraints(&self) -> usize {
        self.b.len()
    }

    /// Check dimensions and finiteness of the data.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.num_vars();
        let m = self.num_constraints();

        if self.A.rows() != m {
            return Err(format!("A has {} rows, expected {}", self.A.rows(), m));
        }
        if self.A.cols() != n {
            return Err(format!("A has {} cols, expected {}", self.A.cols(), n));
        }
        if self.lb.len() != n {
            return Err(format!("lb has length {}, expected {}", self.lb.len(), n));
        }
        if self.ub.len() != n {
            return Err(format!("ub has length {}, expected {}", self.ub.len(), n));
        }
        if let Some(j) = self.c.iter().position(|v| !v.is_finite()) {
            return Err(format!("c[{}] is not finite", j));
        }
        if let Some(i) = self.b.iter().position(|v| !v.is_finite()) {
            return Err(format!("b[{}] is not finite", i));
        }
        if self.A.iter().any(|(v, _)| !v.is_finite()) {
            return Err("A contains a non-finite coefficient".to_string());
        }
        for j in 0..n {
            if self.lb[j].is_nan() || self.ub[j].is_nan() {
                return Err(format!("bounds of variable {} are NaN", j));
            }
            if self.lb[j] == f64::INFINITY || self.ub[j] == f64::NEG_INFINITY {
                return Err(format!(
                    "variable {} has an empty infinite bound [{}, {}]",
                    j, self.lb[j], self.ub[j]
                ));
            }
        }
        Ok(())
    }
}

/// LP engine settings.
#[derive(Debug, Clone)]
pub struct LpSettings {
    /// Maximum number of simplex pivots.
    pub max_iter: usize,

    /// Primal feasibility tolerance.
    pub tol_feas: f64,

    /// Smallest pivot magnitude accepted in the ratio test.
    pub tol_pivot: f64,

    /// Finite box used in place of infinite bounds.
    pub big_bound: f64,

    /// Emit per-iteration trace logging.
    pub verbose: bool,
}

impl Default for LpSettings {
    fn default() -> Self {
        Self {
            max_iter: 50_000,
            tol_feas: 1e-9,
            tol_pivot: 1e-9,
            big_bound: 1e7,
            verbose: false,
        }
    }
}

impl LpSettings {
    /// Copy of these settings with a different iteration cap.
    pub fn with_max_iter(&self, max_iter: usize) -> Self {
        Self {
            max_iter,
            ..self.clone()
        }
    }

    /// Check that tolerances are usable.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.tol_feas > 0.0) {
            return Err(format!("tol_feas must be positive, got {}", self.tol_feas));
        }
        if !(self.tol_pivot > 0.0) {
            return Err(format!("tol_pivot must be positive, got {}", self.tol_pivot));
        }
        if !(self.big_bound.is_finite() && self.big_bound > 0.0) {
            return Err(format!("big_bound must be finite and positive, got {}", self.big_bound));
        }
        Ok(())
    }
}

/// Outcome of an LP solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LpStatus {
    /// Optimal basis found.
    Optimal,

    /// No point satisfies the constraints and bounds.
    PrimalInfeasible,

    /// Objective is unbounded below.
    DualInfeasible,

    /// Iteration cap reached; the objective is a valid lower bound.
    MaxIters,

    /// No acceptable pivot could be found.
    NumericalError,
}

impl fmt::Display for LpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LpStatus::Optimal => write!(f, "Optimal"),
            LpStatus::PrimalInfeasible => write!(f, "Primal Infeasible"),
            LpStatus::DualInfeasible => write!(f, "Dual Infeasible"),
            LpStatus::MaxIters => write!(f, "MaxIters"),
            LpStatus::NumericalError => write!(f, "NumericalError"),
        }
    }
}

/// Result of an LP solve.
#[derive(Debug, Clone)]
pub struct LpSolveResult {
    /// Solution status.
    pub status: LpStatus,

    /// Primal values of the structural variables (length n).
    ///
    /// For `MaxIters` this is the current basic solution, which may violate
    /// constraints.
    pub x: Vec<f64>,

    /// Objective value `c^T x`.
    ///
    /// For `Optimal` and `MaxIters` this is a lower bound on the optimum.
    pub obj_val: f64,

    /// Number of pivots performed.
    pub iters: usize,
}

impl LpSolveResult {
    /// Result for a problem that fails before the first pivot.
    pub fn infeasible(n: usize) -> Self {
        Self {
            status: LpStatus::PrimalInfeasible,
            x: vec![0.0; n],
            obj_val: f64::INFINITY,
            iters: 0,
        }
    }
}
