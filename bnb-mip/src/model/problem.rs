//! MIP problem representation.

use bnb_lp::{LpData, SparseMatrix};
use serde::{Deserialize, Serialize};
use sprs::TriMat;

use crate::error::{MipError, MipResult};

/// Smallest distance to an integer that makes a variable a branching
/// candidate.
pub(crate) const FRACTIONAL_EPS: f64 = 1e-8;

/// Variable type for mixed-integer problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarType {
    /// Continuous variable
    Continuous,
    /// Integer variable
    Integer,
    /// Binary variable (0 or 1)
    Binary,
}

/// Mixed-integer linear problem.
///
/// ```text
/// maximize    objective^T x
/// subject to  A x <= rhs
///             x >= 0, integer where required
/// ```
///
/// Variables live in `[0, 1]` or `[0, inf)` depending on the run's
/// `binary_vars` setting; `Binary` variables are always capped at 1.
#[derive(Debug, Clone)]
pub struct MipProblem {
    /// Objective coefficients (maximized).
    pub objective: Vec<f64>,

    /// Constraint identifiers, one per row.
    pub constraint_names: Vec<String>,

    /// Constraint matrix (CSR).
    pub matrix: SparseMatrix,

    /// Right-hand side.
    pub rhs: Vec<f64>,

    /// Type of every variable.
    pub var_types: Vec<VarType>,

    /// Indices of integer variables (includes binary).
    pub integer_vars: Vec<usize>,
}

impl MipProblem {
    /// Create a problem from named coefficient rows.
    ///
    /// Every variable is integer until [`MipProblem::with_var_types`] says
    /// otherwise.
    pub fn new<S: Into<String>>(
        objective: Vec<f64>,
        rows: impl IntoIterator<Item = (S, Vec<f64>)>,
        rhs: Vec<f64>,
    ) -> MipResult<Self> {
        let n = objective.len();
        if let Some(j) = objective.iter().position(|v| !v.is_finite()) {
            return Err(MipError::InvalidProblem(format!(
                "objective coefficient {} is not finite",
                j
            )));
        }

        let mut names = Vec::new();
        let mut triplets = Vec::new();
        for (i, (name, coefs)) in rows.into_iter().enumerate() {
            let name = name.into();
            if coefs.len() != n {
                return Err(MipError::InvalidProblem(format!(
                    "constraint '{}' has {} coefficients but there are {} variables",
                    name,
                    coefs.len(),
                    n
                )));
            }
            for (j, &v) in coefs.iter().enumerate() {
                if !v.is_finite() {
                    return Err(MipError::InvalidProblem(format!(
                        "constraint '{}' has a non-finite coefficient for variable {}",
                        name, j
                    )));
                }
                if v != 0.0 {
                    triplets.push((i, j, v));
                }
            }
            names.push(name);
        }

        let m = names.len();
        if rhs.len() != m {
            return Err(MipError::InvalidProblem(format!(
                "rhs has length {}, expected {}",
                rhs.len(),
                m
            )));
        }
        if let Some(i) = rhs.iter().position(|v| !v.is_finite()) {
            return Err(MipError::InvalidProblem(format!(
                "rhs of constraint '{}' is not finite",
                names[i]
            )));
        }

        let mut tri = TriMat::new((m, n));
        for (i, j, v) in triplets {
            tri.add_triplet(i, j, v);
        }

        Ok(Self {
            objective,
            constraint_names: names,
            matrix: tri.to_csr(),
            rhs,
            var_types: vec![VarType::Integer; n],
            integer_vars: (0..n).collect(),
        })
    }

    /// Create a problem from unnamed dense rows (`c0`, `c1`, ...).
    pub fn from_dense(objective: Vec<f64>, rows: &[Vec<f64>], rhs: Vec<f64>) -> MipResult<Self> {
        Self::new(
            objective,
            rows.iter()
                .enumerate()
                .map(|(i, row)| (format!("c{}", i), row.clone())),
            rhs,
        )
    }

    /// Set the type of every variable.
    pub fn with_var_types(mut self, var_types: Vec<VarType>) -> MipResult<Self> {
        if var_types.len() != self.num_vars() {
            return Err(MipError::InvalidProblem(format!(
                "{} variable types given for {} variables",
                var_types.len(),
                self.num_vars()
            )));
        }
        self.integer_vars = var_types
            .iter()
            .enumerate()
            .filter(|(_, t)| **t != VarType::Continuous)
            .map(|(i, _)| i)
            .collect();
        self.var_types = var_types;
        Ok(self)
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.objective.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.rhs.len()
    }

    /// Number of integer variables (including binary).
    pub fn num_integers(&self) -> usize {
        self.integer_vars.len()
    }

    /// Whether variable `var` must take integer values.
    pub fn is_integer(&self, var: usize) -> bool {
        self.var_types[var] != VarType::Continuous
    }

    /// Root bounds for the given domain mode.
    pub fn root_bounds(&self, binary_vars: bool) -> (Vec<f64>, Vec<f64>) {
        let lb = vec![0.0; self.num_vars()];
        let ub = self
            .var_types
            .iter()
            .map(|t| {
                if binary_vars || *t == VarType::Binary {
                    1.0
                } else {
                    f64::INFINITY
                }
            })
            .collect();
        (lb, ub)
    }

    /// Whether every variable domain is bounded by 1.
    pub fn is_binary_domain(&self, binary_vars: bool) -> bool {
        binary_vars || self.var_types.iter().all(|t| *t == VarType::Binary)
    }

    /// LP relaxation in the engine's minimization form with the given bounds.
    pub fn relaxation(&self, lb: &[f64], ub: &[f64]) -> LpData {
        LpData {
            c: self.objective.iter().map(|c| -c).collect(),
            A: self.matrix.clone(),
            b: self.rhs.clone(),
            lb: lb.to_vec(),
            ub: ub.to_vec(),
        }
    }

    /// Objective value of a point.
    pub fn objective_value(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, x)| c * x).sum()
    }

    /// Check if a point satisfies all constraints and nonnegativity.
    pub fn is_feasible(&self, x: &[f64], tol: f64) -> bool {
        if x.len() != self.num_vars() || x.iter().any(|&v| v < -tol) {
            return false;
        }
        let mut lhs = vec![0.0; self.num_constraints()];
        for (&v, (i, j)) in self.matrix.iter() {
            lhs[i] += v * x[j];
        }
        lhs.iter().zip(&self.rhs).all(|(l, r)| *l <= r + tol)
    }

    /// Check if a solution is integer-feasible within tolerance.
    pub fn is_integer_feasible(&self, x: &[f64], tol: f64) -> bool {
        self.integer_vars
            .iter()
            .all(|&i| (x[i].round() - x[i]).abs() <= tol)
    }

    /// Get the fractionality of a variable (distance to nearest integer).
    pub fn fractionality(&self, val: f64) -> f64 {
        (val - val.floor()).min(val.ceil() - val)
    }

    /// Get fractional integer variables and their values, in index order.
    pub fn fractional_vars(&self, x: &[f64]) -> Vec<(usize, f64)> {
        self.integer_vars
            .iter()
            .filter(|&&i| self.fractionality(x[i]) > FRACTIONAL_EPS)
            .map(|&i| (i, x[i]))
            .collect()
    }

    /// Integer infeasibility count and sum of distances to the nearest
    /// integer over the integer variables.
    pub fn integer_infeasibility(&self, x: &[f64]) -> (usize, f64) {
        self.integer_vars
            .iter()
            .map(|&i| self.fractionality(x[i]))
            .filter(|&f| f > FRACTIONAL_EPS)
            .fold((0, 0.0), |(count, sum), f| (count + 1, sum + f))
    }
}
