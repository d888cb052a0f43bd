//! Dense bounded dual simplex.
//!
//! The tableau `B^{-1} [A I]` is kept explicitly, which is adequate for the
//! small and medium relaxations produced by branch-and-bound. Each solve
//! starts from the all-slack basis with every structural variable placed at
//! the bound matching the sign of its cost, so every iterate is dual
//! feasible and the running objective is a valid lower bound even when the
//! iteration cap stops the solve early.

use crate::error::{LpError, LpResult};
use crate::problem::{LpData, LpSettings, LpSolveResult, LpStatus};

/// Consecutive degenerate pivots tolerated before switching to Bland's rule.
const DEGENERATE_SWITCH: usize = 50;

/// Ratios closer than this are considered tied.
const RATIO_TIE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarState {
    Basic,
    AtLower,
    AtUpper,
}

/// Leaving row choice: row index and whether the basic variable is below
/// its lower bound (otherwise above its upper bound).
#[derive(Debug, Clone, Copy)]
struct Leaving {
    row: usize,
    below: bool,
}

/// Explicit simplex tableau over structural and slack columns.
struct Tableau {
    /// Number of rows.
    m: usize,

    /// Number of structural columns.
    n: usize,

    /// Total columns (structural + slack).
    cols: usize,

    /// Row-major `m × cols` tableau.
    rows: Vec<f64>,

    /// `B^{-1} b`.
    beta: Vec<f64>,

    /// Column costs (zero for slacks).
    cost: Vec<f64>,

    /// Reduced costs.
    rc: Vec<f64>,

    lower: Vec<f64>,
    upper: Vec<f64>,

    /// Basic column of each row.
    basis: Vec<usize>,

    state: Vec<VarState>,

    /// Current value of every column.
    x: Vec<f64>,
}

impl Tableau {
    fn new(lp: &LpData, big: f64) -> Self {
        let n = lp.num_vars();
        let m = lp.num_constraints();
        let cols = n + m;

        let mut rows = vec![0.0; m * cols];
        for (&v, (i, j)) in lp.A.iter() {
            rows[i * cols + j] += v;
        }
        for i in 0..m {
            rows[i * cols + n + i] = 1.0;
        }

        let mut lower = Vec::with_capacity(cols);
        let mut upper = Vec::with_capacity(cols);
        for j in 0..n {
            let (lo, hi) = boxed_bounds(lp.lb[j], lp.ub[j], big);
            lower.push(lo);
            upper.push(hi);
        }
        lower.extend(std::iter::repeat(0.0).take(m));
        upper.extend(std::iter::repeat(f64::INFINITY).take(m));

        let mut cost = lp.c.clone();
        cost.extend(std::iter::repeat(0.0).take(m));
        let rc = cost.clone();

        // Dual feasible start: nonbasic at the bound favoured by its cost.
        let mut state = Vec::with_capacity(cols);
        for &r in &rc[..n] {
            state.push(if r >= 0.0 {
                VarState::AtLower
            } else {
                VarState::AtUpper
            });
        }
        state.extend(std::iter::repeat(VarState::Basic).take(m));

        Self {
            m,
            n,
            cols,
            rows,
            beta: lp.b.clone(),
            cost,
            rc,
            lower,
            upper,
            basis: (n..cols).collect(),
            state,
            x: vec![0.0; cols],
        }
    }

    /// Recompute column values from the nonbasic bounds.
    fn compute_primal(&mut self) {
        for j in 0..self.cols {
            match self.state[j] {
                VarState::AtLower => self.x[j] = self.lower[j],
                VarState::AtUpper => self.x[j] = self.upper[j],
                VarState::Basic => {}
            }
        }
        for r in 0..self.m {
            let row = &self.rows[r * self.cols..(r + 1) * self.cols];
            let mut v = self.beta[r];
            for (j, &a) in row.iter().enumerate() {
                if a != 0.0 && self.state[j] != VarState::Basic {
                    v -= a * self.x[j];
                }
            }
            self.x[self.basis[r]] = v;
        }
    }

    /// Pick the leaving row: largest bound violation, or the lowest basic
    /// column index under Bland's rule.
    fn select_leaving(&self, tol: f64, bland: bool) -> Option<Leaving> {
        let mut best: Option<(Leaving, f64)> = None;
        for r in 0..self.m {
            let p = self.basis[r];
            let v = self.x[p];
            let (viol, below) = if v < self.lower[p] - tol * (1.0 + self.lower[p].abs()) {
                (self.lower[p] - v, true)
            } else if v > self.upper[p] + tol * (1.0 + self.upper[p].abs()) {
                (v - self.upper[p], false)
            } else {
                continue;
            };

            let better = match best {
                None => true,
                Some((cur, cur_viol)) => {
                    if bland {
                        p < self.basis[cur.row]
                    } else {
                        viol > cur_viol
                    }
                }
            };
            if better {
                best = Some((Leaving { row: r, below }, viol));
            }
        }
        best.map(|(l, _)| l)
    }

    /// Dual ratio test on the leaving row. Returns the entering column and
    /// its ratio.
    fn select_entering(&self, leaving: Leaving, tol_pivot: f64, bland: bool) -> Option<(usize, f64)> {
        let row = &self.rows[leaving.row * self.cols..(leaving.row + 1) * self.cols];
        let mut best: Option<(usize, f64, f64)> = None;

        for (j, &a) in row.iter().enumerate() {
            if a.abs() <= tol_pivot || self.upper[j] <= self.lower[j] {
                continue;
            }
            let eligible = match (self.state[j], leaving.below) {
                (VarState::Basic, _) => false,
                (VarState::AtLower, true) => a < 0.0,
                (VarState::AtUpper, true) => a > 0.0,
                (VarState::AtLower, false) => a > 0.0,
                (VarState::AtUpper, false) => a < 0.0,
            };
            if !eligible {
                continue;
            }

            let ratio = self.rc[j].abs() / a.abs();
            let better = match best {
                None => true,
                Some((_, r, mag)) => {
                    ratio < r - RATIO_TIE
                        || (!bland && (ratio - r).abs() <= RATIO_TIE && a.abs() > mag)
                }
            };
            if better {
                best = Some((j, ratio, a.abs()));
            }
        }
        best.map(|(j, ratio, _)| (j, ratio))
    }

    /// Pivot column `q` into the basis at `leaving.row`.
    fn pivot(&mut self, leaving: Leaving, q: usize) {
        let cols = self.cols;
        let r = leaving.row;
        let piv = self.rows[r * cols + q];

        for v in &mut self.rows[r * cols..(r + 1) * cols] {
            *v /= piv;
        }
        self.beta[r] /= piv;
        let pivot_row = self.rows[r * cols..(r + 1) * cols].to_vec();
        let pivot_beta = self.beta[r];

        for i in 0..self.m {
            if i == r {
                continue;
            }
            let f = self.rows[i * cols + q];
            if f == 0.0 {
                continue;
            }
            for (v, &p) in self.rows[i * cols..(i + 1) * cols].iter_mut().zip(&pivot_row) {
                *v -= f * p;
            }
            self.beta[i] -= f * pivot_beta;
        }

        let f = self.rc[q];
        for (rc, &p) in self.rc.iter_mut().zip(&pivot_row) {
            *rc -= f * p;
        }
        self.rc[q] = 0.0;

        let p = self.basis[r];
        self.state[p] = if leaving.below {
            VarState::AtLower
        } else {
            VarState::AtUpper
        };
        self.basis[r] = q;
        self.state[q] = VarState::Basic;
    }

    fn objective(&self) -> f64 {
        self.cost
            .iter()
            .zip(&self.x)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Whether an optimum rests on the artificial box of an infinite bound.
    fn hits_artificial_box(&self, lp: &LpData, tol: f64) -> bool {
        (0..self.n).any(|j| {
            let x = self.x[j];
            (lp.ub[j] == f64::INFINITY && x >= self.upper[j] - tol * (1.0 + self.upper[j].abs()))
                || (lp.lb[j] == f64::NEG_INFINITY
                    && x <= self.lower[j] + tol * (1.0 + self.lower[j].abs()))
        })
    }
}

/// Replace infinite bounds by a finite box of width `big`.
fn boxed_bounds(lb: f64, ub: f64, big: f64) -> (f64, f64) {
    match (lb.is_finite(), ub.is_finite()) {
        (true, true) => (lb, ub),
        (true, false) => (lb, lb.max(0.0) + big),
        (false, true) => (ub.min(0.0) - big, ub),
        (false, false) => (-big, big),
    }
}

/// Solve an LP with the bounded dual simplex.
///
/// Returns an error only for malformed input; infeasibility, unboundedness
/// and the iteration cap are reported through [`LpStatus`].
pub fn solve(lp: &LpData, settings: &LpSettings) -> LpResult<LpSolveResult> {
    lp.validate().map_err(LpError::InvalidProblem)?;
    settings.validate().map_err(LpError::InvalidSettings)?;

    let n = lp.num_vars();
    if let Some(j) = (0..n).find(|&j| lp.lb[j] > lp.ub[j]) {
        log::trace!("variable {} has crossed bounds [{}, {}]", j, lp.lb[j], lp.ub[j]);
        return Ok(LpSolveResult::infeasible(n));
    }

    let mut tab = Tableau::new(lp, settings.big_bound);
    let mut iters = 0;
    let mut degenerate = 0;

    let status = loop {
        tab.compute_primal();
        if tab.x.iter().any(|v| !v.is_finite()) {
            break LpStatus::NumericalError;
        }

        let bland = degenerate > DEGENERATE_SWITCH;
        let Some(leaving) = tab.select_leaving(settings.tol_feas, bland) else {
            break LpStatus::Optimal;
        };
        if iters >= settings.max_iter {
            break LpStatus::MaxIters;
        }
        let Some((q, ratio)) = tab.select_entering(leaving, settings.tol_pivot, bland) else {
            break LpStatus::PrimalInfeasible;
        };

        if settings.verbose {
            log::trace!(
                "iter {:>4}: row {} leaves ({}), col {} enters, ratio {:.3e}, obj {:.6e}",
                iters,
                leaving.row,
                if leaving.below { "lower" } else { "upper" },
                q,
                ratio,
                tab.objective(),
            );
        }

        tab.pivot(leaving, q);
        iters += 1;
        if ratio <= RATIO_TIE {
            degenerate += 1;
        } else {
            degenerate = 0;
        }
    };

    let status = if status == LpStatus::Optimal && tab.hits_artificial_box(lp, settings.tol_feas) {
        LpStatus::DualInfeasible
    } else {
        status
    };

    let obj_val = match status {
        LpStatus::Optimal | LpStatus::MaxIters => tab.objective(),
        LpStatus::DualInfeasible => f64::NEG_INFINITY,
        LpStatus::PrimalInfeasible | LpStatus::NumericalError => f64::INFINITY,
    };

    log::trace!("LP finished: {} after {} iterations, obj {:.6e}", status, iters, obj_val);

    Ok(LpSolveResult {
        status,
        x: tab.x[..n].to_vec(),
        obj_val,
        iters,
    })
}
