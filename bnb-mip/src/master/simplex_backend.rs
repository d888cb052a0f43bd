//! Master backend using the bnb-lp dual simplex.
//!
//! The MIP maximizes; the engine minimizes, so the objective is negated on
//! the way in and out. Values are rounded to 7 decimals so that bound
//! comparisons in the tree are not disturbed by pivoting noise.

use bnb_lp::{solve, LpSettings, LpStatus};

use super::{MasterBackend, MasterResult, MasterStatus, NodeBounds};
use crate::error::MipResult;
use crate::model::MipProblem;
use crate::settings::LpMode;

/// Decimal places kept in objective values and primal solutions.
const ROUND_SCALE: f64 = 1e7;

fn round7(v: f64) -> f64 {
    if v.is_finite() {
        (v * ROUND_SCALE).round() / ROUND_SCALE
    } else {
        v
    }
}

/// Master backend using the dense dual simplex.
#[derive(Debug, Clone)]
pub struct SimplexMasterBackend {
    /// Settings for uncapped solves.
    settings: LpSettings,

    /// Requested simplex variant.
    mode: LpMode,
}

impl SimplexMasterBackend {
    /// Create a new simplex master backend.
    pub fn new(settings: LpSettings) -> Self {
        Self {
            settings,
            mode: LpMode::default(),
        }
    }

    /// Requested simplex variant.
    ///
    /// The engine only implements the dual simplex, which is what every
    /// mode runs; the selection is kept so results can be reported against
    /// the requested configuration.
    pub fn mode(&self) -> LpMode {
        self.mode
    }
}

impl Default for SimplexMasterBackend {
    fn default() -> Self {
        Self::new(LpSettings::default())
    }
}

impl MasterBackend for SimplexMasterBackend {
    fn solve(
        &mut self,
        prob: &MipProblem,
        bounds: &NodeBounds,
        iteration_cap: Option<usize>,
    ) -> MipResult<MasterResult> {
        let lp = prob.relaxation(&bounds.lb, &bounds.ub);
        let settings = match iteration_cap {
            Some(cap) => self.settings.with_max_iter(cap.min(self.settings.max_iter)),
            None => self.settings.clone(),
        };

        let res = solve(&lp, &settings)?;

        let status = match res.status {
            LpStatus::Optimal => MasterStatus::Optimal,
            LpStatus::MaxIters if iteration_cap.is_some() => MasterStatus::IterationLimit,
            LpStatus::DualInfeasible => {
                log::warn!("LP relaxation is unbounded; treating node as infeasible");
                MasterStatus::Infeasible
            }
            other => {
                log::debug!("LP relaxation ended with status {}", other);
                MasterStatus::Infeasible
            }
        };

        if status == MasterStatus::Infeasible {
            return Ok(MasterResult::infeasible(res.iters));
        }

        Ok(MasterResult {
            status,
            x: res.x.into_iter().map(round7).collect(),
            obj_val: round7(-res.obj_val),
            iterations: res.iters,
        })
    }

    fn set_mode(&mut self, mode: LpMode) {
        if mode != LpMode::DualSimplex {
            log::debug!("{:?} requested; the simplex backend runs the dual simplex", mode);
        }
        self.mode = mode;
    }
}
