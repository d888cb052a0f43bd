//! Branching variable selection.
//!
//! All rules work on the fractional integer variables of the current node's
//! LP solution, visited in index order. Every argmax keeps the first (lowest
//! index) maximizer, and candidate rankings use a stable descending sort, so
//! a run is reproducible given a deterministic LP backend.

use super::node::BranchRecord;
use super::pseudocost::PseudocostTable;
use crate::error::MipResult;
use crate::master::{MasterBackend, MasterStatus, NodeBounds, RelaxationOracle};
use crate::model::{MipProblem, SearchStats};
use crate::settings::BranchingRule;

/// Minimum objective progress a hybrid resolve must show to be preferred.
const HYBRID_PROGRESS_EPS: f64 = 1e-8;

/// A branching decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchDecision {
    /// Variable to branch on.
    pub var: usize,

    /// Current (fractional) value.
    pub value: f64,

    /// Score of this decision (for logging/debugging).
    pub score: f64,
}

impl BranchDecision {
    /// "Down" branch: x <= floor(value).
    pub fn down(&self) -> BranchRecord {
        BranchRecord::down(self.var, self.value)
    }

    /// "Up" branch: x >= ceil(value).
    pub fn up(&self) -> BranchRecord {
        BranchRecord::up(self.var, self.value)
    }
}

/// LP data of the node being branched.
#[derive(Debug, Clone, Copy)]
pub struct NodeLp<'a> {
    /// Bounds the node was solved under.
    pub bounds: &'a NodeBounds,

    /// LP solution.
    pub x: &'a [f64],

    /// LP objective.
    pub relax: f64,

    /// Depth of the node.
    pub depth: usize,
}

/// Mutable run state a selection may read or refine.
pub struct ScoringContext<'a, B> {
    /// Problem being solved.
    pub prob: &'a MipProblem,

    /// Pseudocost table of the run.
    pub pseudocosts: &'a mut PseudocostTable,

    /// LP oracle for scoring resolves.
    pub oracle: &'a mut RelaxationOracle<B>,

    /// Run counters.
    pub stats: &'a mut SearchStats,
}

/// Branching variable selector.
#[derive(Debug, Clone)]
pub struct BranchingSelector {
    /// Rule in effect.
    rule: BranchingRule,

    /// Depth beyond which Hybrid falls back to pseudocost branching.
    hybrid_switch_depth: usize,
}

impl BranchingSelector {
    /// Create a new branching selector.
    pub fn new(rule: BranchingRule, num_vars: usize) -> Self {
        Self {
            rule,
            hybrid_switch_depth: (num_vars / 5).max(5),
        }
    }

    /// Rule currently in effect.
    ///
    /// Hybrid reports `Pseudocost` after its one-way switch.
    pub fn rule(&self) -> BranchingRule {
        self.rule
    }

    /// Select a branching variable.
    ///
    /// Returns None if no integer variable is fractional.
    pub fn select<B: MasterBackend>(
        &mut self,
        node: &NodeLp<'_>,
        ctx: &mut ScoringContext<'_, B>,
    ) -> MipResult<Option<BranchDecision>> {
        let fractional = ctx.prob.fractional_vars(node.x);
        if fractional.is_empty() {
            return Ok(None);
        }

        if self.rule == BranchingRule::Hybrid && node.depth > self.hybrid_switch_depth {
            log::info!(
                "Depth {} exceeds {}: switching from hybrid to pseudocost branching",
                node.depth,
                self.hybrid_switch_depth
            );
            self.rule = BranchingRule::Pseudocost;
        }

        let decision = match self.rule {
            BranchingRule::FixedOrder => {
                let (var, value) = fractional[0];
                BranchDecision {
                    var,
                    value,
                    score: frac_gap(value),
                }
            }
            BranchingRule::MostFractional => {
                let scores: Vec<f64> = fractional.iter().map(|&(_, v)| frac_gap(v)).collect();
                pick(&fractional, &scores)
            }
            BranchingRule::Pseudocost => {
                let scores = pseudocost_scores(&fractional, ctx.pseudocosts);
                pick(&fractional, &scores)
            }
            BranchingRule::Reliability {
                reliability_count,
                max_sb_iters,
                score_weight,
                lookahead,
            } => select_reliability(
                &fractional,
                node,
                ctx,
                reliability_count,
                max_sb_iters,
                score_weight,
                lookahead,
            )?,
            BranchingRule::Hybrid => select_hybrid(&fractional, node, ctx)?,
        };

        Ok(Some(decision))
    }
}

/// Distance to the nearest integer.
fn frac_gap(value: f64) -> f64 {
    (value - value.floor()).min(value.ceil() - value)
}

/// Blend of the child gains weighted toward the smaller one.
fn blend(qm: f64, qp: f64, mu: f64) -> f64 {
    (1.0 - mu) * qm.min(qp) + mu * qm.max(qp)
}

fn pseudocost_scores(fractional: &[(usize, f64)], pc: &PseudocostTable) -> Vec<f64> {
    fractional.iter().map(|&(v, val)| pc.score(v, val)).collect()
}

/// First maximizer of `scores`.
fn pick(fractional: &[(usize, f64)], scores: &[f64]) -> BranchDecision {
    let mut best = 0;
    for (k, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] {
            best = k;
        }
    }
    let (var, value) = fractional[best];
    BranchDecision {
        var,
        value,
        score: scores[best],
    }
}

/// Candidate positions by descending score, ties in index order.
fn ranking(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Reliability branching.
///
/// Candidates are walked in the order of their initial blended score.
/// Unreliable ones get both children resolved with an iteration cap, and
/// the measured gains replace the predicted ones. The walk stops once
/// `lookahead` consecutive candidates failed to raise the best score.
fn select_reliability<B: MasterBackend>(
    fractional: &[(usize, f64)],
    node: &NodeLp<'_>,
    ctx: &mut ScoringContext<'_, B>,
    eta: u64,
    gamma: usize,
    mu: f64,
    lambda: usize,
) -> MipResult<BranchDecision> {
    let mut scores: Vec<f64> = fractional
        .iter()
        .map(|&(v, val)| {
            let (qm, qp) = ctx.pseudocosts.gains(v, val);
            blend(qm, qp, mu)
        })
        .collect();
    let order = ranking(&scores);

    let mut smax = scores[order[0]];
    let mut no_change = 0;
    for k in order {
        let (var, value) = fractional[k];
        if !ctx.pseudocosts.is_reliable(var, eta) {
            let (mut qm, mut qp) = ctx.pseudocosts.gains(var, value);
            if let Some(gain) = resolve_child(&BranchRecord::down(var, value), node, ctx, gamma)? {
                qm = gain;
            }
            if let Some(gain) = resolve_child(&BranchRecord::up(var, value), node, ctx, gamma)? {
                qp = gain;
            }
            scores[k] = blend(qm, qp, mu);
        }

        if scores[k] > smax {
            smax = scores[k];
            no_change = 0;
        } else {
            no_change += 1;
        }
        if no_change >= lambda {
            log::trace!("reliability walk stopped after {} stale candidates", no_change);
            break;
        }
    }

    Ok(pick(fractional, &scores))
}

/// Resolve one child of the node with an iteration cap.
///
/// Returns the measured gain `relax - child_obj` when the resolve produced a
/// usable bound. Optimal resolves are also recorded as pseudocost samples.
fn resolve_child<B: MasterBackend>(
    branch: &BranchRecord,
    node: &NodeLp<'_>,
    ctx: &mut ScoringContext<'_, B>,
    cap: usize,
) -> MipResult<Option<f64>> {
    let mut bounds = node.bounds.clone();
    branch.apply(&mut bounds);
    let res = ctx.oracle.resolve(ctx.prob, &bounds, cap)?;
    match res.status {
        MasterStatus::Optimal => {
            ctx.stats.full_resolves += 1;
            ctx.pseudocosts.update(branch, node.relax, res.obj_val);
            Ok(Some(node.relax - res.obj_val))
        }
        MasterStatus::IterationLimit => {
            ctx.stats.partial_resolves += 1;
            Ok(Some(node.relax - res.obj_val))
        }
        MasterStatus::Infeasible => Ok(None),
    }
}

/// Hybrid strong/pseudocost branching.
///
/// The top half of the pseudocost ranking is resolved with both bounds of
/// the candidate tightened to `[floor, ceil]`, capped at twice the average
/// iteration count so far. The candidate with the largest strictly positive
/// progress wins; without progress the best pseudocost candidate is used.
fn select_hybrid<B: MasterBackend>(
    fractional: &[(usize, f64)],
    node: &NodeLp<'_>,
    ctx: &mut ScoringContext<'_, B>,
) -> MipResult<BranchDecision> {
    let scores = pseudocost_scores(fractional, ctx.pseudocosts);
    let order = ranking(&scores);
    let restricted = &order[..(order.len() / 2).max(1)];
    let cap = ((2.0 * ctx.oracle.average_iterations()).ceil() as usize).max(1);

    let mut best_progress = 0.0;
    let mut chosen = None;
    for &k in restricted {
        let (var, value) = fractional[k];
        let mut bounds = node.bounds.clone();
        bounds.tighten_lower(var, value.floor());
        bounds.tighten_upper(var, value.ceil());
        let res = ctx.oracle.resolve(ctx.prob, &bounds, cap)?;
        if !res.has_bound() {
            continue;
        }
        let progress = node.relax - res.obj_val;
        if progress - best_progress > HYBRID_PROGRESS_EPS {
            best_progress = progress;
            chosen = Some(k);
        }
    }

    let k = chosen.unwrap_or(restricted[0]);
    let (var, value) = fractional[k];
    Ok(BranchDecision {
        var,
        value,
        score: scores[k],
    })
}
