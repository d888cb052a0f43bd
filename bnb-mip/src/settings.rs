//! Configuration settings for the MIP solver.

use std::fmt;
use std::str::FromStr;

use bnb_lp::LpSettings;
use serde::{Deserialize, Serialize};

use crate::error::{MipError, MipResult};

/// Branching variable selection rule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchingRule {
    /// First fractional variable in index order.
    FixedOrder,

    /// Select variable with fractional part closest to 0.5.
    #[default]
    MostFractional,

    /// Use pseudocost estimates from previous branches.
    Pseudocost,

    /// Reliability branching: resolve capped child LPs for variables whose
    /// pseudocosts are not yet reliable.
    Reliability {
        /// Minimum sample count in both directions before a pseudocost is
        /// trusted (η).
        reliability_count: u64,

        /// Simplex iteration cap for each scoring resolve (γ).
        max_sb_iters: usize,

        /// Weight of the larger child gain in the score (μ).
        score_weight: f64,

        /// Stop after this many candidates without a strict score
        /// improvement (λ).
        lookahead: usize,
    },

    /// Hybrid strong/pseudocost branching: capped resolves on the top half
    /// of the pseudocost ranking, switching permanently to pure pseudocost
    /// once the tree gets deep.
    Hybrid,
}

impl BranchingRule {
    /// Reliability branching with `(η, γ, μ, λ) = (4, 3, 1/6, 5)`.
    pub fn reliability() -> Self {
        BranchingRule::Reliability {
            reliability_count: 4,
            max_sb_iters: 3,
            score_weight: 1.0 / 6.0,
            lookahead: 5,
        }
    }

    /// Whether this rule performs LP resolves while scoring.
    pub fn uses_resolves(&self) -> bool {
        matches!(self, BranchingRule::Reliability { .. } | BranchingRule::Hybrid)
    }

    fn validate(&self) -> MipResult<()> {
        if let BranchingRule::Reliability {
            max_sb_iters,
            score_weight,
            lookahead,
            ..
        } = *self
        {
            if max_sb_iters == 0 {
                return Err(MipError::InvalidConfig(
                    "reliability iteration cap must be at least 1".to_string(),
                ));
            }
            if !(0.0..=1.0).contains(&score_weight) {
                return Err(MipError::InvalidConfig(format!(
                    "reliability score weight must lie in [0, 1], got {}",
                    score_weight
                )));
            }
            if lookahead == 0 {
                return Err(MipError::InvalidConfig(
                    "reliability lookahead must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for BranchingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchingRule::FixedOrder => write!(f, "Fixed order"),
            BranchingRule::MostFractional => write!(f, "Most fractional variable"),
            BranchingRule::Pseudocost => write!(f, "Pseudocost branching"),
            BranchingRule::Reliability {
                reliability_count,
                max_sb_iters,
                score_weight,
                lookahead,
            } => write!(
                f,
                "Reliability branching (eta={}, gamma={}, mu={:.3}, lambda={})",
                reliability_count, max_sb_iters, score_weight, lookahead
            ),
            BranchingRule::Hybrid => write!(f, "Hybrid strong/pseudocost branching"),
        }
    }
}

impl FromStr for BranchingRule {
    type Err = MipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "fixed" | "fixed_order" | "fixed_branching" => Ok(BranchingRule::FixedOrder),
            "most_fractional" => Ok(BranchingRule::MostFractional),
            "pseudocost" | "pseudocost_branching" => Ok(BranchingRule::Pseudocost),
            "reliability" | "reliability_branching" => Ok(BranchingRule::reliability()),
            "hybrid" => Ok(BranchingRule::Hybrid),
            _ => Err(MipError::InvalidConfig(format!(
                "unknown branching strategy '{}'",
                s
            ))),
        }
    }
}

/// Node selection strategy for the B&B tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeSelection {
    /// Deepest node first.
    #[default]
    DepthFirst,

    /// Node with the best (largest) parent bound first.
    BestFirst,

    /// Best pseudocost-projected child bound first.
    BestEstimate,
}

impl fmt::Display for NodeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSelection::DepthFirst => write!(f, "Depth first"),
            NodeSelection::BestFirst => write!(f, "Best first"),
            NodeSelection::BestEstimate => write!(f, "Best estimate"),
        }
    }
}

impl FromStr for NodeSelection {
    type Err = MipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "depth_first" | "dfs" => Ok(NodeSelection::DepthFirst),
            "best_first" | "best_bound" => Ok(NodeSelection::BestFirst),
            "best_estimate" => Ok(NodeSelection::BestEstimate),
            _ => Err(MipError::InvalidConfig(format!(
                "unknown search strategy '{}'",
                s
            ))),
        }
    }
}

/// Simplex variant requested from the master backend.
///
/// Advisory: backends may ignore it. The bundled simplex backend always
/// runs the dual simplex, which capped scoring resolves depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpMode {
    /// Let the backend choose.
    #[default]
    Dynamic,

    /// Primal simplex.
    PrimalSimplex,

    /// Dual simplex.
    DualSimplex,
}

impl FromStr for LpMode {
    type Err = MipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "dynamic" => Ok(LpMode::Dynamic),
            "primal_simplex" | "primal" => Ok(LpMode::PrimalSimplex),
            "dual_simplex" | "dual" => Ok(LpMode::DualSimplex),
            _ => Err(MipError::InvalidConfig(format!("unknown LP mode '{}'", s))),
        }
    }
}

/// Lowercase and map spaces, dashes and camel case humps to underscores.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for ch in s.trim().chars() {
        if ch == ' ' || ch == '-' || ch == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        } else if ch.is_ascii_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_ascii_lowercase();
        }
    }
    out
}

/// MIP solver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MipSettings {
    // === Termination criteria ===
    /// Maximum number of nodes to process.
    pub max_nodes: u64,

    /// Time limit in milliseconds (None = unlimited).
    pub time_limit_ms: Option<u64>,

    /// Integer feasibility tolerance.
    /// A variable is considered integer if |x - round(x)| <= int_feas_tol.
    pub int_feas_tol: f64,

    /// Depth at which a still-fractional node is fathomed.
    ///
    /// None uses the number of variables for binary domains and no limit
    /// otherwise.
    pub depth_limit: Option<usize>,

    // === Search strategy ===
    /// Branching variable selection rule.
    pub branching_rule: BranchingRule,

    /// Node selection strategy.
    pub node_selection: NodeSelection,

    /// Explore every node regardless of bounds.
    pub complete_enumeration: bool,

    /// Restrict every variable to [0, 1] instead of [0, inf).
    pub binary_vars: bool,

    // === LP settings ===
    /// Simplex variant requested from the master backend (advisory).
    pub lp_mode: LpMode,

    /// Settings for full node LP solves.
    #[serde(skip)]
    pub lp_settings: LpSettings,

    // === Output ===
    /// Print progress information.
    pub verbose: bool,

    /// Log frequency (print every N nodes).
    pub log_freq: u64,
}

impl Default for MipSettings {
    fn default() -> Self {
        Self {
            // Termination
            max_nodes: 1_000_000,
            time_limit_ms: None,
            int_feas_tol: 1e-3,
            depth_limit: None,

            // Search
            branching_rule: BranchingRule::default(),
            node_selection: NodeSelection::default(),
            complete_enumeration: false,
            binary_vars: true,

            // LP
            lp_mode: LpMode::default(),
            lp_settings: LpSettings::default(),

            // Output
            verbose: false,
            log_freq: 100,
        }
    }
}

impl MipSettings {
    /// Create settings with verbose output enabled.
    pub fn verbose() -> Self {
        Self {
            verbose: true,
            log_freq: 1,
            ..Self::default()
        }
    }

    /// Build settings from strategy identifiers.
    ///
    /// Unknown identifiers are rejected here, before any search starts.
    pub fn from_names(branching: &str, search: &str) -> MipResult<Self> {
        Ok(Self {
            branching_rule: branching.parse()?,
            node_selection: search.parse()?,
            ..Self::default()
        })
    }

    /// Set the branching rule.
    pub fn with_branching(mut self, rule: BranchingRule) -> Self {
        self.branching_rule = rule;
        self
    }

    /// Set the node selection strategy.
    pub fn with_node_selection(mut self, selection: NodeSelection) -> Self {
        self.node_selection = selection;
        self
    }

    /// Set time limit in seconds.
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_ms = Some((seconds * 1000.0) as u64);
        self
    }

    /// Set maximum nodes.
    pub fn with_max_nodes(mut self, nodes: u64) -> Self {
        self.max_nodes = nodes;
        self
    }

    /// Use `[0, inf)` variable domains.
    pub fn general_integer(mut self) -> Self {
        self.binary_vars = false;
        self
    }

    /// Enable complete enumeration.
    pub fn complete_enumeration(mut self) -> Self {
        self.complete_enumeration = true;
        self
    }

    /// Check parameters before a run.
    pub fn validate(&self) -> MipResult<()> {
        if !(self.int_feas_tol > 0.0 && self.int_feas_tol < 0.5) {
            return Err(MipError::InvalidConfig(format!(
                "int_feas_tol must lie in (0, 0.5), got {}",
                self.int_feas_tol
            )));
        }
        if self.log_freq == 0 {
            return Err(MipError::InvalidConfig("log_freq must be positive".to_string()));
        }
        self.branching_rule.validate()?;
        self.lp_settings.validate().map_err(MipError::InvalidConfig)
    }
}
