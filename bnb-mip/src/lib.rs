//! Branch-and-bound solver for mixed-integer linear programs.
//!
//! Maximizes a linear objective over `A x <= b`, `x >= 0` with integrality
//! on some or all variables by exploring a tree of LP relaxations. The
//! search supports:
//!
//! - **Branching rules**: fixed order, most fractional, pseudocost,
//!   reliability branching and hybrid strong/pseudocost branching
//! - **Node selection**: depth first, best first and best estimate
//! - **Complete enumeration** for teaching and inspection
//! - **Tree events** so an external renderer can rebuild the search tree
//!
//! LP relaxations are solved through the [`MasterBackend`] trait; the
//! bundled [`SimplexMasterBackend`] uses the dual simplex of `bnb-lp`.
//!
//! # Example
//!
//! ```
//! use bnb_mip::{solve_mip, MipProblem, MipSettings, MipStatus};
//!
//! // max 3x0 + 2x1 s.t. 2x0 + x1 <= 4, x0 + 2x1 <= 4, x binary
//! let prob = MipProblem::new(
//!     vec![3.0, 2.0],
//!     vec![("c0", vec![2.0, 1.0]), ("c1", vec![1.0, 2.0])],
//!     vec![4.0, 4.0],
//! )
//! .unwrap();
//!
//! let settings = MipSettings::from_names("pseudocost", "best first").unwrap();
//! let sol = solve_mip(&prob, &settings).unwrap();
//! assert_eq!(sol.status, MipStatus::Optimal);
//! assert!((sol.obj_val - 5.0).abs() < 1e-6);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod master;
pub mod model;
pub mod search;
pub mod settings;

pub use error::{MipError, MipResult};
pub use master::{MasterBackend, MasterResult, MasterStatus, NodeBounds, SimplexMasterBackend};
pub use model::{MipProblem, MipSolution, MipStatus, SearchStats, VarType};
pub use search::{BranchAndBound, NoopObserver, TreeEvent, TreeObserver};
pub use settings::{BranchingRule, LpMode, MipSettings, NodeSelection};

/// Solve a MILP with the bundled simplex backend.
pub fn solve_mip(problem: &MipProblem, settings: &MipSettings) -> MipResult<MipSolution> {
    let backend = SimplexMasterBackend::new(settings.lp_settings.clone());
    solve_mip_with(problem, settings, backend, NoopObserver)
}

/// Solve a MILP with a custom LP backend and tree event sink.
///
/// Settings are validated before any node is created, so configuration
/// errors never leave a partial run behind.
pub fn solve_mip_with<B, O>(
    problem: &MipProblem,
    settings: &MipSettings,
    backend: B,
    observer: O,
) -> MipResult<MipSolution>
where
    B: MasterBackend,
    O: TreeObserver,
{
    settings.validate()?;
    BranchAndBound::new(problem, settings.clone(), backend, observer).solve()
}
