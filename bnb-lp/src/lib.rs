//! LP relaxation engine for the branch-and-bound layer.
//!
//! Solves linear programs in bounded inequality form
//!
//! ```text
//! minimize    c^T x
//! subject to  A x <= b
//!             lb <= x <= ub
//! ```
//!
//! with a dense bounded dual simplex. Every iterate is dual feasible, so a
//! solve stopped by the iteration cap still reports a valid lower bound,
//! which is what strong and reliability branching rely on for their cheap
//! partial solves.
//!
//! # Example
//!
//! ```
//! use bnb_lp::{solve, LpData, LpSettings, LpStatus};
//! use sprs::TriMat;
//!
//! // max x0 + x1 s.t. x0 + x1 <= 1, 0 <= x <= 1
//! let mut a = TriMat::new((1, 2));
//! a.add_triplet(0, 0, 1.0);
//! a.add_triplet(0, 1, 1.0);
//! let lp = LpData {
//!     c: vec![-1.0, -1.0],
//!     A: a.to_csr(),
//!     b: vec![1.0],
//!     lb: vec![0.0, 0.0],
//!     ub: vec![1.0, 1.0],
//! };
//!
//! let result = solve(&lp, &LpSettings::default()).unwrap();
//! assert_eq!(result.status, LpStatus::Optimal);
//! assert!((result.obj_val + 1.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod problem;
pub mod simplex;

pub use error::{LpError, LpResult};
pub use problem::{LpData, LpSettings, LpSolveResult, LpStatus, SparseMatrix};
pub use simplex::solve;
