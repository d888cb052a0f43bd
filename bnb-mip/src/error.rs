//! Error types for the MIP solver.

use thiserror::Error;

/// Errors that can occur during MIP solving.
///
/// Node-level LP outcomes (infeasible, iteration limit, numerical trouble)
/// are classified into node statuses and never surface here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MipError {
    /// Problem validation failed
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    /// Unknown strategy identifier or out-of-range parameter
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Master LP backend rejected its input
    #[error("Master solve failed: {0}")]
    MasterSolveError(String),

    /// Internal solver error
    #[error("Internal error: {0}")]
    InternalError(String),

    /// LP engine error
    #[error("LP engine error: {0}")]
    Lp(#[from] bnb_lp::LpError),
}

/// Result type for MIP operations.
pub type MipResult<T> = Result<T, MipError>;
