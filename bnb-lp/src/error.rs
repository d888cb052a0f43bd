//! Error types for the LP engine.

use thiserror::Error;

/// Errors raised before or during an LP solve.
///
/// Solve outcomes such as infeasibility or hitting the iteration cap are not
/// errors; they are reported through [`crate::LpStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    /// Problem data failed validation.
    #[error("Invalid LP: {0}")]
    InvalidProblem(String),

    /// Settings are out of range.
    #[error("Invalid LP settings: {0}")]
    InvalidSettings(String),
}

/// Result type for LP operations.
pub type LpResult<T> = Result<T, LpError>;
