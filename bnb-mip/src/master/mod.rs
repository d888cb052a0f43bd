//! Master problem (LP relaxation) management.

mod backend;
mod oracle;
mod simplex_backend;

pub use backend::{MasterBackend, MasterResult, MasterStatus, NodeBounds};
pub use oracle::RelaxationOracle;
pub use simplex_backend::SimplexMasterBackend;
