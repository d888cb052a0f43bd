//! LP relaxation oracle with solve accounting.

use super::{MasterBackend, MasterResult, NodeBounds};
use crate::error::{MipError, MipResult};
use crate::model::MipProblem;

/// Wraps a master backend and counts LP work for the search.
///
/// Node solves always count as LP solves; scoring resolves only count when
/// they reach an optimal basis. The iteration average covers every call.
#[derive(Debug)]
pub struct RelaxationOracle<B> {
    backend: B,

    /// LP solves counted for statistics.
    lp_solves: u64,

    /// Backend calls of any kind.
    calls: u64,

    /// Simplex iterations over all calls.
    iterations: u64,
}

impl<B: MasterBackend> RelaxationOracle<B> {
    /// Create an oracle over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lp_solves: 0,
            calls: 0,
            iterations: 0,
        }
    }

    /// Solve a node relaxation to completion.
    pub fn solve_node(&mut self, prob: &MipProblem, bounds: &NodeBounds) -> MipResult<MasterResult> {
        let res = self.call(prob, bounds, None)?;
        self.lp_solves += 1;
        Ok(res)
    }

    /// Solve a child relaxation with an iteration cap while scoring
    /// branching candidates.
    pub fn resolve(
        &mut self,
        prob: &MipProblem,
        bounds: &NodeBounds,
        iteration_cap: usize,
    ) -> MipResult<MasterResult> {
        let res = self.call(prob, bounds, Some(iteration_cap.max(1)))?;
        if res.is_optimal() {
            self.lp_solves += 1;
        }
        Ok(res)
    }

    fn call(
        &mut self,
        prob: &MipProblem,
        bounds: &NodeBounds,
        cap: Option<usize>,
    ) -> MipResult<MasterResult> {
        let res = self.backend.solve(prob, bounds, cap)?;
        if res.has_bound() && res.x.len() != prob.num_vars() {
            return Err(MipError::MasterSolveError(format!(
                "backend returned {} values for {} variables",
                res.x.len(),
                prob.num_vars()
            )));
        }
        self.calls += 1;
        self.iterations += res.iterations as u64;
        log::trace!(
            "LP call {}: {:?}, obj {:.7}, {} iterations (cap {:?})",
            self.calls,
            res.status,
            res.obj_val,
            res.iterations,
            cap
        );
        Ok(res)
    }

    /// Running average of simplex iterations per call.
    pub fn average_iterations(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.iterations as f64 / self.calls as f64
        }
    }

    /// LP solves counted so far.
    pub fn lp_solves(&self) -> u64 {
        self.lp_solves
    }

    /// Simplex iterations so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Access the wrapped backend.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::{MasterStatus, SimplexMasterBackend};

    #[test]
    fn test_accounting() {
        let prob = MipProblem::from_dense(
            vec![1.0, 1.0],
            &[vec![2.0, 1.0], vec![1.0, 2.0]],
            vec![2.0, 2.0],
        )
        .unwrap();
        let bounds = NodeBounds::root(&prob, false);
        let mut oracle = RelaxationOracle::new(SimplexMasterBackend::default());

        let full = oracle.solve_node(&prob, &bounds).unwrap();
        assert_eq!(full.status, MasterStatus::Optimal);
        assert_eq!(oracle.lp_solves(), 1);
        let full_iters = full.iterations as f64;
        assert!((oracle.average_iterations() - full_iters).abs() < 1e-12);

        let capped = oracle.resolve(&prob, &bounds, 1).unwrap();
        assert_eq!(capped.status, MasterStatus::IterationLimit);
        // Capped resolves are not counted as LP solves
        assert_eq!(oracle.lp_solves(), 1);
        assert!((oracle.average_iterations() - (full_iters + 1.0) / 2.0).abs() < 1e-12);
    }

    struct TruncatingBackend;

    impl MasterBackend for TruncatingBackend {
        fn solve(
            &mut self,
            _prob: &MipProblem,
            _bounds: &NodeBounds,
            _iteration_cap: Option<usize>,
        ) -> MipResult<MasterResult> {
            Ok(MasterResult {
                status: MasterStatus::Optimal,
                x: vec![0.0],
                obj_val: 0.0,
                iterations: 0,
            })
        }
    }

    #[test]
    fn test_malformed_backend_result() {
        let prob = MipProblem::from_dense(vec![1.0, 1.0], &[vec![1.0, 1.0]], vec![1.0]).unwrap();
        let bounds = NodeBounds::root(&prob, true);
        let mut oracle = RelaxationOracle::new(TruncatingBackend);

        let err = oracle.solve_node(&prob, &bounds).unwrap_err();
        assert!(matches!(err, MipError::MasterSolveError(_)));
        assert_eq!(oracle.lp_solves(), 0);
    }
}
