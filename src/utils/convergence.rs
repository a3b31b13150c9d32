//! Convergence tracking & tolerance checks for the restarted solver.

/// Stopping criteria.
#[derive(Copy, Clone, Debug)]
pub struct Convergence {
    pub tol: f64,
    pub max_cycles: usize,
}

/// Terminal state of a solve.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    Converged,
    /// `max_cycles` reached; `x` holds the best iterate found.
    NonConvergence,
}

#[derive(Clone, Debug)]
pub struct SolveStats {
    /// Arnoldi steps over all cycles.
    pub iterations: usize,
    pub cycles: usize,
    /// ‖b − A x‖ / ‖b‖ with the precise operator.
    pub final_residual: f64,
    pub status: SolveStatus,
    /// Relative true residual at the end of each cycle.
    pub history: Vec<f64>,
}

impl SolveStats {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

impl Convergence {
    /// Squared absolute threshold `tol² ‖b‖²` for a right-hand side with `‖b‖² = b_norm2`.
    pub fn threshold(&self, b_norm2: f64) -> f64 {
        self.tol * self.tol * b_norm2
    }

    /// Returns (should_stop, status) after cycle `cycle` (1-based) with squared residual `r2`.
    pub fn check(&self, r2: f64, b_norm2: f64, cycle: usize) -> (bool, SolveStatus) {
        if r2 <= self.threshold(b_norm2) {
            (true, SolveStatus::Converged)
        } else {
            (cycle >= self.max_cycles, SolveStatus::NonConvergence)
        }
    }
}
