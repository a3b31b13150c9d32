//! API options for the GMRES-DR solver.
//!
//! This module provides the `GmresDrOptions` struct, which fixes the Krylov subspace dimension,
//! the number of deflation vectors, the dense buffer layout, the stopping criteria and the dense
//! backend. Options are built with `with_*` methods and checked once by [`GmresDrOptions::validate`]
//! when the solver is constructed.

use crate::dense::BackendKind;
use crate::error::KError;

/// Largest number of harmonic Ritz vectors kept across a restart.
pub const MAX_EIGENVEC_WINDOW: usize = 64;

/// GMRES-DR parameters.
#[derive(Clone, Debug)]
pub struct GmresDrOptions {
    /// Krylov subspace dimension per cycle.
    pub m: usize,

    /// Number of harmonic Ritz vectors carried over a restart.
    pub nev: usize,

    /// Leading dimension of the Hessenberg buffers; `None` means `m + 1`.
    pub ldm: Option<usize>,

    /// Maximum number of cycles, the first one included.
    pub max_cycles: usize,

    /// Relative residual tolerance, ‖b − A x‖ ≤ tol ‖b‖.
    pub tol: f64,

    /// Dense kernel implementation.
    pub backend: BackendKind,

    /// Row-block length of the basis rotation; `None` uses `(2·len + (2·nev)²) / (2·nev)`.
    pub gemm_block_len: Option<usize>,

    /// Arnoldi breakdown threshold on ‖w‖ / ‖A v_j‖, the new direction relative to the
    /// operator image it was orthogonalized from.
    pub breakdown_tol: f64,
}

impl Default for GmresDrOptions {
    fn default() -> Self {
        Self {
            m: 30,
            nev: 8,
            ldm: None,
            max_cycles: 100,
            tol: 1e-10,
            backend: BackendKind::Host,
            gemm_block_len: None,
            breakdown_tol: 1e-14,
        }
    }
}

impl GmresDrOptions {
    pub fn new(m: usize, nev: usize) -> Self {
        Self {
            m,
            nev,
            ..Self::default()
        }
    }

    pub fn with_ldm(mut self, ldm: usize) -> Self {
        self.ldm = Some(ldm);
        self
    }

    pub fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_gemm_block_len(mut self, len: usize) -> Self {
        self.gemm_block_len = Some(len);
        self
    }

    pub fn with_breakdown_tol(mut self, breakdown_tol: f64) -> Self {
        self.breakdown_tol = breakdown_tol;
        self
    }

    /// Effective leading dimension.
    pub fn leading_dim(&self) -> usize {
        self.ldm.unwrap_or(self.m + 1)
    }

    pub fn validate(&self) -> Result<(), KError> {
        if self.m == 0 {
            return Err(KError::Configuration("m must be positive".into()));
        }
        if self.nev == 0 {
            return Err(KError::Configuration("nev must be positive".into()));
        }
        if self.nev >= self.m {
            return Err(KError::Configuration(format!(
                "nev ({}) must be smaller than m ({})",
                self.nev, self.m
            )));
        }
        if self.nev > MAX_EIGENVEC_WINDOW {
            return Err(KError::Configuration(format!(
                "nev ({}) exceeds the eigenvector window ({MAX_EIGENVEC_WINDOW})",
                self.nev
            )));
        }
        if self.leading_dim() < self.m + 1 {
            return Err(KError::Configuration(format!(
                "ldm ({}) must be at least m + 1 ({})",
                self.leading_dim(),
                self.m + 1
            )));
        }
        if !(self.tol > 0.0) {
            return Err(KError::Configuration("tolerance must be positive".into()));
        }
        if self.max_cycles == 0 {
            return Err(KError::Configuration("max_cycles must be positive".into()));
        }
        if self.gemm_block_len == Some(0) {
            return Err(KError::Configuration("gemm_block_len must be positive".into()));
        }
        if !(self.breakdown_tol >= 0.0) {
            return Err(KError::Configuration("breakdown_tol must be non-negative".into()));
        }
        Ok(())
    }
}
