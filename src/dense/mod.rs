//! Dense linear-algebra kernels behind the restart logic.
//!
//! All kernels work in complex double precision on [`ColMat`] buffers. The solver reaches them
//! through the [`DenseBackend`] trait; [`Backend`] dispatches to the implementation selected by
//! [`BackendKind`] in the solver options.
//!
//! # Kernels
//! - Householder QR and application of its unitary factor (Faer)
//! - General complex eigen-decomposition, right eigenvectors (Faer)
//! - LU solve with partial pivoting (Faer)
//! - Blocked basis rotation `V ← V Q`
//!
//! Failures carry the name of the equivalent LAPACK routine and an `info` code in its
//! convention.

pub mod colmat;
pub mod eigen;
pub mod gemm;
pub mod householder;
pub mod lu;

pub use colmat::ColMat;
pub use eigen::EigenPairs;
pub use householder::HouseholderFactor;

use crate::core::traits::{FieldVector, Precision};
use crate::error::KError;
use num_complex::Complex64 as C64;

/// Side from which an implicit unitary factor is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Whether the factor or its conjugate transpose is applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Trans {
    NoTrans,
    ConjTrans,
}

/// Dense kernels used by the harmonic Ritz engine and the restart projector.
pub trait DenseBackend {
    /// Working precision of every kernel.
    fn precision(&self) -> Precision {
        Precision::Double
    }

    fn qr_factor(
        &self,
        a: &mut ColMat,
        nrows: usize,
        ncols: usize,
        factor: &mut HouseholderFactor,
    ) -> Result<(), KError> {
        householder::qr_factor(a, nrows, ncols, factor)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_q(
        &self,
        side: Side,
        trans: Trans,
        qr: &ColMat,
        k: usize,
        factor: &HouseholderFactor,
        c: &mut ColMat,
        nrows: usize,
        ncols: usize,
    ) -> Result<(), KError> {
        householder::apply_q(side, trans, qr, k, factor, c, nrows, ncols)
    }

    fn eig(&self, a: &ColMat, n: usize) -> Result<EigenPairs, KError> {
        eigen::eig(a, n)
    }

    fn solve_linear_system(&self, a: &ColMat, n: usize, rhs: &mut [C64]) -> Result<(), KError> {
        lu::solve_linear_system(a, n, rhs)
    }

    /// `basis[0..ncols] ← basis[0..nrows] · q[0..nrows, 0..ncols]`, processed in row blocks of
    /// `block_len` entries.
    fn gemm_block<V: FieldVector>(
        &self,
        basis: &mut [V],
        q: &ColMat,
        nrows: usize,
        ncols: usize,
        block_len: usize,
    ) -> Result<(), KError>;
}

/// Sequential kernels.
#[derive(Copy, Clone, Debug, Default)]
pub struct HostBackend;

impl DenseBackend for HostBackend {
    fn gemm_block<V: FieldVector>(
        &self,
        basis: &mut [V],
        q: &ColMat,
        nrows: usize,
        ncols: usize,
        block_len: usize,
    ) -> Result<(), KError> {
        gemm::gemm_block_serial(basis, q, nrows, ncols, block_len)
    }
}

/// Kernels with a Rayon-parallel basis rotation.
#[cfg(feature = "rayon")]
#[derive(Copy, Clone, Debug, Default)]
pub struct ThreadedBackend;

#[cfg(feature = "rayon")]
impl DenseBackend for ThreadedBackend {
    fn gemm_block<V: FieldVector>(
        &self,
        basis: &mut [V],
        q: &ColMat,
        nrows: usize,
        ncols: usize,
        block_len: usize,
    ) -> Result<(), KError> {
        gemm::gemm_block_parallel(basis, q, nrows, ncols, block_len)
    }
}

/// Backend selector carried by the solver options.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    #[default]
    Host,
    Threaded,
}

/// Backend chosen at run time.
#[derive(Copy, Clone, Debug)]
pub enum Backend {
    Host(HostBackend),
    #[cfg(feature = "rayon")]
    Threaded(ThreadedBackend),
}

impl Backend {
    pub fn from_kind(kind: BackendKind) -> Result<Self, KError> {
        match kind {
            BackendKind::Host => Ok(Backend::Host(HostBackend)),
            #[cfg(feature = "rayon")]
            BackendKind::Threaded => Ok(Backend::Threaded(ThreadedBackend)),
            #[cfg(not(feature = "rayon"))]
            BackendKind::Threaded => Err(KError::Configuration(
                "threaded dense backend requires the `rayon` feature".into(),
            )),
        }
    }
}

impl DenseBackend for Backend {
    fn gemm_block<V: FieldVector>(
        &self,
        basis: &mut [V],
        q: &ColMat,
        nrows: usize,
        ncols: usize,
        block_len: usize,
    ) -> Result<(), KError> {
        match self {
            Backend::Host(b) => b.gemm_block(basis, q, nrows, ncols, block_len),
            #[cfg(feature = "rayon")]
            Backend::Threaded(b) => b.gemm_block(basis, q, nrows, ncols, block_len),
        }
    }
}
