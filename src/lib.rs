//! gmresdr: GMRES with deflated restarting over Faer-backed dense kernels
//!
//! This crate provides a restarted Krylov solver for large sparse complex systems that carries
//! harmonic Ritz vectors across restarts, with the operator, the vector space and the global
//! reductions supplied through traits so the same solver runs on local and distributed fields.

pub mod parallel;

pub mod config;
pub mod core;
pub mod dense;
pub mod error;
pub mod matrix;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use crate::core::*;
pub use dense::{Backend, BackendKind, ColMat, DenseBackend, HostBackend, HouseholderFactor};
pub use error::*;
pub use matrix::*;
pub use solver::*;
pub use utils::*;

#[cfg(feature = "rayon")]
pub use dense::ThreadedBackend;
