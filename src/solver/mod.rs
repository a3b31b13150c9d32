//! GMRES-DR and its building blocks.
//!
//! Leaf first: [`hessenberg`] stores the projected matrix, [`harmonic`] extracts the deflation
//! subspace from it, [`restart`] compresses the basis onto that subspace, [`givens`] keeps the
//! least-squares problem triangular, and [`gmresdr`] drives the cycles.

pub mod givens;
pub mod gmresdr;
pub mod harmonic;
pub mod hessenberg;
pub mod restart;

pub use givens::GivensState;
pub use gmresdr::GmresDrSolver;
pub use harmonic::{DeflationSpace, HarmonicRitzEngine, sort_by_modulus};
pub use hessenberg::HessenbergStore;
pub use restart::{RestartProjector, reorthonormalize};
