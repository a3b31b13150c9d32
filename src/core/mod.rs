//! Core traits, the Krylov basis container and reference vector spaces.

pub mod basis;
pub mod traits;
pub mod wrappers;

pub use basis::KrylovBasis;
pub use traits::{FieldVector, MatVec, Precision, VectorSpace};
pub use wrappers::{DistributedSpace, LocalSpace};
