//! Reference operators: dense (Faer), sparse CSR and diagonal.

pub mod dense;
pub mod sparse;

pub use dense::{DiagonalOperator, dense_from_fn};
pub use sparse::CsrMatrix;
