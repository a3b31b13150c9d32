//! Solver configuration.

pub mod options;

pub use options::{GmresDrOptions, MAX_EIGENVEC_WINDOW};
