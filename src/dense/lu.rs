//! LU solve with partial pivoting, delegated to Faer.

use super::colmat::ColMat;
use crate::error::KError;
use faer::linalg::solvers::{PartialPivLu, SolveCore};
use faer::{Conj, MatMut};
use num_complex::Complex64 as C64;

/// Solve `A x = rhs` for the leading `n × n` block of `a`; `rhs` is overwritten with `x`.
pub fn solve_linear_system(a: &ColMat, n: usize, rhs: &mut [C64]) -> Result<(), KError> {
    if n > a.ld() || n > a.ncols() {
        return Err(KError::numerical("zgesv", -4));
    }
    if rhs.len() < n {
        return Err(KError::numerical("zgesv", -7));
    }
    if !a.is_finite(n, n) {
        return Err(KError::numerical("zgesv", -3));
    }
    let lu = PartialPivLu::new(a.as_faer(n, n));
    let x = &mut rhs[..n];
    lu.solve_in_place_with_conj(Conj::No, MatMut::from_column_major_slice_mut(&mut *x, n, 1));
    if let Some(i) = x.iter().position(|xi| !(xi.re.is_finite() && xi.im.is_finite())) {
        // exactly singular U
        return Err(KError::numerical("zgesv", i as i64 + 1));
    }
    Ok(())
}
