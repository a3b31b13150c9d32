//! Householder QR and application of its unitary factor, delegated to Faer.
//!
//! After [`qr_factor`] the leading block of `a` holds `R` in its upper triangle and the
//! Householder basis (unit diagonal implied) below it, as produced by Faer's `qr_in_place`.
//! [`HouseholderFactor`] keeps the block factors, so that `Q = H(0) H(1) ... H(k-1)`.
//!
//! Any leading `k` reflectors form a valid sequence on their own, and a reflector whose
//! trailing rows are zero may be applied at a shorter order.

use super::colmat::ColMat;
use super::{Side, Trans};
use crate::error::KError;
use faer::dyn_stack::{MemBuffer, MemStack};
use faer::linalg::householder;
use faer::linalg::qr::no_pivoting::factor::{qr_in_place, qr_in_place_scratch, recommended_blocksize};
use faer::{Conj, Mat, Par};
use num_complex::Complex64 as C64;

/// Block Householder factors of the last [`qr_factor`] call.
#[derive(Clone, Debug)]
pub struct HouseholderFactor {
    t: Mat<C64>,
}

impl Default for HouseholderFactor {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseholderFactor {
    pub fn new() -> Self {
        Self { t: Mat::zeros(1, 0) }
    }

    /// Number of stored reflectors.
    pub fn len(&self) -> usize {
        self.t.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.t.ncols() == 0
    }
}

/// Householder QR of the leading `nrows × ncols` block of `a`, in place.
pub fn qr_factor(a: &mut ColMat, nrows: usize, ncols: usize, factor: &mut HouseholderFactor) -> Result<(), KError> {
    if ncols > nrows || nrows > a.ld() || ncols > a.ncols() {
        return Err(KError::numerical("zgeqrf", -2));
    }
    if !a.is_finite(nrows, ncols) {
        return Err(KError::numerical("zgeqrf", -4));
    }
    let blocksize = recommended_blocksize::<C64>(nrows, ncols);
    factor.t = Mat::zeros(blocksize, ncols);
    let par = Par::Seq;
    let mut mem = MemBuffer::new(qr_in_place_scratch::<C64>(nrows, ncols, blocksize, par, Default::default()));
    qr_in_place(
        a.as_faer_mut(nrows, ncols),
        factor.t.as_mut(),
        par,
        MemStack::new(&mut mem),
        Default::default(),
    );
    Ok(())
}

/// Apply `Q` or `Qᴴ` built from the first `k` reflectors of `qr` to the leading
/// `nrows × ncols` block of `c`, from the given side.
///
/// The order of `Q` is `nrows` for [`Side::Left`] and `ncols` for [`Side::Right`]; only the
/// leading `order` rows of each stored reflector are used.
#[allow(clippy::too_many_arguments)]
pub fn apply_q(
    side: Side,
    trans: Trans,
    qr: &ColMat,
    k: usize,
    factor: &HouseholderFactor,
    c: &mut ColMat,
    nrows: usize,
    ncols: usize,
) -> Result<(), KError> {
    let order = match side {
        Side::Left => nrows,
        Side::Right => ncols,
    };
    if k > order || k > qr.ncols() || order > qr.ld() {
        return Err(KError::numerical("zunmqr", -5));
    }
    if nrows > c.ld() || ncols > c.ncols() {
        return Err(KError::numerical("zunmqr", -10));
    }
    if k > factor.len() {
        return Err(KError::numerical("zunmqr", -9));
    }
    if k == 0 {
        return Ok(());
    }

    let basis = qr.as_faer(order, k);
    let t = factor.t.as_ref().subcols(0, k);
    let blocksize = t.nrows();
    let par = Par::Seq;
    let req = match side {
        Side::Left => householder::apply_block_householder_sequence_on_the_left_in_place_scratch::<C64>(order, blocksize, ncols),
        Side::Right => householder::apply_block_householder_sequence_on_the_right_in_place_scratch::<C64>(order, blocksize, nrows),
    };
    let mut mem = MemBuffer::new(req);
    let stack = MemStack::new(&mut mem);
    let target = c.as_faer_mut(nrows, ncols);

    match (side, trans) {
        (Side::Left, Trans::NoTrans) => {
            householder::apply_block_householder_sequence_on_the_left_in_place_with_conj(basis, t, Conj::No, target, par, stack)
        }
        (Side::Left, Trans::ConjTrans) => householder::apply_block_householder_sequence_transpose_on_the_left_in_place_with_conj(
            basis,
            t,
            Conj::Yes,
            target,
            par,
            stack,
        ),
        (Side::Right, Trans::NoTrans) => {
            householder::apply_block_householder_sequence_on_the_right_in_place_with_conj(basis, t, Conj::No, target, par, stack)
        }
        (Side::Right, Trans::ConjTrans) => householder::apply_block_householder_sequence_transpose_on_the_right_in_place_with_conj(
            basis,
            t,
            Conj::Yes,
            target,
            par,
            stack,
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::{One, Zero};

    fn sample(ld: usize, nrows: usize, ncols: usize) -> ColMat {
        ColMat::from_fn(ld, nrows, ncols, |i, j| {
            C64::new((i as f64 + 1.0) * 0.7 - j as f64, ((i * 3 + j) % 5) as f64 * 0.3 - 0.5)
        })
    }

    fn upper(qr: &ColMat, n: usize) -> ColMat {
        let mut r = ColMat::zeros(qr.ld(), n);
        for j in 0..n {
            for i in 0..=j {
                r[(i, j)] = qr[(i, j)];
            }
        }
        r
    }

    #[test]
    fn qr_reconstructs_input() {
        let (ld, m, n) = (7, 6, 4);
        let a0 = sample(ld, m, n);
        let mut qr = a0.clone();
        let mut factor = HouseholderFactor::new();
        qr_factor(&mut qr, m, n, &mut factor).unwrap();
        assert_eq!(factor.len(), n);
        let mut r = upper(&qr, n);
        apply_q(Side::Left, Trans::NoTrans, &qr, n, &factor, &mut r, m, n).unwrap();
        for j in 0..n {
            for i in 0..m {
                assert!((r[(i, j)] - a0[(i, j)]).norm() < 1e-12, "({i},{j})");
            }
        }
    }

    #[test]
    fn explicit_q_is_unitary_and_sides_agree() {
        let (ld, m, n) = (6, 6, 3);
        let mut qr = sample(ld, m, n);
        let mut factor = HouseholderFactor::new();
        qr_factor(&mut qr, m, n, &mut factor).unwrap();
        let mut q_left = ColMat::identity(ld, m);
        apply_q(Side::Left, Trans::NoTrans, &qr, n, &factor, &mut q_left, m, m).unwrap();
        let mut q_right = ColMat::identity(ld, m);
        apply_q(Side::Right, Trans::NoTrans, &qr, n, &factor, &mut q_right, m, m).unwrap();
        for j in 0..m {
            for i in 0..m {
                assert!((q_left[(i, j)] - q_right[(i, j)]).norm() < 1e-12);
            }
        }
        // Qᴴ Q = I, and Q Qᴴ = I from the right
        let mut qhq = q_left.clone();
        apply_q(Side::Left, Trans::ConjTrans, &qr, n, &factor, &mut qhq, m, m).unwrap();
        let mut qqh = q_left.clone();
        apply_q(Side::Right, Trans::ConjTrans, &qr, n, &factor, &mut qqh, m, m).unwrap();
        for j in 0..m {
            for i in 0..m {
                let expected = if i == j { C64::one() } else { C64::zero() };
                assert!((qhq[(i, j)] - expected).norm() < 1e-12);
                assert!((qqh[(i, j)] - expected).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn leading_reflectors_apply_at_shorter_order() {
        // last row zero in the first two columns: their reflectors stay inside the leading block
        let (m, n) = (7, 3);
        let mut a0 = sample(m, m, n);
        a0[(m - 1, 0)] = C64::zero();
        a0[(m - 1, 1)] = C64::zero();
        let mut qr = a0.clone();
        let mut factor = HouseholderFactor::new();
        qr_factor(&mut qr, m, n, &mut factor).unwrap();

        let mut full = ColMat::identity(m, m);
        apply_q(Side::Right, Trans::NoTrans, &qr, 2, &factor, &mut full, m, m).unwrap();
        let mut short = ColMat::identity(m, m - 1);
        apply_q(Side::Right, Trans::NoTrans, &qr, 2, &factor, &mut short, m - 1, m - 1).unwrap();
        for j in 0..m - 1 {
            for i in 0..m - 1 {
                assert!((full[(i, j)] - short[(i, j)]).norm() < 1e-12);
            }
        }
    }

    #[test]
    fn qr_rejects_wide_block() {
        let mut a = sample(4, 3, 4);
        let mut factor = HouseholderFactor::new();
        let err = qr_factor(&mut a, 3, 4, &mut factor).unwrap_err();
        assert!(matches!(err, KError::NumericalFailure { routine: "zgeqrf", .. }));
    }

    #[test]
    fn apply_rejects_missing_reflectors() {
        let mut qr = sample(5, 5, 2);
        let mut factor = HouseholderFactor::new();
        qr_factor(&mut qr, 5, 2, &mut factor).unwrap();
        let mut c = ColMat::identity(5, 5);
        let err = apply_q(Side::Left, Trans::NoTrans, &qr, 3, &factor, &mut c, 5, 5).unwrap_err();
        assert!(matches!(err, KError::NumericalFailure { routine: "zunmqr", .. }));
    }
}
