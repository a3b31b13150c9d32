//! Blocked in-place basis rotation `V[:, 0..ncols] ← V[:, 0..nrows] · Q`.
//!
//! The local vector length is walked in contiguous row blocks; each block of the product is
//! staged in a scratch buffer and written back before the next block is read, so the scratch
//! holds `block_len × ncols` entries regardless of the vector length.

use super::colmat::ColMat;
use crate::core::traits::FieldVector;
use crate::error::KError;
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// Default row-block length: `(2·len + (2·nev)²) / (2·nev)`, at least one row.
pub fn default_block_len(local_len: usize, nev: usize) -> usize {
    let two_nev = 2 * nev.max(1);
    ((2 * local_len + two_nev * two_nev) / two_nev).max(1)
}

fn check<V: FieldVector>(basis: &[V], q: &ColMat, nrows: usize, ncols: usize) -> Result<usize, KError> {
    if nrows > basis.len() || ncols > nrows {
        return Err(KError::numerical("zgemm", -4));
    }
    if nrows > q.ld() || ncols > q.ncols() {
        return Err(KError::numerical("zgemm", -8));
    }
    let len = basis.first().map_or(0, |v| v.as_ref().len());
    if basis[..nrows].iter().any(|v| v.as_ref().len() != len) {
        return Err(KError::DimensionMismatch("basis vectors differ in length".into()));
    }
    Ok(len)
}

fn stage_column<V: FieldVector>(basis: &[V], q: &ColMat, nrows: usize, c: usize, r0: usize, out: &mut [C64]) {
    out.fill(C64::zero());
    let qc = q.col(c);
    for (i, v) in basis[..nrows].iter().enumerate() {
        let coef = qc[i];
        if coef.is_zero() {
            continue;
        }
        let src = &v.as_ref()[r0..r0 + out.len()];
        for (o, s) in out.iter_mut().zip(src) {
            *o += s * coef;
        }
    }
}

fn write_back<V: FieldVector>(basis: &mut [V], stage: &[C64], ncols: usize, bl: usize, r0: usize) {
    for (c, v) in basis[..ncols].iter_mut().enumerate() {
        v.as_mut()[r0..r0 + bl].copy_from_slice(&stage[c * bl..(c + 1) * bl]);
    }
}

/// Sequential blocked rotation.
pub fn gemm_block_serial<V: FieldVector>(
    basis: &mut [V],
    q: &ColMat,
    nrows: usize,
    ncols: usize,
    block_len: usize,
) -> Result<(), KError> {
    let len = check(basis, q, nrows, ncols)?;
    let block_len = block_len.max(1);
    let mut stage = vec![C64::zero(); block_len * ncols];
    let mut r0 = 0;
    while r0 < len {
        let bl = block_len.min(len - r0);
        for c in 0..ncols {
            stage_column(basis, q, nrows, c, r0, &mut stage[c * bl..(c + 1) * bl]);
        }
        write_back(basis, &stage, ncols, bl, r0);
        r0 += bl;
    }
    Ok(())
}

/// Blocked rotation with the output columns of each block computed in parallel.
#[cfg(feature = "rayon")]
pub fn gemm_block_parallel<V: FieldVector>(
    basis: &mut [V],
    q: &ColMat,
    nrows: usize,
    ncols: usize,
    block_len: usize,
) -> Result<(), KError> {
    use rayon::prelude::*;

    let len = check(basis, q, nrows, ncols)?;
    let block_len = block_len.max(1);
    let mut stage = vec![C64::zero(); block_len * ncols];
    let mut r0 = 0;
    while r0 < len {
        let bl = block_len.min(len - r0);
        {
            let src: &[V] = basis;
            stage[..bl * ncols]
                .par_chunks_mut(bl)
                .enumerate()
                .for_each(|(c, out)| stage_column(src, q, nrows, c, r0, out));
        }
        write_back(basis, &stage, ncols, bl, r0);
        r0 += bl;
    }
    Ok(())
}
