//! Compression of the Krylov basis and `H` onto the deflation subspace.
//!
//! With `P` the `(m+1) × (nev+1)` matrix whose first `nev` columns are harmonic Ritz vectors
//! (last row zero) and whose last column is the short residual, the restart orthonormalizes
//! `P = Q R` and replaces
//!
//! - `V[:, 0..=nev] ← V Q`,
//! - `H ← Qᴴ H Q_nev` over the `(nev+1) × nev` leading block,
//!
//! so that `A V_nev = V_{nev+1} H` holds again and the next cycle can resume Arnoldi at `nev`.

use crate::core::basis::KrylovBasis;
use crate::core::traits::{FieldVector, VectorSpace};
use crate::dense::{ColMat, DenseBackend, HouseholderFactor, Side, Trans};
use crate::error::KError;
use crate::solver::harmonic::DeflationSpace;
use crate::solver::hessenberg::HessenbergStore;
use num_complex::Complex64 as C64;
use num_traits::Zero;

#[derive(Copy, Clone, Debug)]
pub struct RestartProjector {
    /// Row-block length of the basis rotation.
    pub block_len: usize,
}

impl RestartProjector {
    pub fn new(block_len: usize) -> Self {
        Self { block_len }
    }

    /// Compress `basis` and `store` onto `deflation` after a cycle whose least-squares solution
    /// is `lsq`, writing the cycle's residual vector into `residual`.
    #[allow(clippy::too_many_arguments)]
    pub fn restart<V, S, B>(
        &self,
        basis: &mut KrylovBasis<V>,
        space: &S,
        store: &mut HessenbergStore,
        deflation: &mut DeflationSpace,
        lsq: &[C64],
        residual: &mut V,
        backend: &B,
    ) -> Result<(), KError>
    where
        V: FieldVector,
        S: VectorSpace<V>,
        B: DenseBackend,
    {
        if space.precision() != backend.precision() {
            return Err(KError::PrecisionMismatch {
                basis: space.precision(),
                dense: backend.precision(),
            });
        }
        let m = store.m();
        let nev = deflation.nev();

        // s ← s − H lsq
        {
            let h = store.matrix();
            let s = deflation.short_residual_mut();
            for i in 0..m {
                let li = lsq[i];
                if li.is_zero() {
                    continue;
                }
                for (j, sj) in s.iter_mut().enumerate().take(m + 1) {
                    *sj -= h[(j, i)] * li;
                }
            }
        }

        space.zero(residual);
        for (i, si) in deflation.short_residual()[..=m].iter().enumerate() {
            space.axpy(*si, basis.index(i), residual);
        }

        let mut factor = HouseholderFactor::new();
        backend.qr_factor(deflation.matrix_mut(), m + 1, nev + 1, &mut factor)?;
        let qr = deflation.matrix();

        let mut q = ColMat::identity(store.ld(), m + 1);
        backend.apply_q(Side::Right, Trans::NoTrans, qr, nev + 1, &factor, &mut q, m + 1, m + 1)?;

        backend.gemm_block(basis.as_mut_slice(), &q, m + 1, nev + 1, self.block_len)?;
        for i in nev + 1..=m {
            space.zero(basis.index_mut(i));
        }

        let h = store.matrix_mut();
        // the first nev reflectors vanish in row m, so they act on the m columns of H
        backend.apply_q(Side::Right, Trans::NoTrans, qr, nev, &factor, h, m + 1, m)?;
        backend.apply_q(Side::Left, Trans::ConjTrans, qr, nev + 1, &factor, h, m + 1, nev)?;
        for j in 0..m {
            let first = if j < nev { nev + 1 } else { 0 };
            for i in first..=m {
                h[(i, j)] = C64::zero();
            }
        }

        reorthonormalize(space, basis, nev)
    }
}

/// One Gram-Schmidt pass of `basis[k]` against `basis[0..k]`, then normalization.
pub fn reorthonormalize<V, S>(space: &S, basis: &mut KrylovBasis<V>, k: usize) -> Result<(), KError>
where
    V: FieldVector,
    S: VectorSpace<V>,
{
    for i in 0..k {
        let (vi, vk) = basis.pair_mut(i, k);
        let h = space.dot(vi, vk);
        space.axpy(-h, vi, vk);
    }
    let nrm = space.norm(basis.index(k));
    if !(nrm > 0.0) || !nrm.is_finite() {
        return Err(KError::numerical("reorthonormalize", k as i64));
    }
    space.scale(1.0 / nrm, basis.index_mut(k));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::wrappers::LocalSpace;
    use crate::dense::HostBackend;

    fn unit(n: usize, i: usize) -> Vec<C64> {
        let mut v = vec![C64::zero(); n];
        v[i] = C64::new(1.0, 0.0);
        v
    }

    #[test]
    fn single_pass_on_nearly_dependent_vector() {
        let n = 6;
        let space = LocalSpace::new();
        let mut basis = KrylovBasis::<Vec<C64>>::new(3, n);
        let s = 0.5f64.sqrt();
        *basis.index_mut(0) = unit(n, 0);
        *basis.index_mut(1) = (0..n).map(|i| C64::new(if i == 1 || i == 2 { s } else { 0.0 }, 0.0)).collect();
        // almost in span{v0, v1}
        let target: Vec<C64> = (0..n)
            .map(|i| {
                let along = basis.index(0)[i] * 0.6 + basis.index(1)[i] * C64::new(0.0, 0.8);
                along + C64::new(1e-9 * (i as f64 + 1.0), 0.0)
            })
            .collect();
        *basis.index_mut(2) = target;
        reorthonormalize(&space, &mut basis, 2).unwrap();
        assert!((space.norm(basis.index(2)) - 1.0).abs() < 1e-12);
        for i in 0..2 {
            assert!(space.dot(basis.index(i), basis.index(2)).norm() < 1e-5);
        }
    }

    #[test]
    fn precision_mismatch_is_reported() {
        use crate::core::traits::Precision;

        struct SingleSpace;
        impl VectorSpace<Vec<C64>> for SingleSpace {
            fn precision(&self) -> Precision {
                Precision::Single
            }
            fn dot(&self, x: &Vec<C64>, y: &Vec<C64>) -> C64 {
                x.iter().zip(y).map(|(a, b)| a.conj() * b).sum()
            }
            fn norm2(&self, x: &Vec<C64>) -> f64 {
                x.iter().map(|a| a.norm_sqr()).sum()
            }
        }

        let (m, nev) = (4, 2);
        let mut basis = KrylovBasis::<Vec<C64>>::new(m + 1, 3);
        let mut store = HessenbergStore::new(m, m + 1).unwrap();
        let mut deflation = DeflationSpace::new(m + 1, nev);
        let mut residual = vec![C64::zero(); 3];
        let err = RestartProjector::new(4)
            .restart(
                &mut basis,
                &SingleSpace,
                &mut store,
                &mut deflation,
                &[C64::zero(); 5],
                &mut residual,
                &HostBackend,
            )
            .unwrap_err();
        assert!(matches!(
            err,
            KError::PrecisionMismatch {
                basis: Precision::Single,
                dense: Precision::Double
            }
        ));
    }
}
