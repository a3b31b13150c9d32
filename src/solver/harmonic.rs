//! Harmonic Ritz pairs of the Hessenberg matrix and the deflation subspace they span.
//!
//! With `H_m` the square part of `H` and `β = H[m, m-1]`, the harmonic Ritz values are the
//! eigenvalues of `H_m + y e_mᵀ`, where `H_mᴴ y = |β|² e_m`. The eigenvectors belonging to the
//! `nev` values of smallest modulus approximate the invariant subspace that slows restarted GMRES
//! down, and are carried into the next cycle.
//!
//! # References
//! - R. B. Morgan, "GMRES with deflated restarting", SIAM J. Sci. Comput. 24 (2002)

use crate::dense::{ColMat, DenseBackend};
use crate::error::KError;
use crate::solver::hessenberg::HessenbergStore;
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// One `ldm × (nev+1)` buffer: columns `0..nev` hold harmonic Ritz vectors, column `nev` holds
/// the short residual of the cycle being restarted.
#[derive(Clone, Debug)]
pub struct DeflationSpace {
    buf: ColMat,
    nev: usize,
}

impl DeflationSpace {
    pub fn new(ldm: usize, nev: usize) -> Self {
        Self {
            buf: ColMat::zeros(ldm, nev + 1),
            nev,
        }
    }

    pub fn nev(&self) -> usize {
        self.nev
    }

    /// Column index of the short residual.
    pub fn residual_col(&self) -> usize {
        self.nev
    }

    pub fn vector(&self, k: usize) -> &[C64] {
        self.buf.col(k)
    }

    pub fn short_residual(&self) -> &[C64] {
        self.buf.col(self.nev)
    }

    pub fn short_residual_mut(&mut self) -> &mut [C64] {
        self.buf.col_mut(self.nev)
    }

    pub fn matrix(&self) -> &ColMat {
        &self.buf
    }

    pub fn matrix_mut(&mut self) -> &mut ColMat {
        &mut self.buf
    }
}

/// Indices of `values` ordered by ascending modulus; equal moduli keep their input order.
pub fn sort_by_modulus(values: &[C64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].norm().total_cmp(&values[b].norm()));
    order
}

#[derive(Copy, Clone, Debug, Default)]
pub struct HarmonicRitzEngine;

impl HarmonicRitzEngine {
    /// Fill columns `0..nev` of `deflation` with the harmonic Ritz vectors of smallest modulus
    /// (row `m` zeroed) and return all `m` harmonic Ritz values in that order.
    pub fn compute<B: DenseBackend>(
        &self,
        store: &mut HessenbergStore,
        deflation: &mut DeflationSpace,
        backend: &B,
    ) -> Result<Vec<C64>, KError> {
        let m = store.m();
        let beta2 = store.get(m, m - 1).norm_sqr();

        // H_mᴴ y = β² e_m
        let ch = store.conjugate_transpose(m, m);
        let mut y = vec![C64::zero(); m];
        y[m - 1] = C64::new(beta2, 0.0);
        backend.solve_linear_system(&ch, m, &mut y)?;

        {
            let (h, harmonic) = store.split_harmonic();
            harmonic.copy_from(h);
            for (i, yi) in y.iter().enumerate() {
                harmonic[(i, m - 1)] += *yi;
            }
        }

        let pairs = backend.eig(store.harmonic(), m)?;
        let order = sort_by_modulus(&pairs.values);

        let nev = deflation.nev();
        let buf = deflation.matrix_mut();
        for (k, &src) in order.iter().take(nev).enumerate() {
            let col = buf.col_mut(k);
            col.fill(C64::zero());
            col[..m].copy_from_slice(&pairs.vectors.col(src)[..m]);
        }
        Ok(order.iter().map(|&i| pairs.values[i]).collect())
    }
}
