//! Incremental triangularization of `H` and the small least-squares problem.
//!
//! Each new Hessenberg column is first rotated by the unitary factor of the compressed block
//! (deflated cycles only, `PrepareGivens`), then by the Givens rotations of the previous columns,
//! and finally a new rotation annihilates its subdiagonal entry. The rotation
//! `[conj(c), s; -s, c]` has complex cosine `c` and real sine `s`. `|g[j+1]|` is the
//! least-squares residual `min ‖g₀ − H y‖` after `j + 1` columns.

use crate::dense::{ColMat, DenseBackend, HouseholderFactor, Side, Trans};
use crate::error::KError;
use crate::solver::hessenberg::HessenbergStore;
use num_complex::Complex64 as C64;
use num_traits::Zero;

pub struct GivensState {
    /// Upper triangular factor `R`.
    givens_h: ColMat,
    /// Rotated right-hand side.
    g: ColMat,
    cn: Vec<C64>,
    sn: Vec<f64>,
    /// Householder QR of the compressed `(nev+1) × nev` block.
    qr_h: ColMat,
    factor_h: HouseholderFactor,
    /// Scratch column for `Qᴴ h`.
    scratch: ColMat,
    lsq: Vec<C64>,
    /// Number of reflectors in `qr_h` for the current cycle.
    k: usize,
}

impl GivensState {
    pub fn new(m: usize, ldm: usize, nev: usize) -> Self {
        Self {
            givens_h: ColMat::zeros(ldm, m),
            g: ColMat::zeros(ldm, 1),
            cn: vec![C64::zero(); m],
            sn: vec![0.0; m],
            qr_h: ColMat::zeros(ldm, nev),
            factor_h: HouseholderFactor::new(),
            scratch: ColMat::zeros(ldm, 1),
            lsq: vec![C64::zero(); m + 1],
            k: 0,
        }
    }

    /// Start an undeflated cycle from `g = β e₀`.
    pub fn start_plain(&mut self, beta: f64) {
        self.givens_h.fill_zero();
        self.g.fill_zero();
        self.g[(0, 0)] = C64::new(beta, 0.0);
        self.k = 0;
    }

    /// Start a deflated cycle from `g[0..=nev] = Vᴴ r`: factor `H[0..=nev, 0..nev] = Q R`, seed
    /// the triangular factor with `R` and rotate `g ← Qᴴ g`.
    pub fn start_deflated<B: DenseBackend>(
        &mut self,
        store: &HessenbergStore,
        coeffs: &[C64],
        nev: usize,
        backend: &B,
    ) -> Result<(), KError> {
        self.qr_h.fill_zero();
        for j in 0..nev {
            for i in 0..=nev {
                self.qr_h[(i, j)] = store.get(i, j);
            }
        }
        backend.qr_factor(&mut self.qr_h, nev + 1, nev, &mut self.factor_h)?;

        self.givens_h.fill_zero();
        for j in 0..nev {
            for i in 0..=j {
                self.givens_h[(i, j)] = self.qr_h[(i, j)];
            }
        }

        self.g.fill_zero();
        self.g.col_mut(0)[..=nev].copy_from_slice(&coeffs[..=nev]);
        backend.apply_q(Side::Left, Trans::ConjTrans, &self.qr_h, nev, &self.factor_h, &mut self.g, nev + 1, 1)?;
        self.k = nev;
        Ok(())
    }

    /// Rotated right-hand side, `m + 1` entries.
    pub fn rhs(&self) -> &[C64] {
        self.g.col(0)
    }

    /// Triangularize column `j` of `H` (rows `0..=j+1` already final) and return the squared
    /// least-squares residual `|g[j+1]|²`.
    pub fn update<B: DenseBackend>(&mut self, store: &HessenbergStore, j: usize, backend: &B) -> Result<f64, KError> {
        let k = self.k;
        let mut h0 = if k > 0 {
            let col = &mut self.scratch;
            for i in 0..=k {
                col[(i, 0)] = store.get(i, j);
            }
            backend.apply_q(Side::Left, Trans::ConjTrans, &self.qr_h, k, &self.factor_h, col, k + 1, 1)?;
            for i in 0..k {
                self.givens_h[(i, j)] = col[(i, 0)];
            }
            col[(k, 0)]
        } else {
            store.get(0, j)
        };

        for i in k + 1..=j {
            let h1 = store.get(i, j);
            let (c, s) = (self.cn[i - 1], self.sn[i - 1]);
            self.givens_h[(i - 1, j)] = c.conj() * h0 + h1 * s;
            h0 = -h0 * s + c * h1;
        }

        let hn = store.get(j + 1, j).norm();
        let denom = (h0.norm_sqr() + hn * hn).sqrt();
        let (c, s) = if denom == 0.0 {
            (C64::new(1.0, 0.0), 0.0)
        } else {
            (h0 / denom, hn / denom)
        };
        self.cn[j] = c;
        self.sn[j] = s;
        self.givens_h[(j, j)] = c.conj() * h0 + s * hn;

        let gj = self.g[(j, 0)];
        self.g[(j + 1, 0)] = -gj * s;
        self.g[(j, 0)] = gj * c.conj();
        Ok(self.g[(j + 1, 0)].norm_sqr())
    }

    /// Solve `R y = g[0..n]`; entries `n..=m` of the result are zero.
    pub fn back_substitute(&mut self, n: usize) -> Result<&[C64], KError> {
        self.lsq.fill(C64::zero());
        for i in (0..n).rev() {
            let mut acc = self.g[(i, 0)];
            for l in i + 1..n {
                acc -= self.givens_h[(i, l)] * self.lsq[l];
            }
            let d = self.givens_h[(i, i)];
            if d.is_zero() {
                return Err(KError::numerical("ztrsv", i as i64 + 1));
            }
            self.lsq[i] = acc / d;
        }
        Ok(&self.lsq)
    }

    /// Least-squares solution of the last [`GivensState::back_substitute`].
    pub fn lsq(&self) -> &[C64] {
        &self.lsq
    }

    pub fn triangular(&self) -> &ColMat {
        &self.givens_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::HostBackend;
    use crate::dense::lu::solve_linear_system;

    fn sample_store(m: usize) -> HessenbergStore {
        let mut store = HessenbergStore::new(m, m + 1).unwrap();
        for j in 0..m {
            for i in 0..=j {
                store.set_element(i, j, C64::new(1.0 / (1 + i + j) as f64, 0.2 * (i as f64 - j as f64)));
            }
            store.set_element(j + 1, j, C64::new(0.5 + 0.1 * j as f64, 0.0));
        }
        store
    }

    /// min ‖β e₀ − H y‖ through the normal equations.
    fn lsq_residual(store: &HessenbergStore, n: usize, beta: f64) -> (Vec<C64>, f64) {
        let hh = ColMat::from_fn(n, n, n, |a, b| {
            (0..=n).fold(C64::zero(), |acc, r| acc + store.get(r, a).conj() * store.get(r, b))
        });
        let mut y: Vec<C64> = (0..n).map(|a| store.get(0, a).conj() * beta).collect();
        solve_linear_system(&hh, n, &mut y).unwrap();
        let res2: f64 = (0..=n)
            .map(|r| {
                let hy = (0..n).fold(C64::zero(), |acc, c| acc + store.get(r, c) * y[c]);
                let e = if r == 0 { C64::new(beta, 0.0) } else { C64::zero() };
                (e - hy).norm_sqr()
            })
            .sum();
        (y, res2.sqrt())
    }

    #[test]
    fn rotations_triangularize_and_track_residual() {
        let m = 5;
        let beta = 2.0;
        let store = sample_store(m);
        let mut givens = GivensState::new(m, m + 1, 2);
        givens.start_plain(beta);
        let mut r2 = 0.0;
        for j in 0..m {
            r2 = givens.update(&store, j, &HostBackend).unwrap();
        }
        let (y_ref, res_ref) = lsq_residual(&store, m, beta);
        assert!((r2.sqrt() - res_ref).abs() < 1e-10);

        // R is upper triangular with a real diagonal
        for j in 0..m {
            assert!(givens.triangular()[(j, j)].im.abs() < 1e-14);
            for i in j + 1..=m {
                assert_eq!(givens.triangular()[(i, j)], C64::zero());
            }
        }

        let y = givens.back_substitute(m).unwrap();
        for (a, b) in y.iter().zip(&y_ref) {
            assert!((a - b).norm() < 1e-9);
        }
        assert_eq!(y[m], C64::zero());
    }

    #[test]
    fn deflated_start_matches_plain_rotation() {
        // g = β e₀ and H[0..=k, 0..k] Householder-factored must give the same residual as the
        // plain Givens sweep over the whole matrix
        let (m, k, beta) = (5, 2, 1.5);
        let store = sample_store(m);
        let mut coeffs = vec![C64::zero(); m + 1];
        coeffs[0] = C64::new(beta, 0.0);

        let mut deflated = GivensState::new(m, m + 1, k);
        deflated.start_deflated(&store, &coeffs, k, &HostBackend).unwrap();
        let mut r2 = 0.0;
        for j in k..m {
            r2 = deflated.update(&store, j, &HostBackend).unwrap();
        }
        let (_, res_ref) = lsq_residual(&store, m, beta);
        assert!((r2.sqrt() - res_ref).abs() < 1e-10);
    }
}
