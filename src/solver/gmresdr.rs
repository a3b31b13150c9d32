//! GMRES with deflated restarting (GMRES-DR).
//!
//! Restarted GMRES throws away the whole Krylov subspace at every restart, and with it the
//! information about the eigenvalues closest to the origin that make the problem hard. GMRES-DR
//! keeps the `nev` harmonic Ritz vectors of smallest modulus together with the residual: each
//! cycle after the first starts from that `(nev+1)`-dimensional subspace and extends it to `m`
//! columns with Arnoldi.
//!
//! # Features
//! - Modified Gram-Schmidt Arnoldi with incremental Givens triangularization
//! - Harmonic Ritz deflation with a stable sort on eigenvalue modulus
//! - Separate sloppy operator for basis growth and precise operator for the true residual
//! - Arnoldi breakdown detection, with an undeflated restart when the residual has not converged
//! - Pluggable dense backend and (possibly distributed) vector spaces
//!
//! # References
//! - R. B. Morgan, "GMRES with deflated restarting", SIAM J. Sci. Comput. 24 (2002) 20-37
//! - Saad, Y. (2003). Iterative Methods for Sparse Linear Systems, 2nd Edition. SIAM. §6.5

use crate::config::options::GmresDrOptions;
use crate::core::basis::KrylovBasis;
use crate::core::traits::{FieldVector, MatVec, VectorSpace};
use crate::dense::gemm::default_block_len;
use crate::dense::Backend;
use crate::error::KError;
use crate::solver::givens::GivensState;
use crate::solver::harmonic::{DeflationSpace, HarmonicRitzEngine};
use crate::solver::hessenberg::HessenbergStore;
use crate::solver::restart::RestartProjector;
use crate::utils::convergence::{Convergence, SolveStats, SolveStatus};
use log::{debug, info, warn};
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// GMRES-DR solver with its dense workspace.
pub struct GmresDrSolver {
    options: GmresDrOptions,
    conv: Convergence,
    backend: Backend,
    store: HessenbergStore,
    givens: GivensState,
    deflation: DeflationSpace,
    engine: HarmonicRitzEngine,
}

/// How an Arnoldi sweep ended.
struct Sweep {
    /// Columns built, the starting `k` included.
    columns: usize,
    r2: f64,
    breakdown: bool,
}

impl GmresDrSolver {
    /// Validate `options` and allocate the dense workspace.
    pub fn new(options: GmresDrOptions) -> Result<Self, KError> {
        options.validate()?;
        let backend = Backend::from_kind(options.backend)?;
        let (m, nev, ldm) = (options.m, options.nev, options.leading_dim());
        Ok(Self {
            conv: Convergence {
                tol: options.tol,
                max_cycles: options.max_cycles,
            },
            backend,
            store: HessenbergStore::new(m, ldm)?,
            givens: GivensState::new(m, ldm, nev),
            deflation: DeflationSpace::new(ldm, nev),
            engine: HarmonicRitzEngine,
            options,
        })
    }

    pub fn options(&self) -> &GmresDrOptions {
        &self.options
    }

    /// The Hessenberg store as left by the last cycle.
    pub fn hessenberg(&self) -> &HessenbergStore {
        &self.store
    }

    /// Solve `A x = b` with one operator for both basis growth and the true residual.
    ///
    /// `x` holds the initial guess on entry and the best iterate on exit.
    pub fn solve<V, M, S>(&mut self, op: &M, space: &S, b: &V, x: &mut V) -> Result<SolveStats, KError>
    where
        V: FieldVector,
        M: MatVec<V>,
        S: VectorSpace<V>,
    {
        self.solve_split(op, op, space, b, x)
    }

    /// Solve `A x = b`, growing the Krylov basis with `sloppy` and checking the true residual
    /// with `precise`.
    pub fn solve_split<V, M, P, S>(
        &mut self,
        precise: &M,
        sloppy: &P,
        space: &S,
        b: &V,
        x: &mut V,
    ) -> Result<SolveStats, KError>
    where
        V: FieldVector,
        M: MatVec<V>,
        P: MatVec<V>,
        S: VectorSpace<V>,
    {
        let n = b.as_ref().len();
        if x.as_ref().len() != n {
            return Err(KError::DimensionMismatch(format!(
                "b has {n} local entries, x has {}",
                x.as_ref().len()
            )));
        }
        let (m, nev) = (self.options.m, self.options.nev);

        let b2 = space.norm2(b);
        if b2 == 0.0 {
            space.zero(x);
            info!("GMRES-DR: zero right-hand side, x = 0");
            return Ok(SolveStats {
                iterations: 0,
                cycles: 0,
                final_residual: 0.0,
                status: SolveStatus::Converged,
                history: Vec::new(),
            });
        }
        let stop = self.conv.threshold(b2);

        let mut basis = KrylovBasis::<V>::new(m + 1, n);
        let mut r = space.create(n);
        let mut projected = space.create(n);
        let mut scratch = space.create(n);
        let mut coeffs = vec![C64::zero(); nev + 1];
        let block_len = self
            .options
            .gemm_block_len
            .unwrap_or_else(|| default_block_len(n, nev));
        let projector = RestartProjector::new(block_len);

        let mut r2 = true_residual(precise, space, b, x, &mut r, &mut scratch);
        info!(
            "GMRES-DR: m = {m}, nev = {nev}, initial residual {:.6e}, |b| {:.6e}, tol {:.1e}",
            r2.sqrt(),
            b2.sqrt(),
            self.conv.tol
        );

        let mut stats = SolveStats {
            iterations: 0,
            cycles: 0,
            final_residual: (r2 / b2).sqrt(),
            status: SolveStatus::NonConvergence,
            history: Vec::new(),
        };
        if r2 <= stop {
            stats.status = SolveStatus::Converged;
            return Ok(stats);
        }

        let mut start = 0;
        loop {
            if start == 0 {
                self.begin_plain(space, &mut basis, &r, r2);
            } else {
                for (i, c) in coeffs.iter_mut().enumerate() {
                    *c = space.dot(basis.index(i), &projected);
                }
                let s = self.deflation.short_residual_mut();
                s.fill(C64::zero());
                s[..=nev].copy_from_slice(&coeffs);
                self.givens.start_deflated(&self.store, &coeffs, nev, &self.backend)?;
            }
            stats.cycles += 1;
            info!("GMRES-DR cycle {}: Arnoldi from column {start}", stats.cycles);

            let sweep = self.arnoldi(sloppy, space, &mut basis, start, r2, stop)?;
            stats.iterations += sweep.columns - start;
            debug!(
                "GMRES-DR cycle {}: {} columns, least-squares residual {:.6e}",
                stats.cycles,
                sweep.columns,
                sweep.r2.sqrt()
            );

            let lsq = self.givens.back_substitute(sweep.columns)?;
            for (l, coef) in lsq.iter().enumerate().take(sweep.columns) {
                space.axpy(*coef, basis.index(l), x);
            }
            r2 = true_residual(precise, space, b, x, &mut r, &mut scratch);
            let rel = (r2 / b2).sqrt();
            stats.history.push(rel);
            stats.final_residual = rel;
            info!("GMRES-DR cycle {}: true relative residual {rel:.6e}", stats.cycles);

            let (done, status) = self.conv.check(r2, b2, stats.cycles);
            stats.status = status;
            if done {
                break;
            }

            if sweep.columns == m && !sweep.breakdown {
                self.engine
                    .compute(&mut self.store, &mut self.deflation, &self.backend)?;
                projector.restart(
                    &mut basis,
                    space,
                    &mut self.store,
                    &mut self.deflation,
                    self.givens.lsq(),
                    &mut projected,
                    &self.backend,
                )?;
                start = nev;
            } else {
                warn!(
                    "GMRES-DR cycle {}: stopped after {} columns without convergence, restarting undeflated",
                    stats.cycles, sweep.columns
                );
                start = 0;
            }
        }

        match stats.status {
            SolveStatus::Converged => info!(
                "GMRES-DR converged: {} iterations, {} cycles, relative residual {:.6e}",
                stats.iterations, stats.cycles, stats.final_residual
            ),
            SolveStatus::NonConvergence => warn!(
                "GMRES-DR did not converge in {} cycles: relative residual {:.6e}",
                stats.cycles, stats.final_residual
            ),
        }
        Ok(stats)
    }

    /// Fresh cycle from the residual `r`: `V[0] = r / |r|`, `g = |r| e₀`.
    fn begin_plain<V, S>(&mut self, space: &S, basis: &mut KrylovBasis<V>, r: &V, r2: f64)
    where
        V: FieldVector,
        S: VectorSpace<V>,
    {
        let beta = r2.sqrt();
        self.store.reset();
        for i in 1..basis.len() {
            space.zero(basis.index_mut(i));
        }
        let v0 = basis.index_mut(0);
        space.copy(v0, r);
        space.scale(1.0 / beta, v0);
        self.givens.start_plain(beta);
        let s = self.deflation.short_residual_mut();
        s.fill(C64::zero());
        s[0] = C64::new(beta, 0.0);
    }

    /// Arnoldi from column `k` until `m` columns exist, the least-squares residual drops to
    /// `stop`, or the new direction vanishes relative to `‖A v_j‖`.
    fn arnoldi<V, P, S>(
        &mut self,
        sloppy: &P,
        space: &S,
        basis: &mut KrylovBasis<V>,
        k: usize,
        mut r2: f64,
        stop: f64,
    ) -> Result<Sweep, KError>
    where
        V: FieldVector,
        P: MatVec<V>,
        S: VectorSpace<V>,
    {
        let m = self.options.m;
        let mut j = k;
        let mut breakdown = false;
        while j < m && r2 > stop {
            {
                let (vj, w) = basis.pair_mut(j, j + 1);
                sloppy.matvec(vj, w);
            }
            let image = space.norm(basis.index(j + 1));
            for i in 0..=j {
                let (vi, w) = basis.pair_mut(i, j + 1);
                let h = space.dot(vi, w);
                self.store.set_element(i, j, h);
                space.axpy(-h, vi, w);
            }
            let hn = space.norm(basis.index(j + 1));
            self.store.set_element(j + 1, j, C64::new(hn, 0.0));
            if hn <= self.options.breakdown_tol * image {
                warn!("GMRES-DR: Arnoldi breakdown at column {j}, |w| = {hn:.3e}, |A v| = {image:.3e}");
                breakdown = true;
            } else {
                space.scale(1.0 / hn, basis.index_mut(j + 1));
            }

            r2 = self.givens.update(&self.store, j, &self.backend)?;
            j += 1;
            debug!("GMRES-DR iteration {j}: residual {:.6e}", r2.sqrt());
            if breakdown {
                break;
            }
        }
        Ok(Sweep {
            columns: j,
            r2,
            breakdown,
        })
    }
}

/// `r ← b − A x`; returns `|r|²`.
fn true_residual<V, M, S>(op: &M, space: &S, b: &V, x: &V, r: &mut V, ax: &mut V) -> f64
where
    V: FieldVector,
    M: MatVec<V>,
    S: VectorSpace<V>,
{
    op.matvec(x, ax);
    space.copy(r, b);
    space.axpy(C64::new(-1.0, 0.0), ax, r);
    space.norm2(r)
}
