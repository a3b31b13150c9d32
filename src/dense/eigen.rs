//! General complex eigen-decomposition (right eigenvectors), delegated to Faer.
//!
//! Eigenvalues come out in Faer's Schur order; callers sort. Eigenvectors are scaled to unit
//! 2-norm.

use super::colmat::ColMat;
use crate::error::KError;
use faer::linalg::solvers::{Eigen, EvdError};
use num_complex::Complex64 as C64;

/// Right eigenpairs of a square matrix: `vectors.col(i)` belongs to `values[i]`.
#[derive(Clone, Debug)]
pub struct EigenPairs {
    pub values: Vec<C64>,
    pub vectors: ColMat,
}

/// Eigenpairs of the leading `n × n` block of `a`; `vectors` shares the leading dimension of `a`.
pub fn eig(a: &ColMat, n: usize) -> Result<EigenPairs, KError> {
    if n > a.ld() || n > a.ncols() {
        return Err(KError::numerical("zgeev", -4));
    }
    if !a.is_finite(n, n) {
        return Err(KError::numerical("zgeev", -3));
    }
    let evd = Eigen::<f64>::new(a.as_faer(n, n)).map_err(|err| match err {
        EvdError::NoConvergence => KError::numerical("zgeev", 1),
    })?;

    let s = evd.S().column_vector();
    let u = evd.U();
    let mut values = Vec::with_capacity(n);
    let mut vectors = ColMat::zeros(a.ld(), n);
    for k in 0..n {
        values.push(s[k]);
        let col = &mut vectors.col_mut(k)[..n];
        for (i, ci) in col.iter_mut().enumerate() {
            *ci = u[(i, k)];
        }
        let nrm = col.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if nrm > 0.0 {
            for ci in col.iter_mut() {
                *ci /= nrm;
            }
        }
    }
    Ok(EigenPairs { values, vectors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn residual(a: &ColMat, pairs: &EigenPairs, n: usize) -> f64 {
        let mut worst: f64 = 0.0;
        for k in 0..n {
            let v = pairs.vectors.col(k);
            for i in 0..n {
                let av = (0..n).fold(C64::zero(), |acc, j| acc + a[(i, j)] * v[j]);
                worst = worst.max((av - pairs.values[k] * v[i]).norm());
            }
        }
        worst
    }

    #[test]
    fn diagonal_spectrum() {
        let n = 4;
        let a = ColMat::from_fn(n, n, n, |i, j| if i == j { C64::new(i as f64 + 1.0, 0.0) } else { C64::zero() });
        let pairs = eig(&a, n).unwrap();
        let mut vals: Vec<f64> = pairs.values.iter().map(|v| v.re).collect();
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for (k, v) in vals.iter().enumerate() {
            assert!((v - (k as f64 + 1.0)).abs() < 1e-12);
        }
        assert!(residual(&a, &pairs, n) < 1e-12);
    }

    #[test]
    fn rotation_matrix_has_complex_pair() {
        // [[0,-1],[1,0]] has eigenvalues ±i
        let a = ColMat::from_fn(2, 2, 2, |i, j| match (i, j) {
            (0, 1) => C64::new(-1.0, 0.0),
            (1, 0) => C64::new(1.0, 0.0),
            _ => C64::zero(),
        });
        let pairs = eig(&a, 2).unwrap();
        let mut ims: Vec<f64> = pairs.values.iter().map(|v| v.im).collect();
        ims.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((ims[0] + 1.0).abs() < 1e-12 && (ims[1] - 1.0).abs() < 1e-12);
        assert!(residual(&a, &pairs, 2) < 1e-12);
    }

    #[test]
    fn general_complex_matrix() {
        let n = 8;
        let ld = 10;
        let a = ColMat::from_fn(ld, n, n, |i, j| {
            let x = ((i * 7 + j * 3) % 11) as f64 / 11.0 - 0.4;
            let y = ((i * 5 + j * 2) % 13) as f64 / 13.0 - 0.5;
            C64::new(x + if i == j { 2.0 } else { 0.0 }, y)
        });
        let pairs = eig(&a, n).unwrap();
        assert_eq!(pairs.vectors.ld(), ld);
        assert!(residual(&a, &pairs, n) < 1e-10);
        for k in 0..n {
            let nrm: f64 = pairs.vectors.col(k)[..n].iter().map(|c| c.norm_sqr()).sum();
            assert!((nrm - 1.0).abs() < 1e-12);
            assert!(pairs.vectors.col(k)[n..].iter().all(|c| c.is_zero()));
        }
    }

    #[test]
    fn jordan_block_has_repeated_eigenvalue() {
        let n = 4;
        let a = ColMat::from_fn(n, n, n, |i, j| {
            if i == j {
                C64::new(2.0, 1.0)
            } else if j == i + 1 {
                C64::new(1.0, 0.0)
            } else {
                C64::zero()
            }
        });
        let pairs = eig(&a, n).unwrap();
        for v in &pairs.values {
            assert!((v - C64::new(2.0, 1.0)).norm() < 1e-3);
        }
    }

    #[test]
    fn non_finite_input_is_a_failure() {
        let mut a = ColMat::identity(3, 3);
        a[(1, 2)] = C64::new(f64::NAN, 0.0);
        assert!(matches!(eig(&a, 3), Err(KError::NumericalFailure { routine: "zgeev", .. })));
    }
}
