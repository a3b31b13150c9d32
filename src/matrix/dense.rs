//! Dense operators on top of Faer.
//!
//! This module implements [`MatVec`] for `faer::Mat<c64>` so small dense test problems can be
//! handed to the solver directly, plus a diagonal operator for spectra chosen by hand.

use crate::core::traits::{FieldVector, MatVec};
use faer::{Mat, c64};
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// Build a square Faer matrix from a closure returning `Complex64`.
pub fn dense_from_fn(n: usize, f: impl Fn(usize, usize) -> C64) -> Mat<c64> {
    Mat::from_fn(n, n, |i, j| {
        let z = f(i, j);
        c64::new(z.re, z.im)
    })
}

impl<V: FieldVector> MatVec<V> for Mat<c64> {
    fn matvec(&self, x: &V, y: &mut V) {
        let (x, y) = (x.as_ref(), y.as_mut());
        assert_eq!(x.len(), self.ncols());
        assert_eq!(y.len(), self.nrows());
        y.fill(C64::zero());
        for (j, xj) in x.iter().enumerate() {
            for (i, yi) in y.iter_mut().enumerate() {
                let a = self[(i, j)];
                *yi += C64::new(a.re, a.im) * xj;
            }
        }
    }
}

/// `A = diag(d)`.
#[derive(Clone, Debug)]
pub struct DiagonalOperator {
    diag: Vec<C64>,
}

impl DiagonalOperator {
    pub fn new(diag: Vec<C64>) -> Self {
        Self { diag }
    }

    /// `diag(1, 2, ..., n)`.
    pub fn linear_spectrum(n: usize) -> Self {
        Self::new((1..=n).map(|k| C64::new(k as f64, 0.0)).collect())
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }
}

impl<V: FieldVector> MatVec<V> for DiagonalOperator {
    fn matvec(&self, x: &V, y: &mut V) {
        let (x, y) = (x.as_ref(), y.as_mut());
        assert_eq!(x.len(), self.diag.len());
        assert_eq!(y.len(), self.diag.len());
        for ((yi, xi), di) in y.iter_mut().zip(x).zip(&self.diag) {
            *yi = di * xi;
        }
    }
}
