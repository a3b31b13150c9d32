//! Reference vector spaces over host slices.
//!
//! This module provides implementations of [`VectorSpace`] for any [`FieldVector`] whose local
//! storage lives in host memory:
//!
//! - [`LocalSpace`]: single-process space, with Rayon-parallel reductions when the `rayon`
//!   feature is enabled.
//! - [`DistributedSpace`]: each process holds a slab of the field; reductions are computed
//!   locally and then summed across processes through a [`Comm`].
//!
//! # Usage
//! These spaces let the solver run on plain `Vec<Complex64>` fields in tests and on partitioned
//! fields in MPI jobs without changing the solver code.

use crate::core::traits::{FieldVector, Precision, VectorSpace};
use crate::parallel::Comm;
use num_complex::Complex64 as C64;
use num_traits::Zero;

pub(crate) fn local_dot(x: &[C64], y: &[C64]) -> C64 {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .zip(y.par_iter())
            .map(|(xi, yi)| xi.conj() * yi)
            .reduce(C64::zero, |acc, v| acc + v)
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| xi.conj() * yi)
            .fold(C64::zero(), |acc, v| acc + v)
    }
}

pub(crate) fn local_norm2(x: &[C64]) -> f64 {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter().map(|xi| xi.norm_sqr()).sum()
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter().map(|xi| xi.norm_sqr()).sum()
    }
}

pub(crate) fn local_axpy(alpha: C64, x: &[C64], y: &mut [C64]) {
    assert_eq!(x.len(), y.len(), "Vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        y.par_iter_mut().zip(x.par_iter()).for_each(|(yi, xi)| *yi += alpha * xi);
    }
    #[cfg(not(feature = "rayon"))]
    {
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi += alpha * xi;
        }
    }
}

/// Single-process vector space in double precision.
#[derive(Copy, Clone, Debug, Default)]
pub struct LocalSpace;

impl LocalSpace {
    pub fn new() -> Self {
        LocalSpace
    }
}

impl<V: FieldVector> VectorSpace<V> for LocalSpace {
    fn precision(&self) -> Precision {
        Precision::Double
    }
    fn dot(&self, x: &V, y: &V) -> C64 {
        local_dot(x.as_ref(), y.as_ref())
    }
    fn norm2(&self, x: &V) -> f64 {
        local_norm2(x.as_ref())
    }
    fn axpy(&self, alpha: C64, x: &V, y: &mut V) {
        local_axpy(alpha, x.as_ref(), y.as_mut());
    }
}

/// Distributed vector space: each process owns a slab, reductions go through `comm`.
///
/// Every process must call `dot`/`norm2` collectively and in the same order.
pub struct DistributedSpace<'a, C: Comm> {
    /// Communicator used for the global sums.
    pub comm: &'a C,
}

impl<'a, C: Comm> DistributedSpace<'a, C> {
    pub fn new(comm: &'a C) -> Self {
        DistributedSpace { comm }
    }
}

impl<'a, C: Comm, V: FieldVector> VectorSpace<V> for DistributedSpace<'a, C> {
    fn precision(&self) -> Precision {
        Precision::Double
    }
    fn dot(&self, x: &V, y: &V) -> C64 {
        let local = local_dot(x.as_ref(), y.as_ref());
        self.comm.all_reduce_complex(local)
    }
    fn norm2(&self, x: &V) -> f64 {
        self.comm.all_reduce(local_norm2(x.as_ref()))
    }
    fn axpy(&self, alpha: C64, x: &V, y: &mut V) {
        local_axpy(alpha, x.as_ref(), y.as_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_is_conjugate_linear_in_first_argument() {
        let x = vec![C64::new(0.0, 1.0), C64::new(2.0, 0.0)];
        let y = vec![C64::new(1.0, 0.0), C64::new(0.0, 3.0)];
        let space = LocalSpace::new();
        let d = VectorSpace::<Vec<C64>>::dot(&space, &x, &y);
        // conj(i)*1 + 2*(3i) = -i + 6i
        assert_eq!(d, C64::new(0.0, 5.0));
        let n2 = VectorSpace::<Vec<C64>>::norm2(&space, &x);
        assert!((n2 - 5.0).abs() < 1e-15);
    }

    #[test]
    fn axpy_scale_zero_copy() {
        let space = LocalSpace::new();
        let x = vec![C64::new(1.0, 1.0); 3];
        let mut y = vec![C64::new(2.0, 0.0); 3];
        space.axpy(C64::new(0.0, 1.0), &x, &mut y);
        assert_eq!(y[0], C64::new(1.0, 1.0));
        space.scale(2.0, &mut y);
        assert_eq!(y[2], C64::new(2.0, 2.0));
        let mut z: Vec<C64> = space.create(3);
        space.copy(&mut z, &y);
        assert_eq!(z, y);
        space.zero(&mut z);
        assert!(z.iter().all(|zi| zi.is_zero()));
    }
}
