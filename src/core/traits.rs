//! Core linear-algebra traits for gmresdr.
//!
//! The solver never touches field storage directly except through these traits: the operator is a
//! [`MatVec`], global reductions go through a [`VectorSpace`], and local storage is any
//! [`FieldVector`] (a contiguous slice of complex doubles on this process).

use num_complex::Complex64 as C64;
use num_traits::Zero;

/// Floating-point storage precision of a vector space or of the dense backend.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Precision {
    Single,
    Double,
}

/// Matrix–vector product: y ← A x.
pub trait MatVec<V> {
    /// Compute y = A · x.
    fn matvec(&self, x: &V, y: &mut V);
}

/// Local storage of a field vector.
pub trait FieldVector: AsRef<[C64]> + AsMut<[C64]> + From<Vec<C64>> + Clone + Send + Sync {}

impl<V> FieldVector for V where V: AsRef<[C64]> + AsMut<[C64]> + From<Vec<C64>> + Clone + Send + Sync {}

/// Vector-space operations over a (possibly distributed) field.
///
/// `dot` and `norm2` are global reductions; the remaining operations act on local storage only.
/// `dot(x, y)` is conjugate-linear in `x`.
pub trait VectorSpace<V: FieldVector> {
    /// Storage precision of vectors in this space.
    fn precision(&self) -> Precision;

    /// Compute ⟨x, y⟩ = Σ conj(xᵢ) yᵢ.
    fn dot(&self, x: &V, y: &V) -> C64;

    /// Compute ‖x‖₂².
    fn norm2(&self, x: &V) -> f64;

    /// Compute ‖x‖₂.
    fn norm(&self, x: &V) -> f64 {
        self.norm2(x).sqrt()
    }

    /// y ← y + α x.
    fn axpy(&self, alpha: C64, x: &V, y: &mut V) {
        for (yi, xi) in y.as_mut().iter_mut().zip(x.as_ref()) {
            *yi += alpha * xi;
        }
    }

    /// x ← α x.
    fn scale(&self, alpha: f64, x: &mut V) {
        for xi in x.as_mut() {
            *xi *= alpha;
        }
    }

    /// x ← 0.
    fn zero(&self, x: &mut V) {
        x.as_mut().fill(C64::zero());
    }

    /// dst ← src.
    fn copy(&self, dst: &mut V, src: &V) {
        dst.as_mut().copy_from_slice(src.as_ref());
    }

    /// A zeroed vector with `len` local entries.
    fn create(&self, len: usize) -> V {
        V::from(vec![C64::zero(); len])
    }
}
