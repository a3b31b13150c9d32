//! Fixed-capacity Krylov basis.

use crate::core::traits::FieldVector;
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// `m+1` field vectors allocated once and overwritten across restart cycles.
pub struct KrylovBasis<V> {
    vecs: Vec<V>,
    local_len: usize,
}

impl<V: FieldVector> KrylovBasis<V> {
    /// Allocate `count` zeroed vectors of `local_len` entries each.
    pub fn new(count: usize, local_len: usize) -> Self {
        let vecs = (0..count)
            .map(|_| V::from(vec![C64::zero(); local_len]))
            .collect();
        Self { vecs, local_len }
    }

    /// Number of basis slots.
    pub fn len(&self) -> usize {
        self.vecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vecs.is_empty()
    }

    /// Local length of every basis vector.
    pub fn local_len(&self) -> usize {
        self.local_len
    }

    /// Select the i-th basis vector.
    pub fn index(&self, i: usize) -> &V {
        &self.vecs[i]
    }

    pub fn index_mut(&mut self, i: usize) -> &mut V {
        &mut self.vecs[i]
    }

    /// Borrow `src` immutably and `dst` mutably at the same time.
    ///
    /// # Panics
    /// Panics if `src == dst`.
    pub fn pair_mut(&mut self, src: usize, dst: usize) -> (&V, &mut V) {
        assert_ne!(src, dst, "pair_mut requires distinct slots");
        if src < dst {
            let (lo, hi) = self.vecs.split_at_mut(dst);
            (&lo[src], &mut hi[0])
        } else {
            let (lo, hi) = self.vecs.split_at_mut(src);
            (&hi[0], &mut lo[dst])
        }
    }

    /// All slots, for block kernels.
    pub fn as_mut_slice(&mut self) -> &mut [V] {
        &mut self.vecs
    }
}
