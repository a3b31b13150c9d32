//! Column-major dense matrix with an explicit leading dimension.

use faer::{MatMut, MatRef};
use num_complex::Complex64 as C64;
use num_traits::{One, Zero};
use std::ops::{Index, IndexMut};

/// Column-major buffer of `ld × ncols` complex entries; element `(i, j)` lives at `j * ld + i`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColMat {
    data: Vec<C64>,
    ld: usize,
    ncols: usize,
}

impl ColMat {
    pub fn zeros(ld: usize, ncols: usize) -> Self {
        Self {
            data: vec![C64::zero(); ld * ncols],
            ld,
            ncols,
        }
    }

    /// Zero buffer with ones on the leading `n` diagonal entries.
    pub fn identity(ld: usize, n: usize) -> Self {
        let mut m = Self::zeros(ld, n);
        for d in 0..n.min(ld) {
            m[(d, d)] = C64::one();
        }
        m
    }

    /// Build from a closure over the leading `nrows × ncols` block.
    pub fn from_fn(ld: usize, nrows: usize, ncols: usize, f: impl Fn(usize, usize) -> C64) -> Self {
        assert!(nrows <= ld, "nrows exceeds leading dimension");
        let mut m = Self::zeros(ld, ncols);
        for j in 0..ncols {
            for i in 0..nrows {
                m[(i, j)] = f(i, j);
            }
        }
        m
    }

    pub fn ld(&self) -> usize {
        self.ld
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn col(&self, j: usize) -> &[C64] {
        &self.data[j * self.ld..(j + 1) * self.ld]
    }

    pub fn col_mut(&mut self, j: usize) -> &mut [C64] {
        &mut self.data[j * self.ld..(j + 1) * self.ld]
    }

    pub fn as_slice(&self) -> &[C64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [C64] {
        &mut self.data
    }

    /// Faer view of the leading `nrows × ncols` block.
    pub fn as_faer(&self, nrows: usize, ncols: usize) -> MatRef<'_, C64> {
        MatRef::from_column_major_slice_with_stride(&self.data, nrows, ncols, self.ld)
    }

    pub fn as_faer_mut(&mut self, nrows: usize, ncols: usize) -> MatMut<'_, C64> {
        MatMut::from_column_major_slice_with_stride_mut(&mut self.data, nrows, ncols, self.ld)
    }

    pub fn fill_zero(&mut self) {
        self.data.fill(C64::zero());
    }

    /// Copy the whole buffer from a matrix of identical shape.
    pub fn copy_from(&mut self, other: &ColMat) {
        assert_eq!((self.ld, self.ncols), (other.ld, other.ncols), "shape mismatch");
        self.data.copy_from_slice(&other.data);
    }

    /// True if every entry of the leading `nrows × ncols` block is finite.
    pub fn is_finite(&self, nrows: usize, ncols: usize) -> bool {
        (0..ncols).all(|j| {
            self.col(j)[..nrows]
                .iter()
                .all(|z| z.re.is_finite() && z.im.is_finite())
        })
    }
}

impl Index<(usize, usize)> for ColMat {
    type Output = C64;
    fn index(&self, (i, j): (usize, usize)) -> &C64 {
        debug_assert!(i < self.ld && j < self.ncols);
        &self.data[j * self.ld + i]
    }
}

impl IndexMut<(usize, usize)> for ColMat {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut C64 {
        debug_assert!(i < self.ld && j < self.ncols);
        &mut self.data[j * self.ld + i]
    }
}
