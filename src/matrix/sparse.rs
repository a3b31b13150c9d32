// Complex CSR operator

use crate::core::traits::{FieldVector, MatVec};
use crate::error::KError;
use num_complex::Complex64 as C64;
use num_traits::Zero;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Compressed sparse row matrix with complex entries.
#[derive(Clone, Debug)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<C64>,
}

impl CsrMatrix {
    /// Build a CSR from raw row-ptr, col-idx and values, checking the structure.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<C64>,
    ) -> Result<Self, KError> {
        if row_ptr.len() != nrows + 1 || row_ptr.first() != Some(&0) {
            return Err(KError::DimensionMismatch(format!(
                "row_ptr has {} entries for {nrows} rows",
                row_ptr.len()
            )));
        }
        if row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(KError::DimensionMismatch("row_ptr is not monotone".into()));
        }
        let nnz = row_ptr[nrows];
        if col_idx.len() != nnz || values.len() != nnz {
            return Err(KError::DimensionMismatch(format!(
                "expected {nnz} entries, got {} indices and {} values",
                col_idx.len(),
                values.len()
            )));
        }
        if let Some(&c) = col_idx.iter().find(|&&c| c >= ncols) {
            return Err(KError::DimensionMismatch(format!("column {c} out of range")));
        }
        Ok(Self {
            nrows,
            ncols,
            row_ptr,
            col_idx,
            values,
        })
    }

    /// Build from `(row, col, value)` triplets; duplicates are summed.
    pub fn from_triplets(nrows: usize, ncols: usize, triplets: &[(usize, usize, C64)]) -> Result<Self, KError> {
        let mut sorted = triplets.to_vec();
        sorted.sort_by_key(|&(r, c, _)| (r, c));
        let mut row_ptr = vec![0; nrows + 1];
        let mut col_idx = Vec::with_capacity(sorted.len());
        let mut values: Vec<C64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;
        for (r, c, v) in sorted {
            if r >= nrows {
                return Err(KError::DimensionMismatch(format!("row {r} out of range")));
            }
            if last == Some((r, c)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            col_idx.push(c);
            values.push(v);
            row_ptr[r + 1] += 1;
            last = Some((r, c));
        }
        for i in 0..nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        Self::from_csr(nrows, ncols, row_ptr, col_idx, values)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row_dot(&self, i: usize, x: &[C64]) -> C64 {
        let (start, end) = (self.row_ptr[i], self.row_ptr[i + 1]);
        self.col_idx[start..end]
            .iter()
            .zip(&self.values[start..end])
            .fold(C64::zero(), |acc, (&j, v)| acc + v * x[j])
    }

    /// Compute y = A * x.  `x.len() == ncols()`, `y.len() == nrows()`.
    pub fn spmv(&self, x: &[C64], y: &mut [C64]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        #[cfg(feature = "rayon")]
        y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = self.row_dot(i, x));
        #[cfg(not(feature = "rayon"))]
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row_dot(i, x);
        }
    }
}

impl<V: FieldVector> MatVec<V> for CsrMatrix {
    fn matvec(&self, x: &V, y: &mut V) {
        self.spmv(x.as_ref(), y.as_mut());
    }
}
