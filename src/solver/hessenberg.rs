//! Storage for the projected Hessenberg matrix.
//!
//! `H` is `(m+1) × m`, column-major with leading dimension `ldm`. Its conjugate transpose is never
//! stored: [`HessenbergStore::conj_element`] reads through `H`, and
//! [`HessenbergStore::conjugate_transpose`] materializes a leading block on demand. The store
//! also owns the buffer in which the harmonic matrix is assembled at every restart.

use crate::dense::ColMat;
use crate::error::KError;
use num_complex::Complex64 as C64;

pub struct HessenbergStore {
    h: ColMat,
    harmonic: ColMat,
    m: usize,
}

impl HessenbergStore {
    /// Zeroed buffers for a subspace of dimension `m` with leading dimension `ldm ≥ m + 1`.
    pub fn new(m: usize, ldm: usize) -> Result<Self, KError> {
        if ldm <= m {
            return Err(KError::Configuration(format!(
                "Hessenberg leading dimension {ldm} must exceed m = {m}"
            )));
        }
        Ok(Self {
            h: ColMat::zeros(ldm, m),
            harmonic: ColMat::zeros(ldm, m),
            m,
        })
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn ld(&self) -> usize {
        self.h.ld()
    }

    /// Zero `H` and the harmonic buffer.
    pub fn reset(&mut self) {
        self.h.fill_zero();
        self.harmonic.fill_zero();
    }

    pub fn set_element(&mut self, row: usize, col: usize, value: C64) {
        self.h[(row, col)] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> C64 {
        self.h[(row, col)]
    }

    /// `cH[row, col] = conj(H[col, row])`.
    pub fn conj_element(&self, row: usize, col: usize) -> C64 {
        self.h[(col, row)].conj()
    }

    /// `cH` over its leading `nrows × ncols` block, in a buffer with the store's leading
    /// dimension.
    pub fn conjugate_transpose(&self, nrows: usize, ncols: usize) -> ColMat {
        ColMat::from_fn(self.ld(), nrows, ncols, |i, j| self.conj_element(i, j))
    }

    pub fn matrix(&self) -> &ColMat {
        &self.h
    }

    pub fn matrix_mut(&mut self) -> &mut ColMat {
        &mut self.h
    }

    pub fn harmonic(&self) -> &ColMat {
        &self.harmonic
    }

    /// `H` and the harmonic buffer, borrowed together.
    pub(crate) fn split_harmonic(&mut self) -> (&ColMat, &mut ColMat) {
        (&self.h, &mut self.harmonic)
    }
}
