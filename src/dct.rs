//! Discrete Cosine Transform
//!
//! Orthonormal DCT-II (forward) and DCT-III (inverse), applied separably
//! to square blocks.
//!
//! # Transform
//!
//! ```text
//! Forward:  X[k] = s(k) · Σₙ x[n] · cos(π/(2N) · (2n+1) · k)
//! Inverse:  x[n] = Σₖ s(k) · X[k] · cos(π/(2N) · (2n+1) · k)
//!
//!           s(0) = √(1/N),  s(k>0) = √(2/N)
//! ```
//!
//! The 2-D forward pass transforms every row, then every column of the
//! intermediate. The inverse runs columns first, then rows.
//!
//! Cosines are evaluated once per [`DctPlan`]; the plan is read-only after
//! construction and can be shared between threads.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;

use crate::block::Tile;
use crate::error::{CodecError, Result};
use crate::BLOCK_SIZE;

/// Precomputed scaled cosine basis for one block side length.
#[derive(Clone, Debug)]
pub struct DctPlan {
    size: usize,
    /// `basis[k * size + n] = s(k) · cos(π/(2N) · (2n+1) · k)`
    basis: Vec<f64>,
}

impl DctPlan {
    /// Build a plan for vectors of length `size` (blocks of `size × size`).
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "DCT size must be positive");

        let n = size as f64;
        let c = PI / (2.0 * n);
        let dc_scale = libm::sqrt(1.0 / n);
        let ac_scale = libm::sqrt(2.0 / n);

        let mut basis = vec![0.0; size * size];
        for k in 0..size {
            let scale = if k == 0 { dc_scale } else { ac_scale };
            for i in 0..size {
                basis[k * size + i] = scale * libm::cos(c * (2 * i + 1) as f64 * k as f64);
            }
        }

        Self { size, basis }
    }

    /// Plan for the codec's 8×8 tiles.
    pub fn block() -> Self {
        Self::new(BLOCK_SIZE)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// 1-D forward transform of `input` into `output`.
    ///
    /// # Panics
    ///
    /// Panics if either slice length differs from the plan size.
    pub fn forward_1d(&self, input: &[f64], output: &mut [f64]) {
        assert_eq!(input.len(), self.size);
        assert_eq!(output.len(), self.size);

        for (k, out) in output.iter_mut().enumerate() {
            let row = &self.basis[k * self.size..(k + 1) * self.size];
            *out = row.iter().zip(input).map(|(&b, &x)| b * x).sum();
        }
    }

    /// 1-D inverse transform of `input` into `output`.
    ///
    /// # Panics
    ///
    /// Panics if either slice length differs from the plan size.
    pub fn inverse_1d(&self, input: &[f64], output: &mut [f64]) {
        assert_eq!(input.len(), self.size);
        assert_eq!(output.len(), self.size);

        output.fill(0.0);
        for (k, &coeff) in input.iter().enumerate() {
            let row = &self.basis[k * self.size..(k + 1) * self.size];
            for (out, &b) in output.iter_mut().zip(row) {
                *out += coeff * b;
            }
        }
    }

    /// Forward 2-D transform of a row-major `size × size` block, in place.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != size * size`.
    pub fn forward_2d_in_place(&self, data: &mut [f64]) {
        let n = self.size;
        assert_eq!(data.len(), n * n);

        let mut line = vec![0.0; n];
        let mut out = vec![0.0; n];

        for row in data.chunks_exact_mut(n) {
            self.forward_1d(row, &mut out);
            row.copy_from_slice(&out);
        }
        for col in 0..n {
            for (j, v) in line.iter_mut().enumerate() {
                *v = data[j * n + col];
            }
            self.forward_1d(&line, &mut out);
            for (j, &v) in out.iter().enumerate() {
                data[j * n + col] = v;
            }
        }
    }

    /// Inverse 2-D transform of a row-major `size × size` block, in place.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != size * size`.
    pub fn inverse_2d_in_place(&self, data: &mut [f64]) {
        let n = self.size;
        assert_eq!(data.len(), n * n);

        let mut line = vec![0.0; n];
        let mut out = vec![0.0; n];

        for col in 0..n {
            for (j, v) in line.iter_mut().enumerate() {
                *v = data[j * n + col];
            }
            self.inverse_1d(&line, &mut out);
            for (j, &v) in out.iter().enumerate() {
                data[j * n + col] = v;
            }
        }
        for row in data.chunks_exact_mut(n) {
            self.inverse_1d(row, &mut out);
            row.copy_from_slice(&out);
        }
    }

    /// Forward transform of one 8×8 tile.
    ///
    /// # Panics
    ///
    /// Panics if the plan was not built for [`BLOCK_SIZE`].
    pub fn forward_tile(&self, tile: &Tile<f64>) -> Tile<f64> {
        let mut coeffs = *tile;
        self.forward_2d_in_place(coeffs.as_mut_slice());
        coeffs
    }

    /// Inverse transform of one 8×8 coefficient tile.
    ///
    /// # Panics
    ///
    /// Panics if the plan was not built for [`BLOCK_SIZE`].
    pub fn inverse_tile(&self, coeffs: &Tile<f64>) -> Tile<f64> {
        let mut tile = *coeffs;
        self.inverse_2d_in_place(tile.as_mut_slice());
        tile
    }
}

impl Default for DctPlan {
    fn default() -> Self {
        Self::block()
    }
}

/// One-shot 1-D forward DCT of any length.
pub fn forward_1d(input: &[f64]) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut output = vec![0.0; input.len()];
    DctPlan::new(input.len()).forward_1d(input, &mut output);
    output
}

/// One-shot 1-D inverse DCT of any length.
pub fn inverse_1d(input: &[f64]) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut output = vec![0.0; input.len()];
    DctPlan::new(input.len()).inverse_1d(input, &mut output);
    output
}

/// Forward 2-D DCT of a row-major `size × size` block of any side length.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if `data.len() != size * size`.
pub fn forward_2d_square(data: &[f64], size: usize) -> Result<Vec<f64>> {
    square_pass(data, size, DctPlan::forward_2d_in_place)
}

/// Inverse of [`forward_2d_square`].
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if `data.len() != size * size`.
pub fn inverse_2d_square(data: &[f64], size: usize) -> Result<Vec<f64>> {
    square_pass(data, size, DctPlan::inverse_2d_in_place)
}

fn square_pass(data: &[f64], size: usize, pass: fn(&DctPlan, &mut [f64])) -> Result<Vec<f64>> {
    let expected = size.checked_mul(size).ok_or(CodecError::DimensionOverflow)?;
    if data.len() != expected {
        return Err(CodecError::InvalidBufferSize {
            expected,
            got: data.len(),
        });
    }
    if size == 0 {
        return Ok(Vec::new());
    }
    let mut out = data.to_vec();
    pass(&DctPlan::new(size), &mut out);
    Ok(out)
}

/// One-shot forward 2-D DCT of an 8×8 tile.
///
/// Builds a fresh plan; reuse a [`DctPlan`] when transforming many tiles.
pub fn forward_2d(tile: &Tile<f64>) -> Tile<f64> {
    DctPlan::block().forward_tile(tile)
}

/// One-shot inverse 2-D DCT of an 8×8 coefficient tile.
pub fn inverse_2d(coeffs: &Tile<f64>) -> Tile<f64> {
    DctPlan::block().inverse_tile(coeffs)
}
