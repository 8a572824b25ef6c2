//! Block decomposition
//!
//! Splits a channel plane into raster-ordered 8×8 tiles and stitches tiles
//! back into a plane.
//!
//! ```text
//!   col 0      8      16     20
//!  row ┌──────┬──────┬────┬ ─ ┐
//!   0  │  T0  │  T1  │ T2 │pad│
//!   8  ├──────┼──────┼────┼ ─ ┤
//!      │  T3  │  T4  │ T5 │pad│
//!  12  ├──────┴──────┴────┴ ─ ┤
//!      │ pad    pad    pad     │
//!      └ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ┘
//! ```
//!
//! Tiles that overhang the right or bottom edge are filled with `0.0`; the
//! padding is dropped again on recombination.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::ops::{Index, IndexMut};

use crate::error::{CodecError, Result};
use crate::{BLOCK_LEN, BLOCK_SIZE};

// ── Tile ───────────────────────────────────────────────────────

/// Fixed 8×8 block stored row-major in a flat array.
///
/// Used for spatial samples (`Tile<f64>`), transform coefficients
/// (`Tile<f64>`) and quantized coefficients (`Tile<i32>`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile<T> {
    data: [T; BLOCK_LEN],
}

impl<T: Copy + Default> Default for Tile<T> {
    fn default() -> Self {
        Self {
            data: [T::default(); BLOCK_LEN],
        }
    }
}

impl<T: Copy> Tile<T> {
    /// Wrap a row-major array of 64 values.
    #[inline]
    pub const fn new(data: [T; BLOCK_LEN]) -> Self {
        Self { data }
    }

    /// Tile with every cell set to `value`.
    #[inline]
    pub const fn splat(value: T) -> Self {
        Self {
            data: [value; BLOCK_LEN],
        }
    }

    /// Build a tile from a `(row, col)` generator.
    pub fn from_fn(mut f: impl FnMut(usize, usize) -> T) -> Self {
        Self {
            data: core::array::from_fn(|i| f(i / BLOCK_SIZE, i % BLOCK_SIZE)),
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * BLOCK_SIZE + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * BLOCK_SIZE + col] = value;
    }

    /// Row-major view (the "flatten" step of the pipeline).
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn into_array(self) -> [T; BLOCK_LEN] {
        self.data
    }

    /// Apply `f` to every cell, keeping positions.
    pub fn map<U: Copy>(&self, mut f: impl FnMut(T) -> U) -> Tile<U> {
        Tile {
            data: core::array::from_fn(|i| f(self.data[i])),
        }
    }
}

impl<T> Index<(usize, usize)> for Tile<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * BLOCK_SIZE + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Tile<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * BLOCK_SIZE + col]
    }
}

// ── ChannelMatrix ──────────────────────────────────────────────

/// One color channel as a `height × width` plane of real samples.
///
/// Samples are stored row-major in a single buffer with stride `width`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelMatrix {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl ChannelMatrix {
    /// Zero-filled plane.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DimensionOverflow`] if `width * height`
    /// overflows `usize`.
    pub fn zeros(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, 0.0)
    }

    /// Plane with every sample set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DimensionOverflow`] if `width * height`
    /// overflows `usize`.
    pub fn filled(width: usize, height: usize, value: f64) -> Result<Self> {
        let len = checked_area(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Wrap an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBufferSize`] if `data.len()` is not
    /// `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self> {
        let expected = checked_area(width, height)?;
        if data.len() != expected {
            return Err(CodecError::InvalidBufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a plane from a `(row, col)` generator.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::DimensionOverflow`] if `width * height`
    /// overflows `usize`.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Result<Self> {
        let len = checked_area(width, height)?;
        let mut data = Vec::with_capacity(len);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.width + col] = value;
    }

    /// One row of samples.
    #[inline]
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.width;
        &self.data[start..start + self.width]
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }
}

/// Checked `width * height`.
fn checked_area(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or(CodecError::DimensionOverflow)
}

// ── Tile grid ──────────────────────────────────────────────────

/// Number of tile columns and rows covering a `width × height` plane.
#[inline]
pub fn tile_grid(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(BLOCK_SIZE), height.div_ceil(BLOCK_SIZE))
}

/// `⌈width/8⌉ × ⌈height/8⌉`.
#[inline]
pub fn tile_count(width: usize, height: usize) -> usize {
    let (cols, rows) = tile_grid(width, height);
    cols * rows
}

/// Split a plane into raster-ordered tiles, zero-padding edge tiles.
pub fn decompose(matrix: &ChannelMatrix) -> Vec<Tile<f64>> {
    let (width, height) = (matrix.width, matrix.height);
    let mut tiles = Vec::with_capacity(tile_count(width, height));

    for row in (0..height).step_by(BLOCK_SIZE) {
        for col in (0..width).step_by(BLOCK_SIZE) {
            let rows_in = BLOCK_SIZE.min(height - row);
            let cols_in = BLOCK_SIZE.min(width - col);
            let mut tile = Tile::splat(0.0);
            for x in 0..rows_in {
                let src = matrix.row(row + x);
                tile.as_mut_slice()[x * BLOCK_SIZE..x * BLOCK_SIZE + cols_in]
                    .copy_from_slice(&src[col..col + cols_in]);
            }
            tiles.push(tile);
        }
    }

    tiles
}

/// Stitch raster-ordered tiles back into a `width × height` plane,
/// discarding padding cells.
///
/// # Errors
///
/// Returns [`CodecError::DimensionMismatch`] if `tiles.len()` is not
/// `⌈width/8⌉ × ⌈height/8⌉`.
pub fn recombine(tiles: &[Tile<f64>], width: usize, height: usize) -> Result<ChannelMatrix> {
    let expected = tile_count(width, height);
    if tiles.len() != expected {
        return Err(CodecError::DimensionMismatch {
            expected,
            got: tiles.len(),
        });
    }

    let mut matrix = ChannelMatrix::zeros(width, height)?;
    let mut index = 0;

    for row in (0..height).step_by(BLOCK_SIZE) {
        for col in (0..width).step_by(BLOCK_SIZE) {
            let tile = &tiles[index];
            index += 1;
            let rows_in = BLOCK_SIZE.min(height - row);
            let cols_in = BLOCK_SIZE.min(width - col);
            for x in 0..rows_in {
                let dst = (row + x) * width + col;
                matrix.data[dst..dst + cols_in]
                    .copy_from_slice(&tile.as_slice()[x * BLOCK_SIZE..x * BLOCK_SIZE + cols_in]);
            }
        }
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> ChannelMatrix {
        ChannelMatrix::from_fn(width, height, |r, c| (r * width + c) as f64).unwrap()
    }

    #[test]
    fn test_tile_count() {
        assert_eq!(tile_count(8, 8), 1);
        assert_eq!(tile_count(9, 8), 2);
        assert_eq!(tile_count(20, 12), 6);
        assert_eq!(tile_count(0, 0), 0);
        assert_eq!(tile_grid(17, 1), (3, 1));
    }

    #[test]
    fn test_decompose_raster_order() {
        let m = ramp(16, 16);
        let tiles = decompose(&m);
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].get(0, 0), 0.0);
        assert_eq!(tiles[1].get(0, 0), 8.0);
        assert_eq!(tiles[2].get(0, 0), 128.0);
        assert_eq!(tiles[3].get(7, 7), 255.0);
    }

    #[test]
    fn test_decompose_pads_with_zero() {
        let m = ChannelMatrix::filled(10, 3, 5.0).unwrap();
        let tiles = decompose(&m);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].get(2, 7), 5.0);
        assert_eq!(tiles[0].get(3, 0), 0.0);
        assert_eq!(tiles[1].get(0, 1), 5.0);
        assert_eq!(tiles[1].get(0, 2), 0.0);
    }

    #[test]
    fn test_roundtrip_exact_multiple() {
        let m = ramp(24, 16);
        let back = recombine(&decompose(&m), 24, 16).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_roundtrip_ragged_edges() {
        let m = ramp(13, 21);
        let back = recombine(&decompose(&m), 13, 21).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_recombine_wrong_count() {
        let tiles = vec![Tile::splat(1.0); 3];
        let err = recombine(&tiles, 16, 16).unwrap_err();
        assert_eq!(
            err,
            CodecError::DimensionMismatch {
                expected: 4,
                got: 3
            }
        );
    }

    #[test]
    fn test_from_vec_size_check() {
        let err = ChannelMatrix::from_vec(4, 4, vec![0.0; 15]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidBufferSize { expected: 16, got: 15 }));
    }

    #[test]
    fn test_tile_index_ops() {
        let mut t = Tile::<i32>::default();
        t[(3, 4)] = 9;
        assert_eq!(t.get(3, 4), 9);
        assert_eq!(t.as_slice()[3 * 8 + 4], 9);
        let doubled = t.map(|v| v * 2);
        assert_eq!(doubled[(3, 4)], 18);
    }
}
