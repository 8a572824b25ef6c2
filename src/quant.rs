//! Table quantization
//!
//! Each transform coefficient is divided by the matching entry of a fixed
//! 8×8 table and converted to an integer; dequantization multiplies back.
//!
//! ```text
//!   q[i][j] = round_mode(c[i][j] / T[i][j])
//!   c'[i][j] = q[i][j] · T[i][j]
//! ```
//!
//! The default conversion truncates toward zero, so for every cell
//! `|c' - c| < T[i][j]`. [`Rounding::Nearest`] halves that bound.
//!
//! The same table is used for all three channels.

#[cfg(not(feature = "std"))]
use alloc::format;

use crate::block::Tile;
use crate::error::{CodecError, Result};
use crate::{BLOCK_LEN, BLOCK_SIZE};

/// Read-only 8×8 table of positive divisors, row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantTable {
    steps: [u16; BLOCK_LEN],
}

/// Standard luminance table (ITU-T T.81, Annex K.1).
pub const LUMINANCE: QuantTable = QuantTable::new([
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99, //
]);

impl QuantTable {
    /// Build a table from row-major steps.
    ///
    /// # Panics
    ///
    /// Panics if any step is zero. Use [`QuantTable::try_new`] for
    /// untrusted input.
    pub const fn new(steps: [u16; BLOCK_LEN]) -> Self {
        let mut i = 0;
        while i < BLOCK_LEN {
            assert!(steps[i] > 0, "quantization steps must be positive");
            i += 1;
        }
        Self { steps }
    }

    /// Fallible constructor.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidConfig`] if any step is zero.
    pub fn try_new(steps: [u16; BLOCK_LEN]) -> Result<Self> {
        match steps.iter().position(|&s| s == 0) {
            Some(i) => Err(CodecError::InvalidConfig(format!(
                "quantization step at ({}, {}) is zero",
                i / BLOCK_SIZE,
                i % BLOCK_SIZE
            ))),
            None => Ok(Self { steps }),
        }
    }

    /// Table with the same step everywhere.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidConfig`] if `step` is zero.
    pub fn uniform(step: u16) -> Result<Self> {
        Self::try_new([step; BLOCK_LEN])
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u16 {
        self.steps[row * BLOCK_SIZE + col]
    }

    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.steps
    }
}

impl Default for QuantTable {
    fn default() -> Self {
        LUMINANCE
    }
}

/// Float → integer conversion applied after division.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Rounding {
    /// Drop the fractional part (toward zero).
    #[default]
    Truncate,
    /// Round to nearest, halves away from zero.
    Nearest,
}

impl Rounding {
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Truncate => libm::trunc(value),
            Self::Nearest => libm::round(value),
        }
    }
}

/// Quantizer configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quantizer {
    /// Divisor table
    pub table: QuantTable,
    /// Conversion applied to each quotient
    pub rounding: Rounding,
}

impl Quantizer {
    /// Create quantizer over `table` with truncating conversion.
    #[inline]
    pub const fn new(table: QuantTable) -> Self {
        Self {
            table,
            rounding: Rounding::Truncate,
        }
    }

    /// Create quantizer with an explicit rounding mode.
    #[inline]
    pub const fn with_rounding(table: QuantTable, rounding: Rounding) -> Self {
        Self { table, rounding }
    }

    /// Quantize a single coefficient against `step`.
    ///
    /// Out-of-range quotients saturate at the `i32` bounds; the run-length
    /// stage rejects anything outside `i16`.
    #[inline]
    pub fn quantize_value(&self, value: f64, step: u16) -> i32 {
        self.rounding.apply(value / f64::from(step)) as i32
    }

    /// Quantize a coefficient tile.
    pub fn quantize(&self, coeffs: &Tile<f64>) -> Tile<i32> {
        let steps = self.table.as_slice();
        let c = coeffs.as_slice();
        Tile::new(core::array::from_fn(|i| {
            self.quantize_value(c[i], steps[i])
        }))
    }

    /// Dequantize a tile: exact integer-to-real widening times the step.
    pub fn dequantize(&self, quantized: &Tile<i32>) -> Tile<f64> {
        let steps = self.table.as_slice();
        let q = quantized.as_slice();
        Tile::new(core::array::from_fn(|i| {
            f64::from(q[i]) * f64::from(steps[i])
        }))
    }
}
