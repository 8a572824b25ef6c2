//! Run-length coding of quantized tiles
//!
//! A flattened tile is written as `(skip, value)` pairs: `skip` zeros
//! followed by one `value`. The stream always ends with the End-Of-Block
//! sentinel `(0, 0)`; positions after it are zero.
//!
//! ```text
//!  index:  0 1 2 3 4 5 6 ... 62 63
//!  value:  0 0 0 0 0 7 0 ...  0  3
//!
//!  pairs:  (5, 7) (57, 3) (0, 0)
//! ```
//!
//! # Forced flush
//!
//! `skip` is bounded by [`RleConfig::max_skip`] (62 by default). When a
//! zero run grows to `max_skip + 1`, the encoder emits `(max_skip, 0)` and
//! starts a new run. The decoder handles that pair like any other (skip
//! `max_skip`, write a zero, advance), so it stands for exactly
//! `max_skip + 1` zeros. Because `max_skip ≥ 1`, a flush pair never
//! collides with the EOB sentinel.
//!
//! # Cursor
//!
//! Each pair advances the write cursor by `skip`, writes `value` and steps
//! one cell further, except that the cursor stays on the last cell once it
//! has been written. A pair that lands past the block is clamped onto the
//! last cell or rejected, per [`OverflowPolicy`].

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(not(feature = "std"))]
use alloc::string::ToString;

use tracing::debug;

use crate::error::{CodecError, Result};
use crate::BLOCK_LEN;

/// Bytes accounted per pair in size reports: one 8-bit skip plus two
/// 16-bit units for the value.
pub const PAIR_BYTES: usize = 1 + 2 * 2;

/// Default upper bound for a pair's skip count.
pub const DEFAULT_MAX_SKIP: u8 = 62;

/// One `(skip, value)` unit of the run-length stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RunLengthPair {
    /// Zeros preceding `value`.
    pub skip: u8,
    /// Coefficient written after the zeros.
    pub value: i16,
}

impl RunLengthPair {
    /// End-Of-Block sentinel.
    pub const EOB: Self = Self { skip: 0, value: 0 };

    #[inline]
    pub const fn new(skip: u8, value: i16) -> Self {
        Self { skip, value }
    }

    #[inline]
    pub const fn is_eob(&self) -> bool {
        self.skip == 0 && self.value == 0
    }

    /// True for the forced-flush pair `(max_skip, 0)`.
    #[inline]
    pub const fn is_flush(&self, max_skip: u8) -> bool {
        self.value == 0 && self.skip == max_skip && max_skip != 0
    }
}

impl From<(u8, i16)> for RunLengthPair {
    fn from((skip, value): (u8, i16)) -> Self {
        Self { skip, value }
    }
}

/// What the decoder does when a skip pushes the cursor past the block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Clamp the cursor to the last cell and keep going.
    #[default]
    Clamp,
    /// Fail with [`CodecError::RunOverflow`].
    Reject,
}

/// Parameters shared by the encoder and decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RleConfig {
    /// Values per block (64 for 8×8 tiles).
    pub block_len: usize,
    /// Largest skip a pair may carry before a forced flush.
    pub max_skip: u8,
    /// Decoder behavior on cursor overflow.
    pub overflow: OverflowPolicy,
}

impl RleConfig {
    /// 64-value blocks, flush at 63 zeros, clamping decoder.
    pub const DEFAULT: Self = Self {
        block_len: BLOCK_LEN,
        max_skip: DEFAULT_MAX_SKIP,
        overflow: OverflowPolicy::Clamp,
    };

    #[must_use]
    pub const fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Check the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidConfig`] if `block_len` or `max_skip`
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        if self.block_len == 0 {
            return Err(CodecError::InvalidConfig(
                "run-length block length must be positive".to_string(),
            ));
        }
        if self.max_skip == 0 {
            return Err(CodecError::InvalidConfig(
                "max_skip must be at least 1 so flush pairs differ from EOB".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RleConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Encode one flattened block.
///
/// # Errors
///
/// - [`CodecError::InvalidConfig`] if `config` fails [`RleConfig::validate`].
/// - [`CodecError::InvalidBufferSize`] if `values.len() != config.block_len`.
/// - [`CodecError::ValueOutOfRange`] if a nonzero value does not fit `i16`.
pub fn encode(values: &[i32], config: &RleConfig) -> Result<Vec<RunLengthPair>> {
    config.validate()?;
    if values.len() != config.block_len {
        return Err(CodecError::InvalidBufferSize {
            expected: config.block_len,
            got: values.len(),
        });
    }

    let mut pairs = Vec::new();
    let mut run: u8 = 0;

    for &v in values {
        if v == 0 {
            if run == config.max_skip {
                pairs.push(RunLengthPair::new(config.max_skip, 0));
                run = 0;
            } else {
                run += 1;
            }
        } else {
            let value = i16::try_from(v).map_err(|_| CodecError::ValueOutOfRange {
                value: i64::from(v),
            })?;
            pairs.push(RunLengthPair::new(run, value));
            run = 0;
        }
    }

    pairs.push(RunLengthPair::EOB);
    Ok(pairs)
}

/// Decode a pair stream into `config.block_len` values.
///
/// # Errors
///
/// - [`CodecError::InvalidConfig`] if `config` fails [`RleConfig::validate`].
/// - [`CodecError::RunOverflow`] under [`OverflowPolicy::Reject`] when a
///   pair lands beyond the block.
pub fn decode(pairs: &[RunLengthPair], config: &RleConfig) -> Result<Vec<i32>> {
    let mut out = vec![0i32; config.block_len];
    decode_into(pairs, config, &mut out)?;
    Ok(out)
}

/// Decode into a caller-provided block; every cell is overwritten.
///
/// # Errors
///
/// - [`CodecError::InvalidConfig`] if `config` fails [`RleConfig::validate`].
/// - [`CodecError::InvalidBufferSize`] if `out.len() != config.block_len`.
/// - [`CodecError::RunOverflow`] under [`OverflowPolicy::Reject`].
pub fn decode_into(pairs: &[RunLengthPair], config: &RleConfig, out: &mut [i32]) -> Result<()> {
    config.validate()?;
    let block_len = config.block_len;
    if out.len() != block_len {
        return Err(CodecError::InvalidBufferSize {
            expected: block_len,
            got: out.len(),
        });
    }
    out.fill(0);

    let last = block_len - 1;
    let mut cursor = 0usize;

    for pair in pairs {
        if pair.is_eob() {
            break;
        }

        let mut position = cursor + usize::from(pair.skip);
        if position > last {
            match config.overflow {
                OverflowPolicy::Clamp => {
                    debug!(position, block_len, "run-length cursor clamped");
                    position = last;
                }
                OverflowPolicy::Reject => {
                    return Err(CodecError::RunOverflow {
                        position,
                        block_len,
                    });
                }
            }
        }

        out[position] = i32::from(pair.value);
        // The cursor parks on the last cell once it is written.
        cursor = (position + 1).min(last);
    }

    Ok(())
}

/// Bytes the pairs would occupy at [`PAIR_BYTES`] each.
#[inline]
pub fn encoded_size(pairs: &[RunLengthPair]) -> usize {
    pairs.len() * PAIR_BYTES
}
