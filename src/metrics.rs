//! Reconstruction quality
//!
//! Compares an image with its recovered copy, either as interleaved RGB8
//! bytes or as the three [`ChannelMatrix`] planes the codec works on, and
//! measures how far a tile's coefficients drift through quantization
//! relative to the table steps.
//!
//! PSNR uses an 8-bit peak of 255 and is infinite for an exact match.

use crate::block::{ChannelMatrix, Tile};
use crate::color::CHANNELS;
use crate::error::{CodecError, Result};
use crate::quant::Quantizer;

/// Peak sample value of an 8-bit channel.
pub const PEAK: f64 = 255.0;

/// Running squared-error and max-error totals.
#[derive(Clone, Copy, Debug, Default)]
struct ErrorSum {
    squared: f64,
    max_abs: f64,
    count: usize,
}

impl ErrorSum {
    fn add(&mut self, a: f64, b: f64) {
        let diff = a - b;
        self.squared += diff * diff;
        self.max_abs = self.max_abs.max(libm::fabs(diff));
        self.count += 1;
    }

    fn stats(&self) -> ChannelStats {
        let mse = if self.count == 0 {
            0.0
        } else {
            self.squared / self.count as f64
        };
        ChannelStats {
            mse,
            psnr: psnr_from_mse(mse),
            max_abs_error: self.max_abs,
        }
    }
}

/// Error figures for one channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelStats {
    pub mse: f64,
    /// Decibels; `f64::INFINITY` when `mse` is zero.
    pub psnr: f64,
    pub max_abs_error: f64,
}

/// Per-channel and combined error of a recovered RGB image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualityReport {
    /// Red, green and blue, in that order.
    pub channels: [ChannelStats; 3],
    /// All samples of all channels pooled together.
    pub overall: ChannelStats,
}

impl QualityReport {
    #[inline]
    pub fn psnr(&self) -> f64 {
        self.overall.psnr
    }

    /// Channel with the lowest PSNR, as an index into `channels`.
    pub fn worst_channel(&self) -> usize {
        (1..CHANNELS).fold(0, |worst, i| {
            if self.channels[i].psnr < self.channels[worst].psnr {
                i
            } else {
                worst
            }
        })
    }
}

/// `10 · log10(255² / mse)`, infinite for `mse == 0`.
#[must_use]
pub fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        return f64::INFINITY;
    }
    10.0 * libm::log10(PEAK * PEAK / mse)
}

/// Compare two planes of the same shape.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the shapes differ.
pub fn compare_channel(original: &ChannelMatrix, recovered: &ChannelMatrix) -> Result<ChannelStats> {
    check_shape(original, recovered)?;
    let mut sum = ErrorSum::default();
    for (&a, &b) in original.as_slice().iter().zip(recovered.as_slice()) {
        sum.add(a, b);
    }
    Ok(sum.stats())
}

/// Compare two three-plane images, e.g. the input of
/// [`Codec::compress_image`](crate::Codec::compress_image) and the output
/// of [`Codec::recover_image`](crate::Codec::recover_image).
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if any pair of planes differs
/// in shape.
pub fn compare_image(
    original: &[ChannelMatrix; 3],
    recovered: &[ChannelMatrix; 3],
) -> Result<QualityReport> {
    let mut pooled = ErrorSum::default();
    let mut sums = [ErrorSum::default(); 3];
    for ((a, b), sum) in original.iter().zip(recovered).zip(&mut sums) {
        check_shape(a, b)?;
        for (&x, &y) in a.as_slice().iter().zip(b.as_slice()) {
            sum.add(x, y);
            pooled.add(x, y);
        }
    }
    Ok(QualityReport {
        channels: sums.map(|s| s.stats()),
        overall: pooled.stats(),
    })
}

/// Compare two interleaved RGB8 buffers channel by channel.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the lengths differ or are
/// not a whole number of pixels.
pub fn compare_rgb(original: &[u8], recovered: &[u8]) -> Result<QualityReport> {
    if original.len() != recovered.len() || original.len() % CHANNELS != 0 {
        return Err(CodecError::InvalidBufferSize {
            expected: original.len() - original.len() % CHANNELS,
            got: recovered.len(),
        });
    }
    let mut pooled = ErrorSum::default();
    let mut sums = [ErrorSum::default(); 3];
    for (pa, pb) in original
        .chunks_exact(CHANNELS)
        .zip(recovered.chunks_exact(CHANNELS))
    {
        for ((&a, &b), sum) in pa.iter().zip(pb).zip(&mut sums) {
            sum.add(f64::from(a), f64::from(b));
            pooled.add(f64::from(a), f64::from(b));
        }
    }
    Ok(QualityReport {
        channels: sums.map(|s| s.stats()),
        overall: pooled.stats(),
    })
}

/// Pooled PSNR of two interleaved RGB8 buffers.
///
/// # Errors
///
/// See [`compare_rgb`].
///
/// # Example
///
/// ```
/// use dct_codec::metrics::psnr;
///
/// let original = [100u8, 150, 200];
/// let decoded  = [101u8, 149, 198];
/// assert!(psnr(&original, &decoded).unwrap() > 40.0);
/// ```
pub fn psnr(original: &[u8], recovered: &[u8]) -> Result<f64> {
    compare_rgb(original, recovered).map(|r| r.psnr())
}

/// Quantization drift of one coefficient tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantizationError {
    /// Largest `|dequantize(quantize(c)) - c|` over the tile.
    pub max_abs: f64,
    /// Largest drift divided by its table step; below 1 for every tile.
    pub max_step_fraction: f64,
}

/// Measure how far `coeffs` move through a quantize/dequantize cycle.
pub fn quantization_error(quantizer: &Quantizer, coeffs: &Tile<f64>) -> QuantizationError {
    let back = quantizer.dequantize(&quantizer.quantize(coeffs));
    let mut max_abs: f64 = 0.0;
    let mut max_step_fraction: f64 = 0.0;
    let steps = quantizer.table.as_slice();
    for ((&c, &d), &step) in coeffs.as_slice().iter().zip(back.as_slice()).zip(steps) {
        let drift = libm::fabs(d - c);
        max_abs = max_abs.max(drift);
        max_step_fraction = max_step_fraction.max(drift / f64::from(step));
    }
    QuantizationError {
        max_abs,
        max_step_fraction,
    }
}

fn check_shape(a: &ChannelMatrix, b: &ChannelMatrix) -> Result<()> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(CodecError::InvalidBufferSize {
            expected: a.as_slice().len(),
            got: b.as_slice().len(),
        });
    }
    Ok(())
}
