//! RGB plane conversion
//!
//! Bridges interleaved 8-bit RGB pixel buffers and the three real-valued
//! channel planes the codec works on.
//!
//! ```text
//! [R0,G0,B0, R1,G1,B1, ...]  ⇄  R: [R0,R1,...]  G: [G0,G1,...]  B: [B0,B1,...]
//! ```
//!
//! No color-space conversion is applied: red, green and blue are coded as
//! three independent channels. Recovered samples are rounded to nearest
//! and clamped to `[0, 255]` on the way back.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::block::ChannelMatrix;
use crate::error::{CodecError, Result};

/// Number of interleaved channels in an RGB8 buffer.
pub const CHANNELS: usize = 3;

/// Round-then-clamp a recovered sample to a byte.
#[must_use]
#[inline]
pub fn sample_to_u8(value: f64) -> u8 {
    libm::round(value).clamp(0.0, 255.0) as u8
}

/// Split interleaved RGB8 pixels into red, green and blue planes.
///
/// # Errors
///
/// - [`CodecError::DimensionOverflow`] if `width * height * 3` overflows.
/// - [`CodecError::InvalidBufferSize`] if `pixels` has the wrong length.
///
/// # Example
///
/// ```
/// use dct_codec::color::split_rgb;
///
/// let pixels = [10u8, 20, 30, 40, 50, 60];
/// let [r, g, b] = split_rgb(&pixels, 2, 1).unwrap();
/// assert_eq!(r.get(0, 1), 40.0);
/// assert_eq!(g.get(0, 0), 20.0);
/// assert_eq!(b.get(0, 1), 60.0);
/// ```
pub fn split_rgb(pixels: &[u8], width: usize, height: usize) -> Result<[ChannelMatrix; 3]> {
    let n_pixels = width
        .checked_mul(height)
        .ok_or(CodecError::DimensionOverflow)?;
    let expected = n_pixels
        .checked_mul(CHANNELS)
        .ok_or(CodecError::DimensionOverflow)?;
    if pixels.len() != expected {
        return Err(CodecError::InvalidBufferSize {
            expected,
            got: pixels.len(),
        });
    }

    let mut planes: [Vec<f64>; 3] = core::array::from_fn(|_| Vec::with_capacity(n_pixels));
    for px in pixels.chunks_exact(CHANNELS) {
        for (plane, &v) in planes.iter_mut().zip(px) {
            plane.push(f64::from(v));
        }
    }

    let [r, g, b] = planes;
    Ok([
        ChannelMatrix::from_vec(width, height, r)?,
        ChannelMatrix::from_vec(width, height, g)?,
        ChannelMatrix::from_vec(width, height, b)?,
    ])
}

/// Interleave three planes back into RGB8 pixels.
///
/// # Errors
///
/// Returns [`CodecError::InvalidBufferSize`] if the planes differ in shape.
pub fn merge_rgb(channels: &[ChannelMatrix; 3]) -> Result<Vec<u8>> {
    let [r, g, b] = channels;
    for plane in [g, b] {
        if plane.width() != r.width() || plane.height() != r.height() {
            return Err(CodecError::InvalidBufferSize {
                expected: r.as_slice().len(),
                got: plane.as_slice().len(),
            });
        }
    }

    let mut out = Vec::with_capacity(r.as_slice().len() * CHANNELS);
    for ((&rv, &gv), &bv) in r.as_slice().iter().zip(g.as_slice()).zip(b.as_slice()) {
        out.push(sample_to_u8(rv));
        out.push(sample_to_u8(gv));
        out.push(sample_to_u8(bv));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_merge_roundtrip() {
        let pixels: Vec<u8> = (0..4 * 3 * 3).map(|i| (i * 7 % 256) as u8).collect();
        let planes = split_rgb(&pixels, 4, 3).unwrap();
        assert_eq!(planes[0].width(), 4);
        assert_eq!(planes[0].height(), 3);
        assert_eq!(merge_rgb(&planes).unwrap(), pixels);
    }

    #[test]
    fn test_split_wrong_length() {
        let err = split_rgb(&[0u8; 10], 2, 2).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidBufferSize {
                expected: 12,
                got: 10
            }
        );
    }

    #[test]
    fn test_split_overflow() {
        let err = split_rgb(&[], usize::MAX, 2).unwrap_err();
        assert_eq!(err, CodecError::DimensionOverflow);
    }

    #[test]
    fn test_round_then_clamp() {
        assert_eq!(sample_to_u8(-3.2), 0);
        assert_eq!(sample_to_u8(254.5), 255);
        assert_eq!(sample_to_u8(300.0), 255);
        assert_eq!(sample_to_u8(127.49), 127);
        assert_eq!(sample_to_u8(127.5), 128);
    }

    #[test]
    fn test_merge_shape_mismatch() {
        let a = ChannelMatrix::zeros(2, 2).unwrap();
        let b = ChannelMatrix::zeros(3, 2).unwrap();
        assert!(merge_rgb(&[a.clone(), a, b]).is_err());
    }
}
