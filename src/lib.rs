//! dct-codec: Block DCT Image Codec
//!
//! > "Most of a picture is the average of its neighbors."
//!
//! A minimal JPEG-style lossy codec. Each of the three RGB channels is cut
//! into 8×8 tiles, transformed with an orthonormal 2-D DCT, quantized
//! against a fixed table and written as `(skip, value)` run-length pairs.
//!
//! # Architecture
//!
//! ```text
//! RGB → planes → 8×8 tiles → 2-D DCT → Quantize → flatten → RLE → pairs
//! pairs → RLE⁻¹ → reshape → Dequantize → 2-D IDCT → tiles → planes → RGB
//! ```
//!
//! # Properties
//!
//! - **Per-channel**: red, green and blue are coded independently, with the
//!   same table; no color-space conversion, no subsampling
//! - **Lossy only at quantization**: DCT, block layout and RLE round-trip
//!   exactly; dequantization error per coefficient stays below its step
//! - **Tile-parallel**: tiles share nothing (`parallel` feature)
//!
//! # Example
//!
//! ```rust
//! use dct_codec::Codec;
//!
//! let (w, h) = (16u32, 16u32);
//! let pixels = vec![128u8; (w * h * 3) as usize];
//!
//! let codec = Codec::default();
//! let (encoded, report) = codec.encode_rgb(&pixels, w, h).unwrap();
//! assert!(report.encoded_bytes < report.raw_bytes);
//!
//! let recovered = codec.decode_rgb(&encoded).unwrap();
//! assert_eq!(recovered.len(), pixels.len());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod block;
pub mod color;
pub mod container;
pub mod dct;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod quant;
pub mod rle;

// Re-exports
pub use block::{decompose, recombine, ChannelMatrix, Tile};
pub use color::{merge_rgb, split_rgb};
pub use dct::DctPlan;
pub use error::{CodecError, Result};
pub use pipeline::{Codec, CodecConfig, EncodedImage, SizeReport};
pub use quant::{QuantTable, Quantizer, Rounding, LUMINANCE};
pub use rle::{OverflowPolicy, RleConfig, RunLengthPair};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tile side length.
pub const BLOCK_SIZE: usize = 8;

/// Values per tile.
pub const BLOCK_LEN: usize = BLOCK_SIZE * BLOCK_SIZE;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_constants() {
        assert_eq!(BLOCK_LEN, 64);
        assert_eq!(RleConfig::DEFAULT.block_len, BLOCK_LEN);
        assert!(usize::from(RleConfig::DEFAULT.max_skip) < BLOCK_LEN);
    }

    #[test]
    fn test_version_set() {
        assert!(!VERSION.is_empty());
    }
}
