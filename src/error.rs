//! Error types for dct-codec
//!
//! All public APIs that can fail return `Result<T, CodecError>`.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use core::fmt;

/// Errors that can occur during encoding, decoding, or buffer operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// Tile count handed to recombine/decode does not match the grid
    /// implied by the channel dimensions.
    DimensionMismatch { expected: usize, got: usize },
    /// A quantized coefficient does not fit the signed 16-bit pair value.
    ValueOutOfRange { value: i64 },
    /// Run-length decode cursor would leave the block.
    RunOverflow { position: usize, block_len: usize },
    /// Input buffer size does not match the declared dimensions.
    InvalidBufferSize { expected: usize, got: usize },
    /// Width or height is zero where a non-empty image is required.
    InvalidDimensions { width: u32, height: u32 },
    /// Dimensions overflow `usize` when multiplied together.
    DimensionOverflow,
    /// A configuration value is unusable.
    InvalidConfig(String),
    /// The serialized container is malformed or truncated.
    InvalidBitstream(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, got } => {
                write!(f, "tile count mismatch: expected {expected}, got {got}")
            }
            Self::ValueOutOfRange { value } => {
                write!(f, "quantized value {value} does not fit in i16")
            }
            Self::RunOverflow {
                position,
                block_len,
            } => write!(
                f,
                "run-length cursor {position} exceeds block length {block_len}"
            ),
            Self::InvalidBufferSize { expected, got } => {
                write!(f, "buffer size mismatch: expected {expected}, got {got}")
            }
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::DimensionOverflow => write!(f, "dimensions overflow usize"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::InvalidBitstream(msg) => write!(f, "invalid bitstream: {msg}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, CodecError>;
