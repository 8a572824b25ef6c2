//! Byte container for [`EncodedImage`]
//!
//! The codec core does not need a byte layout; this one exists so the CLI
//! can persist an encoded image together with its dimensions.
//!
//! # Layout (all integers little-endian)
//!
//! ```text
//! ┌───────┬─────────┬───────┬────────┐
//! │ BDCT  │ version │ width │ height │   header, 13 bytes
//! │  4B   │   1B    │  u32  │  u32   │
//! └───────┴─────────┴───────┴────────┘
//! then for R, G, B and each of ⌈w/8⌉·⌈h/8⌉ tiles, in raster order:
//! ┌────────────┬──────────────────────────────────────┐
//! │ pair count │ (skip u8, value i16) × pair count     │
//! │    u16     │              3B each                 │
//! └────────────┴──────────────────────────────────────┘
//! ```

#[cfg(not(feature = "std"))]
use alloc::format;
#[cfg(not(feature = "std"))]
use alloc::string::ToString;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::block::tile_count;
use crate::error::{CodecError, Result};
use crate::pipeline::{EncodedChannel, EncodedImage};
use crate::rle::RunLengthPair;

/// File magic bytes.
const MAGIC: &[u8; 4] = b"BDCT";

/// Current container format version.
const FORMAT_VERSION: u8 = 1;

/// Fixed header (magic + version + width + height).
const HEADER_BYTES: usize = 4 + 1 + 4 + 4;

/// Serialized size of one pair.
const PAIR_WIRE_BYTES: usize = 1 + 2;

impl EncodedImage {
    /// Serialize to a self-contained byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBitstream`] if a tile holds more than
    /// `u16::MAX` pairs.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body: usize = self
            .channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(|tile| 2 + tile.len() * PAIR_WIRE_BYTES)
            .sum();
        let mut buf = Vec::with_capacity(HEADER_BYTES + body);

        buf.extend_from_slice(MAGIC);
        buf.push(FORMAT_VERSION);
        buf.extend_from_slice(&self.width.to_le_bytes());
        buf.extend_from_slice(&self.height.to_le_bytes());

        for tile in self.channels.iter().flat_map(|ch| ch.iter()) {
            let count = u16::try_from(tile.len()).map_err(|_| {
                CodecError::InvalidBitstream(format!("tile has {} pairs", tile.len()))
            })?;
            buf.extend_from_slice(&count.to_le_bytes());
            for pair in tile {
                buf.push(pair.skip);
                buf.extend_from_slice(&pair.value.to_le_bytes());
            }
        }

        Ok(buf)
    }

    /// Reconstruct an [`EncodedImage`] from bytes produced by
    /// [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBitstream`] if the data is truncated,
    /// has a wrong magic number, an unsupported version, or trailing bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);

        if reader.take(4)? != MAGIC {
            return Err(CodecError::InvalidBitstream(
                "bad magic (expected BDCT)".to_string(),
            ));
        }
        let version = reader.u8()?;
        if version != FORMAT_VERSION {
            return Err(CodecError::InvalidBitstream(format!(
                "unsupported version: {version} (expected {FORMAT_VERSION})"
            )));
        }
        let width = reader.u32()?;
        let height = reader.u32()?;

        let tiles = tile_count(width as usize, height as usize);
        // Each tile needs at least its count field.
        if reader.remaining() < tiles.saturating_mul(3 * 2) {
            return Err(CodecError::InvalidBitstream(format!(
                "{width}x{height} needs {tiles} tiles per channel, data too short"
            )));
        }

        let mut channels: [EncodedChannel; 3] = Default::default();
        for channel in &mut channels {
            channel.reserve_exact(tiles);
            for _ in 0..tiles {
                let count = usize::from(reader.u16()?);
                let mut pairs = Vec::with_capacity(count);
                for _ in 0..count {
                    let skip = reader.u8()?;
                    let value = reader.i16()?;
                    pairs.push(RunLengthPair::new(skip, value));
                }
                channel.push(pairs);
            }
        }

        if reader.remaining() != 0 {
            return Err(CodecError::InvalidBitstream(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }

        Ok(Self {
            width,
            height,
            channels,
        })
    }
}

/// Bounds-checked little-endian cursor.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CodecError::InvalidBitstream(format!(
                "truncated at byte {}: need {n} more",
                self.pos
            )));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn i16(&mut self) -> Result<i16> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Codec;

    fn sample() -> EncodedImage {
        let (w, h) = (20u32, 10u32);
        let rgb: Vec<u8> = (0..w * h * 3).map(|i| (i * 13 % 256) as u8).collect();
        Codec::default().encode_rgb(&rgb, w, h).unwrap().0
    }

    #[test]
    fn test_bytes_roundtrip() {
        let encoded = sample();
        let bytes = encoded.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"BDCT");
        let restored = EncodedImage::from_bytes(&bytes).unwrap();
        assert_eq!(restored, encoded);
    }

    #[test]
    fn test_empty_image_bytes() {
        let encoded = Codec::default().encode_rgb(&[], 0, 0).unwrap().0;
        let bytes = encoded.to_bytes().unwrap();
        assert_eq!(bytes.len(), HEADER_BYTES);
        assert_eq!(EncodedImage::from_bytes(&bytes).unwrap(), encoded);
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            EncodedImage::from_bytes(&bytes),
            Err(CodecError::InvalidBitstream(_))
        ));
    }

    #[test]
    fn test_bad_version() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[4] = 9;
        let err = EncodedImage::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("unsupported version"));
    }

    #[test]
    fn test_truncated() {
        let bytes = sample().to_bytes().unwrap();
        for cut in [0, 3, HEADER_BYTES, bytes.len() - 1] {
            assert!(EncodedImage::from_bytes(&bytes[..cut]).is_err(), "cut {cut}");
        }
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes.push(0);
        assert!(EncodedImage::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_huge_dimensions_rejected_early() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(EncodedImage::from_bytes(&bytes).is_err());
    }
}
