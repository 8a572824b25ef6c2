//! End-to-end compress/recover pipeline
//!
//! Wires block decomposition, the 2-D DCT, table quantization and
//! run-length coding into a single API.
//!
//! # Pipeline
//!
//! ```text
//! Compress: plane -> 8x8 tiles -> DCT -> Quantize -> flatten -> RLE -> pairs
//! Recover:  pairs -> RLE decode -> reshape -> Dequantize -> IDCT -> tiles -> plane
//! ```
//!
//! Each color channel is processed independently, tile by tile, in raster
//! order. Tiles share no state, so the `parallel` feature can fan them out
//! over rayon without changing any output.

#[cfg(not(feature = "std"))]
use alloc::format;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use tracing::{debug, info};

use crate::block::{decompose, recombine, tile_count, ChannelMatrix, Tile};
use crate::color::{merge_rgb, split_rgb, CHANNELS};
use crate::dct::DctPlan;
use crate::error::{CodecError, Result};
use crate::quant::{QuantTable, Quantizer, Rounding};
use crate::rle::{self, OverflowPolicy, RleConfig, RunLengthPair, PAIR_BYTES};
use crate::BLOCK_LEN;

/// Pair stream of one tile, EOB-terminated.
pub type EncodedTile = Vec<RunLengthPair>;

/// Raster-ordered tiles of one channel.
pub type EncodedChannel = Vec<EncodedTile>;

// ── Configuration ──────────────────────────────────────────────

/// Codec settings shared by the compress and recover paths.
///
/// Use [`CodecConfig::builder()`] to create one with a fluent API.
///
/// # Example
///
/// ```
/// use dct_codec::pipeline::CodecConfig;
/// use dct_codec::quant::Rounding;
/// use dct_codec::rle::OverflowPolicy;
///
/// let config = CodecConfig::builder()
///     .rounding(Rounding::Nearest)
///     .overflow(OverflowPolicy::Reject)
///     .build();
/// assert_eq!(config.quantizer.rounding, Rounding::Nearest);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodecConfig {
    /// Quantization table and rounding mode.
    pub quantizer: Quantizer,
    /// Run-length parameters.
    pub rle: RleConfig,
    /// Fan tile work out over rayon (only with the `parallel` feature).
    pub parallel: bool,
}

impl CodecConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::default()
    }
}

/// Builder for [`CodecConfig`].
#[derive(Clone, Debug, Default)]
pub struct CodecConfigBuilder {
    config: CodecConfig,
}

impl CodecConfigBuilder {
    pub fn table(mut self, table: QuantTable) -> Self {
        self.config.quantizer.table = table;
        self
    }

    pub fn rounding(mut self, rounding: Rounding) -> Self {
        self.config.quantizer.rounding = rounding;
        self
    }

    pub fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.config.rle.overflow = overflow;
        self
    }

    /// Largest skip a pair may carry before a forced flush.
    pub fn max_skip(mut self, max_skip: u8) -> Self {
        self.config.rle.max_skip = max_skip;
        self
    }

    pub fn parallel(mut self, value: bool) -> Self {
        self.config.parallel = value;
        self
    }

    /// Build the [`CodecConfig`].
    #[must_use]
    pub fn build(self) -> CodecConfig {
        self.config
    }
}

// ── EncodedImage ───────────────────────────────────────────────

/// Run-length coded RGB image.
///
/// `channels` holds red, green and blue, each a raster-ordered list of
/// per-tile pair streams. The pair streams carry no header; `width` and
/// `height` travel alongside them and are required to recover the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Per-channel tile streams (R, G, B).
    pub channels: [EncodedChannel; 3],
}

impl EncodedImage {
    #[inline]
    pub fn red(&self) -> &[EncodedTile] {
        &self.channels[0]
    }

    #[inline]
    pub fn green(&self) -> &[EncodedTile] {
        &self.channels[1]
    }

    #[inline]
    pub fn blue(&self) -> &[EncodedTile] {
        &self.channels[2]
    }

    /// Tiles per channel expected for the stored dimensions.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        tile_count(self.width as usize, self.height as usize)
    }

    /// Total pairs over all tiles and channels.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.channels
            .iter()
            .flat_map(|ch| ch.iter())
            .map(Vec::len)
            .sum()
    }

    /// Encoded size at [`PAIR_BYTES`] per pair.
    #[must_use]
    pub fn encoded_bytes(&self) -> usize {
        self.pair_count() * PAIR_BYTES
    }

    /// Uncompressed size: one byte per sample, three channels.
    #[must_use]
    pub fn raw_bytes(&self) -> usize {
        self.width as usize * self.height as usize * CHANNELS
    }

    #[must_use]
    pub fn size_report(&self) -> SizeReport {
        SizeReport {
            raw_bytes: self.raw_bytes(),
            encoded_bytes: self.encoded_bytes(),
        }
    }
}

/// Raw-versus-encoded size of one compression run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeReport {
    pub raw_bytes: usize,
    pub encoded_bytes: usize,
}

impl SizeReport {
    /// `encoded / raw`; `0.0` for an empty image.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            self.encoded_bytes as f64 / self.raw_bytes as f64
        }
    }

    /// `(1 - encoded / raw) · 100`.
    #[must_use]
    pub fn savings_percent(&self) -> f64 {
        if self.raw_bytes == 0 {
            0.0
        } else {
            (1.0 - self.ratio()) * 100.0
        }
    }
}

// ── Codec ──────────────────────────────────────────────────────

/// Block DCT codec.
///
/// Holds the configuration and the precomputed 8×8 cosine basis; both are
/// read-only, so one codec can serve any number of threads.
#[derive(Clone, Debug)]
pub struct Codec {
    config: CodecConfig,
    plan: DctPlan,
}

impl Codec {
    /// Create a codec.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidConfig`] if the run-length parameters
    /// are unusable or do not describe 64-value blocks.
    pub fn new(config: CodecConfig) -> Result<Self> {
        config.rle.validate()?;
        if config.rle.block_len != BLOCK_LEN {
            return Err(CodecError::InvalidConfig(format!(
                "run-length block length {} does not match {BLOCK_LEN}-value tiles",
                config.rle.block_len
            )));
        }
        #[cfg(not(feature = "parallel"))]
        if config.parallel {
            debug!("parallel requested but the `parallel` feature is disabled");
        }
        Ok(Self {
            config,
            plan: DctPlan::block(),
        })
    }

    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// DCT → quantize → flatten → run-length encode for one tile.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::ValueOutOfRange`] if a quantized coefficient
    /// does not fit `i16`.
    pub fn encode_tile(&self, tile: &Tile<f64>) -> Result<EncodedTile> {
        let coeffs = self.plan.forward_tile(tile);
        let quantized = self.config.quantizer.quantize(&coeffs);
        rle::encode(quantized.as_slice(), &self.config.rle)
    }

    /// Run-length decode → reshape → dequantize → inverse DCT for one tile.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::RunOverflow`] under [`OverflowPolicy::Reject`].
    pub fn decode_tile(&self, pairs: &[RunLengthPair]) -> Result<Tile<f64>> {
        let mut quantized = Tile::<i32>::default();
        rle::decode_into(pairs, &self.config.rle, quantized.as_mut_slice())?;
        let coeffs = self.config.quantizer.dequantize(&quantized);
        Ok(self.plan.inverse_tile(&coeffs))
    }

    /// Compress one channel into raster-ordered tile streams.
    ///
    /// # Errors
    ///
    /// See [`Codec::encode_tile`].
    pub fn compress_channel(&self, matrix: &ChannelMatrix) -> Result<EncodedChannel> {
        let tiles = decompose(matrix);
        self.map_tiles(&tiles, |tile| self.encode_tile(tile))
    }

    /// Recover one `width × height` channel from its tile streams.
    ///
    /// # Errors
    ///
    /// - [`CodecError::DimensionMismatch`] if the tile count does not match
    ///   `⌈width/8⌉ × ⌈height/8⌉`.
    /// - [`CodecError::RunOverflow`] under [`OverflowPolicy::Reject`].
    pub fn decompress_channel(
        &self,
        encoded: &[EncodedTile],
        width: usize,
        height: usize,
    ) -> Result<ChannelMatrix> {
        let expected = tile_count(width, height);
        if encoded.len() != expected {
            return Err(CodecError::DimensionMismatch {
                expected,
                got: encoded.len(),
            });
        }
        let tiles = self.map_tiles(encoded, |pairs| self.decode_tile(pairs))?;
        recombine(&tiles, width, height)
    }

    /// Compress three same-shaped channels and report the size saving.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidBufferSize`] if the channels differ in shape.
    /// - [`CodecError::DimensionOverflow`] if a dimension exceeds `u32`.
    /// - See [`Codec::encode_tile`].
    pub fn compress_image(
        &self,
        channels: &[ChannelMatrix; 3],
    ) -> Result<(EncodedImage, SizeReport)> {
        let (w, h) = (channels[0].width(), channels[0].height());
        for ch in &channels[1..] {
            if ch.width() != w || ch.height() != h {
                return Err(CodecError::InvalidBufferSize {
                    expected: channels[0].as_slice().len(),
                    got: ch.as_slice().len(),
                });
            }
        }
        let width = u32::try_from(w).map_err(|_| CodecError::DimensionOverflow)?;
        let height = u32::try_from(h).map_err(|_| CodecError::DimensionOverflow)?;

        let [r, g, b] = channels;
        let encoded = EncodedImage {
            width,
            height,
            channels: [
                self.compress_channel(r)?,
                self.compress_channel(g)?,
                self.compress_channel(b)?,
            ],
        };

        let report = encoded.size_report();
        info!(
            width,
            height,
            raw_bytes = report.raw_bytes,
            encoded_bytes = report.encoded_bytes,
            savings_percent = report.savings_percent(),
            "compressed image"
        );

        Ok((encoded, report))
    }

    /// Recover the three channels of an encoded image.
    ///
    /// # Errors
    ///
    /// See [`Codec::decompress_channel`].
    pub fn recover_image(&self, encoded: &EncodedImage) -> Result<[ChannelMatrix; 3]> {
        let (w, h) = (encoded.width as usize, encoded.height as usize);
        let [r, g, b] = &encoded.channels;
        let channels = [
            self.decompress_channel(r, w, h)?,
            self.decompress_channel(g, w, h)?,
            self.decompress_channel(b, w, h)?,
        ];
        debug!(width = w, height = h, "recovered image");
        Ok(channels)
    }

    /// Compress interleaved RGB8 pixels.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidBufferSize`] if `pixels.len()` is not
    /// `width * height * 3`, plus anything [`Codec::compress_image`] returns.
    pub fn encode_rgb(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<(EncodedImage, SizeReport)> {
        let channels = split_rgb(pixels, width as usize, height as usize)?;
        self.compress_image(&channels)
    }

    /// Recover interleaved RGB8 pixels, rounding and clamping each sample.
    ///
    /// # Errors
    ///
    /// See [`Codec::recover_image`].
    pub fn decode_rgb(&self, encoded: &EncodedImage) -> Result<Vec<u8>> {
        merge_rgb(&self.recover_image(encoded)?)
    }

    fn map_tiles<T, U, F>(&self, items: &[T], f: F) -> Result<Vec<U>>
    where
        T: Sync,
        U: Send,
        F: Fn(&T) -> Result<U> + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            use rayon::prelude::*;
            return items.par_iter().map(f).collect();
        }
        items.iter().map(f).collect()
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self {
            config: CodecConfig::default(),
            plan: DctPlan::block(),
        }
    }
}

// ── Thread-safety compile-time assertions ──────────────────────

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    #[allow(dead_code)]
    const fn check() {
        assert_send_sync::<Codec>();
        assert_send_sync::<EncodedImage>();
        assert_send_sync::<CodecError>();
    }
};

// ── Tests ──────────────────────────────────────────────────────
