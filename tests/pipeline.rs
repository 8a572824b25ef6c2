//! End-to-end scenarios through the public API.

use dct_codec::block::tile_count;
use dct_codec::pipeline::CodecConfig;
use dct_codec::rle::{self, RleConfig, RunLengthPair};
use dct_codec::{
    dct, metrics, split_rgb, ChannelMatrix, Codec, CodecError, EncodedImage, Quantizer, Rounding,
    Tile, LUMINANCE,
};

fn photo_like(w: u32, h: u32) -> Vec<u8> {
    let mut rgb = Vec::with_capacity((w * h * 3) as usize);
    for y in 0..h {
        for x in 0..w {
            let fx = f64::from(x) / f64::from(w);
            let fy = f64::from(y) / f64::from(h);
            rgb.push((128.0 + 100.0 * (fx * 6.0).sin()) as u8);
            rgb.push((128.0 + 90.0 * (fy * 4.0).cos()) as u8);
            rgb.push((255.0 * fx * fy) as u8);
        }
    }
    rgb
}

#[test]
fn flat_block_scenario() {
    let row = dct::forward_1d(&[128.0; 8]);
    assert!((row[0] - 128.0 * 8f64.sqrt()).abs() < 1e-9);

    let coeffs = dct::forward_2d(&Tile::splat(128.0));
    assert!((coeffs.get(0, 0) - 1024.0).abs() < 1e-9);
    assert!(coeffs.as_slice()[1..].iter().all(|v| v.abs() < 1e-9));

    let quantized = Quantizer::new(LUMINANCE).quantize(&coeffs);
    assert_eq!(quantized.get(0, 0), 64);
    assert!(quantized.as_slice()[1..].iter().all(|&v| v == 0));

    let pairs = rle::encode(quantized.as_slice(), &RleConfig::DEFAULT).unwrap();
    assert_eq!(
        pairs,
        vec![
            RunLengthPair::new(0, 64),
            RunLengthPair::new(62, 0),
            RunLengthPair::EOB
        ]
    );
}

#[test]
fn run_length_literal_scenario() {
    let mut block = vec![0i32; 64];
    block[5] = 7;
    block[63] = 3;
    let pairs = rle::encode(&block, &RleConfig::DEFAULT).unwrap();
    assert_eq!(
        pairs,
        vec![
            RunLengthPair::new(5, 7),
            RunLengthPair::new(57, 3),
            RunLengthPair::EOB
        ]
    );
    assert_eq!(rle::decode(&pairs, &RleConfig::DEFAULT).unwrap(), block);
}

#[test]
fn uniform_image_beats_raw_size() {
    let pixels = [30u8, 140, 220].repeat(64 * 64);
    let (encoded, report) = Codec::default().encode_rgb(&pixels, 64, 64).unwrap();
    assert_eq!(report.raw_bytes, 64 * 64 * 3);
    assert!(report.encoded_bytes < report.raw_bytes);
    assert_eq!(report.encoded_bytes, encoded.encoded_bytes());

    // Every tile is its DC pair, one flush for the 63 zeros, then EOB.
    for (channel, value) in encoded.channels.iter().zip([30i16, 140, 220]) {
        assert_eq!(channel.len(), 64);
        let expected = vec![
            RunLengthPair::new(0, value * 8 / 16),
            RunLengthPair::new(62, 0),
            RunLengthPair::EOB,
        ];
        assert!(channel.iter().all(|tile| *tile == expected));
    }
}

#[test]
fn photo_like_roundtrip_quality() {
    let (w, h) = (48u32, 40u32);
    let rgb = photo_like(w, h);
    let codec = Codec::default();
    let (encoded, report) = codec.encode_rgb(&rgb, w, h).unwrap();
    assert!(report.encoded_bytes < report.raw_bytes);

    let decoded = codec.decode_rgb(&encoded).unwrap();
    assert_eq!(decoded.len(), rgb.len());
    let db = metrics::psnr(&rgb, &decoded).unwrap();
    assert!(db > 25.0, "PSNR = {db}");
}

#[test]
fn container_roundtrip_preserves_decode() {
    let (w, h) = (21u32, 11u32);
    let rgb = photo_like(w, h);
    let codec = Codec::default();
    let (encoded, _) = codec.encode_rgb(&rgb, w, h).unwrap();

    let restored = EncodedImage::from_bytes(&encoded.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.width, w);
    assert_eq!(restored.height, h);
    assert_eq!(
        codec.decode_rgb(&restored).unwrap(),
        codec.decode_rgb(&encoded).unwrap()
    );
}

#[test]
fn channel_level_api() {
    let [red, _, _] = split_rgb(&photo_like(17, 9), 17, 9).unwrap();
    let codec = Codec::default();
    let tiles = codec.compress_channel(&red).unwrap();
    assert_eq!(tiles.len(), tile_count(17, 9));

    let back = codec.decompress_channel(&tiles, 17, 9).unwrap();
    assert_eq!((back.width(), back.height()), (17, 9));

    let err = codec.decompress_channel(&tiles, 32, 32).unwrap_err();
    assert_eq!(
        err,
        CodecError::DimensionMismatch {
            expected: 16,
            got: 6
        }
    );
}

#[test]
fn rounding_modes_both_decode() {
    let plane = ChannelMatrix::from_fn(16, 16, |r, c| (r * 16 + c) as f64).unwrap();
    for rounding in [Rounding::Truncate, Rounding::Nearest] {
        let codec = Codec::new(CodecConfig::builder().rounding(rounding).build()).unwrap();
        let tiles = codec.compress_channel(&plane).unwrap();
        let back = codec.decompress_channel(&tiles, 16, 16).unwrap();
        let max_err = plane
            .as_slice()
            .iter()
            .zip(back.as_slice())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0f64, f64::max);
        assert!(max_err < 32.0, "{rounding:?}: max error {max_err}");
    }
}

#[test]
fn out_of_range_coefficient_reported() {
    let table = dct_codec::QuantTable::uniform(1).unwrap();
    let codec = Codec::new(CodecConfig::builder().table(table).build()).unwrap();
    // DC of a flat 8x8 block is 8x the sample value.
    let err = codec.encode_tile(&Tile::splat(5000.0)).unwrap_err();
    assert!(
        matches!(err, CodecError::ValueOutOfRange { value } if value > i64::from(i16::MAX)),
        "{err}"
    );
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_matches_sequential() {
    let (w, h) = (40u32, 24u32);
    let rgb = photo_like(w, h);
    let seq = Codec::default();
    let par = Codec::new(CodecConfig::builder().parallel(true).build()).unwrap();
    let (a, _) = seq.encode_rgb(&rgb, w, h).unwrap();
    let (b, _) = par.encode_rgb(&rgb, w, h).unwrap();
    assert_eq!(a, b);
    assert_eq!(seq.decode_rgb(&a).unwrap(), par.decode_rgb(&b).unwrap());
}
