//! Property tests for the exact and lossy round trips of each stage.

use dct_codec::block::{decompose, recombine, ChannelMatrix, Tile};
use dct_codec::dct::{forward_1d, inverse_1d, DctPlan};
use dct_codec::quant::{Quantizer, Rounding, LUMINANCE};
use dct_codec::rle::{self, OverflowPolicy, RleConfig, RunLengthPair};
use dct_codec::BLOCK_LEN;
use proptest::prelude::*;

fn tile_strategy() -> impl Strategy<Value = Tile<f64>> {
    proptest::collection::vec(0.0f64..=255.0, BLOCK_LEN)
        .prop_map(|v| Tile::from_fn(|r, c| v[r * 8 + c]))
}

fn sparse_block() -> impl Strategy<Value = Vec<i32>> {
    proptest::collection::vec(
        prop_oneof![
            6 => Just(0i32),
            1 => any::<i16>().prop_map(i32::from),
        ],
        BLOCK_LEN,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_dct_2d_roundtrip(tile in tile_strategy()) {
        let plan = DctPlan::block();
        let back = plan.inverse_tile(&plan.forward_tile(&tile));
        for (a, b) in tile.as_slice().iter().zip(back.as_slice()) {
            prop_assert!((a - b).abs() < 1e-9, "{} vs {}", a, b);
        }
    }

    #[test]
    fn prop_dct_1d_roundtrip(input in proptest::collection::vec(-500.0f64..500.0, 1..24)) {
        let back = inverse_1d(&forward_1d(&input));
        prop_assert_eq!(back.len(), input.len());
        for (a, b) in input.iter().zip(&back) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_block_layout_roundtrip(
        width in 0usize..40,
        height in 0usize..40,
        seed in any::<u64>(),
    ) {
        let matrix = ChannelMatrix::from_fn(width, height, |r, c| {
            ((seed.wrapping_mul(31).wrapping_add((r * 131 + c * 7) as u64)) % 256) as f64
        })
        .unwrap();
        let tiles = decompose(&matrix);
        prop_assert_eq!(tiles.len(), width.div_ceil(8) * height.div_ceil(8));
        let back = recombine(&tiles, width, height).unwrap();
        prop_assert_eq!(back, matrix);
    }

    #[test]
    fn prop_rle_roundtrip(block in sparse_block()) {
        let config = RleConfig::DEFAULT.with_overflow(OverflowPolicy::Reject);
        let pairs = rle::encode(&block, &config).unwrap();
        prop_assert_eq!(*pairs.last().unwrap(), RunLengthPair::EOB);
        prop_assert!(pairs[..pairs.len() - 1].iter().all(|p| !p.is_eob()));
        prop_assert!(pairs.iter().all(|p| p.skip <= config.max_skip));
        prop_assert_eq!(rle::decode(&pairs, &config).unwrap(), block);
    }

    #[test]
    fn prop_rle_decode_total(raw in proptest::collection::vec((any::<u8>(), any::<i16>()), 0..80)) {
        let pairs: Vec<RunLengthPair> = raw.into_iter().map(RunLengthPair::from).collect();
        let decoded = rle::decode(&pairs, &RleConfig::DEFAULT).unwrap();
        prop_assert_eq!(decoded.len(), BLOCK_LEN);
    }

    #[test]
    fn prop_quantize_lossy_bound(
        coeffs in proptest::collection::vec(-2048.0f64..2048.0, BLOCK_LEN),
        nearest in any::<bool>(),
    ) {
        let rounding = if nearest { Rounding::Nearest } else { Rounding::Truncate };
        let quantizer = Quantizer::with_rounding(LUMINANCE, rounding);
        let tile = Tile::from_fn(|r, c| coeffs[r * 8 + c]);
        let back = quantizer.dequantize(&quantizer.quantize(&tile));
        for r in 0..8 {
            for c in 0..8 {
                let err = (back.get(r, c) - tile.get(r, c)).abs();
                prop_assert!(err < f64::from(LUMINANCE.get(r, c)));
            }
        }
    }

    #[test]
    fn prop_truncation_shrinks_magnitude(coeffs in proptest::collection::vec(-2048.0f64..2048.0, BLOCK_LEN)) {
        let quantizer = Quantizer::new(LUMINANCE);
        let tile = Tile::from_fn(|r, c| coeffs[r * 8 + c]);
        let back = quantizer.dequantize(&quantizer.quantize(&tile));
        for (orig, rec) in tile.as_slice().iter().zip(back.as_slice()) {
            prop_assert!(rec.abs() <= orig.abs());
        }
    }
}
