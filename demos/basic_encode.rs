//! Basic encode/decode example for dct-codec.
//!
//! ```sh
//! cargo run --example basic_encode
//! ```

#![allow(clippy::cast_possible_truncation)]

use dct_codec::{metrics, Codec};

fn main() {
    let width = 64u32;
    let height = 48u32;
    let n_pixels = (width * height) as usize;

    // Synthetic RGB gradient
    let mut rgb = vec![0u8; n_pixels * 3];
    for i in 0..n_pixels {
        let x = i % width as usize;
        let y = i / width as usize;
        rgb[i * 3] = (x * 4) as u8;
        rgb[i * 3 + 1] = (y * 5) as u8;
        rgb[i * 3 + 2] = ((x + y) * 2) as u8;
    }

    // Encode
    let codec = Codec::default();
    let (encoded, report) = codec.encode_rgb(&rgb, width, height).unwrap();

    println!("Raw:        {} bytes", report.raw_bytes);
    println!("Encoded:    {} bytes ({} pairs)", report.encoded_bytes, encoded.pair_count());
    println!("Saved:      {:.1}%", report.savings_percent());

    // Decode
    let decoded = codec.decode_rgb(&encoded).unwrap();

    // Quality check
    let db = metrics::psnr(&rgb, &decoded).unwrap();
    println!("PSNR:       {db:.2} dB");
}
