//! CLI for dct-codec
//!
//! ```bash
//! dct-codec encode photo.png -o photo.bdct
//! dct-codec decode photo.bdct -o recovered.png
//! dct-codec info photo.bdct
//! dct-codec roundtrip photo.png -o output.jpg
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use dct_codec::{metrics, Codec, CodecConfig, EncodedImage, OverflowPolicy, Rounding};

#[derive(Parser)]
#[command(
    name = "dct-codec",
    version,
    about = "Block DCT image codec: 8x8 DCT, table quantization, run-length pairs"
)]
struct Cli {
    /// Log per-stage details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress an image file into a .bdct container
    Encode {
        /// Input image (PNG, JPEG or BMP)
        input: PathBuf,
        /// Output file (.bdct)
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        codec: CodecArgs,
    },
    /// Recover an image file from a .bdct container
    Decode {
        /// Input file (.bdct)
        input: PathBuf,
        /// Output image; format follows the extension
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        codec: CodecArgs,
    },
    /// Show metadata of a .bdct container
    Info {
        /// Input file (.bdct)
        input: PathBuf,
    },
    /// Compress and immediately recover an image, reporting size and PSNR
    Roundtrip {
        /// Input image (PNG, JPEG or BMP)
        input: PathBuf,
        /// Output image; format follows the extension
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        codec: CodecArgs,
    },
}

#[derive(Args, Clone, Copy)]
struct CodecArgs {
    /// Quotient conversion used by the quantizer
    #[arg(long, value_enum, default_value = "truncate")]
    rounding: RoundingArg,
    /// Fail on run-length overflow instead of clamping
    #[arg(long, default_value_t = false)]
    strict_runs: bool,
    /// Spread tile work across threads (needs the `parallel` feature)
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoundingArg {
    Truncate,
    Nearest,
}

impl CodecArgs {
    fn build(self) -> Result<Codec, String> {
        let rounding = match self.rounding {
            RoundingArg::Truncate => Rounding::Truncate,
            RoundingArg::Nearest => Rounding::Nearest,
        };
        let overflow = if self.strict_runs {
            OverflowPolicy::Reject
        } else {
            OverflowPolicy::Clamp
        };
        let config = CodecConfig::builder()
            .rounding(rounding)
            .overflow(overflow)
            .parallel(self.parallel)
            .build();
        Codec::new(config).map_err(|e| e.to_string())
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            codec,
        } => cmd_encode(&input, &output, codec),
        Commands::Decode {
            input,
            output,
            codec,
        } => cmd_decode(&input, &output, codec),
        Commands::Info { input } => cmd_info(&input),
        Commands::Roundtrip {
            input,
            output,
            codec,
        } => cmd_roundtrip(&input, &output, codec),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_rgb(path: &Path) -> Result<(Vec<u8>, u32, u32), String> {
    let img = image::open(path)
        .map_err(|e| format!("read {}: {e}", path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    debug!(path = %path.display(), width, height, "loaded image");
    Ok((img.into_raw(), width, height))
}

fn save_rgb(path: &Path, pixels: Vec<u8>, width: u32, height: u32) -> Result<(), String> {
    let img = image::RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| format!("recovered buffer does not match {width}x{height}"))?;
    img.save(path)
        .map_err(|e| format!("write {}: {e}", path.display()))
}

fn read_container(path: &Path) -> Result<EncodedImage, String> {
    let data = fs::read(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    EncodedImage::from_bytes(&data).map_err(|e| e.to_string())
}

fn cmd_encode(input: &Path, output: &Path, args: CodecArgs) -> Result<(), String> {
    let codec = args.build()?;
    let (pixels, width, height) = load_rgb(input)?;

    let start = Instant::now();
    let (encoded, report) = codec
        .encode_rgb(&pixels, width, height)
        .map_err(|e| e.to_string())?;
    let elapsed = start.elapsed();

    let bytes = encoded.to_bytes().map_err(|e| e.to_string())?;
    fs::write(output, &bytes).map_err(|e| format!("write {}: {e}", output.display()))?;

    info!(
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        file_bytes = bytes.len(),
        "encoded {}x{} -> {}",
        width,
        height,
        output.display()
    );
    eprintln!(
        "encoded {width}x{height} ({} bytes raw) -> {} pair bytes, {} file bytes ({:.1}% smaller)",
        report.raw_bytes,
        report.encoded_bytes,
        bytes.len(),
        report.savings_percent(),
    );

    Ok(())
}

fn cmd_decode(input: &Path, output: &Path, args: CodecArgs) -> Result<(), String> {
    let codec = args.build()?;
    let encoded = read_container(input)?;

    let pixels = codec.decode_rgb(&encoded).map_err(|e| e.to_string())?;
    save_rgb(output, pixels, encoded.width, encoded.height)?;

    eprintln!(
        "decoded {}x{} -> {}",
        encoded.width,
        encoded.height,
        output.display()
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), String> {
    let data = fs::read(input).map_err(|e| format!("read {}: {e}", input.display()))?;
    let encoded = EncodedImage::from_bytes(&data).map_err(|e| e.to_string())?;
    let report = encoded.size_report();

    println!("dct-codec Container Info");
    println!("  File:        {}", input.display());
    println!("  File size:   {} bytes", data.len());
    println!("  Width:       {}", encoded.width);
    println!("  Height:      {}", encoded.height);
    println!("  Tiles:       {} per channel", encoded.tile_count());
    println!("  Pairs:       {}", encoded.pair_count());
    println!("  Pair bytes:  {}", report.encoded_bytes);
    println!("  Raw size:    {} bytes (uncompressed RGB)", report.raw_bytes);
    println!("  Ratio:       {:.1}%", report.ratio() * 100.0);

    Ok(())
}

fn cmd_roundtrip(input: &Path, output: &Path, args: CodecArgs) -> Result<(), String> {
    let codec = args.build()?;
    let (pixels, width, height) = load_rgb(input)?;

    let (encoded, report) = codec
        .encode_rgb(&pixels, width, height)
        .map_err(|e| e.to_string())?;
    let recovered = codec.decode_rgb(&encoded).map_err(|e| e.to_string())?;
    let quality = metrics::compare_rgb(&pixels, &recovered).map_err(|e| e.to_string())?;
    let [r, g, b] = quality.channels;

    println!("Raw image bytes:      {}", report.raw_bytes);
    println!("Encoded pair bytes:   {}", report.encoded_bytes);
    println!("Compression:          {:.1}%", report.savings_percent());
    println!("PSNR:                 {:.2} dB", quality.psnr());
    println!(
        "PSNR R/G/B:           {:.2} / {:.2} / {:.2} dB",
        r.psnr, g.psnr, b.psnr
    );
    println!(
        "Max error R/G/B:      {} / {} / {}",
        r.max_abs_error, g.max_abs_error, b.max_abs_error
    );

    save_rgb(output, recovered, width, height)
}
