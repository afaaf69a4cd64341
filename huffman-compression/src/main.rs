use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use huffman_compression::encode_decode::{
    decode_file, encode_and_decode, encode_file, EncodeSummary,
};
use log::info;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress INPUT into OUTPUT
    Encode { input: PathBuf, output: PathBuf },
    /// Decompress INPUT into OUTPUT
    Decode { input: PathBuf, output: PathBuf },
    /// Compress INPUT into ENCODED, then decompress ENCODED into OUTPUT
    Roundtrip {
        input: PathBuf,
        encoded: PathBuf,
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Encode { input, output } => {
            ensure_exists(&input)?;
            let summary = encode_file(&input, &output)
                .with_context(|| format!("failed to encode {}", input.display()))?;
            report(&summary);
        }
        Command::Decode { input, output } => {
            ensure_exists(&input)?;
            let summary = decode_file(&input, &output)
                .with_context(|| format!("failed to decode {}", input.display()))?;
            info!(
                "decoded {} symbols from {} bits",
                summary.symbols, summary.encoded_bits
            );
        }
        Command::Roundtrip {
            input,
            encoded,
            output,
        } => {
            ensure_exists(&input)?;
            let (summary, _) = encode_and_decode(&input, &encoded, &output)
                .with_context(|| format!("failed to round trip {}", input.display()))?;
            report(&summary);
        }
    }

    Ok(())
}

fn ensure_exists(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("input file {} does not exist", path.display());
    }
    Ok(())
}

fn report(summary: &EncodeSummary) {
    let ratio = if summary.input_bytes == 0 {
        0.0
    } else {
        summary.output_bytes() as f64 / summary.input_bytes as f64
    };
    info!(
        "{} bytes -> {} bytes ({} distinct symbols, {} bits, ratio {ratio:.3})",
        summary.input_bytes,
        summary.output_bytes(),
        summary.distinct_symbols,
        summary.encoded_bits
    );
}
