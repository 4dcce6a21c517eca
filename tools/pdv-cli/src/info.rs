//! Inspect PDV files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pdv_common::{BinarySerializable, FrameTableEntry, FrameType, PdvDecoder, PdvHeader};

/// Arguments for inspecting a PDV file
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// PDV file to inspect
    #[arg(short, long)]
    pub infile: PathBuf,

    /// List every frame's type, offset and compressed size
    #[arg(long)]
    pub frames: bool,

    /// Decompress every frame to check the data region
    #[arg(long)]
    pub verify: bool,
}

/// Execute the info command
pub fn execute(args: InfoArgs) -> Result<()> {
    inspect(&args.infile, args.frames, args.verify)
}

fn inspect(path: &Path, list_frames: bool, verify: bool) -> Result<()> {
    let file_size = std::fs::metadata(path)
        .with_context(|| format!("Failed to read PDV file: {}", path.display()))?
        .len();

    let mut decoder = PdvDecoder::open(path)
        .with_context(|| format!("Failed to load PDV file: {}", path.display()))?;
    let header = *decoder.header();
    let present = decoder.frame_count();

    println!("═══════════════════════════════════════════════════════════");
    println!("PDV video: {}", path.display());
    println!("═══════════════════════════════════════════════════════════");
    println!();

    println!("HEADER");
    println!("───────────────────────────────────────────────────────────");
    println!("  Resolution:  {}x{}", header.width, header.height);
    println!("  Frame rate:  {} fps", header.frame_rate);
    println!("  Frames:      {} declared", header.num_frames);
    if header.frame_rate > 0.0 && present > 0 {
        println!(
            "  Duration:    {:.2} s",
            present as f64 / header.frame_rate as f64
        );
    }

    let counts = decoder.table().type_counts();
    println!();
    println!("FRAME TABLE");
    println!("───────────────────────────────────────────────────────────");
    println!("  Entries:     {}", decoder.table().len());
    println!("  Present:     {}", present);
    if present < header.num_frames as usize {
        println!("  Terminated:  early, at entry {}", present);
    }
    for ty in FrameType::ALL.iter().filter(|t| !t.is_empty()) {
        let n = counts[ty.bits() as usize];
        if n > 0 {
            println!("  {:<12} {}", format!("{:?}:", ty), n);
        }
    }

    let data_size = file_size.saturating_sub(decoder.data_offset());
    let raw_size = present as u64 * header.frame_size() as u64;
    println!();
    println!("FILE CONTENTS");
    println!("───────────────────────────────────────────────────────────");
    println!("  File:        {} bytes", format_bytes(file_size));
    let header_size = <PdvHeader as BinarySerializable>::SIZE as u64;
    println!("  Header:      {} bytes", header_size);
    println!(
        "  Frame table: {} bytes ({} x {})",
        format_bytes(decoder.data_offset() - header_size),
        decoder.table().len(),
        <FrameTableEntry as BinarySerializable>::SIZE
    );
    println!("  Frame data:  {} bytes", format_bytes(data_size));
    if raw_size > 0 {
        println!(
            "  Ratio:       {:.1}% of {} bytes uncompressed",
            data_size as f64 * 100.0 / raw_size as f64,
            format_bytes(raw_size)
        );
    }

    if list_frames && present > 0 {
        println!();
        println!("FRAMES");
        println!("───────────────────────────────────────────────────────────");
        for index in 0..present {
            let ty = decoder
                .table()
                .get(index)
                .map(|e| e.frame_type())
                .unwrap_or_default();
            match decoder.frame_span(index) {
                Ok((start, end)) => println!(
                    "  {:>5}  {:<8} @ {:>10}  {:>8} bytes",
                    index + 1,
                    format!("{:?}", ty),
                    start,
                    format_bytes(end - start)
                ),
                Err(e) => println!("  {:>5}  {:<8} {}", index + 1, format!("{:?}", ty), e),
            }
        }
    }

    if verify {
        println!();
        println!("VERIFY");
        println!("───────────────────────────────────────────────────────────");
        let mut ok = 0usize;
        let mut failure = None;
        for frame in decoder.frames() {
            match frame {
                Ok(_) => ok += 1,
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        match failure {
            None => println!("  All {} frame(s) decode", ok),
            Some(e) => println!("  {} frame(s) decode, then: {}", ok, e),
        }
    }

    println!();
    println!("═══════════════════════════════════════════════════════════");

    Ok(())
}

/// Group digits in threes: 1234567 -> "1,234,567"
fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.char_indices() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
