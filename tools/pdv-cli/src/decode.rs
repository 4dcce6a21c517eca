//! Decode command - extract every frame of a PDV file as a still image

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pdv_common::{FrameNamer, PdvDecoder, PngCodec, StillImageCodec};

/// Arguments for the decode command
#[derive(Args)]
pub struct DecodeArgs {
    /// PDV file to decode
    #[arg(short, long)]
    pub infile: PathBuf,

    /// Directory to write frame images into (created if missing)
    pub outdir: PathBuf,
}

/// Execute the decode command
pub fn execute(args: DecodeArgs) -> Result<()> {
    let codec = PngCodec::new();
    let written = decode_file(&args.infile, &args.outdir, &codec)?;
    tracing::info!(
        "Wrote {} frame(s) to {}",
        written,
        args.outdir.display()
    );
    Ok(())
}

/// Decode `input` into numbered image files under `out_dir`.
///
/// Returns the number of frames written. Extraction stops at the first bad frame;
/// files already written for earlier frames are left in place.
pub fn decode_file(input: &Path, out_dir: &Path, codec: &dyn StillImageCodec) -> Result<usize> {
    let mut decoder =
        PdvDecoder::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let header = *decoder.header();

    tracing::info!(
        "{}: {}x{} @ {} fps, {} frame(s) declared, {} present",
        input.display(),
        header.width,
        header.height,
        header.frame_rate,
        header.num_frames,
        decoder.frame_count()
    );

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let namer = FrameNamer::new(header.num_frames, codec.extension());
    let mut written = 0;

    for frame in decoder.frames() {
        let frame = frame.with_context(|| format!("Failed to decode {}", input.display()))?;
        let raster = frame
            .to_raster(&header)
            .with_context(|| format!("Failed to expand frame {}", frame.number))?;
        let bytes = codec
            .encode(&raster)
            .with_context(|| format!("Failed to encode frame {}", frame.number))?;

        let path = namer.path_in(out_dir, frame.number);
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Frame {} -> {}", frame.number, path.display());
        written += 1;
    }

    Ok(written)
}
