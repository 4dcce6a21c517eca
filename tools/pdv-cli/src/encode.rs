//! Encode command - build a PDV file from a video or a directory of images
//!
//! Videos go through ffmpeg, which scales, dithers and emits raw `monob` frames.
//! `monob` pads every row to a whole byte, so each frame is re-packed into the
//! dense PDV payload. Image directories must hold frames that are already
//! two-color and share one size.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use clap::Args;
use pdv_common::{
    PDV_EXTENSION, PdvEncoder, PngCodec, Raster, StillImageCodec, padded_row_len,
};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::dither::{DitherOptions, GraphOutput, filter_graph};
use crate::{ffmpeg, probe};

/// Frame rate used when the input carries none (image directories)
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// Default zlib level for frame blocks
pub const DEFAULT_LEVEL: u32 = 9;

/// Images decoded per parallel batch
const IMAGE_BATCH: usize = 64;

/// Input extensions picked up from a directory
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Arguments for the encode command
#[derive(Args)]
pub struct EncodeArgs {
    /// Video file, or a directory of two-color frame images
    #[arg(short, long)]
    pub infile: PathBuf,

    /// Output file (.pdv, or .mov with --mov)
    pub outfile: PathBuf,

    #[command(flatten)]
    pub dither: DitherOptions,

    /// Output width (default: source width)
    #[arg(long)]
    pub width: Option<u16>,

    /// Output height (default: source height)
    #[arg(long)]
    pub height: Option<u16>,

    /// Frame rate stored in the header (default: source rate, or 30 for images)
    #[arg(long)]
    pub frame_rate: Option<f32>,

    /// zlib compression level for frame data (0-9)
    #[arg(
        short = 'z',
        long,
        default_value_t = DEFAULT_LEVEL,
        value_parser = clap::value_parser!(u32).range(0..=9)
    )]
    pub level: u32,

    /// Write a lossless x265 preview video instead of a PDV file
    #[arg(short = 'x', long = "mov")]
    pub mov: bool,
}

/// Execute the encode command
pub fn execute(args: EncodeArgs) -> Result<()> {
    if args.infile.is_dir() {
        if args.mov {
            bail!("--mov needs a video input, not a directory");
        }
        let frames = encode_image_dir(
            &args.infile,
            &args.outfile,
            args.frame_rate,
            args.level,
            &PngCodec::new(),
        )?;
        tracing::info!("Wrote {} frame(s) to {}", frames, args.outfile.display());
        return Ok(());
    }

    if !args.mov && args.outfile.extension().and_then(|e| e.to_str()) != Some(PDV_EXTENSION) {
        tracing::warn!(
            "{} does not have a .{} extension",
            args.outfile.display(),
            PDV_EXTENSION
        );
    }

    let info = probe::probe(&args.infile)?;
    let width = match args.width {
        Some(w) => w,
        None => u16::try_from(info.width()).context("source width does not fit in 16 bits")?,
    };
    let height = match args.height {
        Some(h) => h,
        None => u16::try_from(info.height()).context("source height does not fit in 16 bits")?,
    };
    let frame_rate = match args.frame_rate {
        Some(rate) => rate,
        None => info.frame_rate()?,
    };

    tracing::info!(
        "{}: {}x{} -> {}x{} @ {} fps",
        args.infile.display(),
        info.width(),
        info.height(),
        width,
        height,
        frame_rate
    );
    if let Some(n) = info.num_frames() {
        tracing::debug!("Source reports {} frame(s)", n);
    }

    if args.mov {
        encode_preview(&args.infile, &args.outfile, &args.dither, width, height)?;
        tracing::info!("Wrote preview {}", args.outfile.display());
        return Ok(());
    }

    let frames = encode_video(
        &args.infile,
        &args.outfile,
        &args.dither,
        width,
        height,
        frame_rate,
        args.level,
    )?;
    tracing::info!("Wrote {} frame(s) to {}", frames, args.outfile.display());
    Ok(())
}

// =============================================================================
// Video input
// =============================================================================

/// Stream `input` through ffmpeg and pack the resulting frames into `output`.
pub fn encode_video(
    input: &Path,
    output: &Path,
    dither: &DitherOptions,
    width: u16,
    height: u16,
    frame_rate: f32,
    level: u32,
) -> Result<usize> {
    let mut encoder = PdvEncoder::new(frame_rate, width, height)?.with_compression(level);

    let ffmpeg_path = ffmpeg::require("ffmpeg")?;
    let graph = filter_graph(dither, width, height, GraphOutput::Monob);
    tracing::debug!("Filter graph: {}", graph);

    let mut child = Command::new(&ffmpeg_path)
        .arg("-v")
        .arg("error")
        .arg("-i")
        .arg(input)
        .args(["-filter_complex", graph.as_str(), "-map", "[out]"])
        .args(["-f", "rawvideo", "-pix_fmt", "monob", "-"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .context("Failed to start ffmpeg")?;

    let pumped = match child.stdout.take() {
        Some(mut stdout) => pump_frames(&mut stdout, &mut encoder),
        None => Err(anyhow::anyhow!("ffmpeg stdout was not captured")),
    };
    if let Err(e) = pumped {
        let _ = child.kill();
        let _ = child.wait();
        return Err(e);
    }

    let status = child.wait().context("Failed to wait for ffmpeg")?;
    if !status.success() {
        bail!("ffmpeg exited with {}", status);
    }
    if encoder.frame_count() == 0 {
        bail!("ffmpeg produced no frames for {}", input.display());
    }

    Ok(encoder.write_file(output)?)
}

/// Read row-padded `monob` frames until end of stream and add them to `encoder`.
fn pump_frames<R: Read>(reader: &mut R, encoder: &mut PdvEncoder) -> Result<()> {
    let (width, height) = (encoder.header().width, encoder.header().height);
    let mut buf = vec![0u8; padded_row_len(width) * height as usize];

    while read_frame(reader, &mut buf)? {
        let number = encoder.frame_count() + 1;
        let raster = Raster::from_padded_rows(&buf, width, height)
            .with_context(|| format!("Failed to unpack frame {}", number))?;
        encoder
            .push_raster(&raster)
            .with_context(|| format!("Failed to add frame {}", number))?;
    }
    Ok(())
}

/// Fill `buf` with the next frame. Returns `false` on a clean end of stream.
fn read_frame<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("Failed to read ffmpeg output"),
        }
    }
    match filled {
        0 => Ok(false),
        n if n == buf.len() => Ok(true),
        n => bail!(
            "ffmpeg output ended mid-frame ({} of {} bytes)",
            n,
            buf.len()
        ),
    }
}

/// Render the dithered video as a lossless x265 file for previewing.
pub fn encode_preview(
    input: &Path,
    output: &Path,
    dither: &DitherOptions,
    width: u16,
    height: u16,
) -> Result<()> {
    let graph = filter_graph(dither, width, height, GraphOutput::Preview);
    let input = input.to_string_lossy();
    let output = output.to_string_lossy();
    ffmpeg::exec(
        "ffmpeg",
        &[
            "-v",
            "error",
            "-y",
            "-i",
            &input,
            "-filter_complex",
            &graph,
            "-map",
            "[out]",
            "-c:v",
            "libx265",
            "-x265-params",
            "lossless=1",
            &output,
        ],
    )?;
    Ok(())
}

// =============================================================================
// Image directory input
// =============================================================================

/// Collect frame images in `dir`, sorted by file name.
pub fn collect_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_image = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
            .unwrap_or(false);
        if is_image {
            paths.push(entry.into_path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// Encode every image in `dir` as one frame, in file-name order.
pub fn encode_image_dir(
    dir: &Path,
    output: &Path,
    frame_rate: Option<f32>,
    level: u32,
    codec: &dyn StillImageCodec,
) -> Result<usize> {
    let paths = collect_images(dir)?;
    if paths.is_empty() {
        bail!("No images found in {}", dir.display());
    }
    tracing::info!("Encoding {} image(s) from {}", paths.len(), dir.display());

    let mut encoder: Option<PdvEncoder> = None;
    let frame_rate = frame_rate.unwrap_or(DEFAULT_FRAME_RATE);

    for batch in paths.chunks(IMAGE_BATCH) {
        let rasters = batch
            .par_iter()
            .map(|path| load_raster(path, codec))
            .collect::<Result<Vec<_>>>()?;

        for (path, raster) in batch.iter().zip(&rasters) {
            if encoder.is_none() {
                encoder = Some(
                    PdvEncoder::new(frame_rate, raster.width(), raster.height())?
                        .with_compression(level),
                );
            }
            if let Some(encoder) = encoder.as_mut() {
                encoder
                    .push_raster(raster)
                    .with_context(|| format!("Failed to add {}", path.display()))?;
            }
        }
    }

    match encoder {
        Some(encoder) => Ok(encoder.write_file(output)?),
        None => bail!("No images found in {}", dir.display()),
    }
}

fn load_raster(path: &Path, codec: &dyn StillImageCodec) -> Result<Raster> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    codec
        .decode(&bytes)
        .with_context(|| format!("Failed to decode {}", path.display()))
}
