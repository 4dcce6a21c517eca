//! Dither configuration and the ffmpeg filter graph built from it
//!
//! The tool never dithers pixels itself. These options select one of ffmpeg's
//! `paletteuse` modes, and the graph maps every source frame onto a two-entry
//! palette made from the configured black and white colors.

use std::fmt;

use anyhow::{Result, bail};
use clap::{Args, ValueEnum};

/// Error diffusion / ordered dither algorithm passed to `paletteuse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum DitherType {
    None,
    Bayer,
    Heckbert,
    FloydSteinberg,
    #[default]
    Sierra2,
    #[value(name = "sierra2_4a")]
    Sierra2_4a,
    Sierra3,
    Burkes,
    Atkinson,
}

impl DitherType {
    /// Name understood by ffmpeg's `paletteuse` filter
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bayer => "bayer",
            Self::Heckbert => "heckbert",
            Self::FloydSteinberg => "floyd_steinberg",
            Self::Sierra2 => "sierra2",
            Self::Sierra2_4a => "sierra2_4a",
            Self::Sierra3 => "sierra3",
            Self::Burkes => "burkes",
            Self::Atkinson => "atkinson",
        }
    }
}

/// Which pixels are re-dithered between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DitherDiffMode {
    None,
    #[default]
    Rectangle,
}

impl DitherDiffMode {
    pub fn ffmpeg_name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Rectangle => "rectangle",
        }
    }
}

/// Maximum `bayer_scale` accepted by ffmpeg
pub const MAX_BAYER_SCALE: u8 = 5;

/// Dithering flags shared by every command that drives ffmpeg
#[derive(Args, Debug, Clone)]
pub struct DitherOptions {
    /// Dither algorithm
    #[arg(short = 't', long = "dither-type", value_enum, default_value_t = DitherType::Sierra2)]
    pub dither_type: DitherType,

    /// Bayer pattern scale (bayer only)
    #[arg(
        short = 's',
        long = "dither-scale",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=MAX_BAYER_SCALE as i64)
    )]
    pub dither_scale: u8,

    /// Only re-dither the changed rectangle between frames
    #[arg(short = 'm', long = "dither-mode", value_enum, default_value_t = DitherDiffMode::Rectangle)]
    pub dither_mode: DitherDiffMode,

    /// Color mapped to black (hex RGB)
    #[arg(short = 'b', long, default_value = "000000", value_parser = parse_hex_color)]
    pub black: Rgb,

    /// Color mapped to white (hex RGB)
    #[arg(short = 'w', long, default_value = "FFFFFF", value_parser = parse_hex_color)]
    pub white: Rgb,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            dither_type: DitherType::default(),
            dither_scale: 0,
            dither_mode: DitherDiffMode::default(),
            black: Rgb(0x000000),
            white: Rgb(0xFFFFFF),
        }
    }
}

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u32);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

/// Parse `RRGGBB`, optionally prefixed with `#` or `0x`.
pub fn parse_hex_color(raw: &str) -> Result<Rgb> {
    let digits = raw
        .trim()
        .trim_start_matches('#')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("invalid color {:?}, expected 6 hex digits (RRGGBB)", raw);
    }
    Ok(Rgb(u32::from_str_radix(digits, 16)?))
}

/// Final pixel format conversion at the end of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOutput {
    /// Raw 1bpp frames for the container
    Monob,
    /// Lossless preview video
    Preview,
}

/// Build the `-filter_complex` graph. The result is labelled `[out]`.
pub fn filter_graph(opts: &DitherOptions, width: u16, height: u16, output: GraphOutput) -> String {
    let mut dither = format!("dither={}", opts.dither_type.ffmpeg_name());
    if opts.dither_type == DitherType::Bayer {
        dither.push_str(&format!(":bayer_scale={}", opts.dither_scale));
    }

    let tail = match output {
        GraphOutput::Monob => "format=monob",
        GraphOutput::Preview => "format=monob,format=yuv444p",
    };

    format!(
        "[0:v]scale={w}:{h}:flags=lanczos,format=rgb24[src];\
         color=c=0x{black}:s=8x16:r=1:d=1,format=rgb24[b];\
         color=c=0x{white}:s=8x16:r=1:d=1,format=rgb24[w];\
         [b][w]hstack=inputs=2[pal];\
         [src][pal]paletteuse={dither}:diff_mode={mode}:new=0,{tail}[out]",
        w = width,
        h = height,
        black = opts.black,
        white = opts.white,
        dither = dither,
        mode = opts.dither_mode.ffmpeg_name(),
        tail = tail,
    )
}
