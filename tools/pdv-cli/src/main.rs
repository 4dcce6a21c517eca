//! pdv - Playdate video tool
//!
//! # Commands
//!
//! - `pdv decode -i clip.pdv frames/` - Write every frame as a 1-bit PNG
//! - `pdv encode -i clip.mp4 clip.pdv` - Dither a video through ffmpeg into a PDV file
//! - `pdv encode -i frames/ clip.pdv` - Pack a directory of 2-color images
//! - `pdv info -i clip.pdv` - Show header and frame table
//! - `pdv probe -i clip.mp4` - Show what ffprobe reports for a video

use anyhow::Result;
use clap::{Parser, Subcommand};

use pdv_cli::{decode, encode, info, probe};

#[derive(Parser)]
#[command(name = "pdv")]
#[command(about = "Convert between Playdate PDV videos and still frames")]
#[command(version)]
struct Cli {
    /// Debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every frame of a PDV file as a PNG image
    Decode(decode::DecodeArgs),

    /// Build a PDV file from a video or a directory of images
    Encode(encode::EncodeArgs),

    /// Inspect a PDV file
    Info(info::InfoArgs),

    /// Show ffprobe's view of a video file
    Probe(probe::ProbeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Decode(args) => decode::execute(args),
        Commands::Encode(args) => encode::execute(args),
        Commands::Info(args) => info::execute(args),
        Commands::Probe(args) => probe::execute(args),
    }
}
