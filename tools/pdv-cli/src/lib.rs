//! pdv - command implementations for the `pdv` tool
//!
//! Each command module exposes an `Args` struct and an `execute` function.
//!
//! - [`decode`] - PDV file to numbered PNG frames
//! - [`encode`] - video (through ffmpeg) or image directory to PDV
//! - [`info`] - header and frame-table report
//! - [`probe`] - ffprobe geometry/frame-rate report

pub mod decode;
pub mod dither;
pub mod encode;
pub mod ffmpeg;
pub mod info;
pub mod probe;
