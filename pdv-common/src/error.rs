//! Error type shared by every PDV codec operation.
//!
//! Every variant is fatal to the current decode/encode run. Variants carry the
//! frame index and byte offsets needed to locate the problem in the file.

use std::io;

use crate::formats::PDV_MAGIC;

/// Result alias for PDV operations.
pub type Result<T> = std::result::Result<T, PdvError>;

/// Errors raised while reading or writing PDV containers.
#[derive(Debug, thiserror::Error)]
pub enum PdvError {
    #[error("invalid magic: expected {expected:?}, found {found:?}", expected = String::from_utf8_lossy(PDV_MAGIC), found = String::from_utf8_lossy(.found))]
    InvalidMagic { found: [u8; 12] },

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("frame {frame}: invalid byte range {start}..{end}")]
    InvalidRange { frame: usize, start: u64, end: u64 },

    #[error("malformed frame table: {0}")]
    MalformedTable(String),

    #[error("frame {frame} at offset {offset}: {reason}")]
    CorruptFrame {
        frame: usize,
        offset: u64,
        reason: String,
    },

    #[error("frame {number} out of range ({present} frames present)")]
    FrameOutOfRange { number: usize, present: usize },

    #[error("offset {0} does not fit in 30 bits")]
    OffsetTooLarge(u64),

    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        width: u16,
        height: u16,
        reason: &'static str,
    },

    #[error("too many frames: a PDV file holds at most {max}", max = u16::MAX)]
    TooManyFrames,

    #[error("frame payload is {actual} bytes, expected {expected}")]
    PayloadSize { expected: usize, actual: usize },

    #[error("failed to encode image: {0}")]
    ImageEncode(#[from] png::EncodingError),

    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
}

impl PdvError {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Attach context to raw `io::Result`s.
pub(crate) trait IoContext<T> {
    fn io_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_context<C: Into<String>>(self, context: impl FnOnce() -> C) -> Result<T> {
        self.map_err(|e| PdvError::io(context(), e))
    }
}
