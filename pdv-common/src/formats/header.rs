//! PDV container header (.pdv)
//!
//! # Layout
//! ```text
//! 0x00: magic "Playdate VID" (12 bytes ASCII)
//! 0x0C: reserved u32
//! 0x10: num_frames u16
//! 0x12: reserved u16
//! 0x14: frame_rate f32
//! 0x18: width u16
//! 0x1A: height u16
//! 0x1C: frame table (num_frames + 1 entries)
//! ```
//!
//! All fields little-endian, no padding.

use std::io::Read;

use crate::error::{IoContext, PdvError, Result};

/// Magic bytes at the start of every PDV file.
pub const PDV_MAGIC: &[u8; 12] = b"Playdate VID";

/// PDV header (28 bytes)
///
/// Note: Not packed - we use explicit byte serialization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct PdvHeader {
    pub magic: [u8; 12],
    pub reserved1: u32,
    /// Declared frame count. An upper bound: the table terminator is authoritative.
    pub num_frames: u16,
    pub reserved2: u16,
    /// Nominal playback rate in frames per second
    pub frame_rate: f32,
    pub width: u16,
    pub height: u16,
}

impl PdvHeader {
    pub const SIZE: usize = 28;

    /// Build a header with an unknown frame count.
    ///
    /// Writers that stream frames patch `num_frames` once the count is known.
    pub fn new(frame_rate: f32, width: u16, height: u16) -> Self {
        Self::with_num_frames(frame_rate, width, height, 0)
    }

    pub fn with_num_frames(frame_rate: f32, width: u16, height: u16, num_frames: u16) -> Self {
        Self {
            magic: *PDV_MAGIC,
            reserved1: 0,
            num_frames,
            reserved2: 0,
            frame_rate,
            width,
            height,
        }
    }

    /// Check the magic tag
    pub fn has_valid_magic(&self) -> bool {
        &self.magic == PDV_MAGIC
    }

    /// Check the dimension invariant: both sides positive, pixel count a multiple of 8.
    pub fn validate(&self) -> Result<()> {
        validate_dimensions(self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Decompressed size of one frame (1 bit per pixel)
    pub fn frame_size(&self) -> usize {
        self.pixel_count() / 8
    }

    /// Number of entries in the frame table, terminator included
    pub fn table_len(&self) -> usize {
        self.num_frames as usize + 1
    }

    /// Absolute file offset of the frame-data region
    pub fn data_offset(&self) -> u64 {
        (Self::SIZE + self.table_len() * super::FrameTableEntry::SIZE) as u64
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..12].copy_from_slice(&self.magic);
        bytes[12..16].copy_from_slice(&self.reserved1.to_le_bytes());
        bytes[16..18].copy_from_slice(&self.num_frames.to_le_bytes());
        bytes[18..20].copy_from_slice(&self.reserved2.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.frame_rate.to_le_bytes());
        bytes[24..26].copy_from_slice(&self.width.to_le_bytes());
        bytes[26..28].copy_from_slice(&self.height.to_le_bytes());
        bytes
    }

    /// Read header fields from bytes without checking the magic.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut magic = [0u8; 12];
        magic.copy_from_slice(&bytes[0..12]);
        Some(Self {
            magic,
            reserved1: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            num_frames: u16::from_le_bytes([bytes[16], bytes[17]]),
            reserved2: u16::from_le_bytes([bytes[18], bytes[19]]),
            frame_rate: f32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
            width: u16::from_le_bytes([bytes[24], bytes[25]]),
            height: u16::from_le_bytes([bytes[26], bytes[27]]),
        })
    }

    /// Parse a header, rejecting anything whose magic is not [`PDV_MAGIC`].
    ///
    /// Dimensions are not checked here; call [`PdvHeader::validate`].
    pub fn parse(bytes: &[u8; Self::SIZE]) -> Result<Self> {
        let mut found = [0u8; 12];
        found.copy_from_slice(&bytes[0..12]);
        if &found != PDV_MAGIC {
            return Err(PdvError::InvalidMagic { found });
        }
        // Length is fixed by the array type, so this cannot fail.
        Self::from_bytes(bytes).ok_or(PdvError::InvalidMagic { found })
    }

    /// Read and parse a header from the start of a stream.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; Self::SIZE];
        reader
            .read_exact(&mut bytes)
            .io_context(|| "reading header")?;
        Self::parse(&bytes)
    }
}

/// Validate PDV frame geometry.
pub fn validate_dimensions(width: u16, height: u16) -> Result<()> {
    let reason = if width == 0 || height == 0 {
        "width and height must be positive"
    } else if (width as usize * height as usize) % 8 != 0 {
        "pixel count must be a multiple of 8"
    } else {
        return Ok(());
    };
    Err(PdvError::InvalidDimensions {
        width,
        height,
        reason,
    })
}
