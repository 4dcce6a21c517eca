//! Packed frame-table entry
//!
//! Each table entry is a single little-endian u32 holding two fields:
//!
//! ```text
//! bit 31 ............ 2 | 1 0
//!   byte offset (30 bit) | type
//! ```
//!
//! The offset is relative to the start of the frame-data region. Offsets come from a
//! serial byte cursor, so the encoder never needs their low bits.

use crate::error::{PdvError, Result};

/// Number of bits reserved for the frame type tag.
pub const FRAME_TYPE_BITS: u32 = 2;

/// Mask selecting the frame type tag.
pub const FRAME_TYPE_MASK: u32 = (1 << FRAME_TYPE_BITS) - 1;

/// Largest byte offset an entry can address (2^30 - 1).
pub const MAX_FRAME_OFFSET: u32 = u32::MAX >> FRAME_TYPE_BITS;

/// Frame type tag stored in the low two bits of an entry.
///
/// The enumeration is closed: every 2-bit pattern maps to a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FrameType {
    /// No frame. Marks the end of the table.
    #[default]
    Empty = 0,
    IFrame = 1,
    PFrame = 2,
    IPFrame = 3,
}

impl FrameType {
    /// All variants in tag order.
    pub const ALL: [FrameType; 4] = [
        FrameType::Empty,
        FrameType::IFrame,
        FrameType::PFrame,
        FrameType::IPFrame,
    ];

    /// Map the low two bits of `bits` to a frame type.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        match bits & FRAME_TYPE_MASK {
            0 => FrameType::Empty,
            1 => FrameType::IFrame,
            2 => FrameType::PFrame,
            _ => FrameType::IPFrame,
        }
    }

    /// Two-bit tag value.
    #[inline]
    pub const fn bits(self) -> u32 {
        self as u32
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self, FrameType::Empty)
    }
}

/// One packed frame-table entry (offset + frame type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct FrameTableEntry(u32);

impl FrameTableEntry {
    pub const SIZE: usize = 4;

    /// Pack an offset and type into an entry.
    ///
    /// Fails with [`PdvError::OffsetTooLarge`] if `offset` needs more than 30 bits.
    pub fn pack(offset: u64, frame_type: FrameType) -> Result<Self> {
        if offset > MAX_FRAME_OFFSET as u64 {
            return Err(PdvError::OffsetTooLarge(offset));
        }
        Ok(Self(((offset as u32) << FRAME_TYPE_BITS) | frame_type.bits()))
    }

    /// Reinterpret a raw table word.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw packed word.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Byte offset relative to the frame-data region.
    #[inline]
    pub const fn offset(self) -> u32 {
        self.0 >> FRAME_TYPE_BITS
    }

    #[inline]
    pub const fn frame_type(self) -> FrameType {
        FrameType::from_bits(self.0)
    }

    /// Unpack into `(offset, frame_type)`.
    #[inline]
    pub const fn unpack(self) -> (u32, FrameType) {
        (self.offset(), self.frame_type())
    }

    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        self.0.to_le_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self(u32::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3],
        ])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_layout() {
        let entry = FrameTableEntry::pack(5, FrameType::PFrame).unwrap();
        assert_eq!(entry.raw(), (5 << 2) | 2);
    }

    #[test]
    fn test_pack_unpack_all_types() {
        let offsets = [0u64, 1, 2, 3, 4, 1234, 0x00FF_FFFF, MAX_FRAME_OFFSET as u64];
        for &offset in &offsets {
            for frame_type in FrameType::ALL {
                let entry = FrameTableEntry::pack(offset, frame_type).unwrap();
                assert_eq!(entry.offset() as u64, offset);
                assert_eq!(entry.frame_type(), frame_type);
                assert_eq!(entry.unpack(), (offset as u32, frame_type));
            }
        }
    }

    #[test]
    fn test_pack_rejects_31_bit_offset() {
        let err = FrameTableEntry::pack(1 << 30, FrameType::IFrame).unwrap_err();
        assert!(matches!(err, PdvError::OffsetTooLarge(o) if o == 1 << 30));
    }

    #[test]
    fn test_every_tag_is_valid() {
        for raw in 0u32..16 {
            let entry = FrameTableEntry::from_raw(raw);
            assert_eq!(entry.frame_type().bits(), raw & 0x3);
            assert_eq!(entry.offset(), raw >> 2);
        }
    }

    #[test]
    fn test_high_bits_offset() {
        let entry = FrameTableEntry::from_raw(0xFFFF_FFFC);
        assert_eq!(entry.offset(), MAX_FRAME_OFFSET);
        assert_eq!(entry.frame_type(), FrameType::Empty);
    }

    #[test]
    fn test_bytes_little_endian() {
        let entry = FrameTableEntry::pack(0x40, FrameType::IFrame).unwrap();
        // 0x40 << 2 | 1 = 0x101
        assert_eq!(entry.to_bytes(), [0x01, 0x01, 0x00, 0x00]);
        assert_eq!(FrameTableEntry::from_bytes(&entry.to_bytes()), Some(entry));
        assert!(FrameTableEntry::from_bytes(&[0, 1, 2]).is_none());
    }
}
