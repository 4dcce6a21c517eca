//! Binary serialization trait for fixed-size PDV records.
//!
//! Gives generic code one interface over the header and table entry while each type
//! keeps its own `to_bytes()` returning a fixed-size array.

use std::io::{Read, Write};

use crate::error::{IoContext, PdvError, Result};

/// Trait for fixed-size binary records.
///
/// Uses `Vec<u8>` for the return type because `[u8; Self::SIZE]` in a trait
/// signature is not yet stable.
///
/// # Example
///
/// ```
/// use pdv_common::formats::{BinarySerializable, PdvHeader};
///
/// let header = PdvHeader::new(30.0, 400, 240);
/// let bytes = header.serialize();
/// let parsed = PdvHeader::deserialize(&bytes).unwrap();
/// assert_eq!(parsed.width, 400);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    fn serialize(&self) -> Vec<u8>;

    /// Returns `None` if the byte slice is too short or contains invalid data.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::PdvHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    /// Also rejects a wrong magic tag.
    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes).filter(|h| h.has_valid_magic())
    }
}

impl BinarySerializable for super::FrameTableEntry {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

/// Read `count` consecutive records of type `T`.
pub fn read_records<T: BinarySerializable, R: Read>(
    reader: &mut R,
    count: usize,
    what: &str,
) -> Result<Vec<T>> {
    let mut bytes = vec![0u8; count * T::SIZE];
    reader
        .read_exact(&mut bytes)
        .io_context(|| format!("reading {} ({} records)", what, count))?;

    bytes
        .chunks_exact(T::SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            T::deserialize(chunk).ok_or_else(|| {
                PdvError::MalformedTable(format!("{} record {} is invalid", what, i))
            })
        })
        .collect()
}

/// Write records back to back.
pub fn write_records<'a, T, W>(
    writer: &mut W,
    records: impl IntoIterator<Item = &'a T>,
    what: &str,
) -> Result<()>
where
    T: BinarySerializable + 'a,
    W: Write,
{
    for record in records {
        writer
            .write_all(&record.serialize())
            .io_context(|| format!("writing {}", what))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{FrameTableEntry, FrameType, PdvHeader};

    #[test]
    fn test_header_trait() {
        let header = PdvHeader::with_num_frames(15.0, 64, 32, 7);
        let bytes = header.serialize();
        assert_eq!(bytes.len(), PdvHeader::SIZE);
        assert_eq!(<PdvHeader as BinarySerializable>::SIZE, 28);

        let parsed = PdvHeader::deserialize(&bytes).unwrap();
        assert_eq!(parsed.num_frames, 7);
        assert_eq!(parsed.width, 64);
        assert_eq!(parsed.height, 32);
    }

    #[test]
    fn test_header_trait_rejects_magic() {
        let mut bytes = PdvHeader::new(15.0, 64, 32).serialize();
        bytes[11] = b'X';
        assert!(PdvHeader::deserialize(&bytes).is_none());
    }

    #[test]
    fn test_entry_trait() {
        let entry = FrameTableEntry::pack(300, FrameType::IPFrame).unwrap();
        let bytes = entry.serialize();
        assert_eq!(bytes.len(), 4);
        assert_eq!(FrameTableEntry::deserialize(&bytes), Some(entry));
    }

    #[test]
    fn test_deserialize_insufficient_bytes() {
        assert!(PdvHeader::deserialize(&[0; 27]).is_none());
        assert!(FrameTableEntry::deserialize(&[0; 3]).is_none());
    }

    fn record_size<T: BinarySerializable>() -> usize {
        T::SIZE
    }

    #[test]
    fn test_records_roundtrip() {
        let entries = vec![
            FrameTableEntry::pack(0, FrameType::IFrame).unwrap(),
            FrameTableEntry::pack(12, FrameType::PFrame).unwrap(),
            FrameTableEntry::pack(40, FrameType::Empty).unwrap(),
        ];
        let mut bytes = Vec::new();
        write_records(&mut bytes, &entries, "entries").unwrap();
        assert_eq!(bytes.len(), 12);

        let parsed: Vec<FrameTableEntry> =
            read_records(&mut std::io::Cursor::new(&bytes), 3, "entries").unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn test_read_records_short() {
        let mut short = std::io::Cursor::new([0u8; 7]);
        let err = read_records::<FrameTableEntry, _>(&mut short, 2, "entries").unwrap_err();
        assert!(matches!(err, PdvError::Io { .. }));
    }

    #[test]
    fn test_generic_usage() {
        assert_eq!(record_size::<PdvHeader>(), 28);
        assert_eq!(record_size::<FrameTableEntry>(), 4);
    }
}
