//! Frame table
//!
//! `num_frames + 1` packed entries directly after the header. Entry *i* and *i+1*
//! delimit the compressed bytes of frame *i*. The final entry is an Empty terminator
//! whose offset is the end of the frame-data region.

use std::io::{Read, Write};

use crate::error::{PdvError, Result};

use super::{FrameTableEntry, FrameType, read_records, write_records};

/// Ordered, read-only frame table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTable {
    entries: Vec<FrameTableEntry>,
}

impl FrameTable {
    /// Wrap entries, checking that the last one is an Empty terminator.
    pub fn new(entries: Vec<FrameTableEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(PdvError::MalformedTable("table has no entries".into()));
        }
        if !validate_terminator(&entries) {
            let last = entries[entries.len() - 1];
            return Err(PdvError::MalformedTable(format!(
                "last of {} entries is {:?}, expected Empty terminator",
                entries.len(),
                last.frame_type()
            )));
        }
        Ok(Self { entries })
    }

    /// Read `num_frames + 1` entries and validate the terminator.
    pub fn read<R: Read>(reader: &mut R, num_frames: u16) -> Result<Self> {
        Self::new(read_table(reader, num_frames)?)
    }

    pub fn entries(&self) -> &[FrameTableEntry] {
        &self.entries
    }

    /// Number of entries including the terminator.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<FrameTableEntry> {
        self.entries.get(index).copied()
    }

    /// Number of frames actually present.
    ///
    /// The first Empty entry after index 0 ends the frame list, so this can be smaller
    /// than the header's declared count.
    pub fn frames_present(&self) -> usize {
        self.entries
            .iter()
            .skip(1)
            .position(|e| e.frame_type().is_empty())
            .map(|p| p + 1)
            .unwrap_or(0)
    }

    /// Relative `[start, end)` of frame `index` within the frame-data region.
    ///
    /// Offsets are returned as stored; ordering is checked by the decoder.
    pub fn span(&self, index: usize) -> Option<(u64, u64)> {
        let start = self.entries.get(index)?;
        let end = self.entries.get(index + 1)?;
        Some((start.offset() as u64, end.offset() as u64))
    }

    /// Count of each frame type among the present frames, indexed by tag.
    pub fn type_counts(&self) -> [usize; 4] {
        let mut counts = [0usize; 4];
        for entry in &self.entries[..self.frames_present()] {
            counts[entry.frame_type().bits() as usize] += 1;
        }
        counts
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_records(writer, &self.entries, "frame table")
    }
}

/// Read exactly `num_frames + 1` entries in file order.
pub fn read_table<R: Read>(reader: &mut R, num_frames: u16) -> Result<Vec<FrameTableEntry>> {
    read_records(reader, num_frames as usize + 1, "frame table")
}

/// True if the last entry is an Empty terminator.
pub fn validate_terminator(entries: &[FrameTableEntry]) -> bool {
    entries
        .last()
        .is_some_and(|e| e.frame_type() == FrameType::Empty)
}
