//! PDV container writer
//!
//! Frames are compressed as they arrive and appended to an in-memory data region.
//! The table and frame count are only known at the end, so [`PdvEncoder::finish`]
//! patches the header and writes header, table and data in one pass.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use tracing::debug;

use crate::error::{IoContext, PdvError, Result};
use crate::formats::{FrameTable, FrameTableEntry, FrameType, PdvHeader};
use crate::raster::Raster;

/// Incremental PDV builder.
pub struct PdvEncoder {
    header: PdvHeader,
    entries: Vec<FrameTableEntry>,
    data: Vec<u8>,
    compression: Compression,
}

impl PdvEncoder {
    /// Start a new container. The frame count is filled in by [`PdvEncoder::finish`].
    pub fn new(frame_rate: f32, width: u16, height: u16) -> Result<Self> {
        let header = PdvHeader::new(frame_rate, width, height);
        header.validate()?;
        Ok(Self {
            header,
            entries: Vec::new(),
            data: Vec::new(),
            compression: Compression::best(),
        })
    }

    /// Override the zlib level (0-9).
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    pub fn header(&self) -> &PdvHeader {
        &self.header
    }

    pub fn frame_count(&self) -> usize {
        self.entries.len()
    }

    /// Compressed bytes written so far
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Append one 1bpp frame payload as an IFrame.
    pub fn push_frame(&mut self, payload: &[u8]) -> Result<()> {
        let expected = self.header.frame_size();
        if payload.len() != expected {
            return Err(PdvError::PayloadSize {
                expected,
                actual: payload.len(),
            });
        }
        if self.entries.len() >= u16::MAX as usize {
            return Err(PdvError::TooManyFrames);
        }

        let entry = FrameTableEntry::pack(self.data.len() as u64, FrameType::IFrame)?;

        let mut zlib = ZlibEncoder::new(Vec::with_capacity(expected / 2), self.compression);
        zlib.write_all(payload)
            .io_context(|| "compressing frame")?;
        let block = zlib.finish().io_context(|| "compressing frame")?;

        debug!(
            "Frame {}: {} -> {} bytes at offset {}",
            self.entries.len() + 1,
            payload.len(),
            block.len(),
            entry.offset()
        );

        self.entries.push(entry);
        self.data.extend_from_slice(&block);
        Ok(())
    }

    /// Pack and append a raster.
    pub fn push_raster(&mut self, raster: &Raster) -> Result<()> {
        if raster.width() != self.header.width || raster.height() != self.header.height {
            return Err(PdvError::InvalidDimensions {
                width: raster.width(),
                height: raster.height(),
                reason: "frame size differs from the container",
            });
        }
        self.push_frame(&raster.pack())
    }

    /// Terminate the table, patch the frame count and write the container.
    ///
    /// Returns the number of frames written.
    pub fn finish<W: Write>(self, writer: &mut W) -> Result<usize> {
        let Self {
            mut header,
            mut entries,
            data,
            ..
        } = self;

        let frames = entries.len();
        entries.push(FrameTableEntry::pack(data.len() as u64, FrameType::Empty)?);
        header.num_frames = frames as u16;

        let table = FrameTable::new(entries)?;

        writer
            .write_all(&header.to_bytes())
            .io_context(|| "writing header")?;
        table.write_to(writer)?;
        writer
            .write_all(&data)
            .io_context(|| "writing frame data")?;
        writer.flush().io_context(|| "flushing output")?;

        debug!(
            "Wrote {} frames, {} bytes of frame data",
            frames,
            data.len()
        );
        Ok(frames)
    }

    /// Write the container to a file.
    pub fn write_file(self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let file = File::create(path).io_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.finish(&mut writer)
    }
}
