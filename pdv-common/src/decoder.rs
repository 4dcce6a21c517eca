//! PDV frame extraction
//!
//! [`PdvDecoder`] reads the header and frame table once, then resolves each pair of
//! adjacent entries to a byte span in the frame-data region, inflates it and checks
//! the result against the header geometry.
//!
//! Frame numbers used in results and errors start at 1.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::ZlibDecoder;
use tracing::{debug, warn};

use crate::error::{IoContext, PdvError, Result};
use crate::formats::{FrameTable, FrameType, PdvHeader};
use crate::raster::Raster;

/// One decompressed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    /// 1-based position in the file
    pub number: usize,
    /// Tag from the table. Every non-Empty type holds a complete frame.
    pub frame_type: FrameType,
    /// `width * height / 8` bytes of 1bpp pixels
    pub payload: Vec<u8>,
}

impl DecodedFrame {
    pub fn to_raster(&self, header: &PdvHeader) -> Result<Raster> {
        Raster::assemble(&self.payload, header.width, header.height)
    }
}

/// Reader for a PDV stream.
pub struct PdvDecoder<R> {
    reader: R,
    header: PdvHeader,
    table: FrameTable,
    data_offset: u64,
    stream_len: u64,
}

impl PdvDecoder<BufReader<File>> {
    /// Open a PDV file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).io_context(|| format!("opening {}", path.display()))?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> PdvDecoder<R> {
    /// Read and validate the header and frame table.
    ///
    /// The magic is checked before anything else is read.
    pub fn new(mut reader: R) -> Result<Self> {
        let header = PdvHeader::read_from(&mut reader)?;
        header.validate()?;

        let table = FrameTable::read(&mut reader, header.num_frames)?;

        let data_offset = reader
            .stream_position()
            .io_context(|| "locating frame data")?;
        let stream_len = reader
            .seek(SeekFrom::End(0))
            .io_context(|| "measuring stream length")?;

        debug!(
            "PDV header: {}x{} @ {} fps, {} frames declared, data at 0x{:X}",
            header.width, header.height, header.frame_rate, header.num_frames, data_offset
        );

        let present = table.frames_present();
        if present < header.num_frames as usize {
            warn!(
                "Frame table ends after {} of {} declared frames",
                present, header.num_frames
            );
        }

        Ok(Self {
            reader,
            header,
            table,
            data_offset,
            stream_len,
        })
    }

    pub fn header(&self) -> &PdvHeader {
        &self.header
    }

    pub fn table(&self) -> &FrameTable {
        &self.table
    }

    /// Absolute offset of the frame-data region
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Number of frames present (terminator position, not the declared count)
    pub fn frame_count(&self) -> usize {
        self.table.frames_present()
    }

    /// Absolute `[start, end)` of a frame's compressed bytes.
    pub fn frame_span(&self, index: usize) -> Result<(u64, u64)> {
        let number = index + 1;
        let present = self.frame_count();
        let (start, end) = match self.table.span(index) {
            Some(span) if index < present => span,
            _ => return Err(PdvError::FrameOutOfRange { number, present }),
        };

        let start = self.data_offset + start;
        let end = self.data_offset + end;
        if end < start || end > self.stream_len {
            return Err(PdvError::InvalidRange {
                frame: number,
                start,
                end,
            });
        }
        Ok((start, end))
    }

    /// Read and inflate frame `index` (0-based).
    pub fn read_frame(&mut self, index: usize) -> Result<DecodedFrame> {
        let number = index + 1;
        let (start, end) = self.frame_span(index)?;
        let frame_type = self.table.entries()[index].frame_type();

        self.reader
            .seek(SeekFrom::Start(start))
            .io_context(|| format!("seeking to frame {} at offset {}", number, start))?;

        let mut compressed = vec![0u8; (end - start) as usize];
        self.reader
            .read_exact(&mut compressed)
            .io_context(|| format!("reading frame {} ({} bytes)", number, compressed.len()))?;

        let expected = self.header.frame_size();
        let payload = inflate(&compressed, expected).map_err(|e| PdvError::CorruptFrame {
            frame: number,
            offset: start,
            reason: format!("zlib: {}", e),
        })?;

        if payload.len() != expected {
            return Err(PdvError::CorruptFrame {
                frame: number,
                offset: start,
                reason: format!(
                    "decompressed to {} bytes, expected {}",
                    payload.len(),
                    expected
                ),
            });
        }

        debug!(
            "Frame {}: {:?}, {} -> {} bytes",
            number,
            frame_type,
            compressed.len(),
            payload.len()
        );

        Ok(DecodedFrame {
            number,
            frame_type,
            payload,
        })
    }

    /// Iterate over all present frames in table order.
    ///
    /// The iterator stops after yielding the first error.
    pub fn frames(&mut self) -> Frames<'_, R> {
        let remaining = self.frame_count();
        Frames {
            decoder: self,
            index: 0,
            remaining,
        }
    }
}

/// Sequential frame iterator returned by [`PdvDecoder::frames`].
pub struct Frames<'a, R> {
    decoder: &'a mut PdvDecoder<R>,
    index: usize,
    remaining: usize,
}

impl<R: Read + Seek> Iterator for Frames<'_, R> {
    type Item = Result<DecodedFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.decoder.read_frame(self.index);
        self.index += 1;
        self.remaining = if result.is_ok() { self.remaining - 1 } else { 0 };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for Frames<'_, R> {}

/// Inflate a zlib block, reading at most one byte past `expected` so oversized
/// blocks are detected without decompressing them fully.
fn inflate(compressed: &[u8], expected: usize) -> std::io::Result<Vec<u8>> {
    let mut payload = Vec::with_capacity(expected);
    ZlibDecoder::new(compressed)
        .take(expected as u64 + 1)
        .read_to_end(&mut payload)?;
    Ok(payload)
}
