//! Still-image codec service
//!
//! Decoded frames are persisted through a [`StillImageCodec`], passed in by the caller
//! rather than held globally. [`PngCodec`] writes 1-bit indexed PNGs with a
//! black/white palette and reads any format the `image` crate understands.

use crate::error::{PdvError, Result};
use crate::raster::{Raster, pack_bits, padded_row_len};

/// Stateless raster <-> file-bytes conversion.
pub trait StillImageCodec: Send + Sync {
    /// File extension without dot (e.g. "png")
    fn extension(&self) -> &'static str;

    fn encode(&self, raster: &Raster) -> Result<Vec<u8>>;

    /// Decode an image that is already black and white.
    fn decode(&self, bytes: &[u8]) -> Result<Raster>;
}

/// Palette for palette index 0 (black) and 1 (white), RGB triplets
pub const BW_PALETTE: [u8; 6] = [0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF];

/// PNG codec producing 1-bit-depth, 2-color palette images.
#[derive(Debug, Clone, Copy)]
pub struct PngCodec {
    compression: png::Compression,
}

impl Default for PngCodec {
    fn default() -> Self {
        Self {
            compression: png::Compression::Best,
        }
    }
}

impl PngCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StillImageCodec for PngCodec {
    fn extension(&self) -> &'static str {
        "png"
    }

    fn encode(&self, raster: &Raster) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        {
            let mut encoder =
                png::Encoder::new(&mut bytes, raster.width() as u32, raster.height() as u32);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::One);
            encoder.set_palette(&BW_PALETTE[..]);
            encoder.set_compression(self.compression);

            let mut writer = encoder.write_header()?;
            writer.write_image_data(&pack_rows(raster))?;
            writer.finish()?;
        }
        Ok(bytes)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Raster> {
        let luma = image::load_from_memory(bytes)?.to_luma8();
        let (width, height) = luma.dimensions();
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(PdvError::InvalidDimensions {
                width: width.min(u16::MAX as u32) as u16,
                height: height.min(u16::MAX as u32) as u16,
                reason: "image is larger than 65535 pixels on a side",
            });
        };
        Raster::from_luma(w, h, luma.as_raw())
    }
}

/// Pack a raster into PNG scanlines: 1 bit per pixel, each row padded to a whole byte.
fn pack_rows(raster: &Raster) -> Vec<u8> {
    let width = raster.width() as usize;
    let stride = padded_row_len(raster.width());
    let mut rows = Vec::with_capacity(stride * raster.height() as usize);
    for row in raster.pixels().chunks_exact(width) {
        rows.extend(row.chunks(8).map(pack_bits));
    }
    rows
}
