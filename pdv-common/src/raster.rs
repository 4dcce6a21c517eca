//! 1bpp raster packing
//!
//! Frame payloads store one bit per pixel, most-significant bit first, rows in order.
//! A bit is the pixel's palette index: 0 = black, 1 = white.

use crate::error::{PdvError, Result};
use crate::formats::validate_dimensions;

/// Palette index of a black pixel
pub const BLACK: u8 = 0;
/// Palette index of a white pixel
pub const WHITE: u8 = 1;

/// Luma at or above which an 8-bit gray pixel counts as white
pub const LUMA_THRESHOLD: u8 = 128;

/// Expand one packed byte into 8 palette indices, high bit first.
#[inline]
pub fn expand_bits(byte: u8) -> [u8; 8] {
    let mut pixels = [0u8; 8];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        *pixel = (byte >> (7 - i)) & 1;
    }
    pixels
}

/// Pack 8 palette indices into one byte, first pixel in the high bit.
///
/// Any nonzero index counts as white.
#[inline]
pub fn pack_bits(pixels: &[u8]) -> u8 {
    pixels
        .iter()
        .take(8)
        .enumerate()
        .fold(0u8, |acc, (i, &p)| acc | (((p != 0) as u8) << (7 - i)))
}

/// Bytes per row when each row is padded to a whole byte.
pub fn padded_row_len(width: u16) -> usize {
    (width as usize).div_ceil(8)
}

/// One decoded frame: a palette index (0 or 1) per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Raster {
    /// All-black raster
    pub fn new(width: u16, height: u16) -> Result<Self> {
        validate_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![BLACK; width as usize * height as usize],
        })
    }

    /// Wrap per-pixel palette indices. Nonzero values become white.
    pub fn from_pixels(width: u16, height: u16, mut pixels: Vec<u8>) -> Result<Self> {
        validate_dimensions(width, height)?;
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(PdvError::PayloadSize {
                expected,
                actual: pixels.len(),
            });
        }
        for p in pixels.iter_mut() {
            *p = (*p != 0) as u8;
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Expand a decompressed frame payload into a raster.
    pub fn assemble(payload: &[u8], width: u16, height: u16) -> Result<Self> {
        validate_dimensions(width, height)?;
        let expected = width as usize * height as usize / 8;
        if payload.len() != expected {
            return Err(PdvError::PayloadSize {
                expected,
                actual: payload.len(),
            });
        }

        let mut pixels = Vec::with_capacity(expected * 8);
        for &byte in payload {
            pixels.extend_from_slice(&expand_bits(byte));
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Expand 1bpp scanlines where every row is padded to a whole byte.
    ///
    /// This is the layout of 1-bit PNG rows and of raw `monob` video. Padding bits
    /// past `width` in each row are dropped.
    pub fn from_padded_rows(rows: &[u8], width: u16, height: u16) -> Result<Self> {
        validate_dimensions(width, height)?;
        let stride = padded_row_len(width);
        let expected = stride * height as usize;
        if rows.len() != expected {
            return Err(PdvError::PayloadSize {
                expected,
                actual: rows.len(),
            });
        }

        let width = width as usize;
        let mut pixels = Vec::with_capacity(width * height as usize);
        for row in rows.chunks_exact(stride) {
            let start = pixels.len();
            for &byte in row {
                pixels.extend_from_slice(&expand_bits(byte));
            }
            pixels.truncate(start + width);
        }

        Self::from_pixels(width as u16, height, pixels)
    }

    /// Threshold 8-bit grayscale into black/white.
    ///
    /// Input is expected to be 2-color already; no dithering is applied.
    pub fn from_luma(width: u16, height: u16, luma: &[u8]) -> Result<Self> {
        let pixels = luma
            .iter()
            .map(|&l| if l >= LUMA_THRESHOLD { WHITE } else { BLACK })
            .collect();
        Self::from_pixels(width, height, pixels)
    }

    /// Pack back into a 1bpp frame payload.
    pub fn pack(&self) -> Vec<u8> {
        self.pixels.chunks_exact(8).map(pack_bits).collect()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u16, y: u16) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn set(&mut self, x: u16, y: u16, value: u8) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = (value != 0) as u8;
        }
    }
}
