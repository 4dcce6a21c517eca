//! PDV monochrome video container codec
//!
//! Shared by the `pdv` command-line tool and anything else that needs to read or
//! write `.pdv` files.
//!
//! # Modules
//!
//! - [`formats`] - Header, packed frame-table entries, frame table
//! - [`raster`] - 1bpp payload expansion and packing
//! - [`decoder`] - Frame extraction pipeline
//! - [`encoder`] - Container writer
//! - [`codec`] - Still-image codec service (PNG)
//! - [`naming`] - Output file naming

pub mod codec;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod formats;
pub mod naming;
pub mod raster;

pub use codec::{PngCodec, StillImageCodec};
pub use decoder::{DecodedFrame, PdvDecoder};
pub use encoder::PdvEncoder;
pub use error::{PdvError, Result};
pub use formats::{
    BinarySerializable, FrameTable, FrameTableEntry, FrameType, PDV_EXTENSION, PDV_MAGIC,
    PdvHeader,
};
pub use naming::FrameNamer;
pub use raster::{Raster, expand_bits, padded_row_len};
