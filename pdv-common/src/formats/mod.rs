//! PDV container binary formats
//!
//! A PDV file is a fixed header, a packed frame table and a region of
//! zlib-compressed 1bpp frames:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ PdvHeader (28 bytes, magic "Playdate VID")   │
//! ├──────────────────────────────────────────────┤
//! │ FrameTableEntry × (num_frames + 1)           │
//! │   offset << 2 | frame_type                   │
//! │   last entry: Empty terminator               │
//! ├──────────────────────────────────────────────┤
//! │ zlib block frame 0 │ zlib block frame 1 │ …  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! All records implement [`BinarySerializable`].

pub mod entry;
pub mod header;
mod serialization;
pub mod table;

pub use entry::*;
pub use header::*;
pub use serialization::{BinarySerializable, read_records, write_records};
pub use table::*;

/// File extension for PDV containers.
pub const PDV_EXTENSION: &str = "pdv";
