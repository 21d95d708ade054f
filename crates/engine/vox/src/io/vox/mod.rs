//! MagicaVoxel `.vox` container - chunked binary format
//!
//! Everything is little-endian. A file is an 8-byte header followed by a tree
//! of chunks; in practice a single `MAIN` chunk whose children hold the
//! document.
//!
//! # File Format
//!
//! ```text
//! [Header: 8 bytes]
//!   Magic: 'VOX ' (4 ASCII bytes)
//!   Version: u32 (150 or 200 in the wild)
//!
//! [Chunk: 12 + N + M bytes]
//!   Tag: 4 ASCII bytes
//!   Content length N: u32
//!   Children length M: u32
//!   Content: N bytes
//!   Children: M bytes of nested chunks
//! ```
//!
//! Known chunk payloads:
//!
//! ```text
//! SIZE  x: u32, y: u32, z: u32                 (z is up)
//! XYZI  n: u32, n * (x: u8, y: u8, z: u8, i: u8)
//! RGBA  256 * (r: u8, g: u8, b: u8, a: u8)     record k -> palette[k + 1]
//! MATL  id: i32, DICT                          (MATT: legacy tag, same layout)
//! PACK  model count: u32
//! DICT  n: i32, n * (STRING key, STRING value)
//! STRING len: i32, len bytes
//! ```
//!
//! Any other tag is skipped whole so newer files stay readable.

pub mod dict;
pub mod parser;
pub mod reader;
pub mod serializer;

use std::fmt;
use thiserror::Error;

/// Four ASCII bytes naming a chunk.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    pub const MAIN: ChunkTag = ChunkTag(*b"MAIN");
    pub const PACK: ChunkTag = ChunkTag(*b"PACK");
    pub const SIZE: ChunkTag = ChunkTag(*b"SIZE");
    pub const XYZI: ChunkTag = ChunkTag(*b"XYZI");
    pub const RGBA: ChunkTag = ChunkTag(*b"RGBA");
    pub const MATL: ChunkTag = ChunkTag(*b"MATL");
    pub const MATT: ChunkTag = ChunkTag(*b"MATT");

    /// Pseudo-tag used when the file header itself is short.
    pub const HEADER: ChunkTag = ChunkTag(constants::MAGIC);

    /// Tags the parser interprets. Children of any other chunk are never
    /// descended into.
    pub fn is_known(self) -> bool {
        matches!(
            self,
            ChunkTag::MAIN
                | ChunkTag::PACK
                | ChunkTag::SIZE
                | ChunkTag::XYZI
                | ChunkTag::RGBA
                | ChunkTag::MATL
                | ChunkTag::MATT
        )
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag({})", self)
    }
}

/// VOX format errors
///
/// All of them are fatal to the parse; no partial document is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// First four bytes are not `VOX `
    #[error("Invalid VOX magic: expected 'VOX ', found '{found}'")]
    BadMagic { found: ChunkTag },

    /// A declared length reads past the end of its enclosing region
    #[error(
        "Truncated {tag} chunk at offset {offset}: expected {expected_bytes} bytes, only {available_bytes} available"
    )]
    Truncated {
        tag: ChunkTag,
        offset: usize,
        expected_bytes: usize,
        available_bytes: usize,
    },

    /// MATL/MATT dictionary entry count disagrees with its contents
    #[error("Malformed material dictionary for material {material_id}: {reason}")]
    MalformedMaterialDict { material_id: i32, reason: String },

    /// SIZE and XYZI chunks do not pair up one to one
    #[error("Unpaired model chunks: {sizes} SIZE chunk(s) for {models} XYZI chunk(s)")]
    UnpairedModel { sizes: usize, models: usize },

    /// A model cell cannot be written as an XYZI record: it is negative, past
    /// 255, or outside the model extent
    #[error("Model {model}: cell {pos:?} is outside extent {extent:?}")]
    CellOutOfRange {
        model: usize,
        pos: [i32; 3],
        extent: [u32; 3],
    },

    /// Chunk tree deeper than the reader allows
    #[error("Chunk nesting exceeds {max_depth} levels")]
    NestingTooDeep { max_depth: usize },
}

/// VOX file format constants
pub mod constants {
    /// Magic number: 'VOX ' in ASCII
    pub const MAGIC: [u8; 4] = *b"VOX ";

    /// Version written by the serializer
    pub const VERSION: u32 = 200;

    /// Header size in bytes (magic + version)
    pub const HEADER_SIZE: usize = 8;

    /// Chunk header: tag + content length + children length
    pub const CHUNK_HEADER_SIZE: usize = 12;

    /// Bytes per XYZI record
    pub const VOXEL_RECORD_SIZE: usize = 4;

    /// Bytes in a complete RGBA payload
    pub const RGBA_CHUNK_SIZE: usize = 256 * 4;

    /// Maximum chunk nesting depth to prevent stack overflow
    pub const MAX_NESTING_DEPTH: usize = 64;
}

// Re-export public API
pub use parser::parse_vox;
pub use reader::{Chunk, ChunkReader, VoxHeader};
pub use serializer::serialize_vox;
