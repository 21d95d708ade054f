// Input/Output: parsing and serialization

pub mod vox;

// Re-export main types and functions
pub use vox::{parse_vox, serialize_vox, ChunkTag, FormatError};
