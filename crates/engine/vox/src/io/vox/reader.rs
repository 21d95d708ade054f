//! VOX chunk reader
//!
//! Walks the chunk tree of a `.vox` buffer and returns it as a flat,
//! pre-order list of `(tag, payload)` records. Nesting is not retained; only
//! the tags matter to the document builder.
//!
//! Every read is bounds-checked against the region that encloses it, so a
//! declared length can never carry the reader past the end of its parent.

use super::constants::*;
use super::{ChunkTag, FormatError};

/// VOX file header (8 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxHeader {
    pub version: u32,
}

/// One chunk with its content borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub tag: ChunkTag,
    /// Offset of the chunk header within the whole buffer
    pub offset: usize,
    /// Nesting depth, 0 for top-level chunks
    pub depth: usize,
    pub content: &'a [u8],
}

/// Zero-copy reader over a `.vox` buffer.
pub struct ChunkReader<'a> {
    data: &'a [u8],
}

impl<'a> ChunkReader<'a> {
    /// Create a new reader for VOX binary data
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Read 4-byte little-endian unsigned integer
    #[inline]
    pub fn read_u32_le(&self, offset: usize, tag: ChunkTag) -> Result<u32, FormatError> {
        let bytes = self.read_bytes::<4>(offset, tag)?;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Read a fixed number of bytes at offset (with bounds checking)
    #[inline]
    pub fn read_bytes<const N: usize>(
        &self,
        offset: usize,
        tag: ChunkTag,
    ) -> Result<[u8; N], FormatError> {
        let end = offset.checked_add(N).filter(|&end| end <= self.data.len());
        match end {
            Some(end) => {
                let mut out = [0u8; N];
                out.copy_from_slice(&self.data[offset..end]);
                Ok(out)
            }
            None => Err(FormatError::Truncated {
                tag,
                offset,
                expected_bytes: N,
                available_bytes: self.data.len().saturating_sub(offset),
            }),
        }
    }

    /// Read and validate the 8-byte file header
    pub fn read_header(&self) -> Result<VoxHeader, FormatError> {
        if self.data.len() < HEADER_SIZE {
            return Err(FormatError::Truncated {
                tag: ChunkTag::HEADER,
                offset: 0,
                expected_bytes: HEADER_SIZE,
                available_bytes: self.data.len(),
            });
        }

        let magic = self.read_bytes::<4>(0, ChunkTag::HEADER)?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                found: ChunkTag(magic),
            });
        }

        let version = self.read_u32_le(4, ChunkTag::HEADER)?;
        Ok(VoxHeader { version })
    }

    /// Read the header, then every chunk after it.
    pub fn read_chunks(&self) -> Result<(VoxHeader, Vec<Chunk<'a>>), FormatError> {
        let header = self.read_header()?;
        let mut chunks = Vec::new();
        self.walk(HEADER_SIZE, self.data.len(), ChunkTag::HEADER, 0, &mut chunks)?;
        Ok((header, chunks))
    }

    /// Read the chunks in `data[start..end]`, descending into the children of
    /// known tags. Unknown chunks are skipped whole, children included.
    fn walk(
        &self,
        start: usize,
        end: usize,
        parent: ChunkTag,
        depth: usize,
        out: &mut Vec<Chunk<'a>>,
    ) -> Result<(), FormatError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(FormatError::NestingTooDeep {
                max_depth: MAX_NESTING_DEPTH,
            });
        }

        let mut offset = start;
        while offset < end {
            let available = end - offset;
            if available < CHUNK_HEADER_SIZE {
                return Err(FormatError::Truncated {
                    tag: parent,
                    offset,
                    expected_bytes: CHUNK_HEADER_SIZE,
                    available_bytes: available,
                });
            }

            let tag = ChunkTag(self.read_bytes::<4>(offset, parent)?);
            let content_len = self.read_u32_le(offset + 4, tag)? as usize;
            let children_len = self.read_u32_le(offset + 8, tag)? as usize;

            let declared = CHUNK_HEADER_SIZE
                .checked_add(content_len)
                .and_then(|n| n.checked_add(children_len));
            let total = match declared {
                Some(total) if total <= available => total,
                _ => {
                    return Err(FormatError::Truncated {
                        tag,
                        offset,
                        expected_bytes: declared.unwrap_or(usize::MAX),
                        available_bytes: available,
                    })
                }
            };

            let content_start = offset + CHUNK_HEADER_SIZE;
            let children_start = content_start + content_len;
            out.push(Chunk {
                tag,
                offset,
                depth,
                content: &self.data[content_start..children_start],
            });

            if children_len > 0 && tag.is_known() {
                self.walk(
                    children_start,
                    children_start + children_len,
                    tag,
                    depth + 1,
                    out,
                )?;
            }

            offset += total;
        }

        Ok(())
    }

    /// Get raw data slice (for accessing entire buffer)
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Get data length
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if data is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(tag: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
        let mut out = tag.to_vec();
        out.extend_from_slice(&(content.len() as u32).to_le_bytes());
        out.extend_from_slice(&(children.len() as u32).to_le_bytes());
        out.extend_from_slice(content);
        out.extend_from_slice(children);
        out
    }

    fn file(body: &[u8]) -> Vec<u8> {
        let mut out = b"VOX ".to_vec();
        out.extend_from_slice(&150u32.to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_read_u32_le() {
        let data = vec![0x78, 0x56, 0x34, 0x12];
        let reader = ChunkReader::new(&data);
        assert_eq!(reader.read_u32_le(0, ChunkTag::SIZE).unwrap(), 0x12345678);
        assert!(reader.read_u32_le(1, ChunkTag::SIZE).is_err());
    }

    #[test]
    fn test_read_bytes_past_end() {
        let data = vec![1, 2, 3];
        let reader = ChunkReader::new(&data);
        match reader.read_bytes::<4>(0, ChunkTag::RGBA) {
            Err(FormatError::Truncated {
                tag,
                expected_bytes,
                available_bytes,
                ..
            }) => {
                assert_eq!(tag, ChunkTag::RGBA);
                assert_eq!(expected_bytes, 4);
                assert_eq!(available_bytes, 3);
            }
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_header_version() {
        let data = file(&[]);
        let header = ChunkReader::new(&data).read_header().unwrap();
        assert_eq!(header.version, 150);
    }

    #[test]
    fn test_main_children_are_flattened() {
        let size = chunk(b"SIZE", &[0; 12], &[]);
        let rgba = chunk(b"RGBA", &[0; 1024], &[]);
        let main = chunk(b"MAIN", &[], &[size, rgba].concat());
        let data = file(&main);

        let (_, chunks) = ChunkReader::new(&data).read_chunks().unwrap();
        let tags: Vec<ChunkTag> = chunks.iter().map(|c| c.tag).collect();
        assert_eq!(tags, vec![ChunkTag::MAIN, ChunkTag::SIZE, ChunkTag::RGBA]);
        assert_eq!(chunks[1].depth, 1);
        assert_eq!(chunks[1].offset, 8 + 12);
        assert_eq!(chunks[2].content.len(), 1024);
    }

    #[test]
    fn test_unknown_chunk_children_not_walked() {
        // Garbage children would fail to parse as chunks if descended into
        let unknown = chunk(b"nTRN", &[1, 2, 3], &[0xFF; 5]);
        let size = chunk(b"SIZE", &[0; 12], &[]);
        let data = file(&[unknown, size].concat());

        let (_, chunks) = ChunkReader::new(&data).read_chunks().unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].tag, ChunkTag(*b"nTRN"));
        assert_eq!(chunks[1].tag, ChunkTag::SIZE);
    }

    #[test]
    fn test_children_length_past_parent_end() {
        let mut main = chunk(b"MAIN", &[], &chunk(b"SIZE", &[0; 12], &[]));
        // Claim more children than the buffer holds
        main[8..12].copy_from_slice(&100u32.to_le_bytes());
        let data = file(&main);

        match ChunkReader::new(&data).read_chunks() {
            Err(FormatError::Truncated { tag, offset, .. }) => {
                assert_eq!(tag, ChunkTag::MAIN);
                assert_eq!(offset, 8);
            }
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_chunk_header() {
        let data = file(b"SIZE\x0c\x00");
        match ChunkReader::new(&data).read_chunks() {
            Err(FormatError::Truncated {
                expected_bytes,
                available_bytes,
                ..
            }) => {
                assert_eq!(expected_bytes, CHUNK_HEADER_SIZE);
                assert_eq!(available_bytes, 6);
            }
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_nesting_limit() {
        let mut nested = chunk(b"SIZE", &[0; 12], &[]);
        for _ in 0..=MAX_NESTING_DEPTH {
            nested = chunk(b"MAIN", &[], &nested);
        }
        let data = file(&nested);

        assert_eq!(
            ChunkReader::new(&data).read_chunks().unwrap_err(),
            FormatError::NestingTooDeep {
                max_depth: MAX_NESTING_DEPTH
            }
        );
    }
}
