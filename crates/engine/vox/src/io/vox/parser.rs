//! VOX parser - builds a [`VoxDocument`] from the flattened chunk list

use glam::{IVec3, UVec3};
use tracing::{debug, warn};

use super::constants::*;
use super::dict::read_material_chunk;
use super::reader::{Chunk, ChunkReader};
use super::{ChunkTag, FormatError};
use crate::document::{VoxDocument, VoxModel};
use crate::palette::Rgba;

type Result<T> = std::result::Result<T, FormatError>;

/// Parse a complete `.vox` buffer.
///
/// Either the whole document is returned or an error; nothing partial.
pub fn parse_vox(data: &[u8]) -> Result<VoxDocument> {
    let (header, chunks) = ChunkReader::new(data).read_chunks()?;
    debug!(
        "VOX version {}, {} chunks in {} bytes",
        header.version,
        chunks.len(),
        data.len()
    );

    let mut doc = VoxDocument::new();
    doc.version = header.version;

    // SIZE chunks not yet claimed by an XYZI
    let mut sizes: Vec<UVec3> = Vec::new();
    let mut models: Vec<VoxModel> = Vec::new();

    for chunk in &chunks {
        match chunk.tag {
            ChunkTag::MAIN => {}
            ChunkTag::PACK => {
                let count = u32_at(chunk, 0)?;
                debug!("PACK declares {} models", count);
                doc.declared_model_count = Some(count);
            }
            ChunkTag::SIZE => {
                let size = UVec3::new(u32_at(chunk, 0)?, u32_at(chunk, 4)?, u32_at(chunk, 8)?);
                debug!("SIZE {}", size);
                sizes.push(size);
            }
            ChunkTag::XYZI => {
                let Some(&extent) = sizes.get(models.len()) else {
                    return Err(FormatError::UnpairedModel {
                        sizes: sizes.len(),
                        models: models.len() + 1,
                    });
                };
                let model = parse_voxels(chunk, extent)?;
                debug!("XYZI model {}: {} voxels", models.len(), model.len());
                models.push(model);
            }
            ChunkTag::RGBA => parse_palette(chunk, &mut doc)?,
            ChunkTag::MATL | ChunkTag::MATT => {
                let (id, dict) = read_material_chunk(chunk.content, chunk.tag, chunk.offset)?;
                match u8::try_from(id) {
                    // Later chunks for the same id override key by key
                    Ok(index) => {
                        let material = doc.material_mut(index);
                        for (key, value) in &dict {
                            material.apply(key, value);
                        }
                    }
                    Err(_) => warn!("Ignoring {} for out-of-range material id {}", chunk.tag, id),
                }
            }
            tag => debug!(
                "Skipping unknown chunk {} at offset {} ({} content bytes)",
                tag,
                chunk.offset,
                chunk.content.len()
            ),
        }
    }

    if sizes.len() != models.len() {
        return Err(FormatError::UnpairedModel {
            sizes: sizes.len(),
            models: models.len(),
        });
    }

    if let Some(declared) = doc.declared_model_count {
        if declared as usize != models.len() {
            warn!(
                "PACK declares {} models but file contains {}",
                declared,
                models.len()
            );
        }
    }

    for (extent, model) in sizes.into_iter().zip(models) {
        doc.push_model(extent, model);
    }

    Ok(doc)
}

fn u32_at(chunk: &Chunk<'_>, at: usize) -> Result<u32> {
    chunk
        .content
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(FormatError::Truncated {
            tag: chunk.tag,
            offset: chunk.offset,
            expected_bytes: at + 4,
            available_bytes: chunk.content.len(),
        })
}

fn parse_voxels(chunk: &Chunk<'_>, extent: UVec3) -> Result<VoxModel> {
    let count = u32_at(chunk, 0)? as usize;
    let expected = count
        .checked_mul(VOXEL_RECORD_SIZE)
        .and_then(|n| n.checked_add(4));
    let records = match expected {
        Some(end) if end <= chunk.content.len() => &chunk.content[4..end],
        _ => {
            return Err(FormatError::Truncated {
                tag: chunk.tag,
                offset: chunk.offset,
                expected_bytes: expected.unwrap_or(usize::MAX),
                available_bytes: chunk.content.len(),
            })
        }
    };

    let mut model = VoxModel::new();
    let mut outside = 0usize;
    for record in records.chunks_exact(VOXEL_RECORD_SIZE) {
        let (pos, color) = (
            UVec3::new(record[0] as u32, record[1] as u32, record[2] as u32),
            record[3],
        );
        if color == 0 {
            continue;
        }
        if pos.cmpge(extent).any() {
            outside += 1;
            continue;
        }
        model.insert(IVec3::new(pos.x as i32, pos.y as i32, pos.z as i32), color);
    }

    if outside > 0 {
        warn!(
            "Dropped {} voxels outside model extent {} at offset {}",
            outside, extent, chunk.offset
        );
    }

    Ok(model)
}

fn parse_palette(chunk: &Chunk<'_>, doc: &mut VoxDocument) -> Result<()> {
    if chunk.content.len() < RGBA_CHUNK_SIZE {
        return Err(FormatError::Truncated {
            tag: chunk.tag,
            offset: chunk.offset,
            expected_bytes: RGBA_CHUNK_SIZE,
            available_bytes: chunk.content.len(),
        });
    }

    // Record i is colour i + 1; the last record has no slot
    for (i, c) in chunk.content[..RGBA_CHUNK_SIZE - 4].chunks_exact(4).enumerate() {
        doc.palette.set(i as u8 + 1, Rgba::new(c[0], c[1], c[2], c[3]));
    }
    Ok(())
}
