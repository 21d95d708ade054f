//! VOX serializer - writes a [`VoxDocument`] back to the chunk format

use glam::{IVec3, UVec3};

use super::constants::*;
use super::dict::write_material_chunk;
use super::{ChunkTag, FormatError};
use crate::document::VoxDocument;

/// Serialize a document to `.vox` bytes.
///
/// Output is a single `MAIN` chunk holding `PACK` (multi-model files only),
/// the `SIZE`/`XYZI` pairs, `RGBA`, and one `MATL` per non-default material.
/// Fails with [`FormatError::CellOutOfRange`] if a cell has no XYZI record:
/// coordinates are single bytes and must lie inside the model extent.
pub fn serialize_vox(doc: &VoxDocument) -> Result<Vec<u8>, FormatError> {
    let mut body = VoxWriter::new();

    if doc.model_count() > 1 {
        body.write_chunk(ChunkTag::PACK, &(doc.model_count() as u32).to_le_bytes());
    }

    for (index, (model, extent)) in doc.models().enumerate() {
        let mut size = Vec::with_capacity(12);
        for v in extent.to_array() {
            size.extend_from_slice(&v.to_le_bytes());
        }
        body.write_chunk(ChunkTag::SIZE, &size);

        let cells = model.sorted_cells();
        let mut xyzi = Vec::with_capacity(4 + cells.len() * VOXEL_RECORD_SIZE);
        xyzi.extend_from_slice(&(cells.len() as u32).to_le_bytes());
        for (pos, color) in cells {
            let record = voxel_record(pos, extent).ok_or(FormatError::CellOutOfRange {
                model: index,
                pos: pos.to_array(),
                extent: extent.to_array(),
            })?;
            xyzi.extend_from_slice(&[record[0], record[1], record[2], color]);
        }
        body.write_chunk(ChunkTag::XYZI, &xyzi);
    }

    // Record i holds colour i + 1; the last record is padding
    let mut rgba = Vec::with_capacity(RGBA_CHUNK_SIZE);
    for index in 1..=255u8 {
        rgba.extend_from_slice(&doc.color(index).to_array());
    }
    rgba.extend_from_slice(&[0; 4]);
    body.write_chunk(ChunkTag::RGBA, &rgba);

    for (index, material) in doc.materials().iter().enumerate() {
        if !material.is_default() {
            let content = write_material_chunk(index as i32, &material.to_dict());
            body.write_chunk(ChunkTag::MATL, &content);
        }
    }

    let mut writer = VoxWriter::new();
    writer.write_header(doc.version);
    writer.write_parent(ChunkTag::MAIN, &[], &body.finish());
    Ok(writer.finish())
}

/// Byte coordinates of a cell, if it lies inside `extent`
fn voxel_record(pos: IVec3, extent: UVec3) -> Option<[u8; 3]> {
    let mut record = [0u8; 3];
    for axis in 0..3 {
        let coord = u8::try_from(pos[axis]).ok()?;
        if u32::from(coord) >= extent[axis] {
            return None;
        }
        record[axis] = coord;
    }
    Some(record)
}

/// Growable output buffer with chunk framing
struct VoxWriter {
    buffer: Vec<u8>,
}

impl VoxWriter {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn write_header(&mut self, version: u32) {
        self.buffer.extend_from_slice(&MAGIC);
        self.buffer.extend_from_slice(&version.to_le_bytes());
    }

    fn write_chunk(&mut self, tag: ChunkTag, content: &[u8]) {
        self.write_parent(tag, content, &[]);
    }

    fn write_parent(&mut self, tag: ChunkTag, content: &[u8], children: &[u8]) {
        self.buffer.extend_from_slice(tag.as_bytes());
        self.buffer
            .extend_from_slice(&(content.len() as u32).to_le_bytes());
        self.buffer
            .extend_from_slice(&(children.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(content);
        self.buffer.extend_from_slice(children);
    }

    fn finish(self) -> Vec<u8> {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::VoxModel;
    use crate::io::vox::parse_vox;
    use crate::material::{MaterialType, VoxMaterial};
    use crate::palette::Rgba;

    #[test]
    fn test_header_and_main() {
        let bytes = serialize_vox(&VoxDocument::new()).unwrap();
        assert_eq!(&bytes[0..4], b"VOX ");
        assert_eq!(u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), VERSION);
        assert_eq!(&bytes[8..12], b"MAIN");
        // MAIN has no content of its own
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_document_survives_resave() {
        let mut doc = VoxDocument::new();
        let a: VoxModel = [(IVec3::new(0, 0, 0), 1), (IVec3::new(3, 1, 2), 200)]
            .into_iter()
            .collect();
        let b: VoxModel = [(IVec3::new(0, 0, 0), 9)].into_iter().collect();
        doc.push_model(UVec3::new(4, 2, 3), a);
        doc.push_model(UVec3::new(1, 1, 1), b);
        doc.palette.set(200, Rgba::new(12, 34, 56, 78));
        doc.set_material(
            200,
            VoxMaterial {
                kind: MaterialType::Metal,
                metallic: 0.75,
                ..Default::default()
            },
        );

        let parsed = parse_vox(&serialize_vox(&doc).unwrap()).unwrap();
        assert_eq!(parsed.sizes(), doc.sizes());
        assert_eq!(parsed.model(0), doc.model(0));
        assert_eq!(parsed.model(1), doc.model(1));
        assert_eq!(parsed.palette, doc.palette);
        assert_eq!(parsed.material(200).kind, MaterialType::Metal);
        assert_eq!(parsed.material(200).metallic, 0.75);
        assert_eq!(parsed.declared_model_count, Some(2));
    }

    #[test]
    fn test_record_bounds() {
        let extent = UVec3::new(256, 3, 300);
        assert_eq!(voxel_record(IVec3::new(255, 2, 0), extent), Some([255, 2, 0]));
        assert_eq!(voxel_record(IVec3::new(0, 3, 0), extent), None);
        assert_eq!(voxel_record(IVec3::new(0, 0, 256), extent), None);
        assert_eq!(voxel_record(IVec3::new(-1, 0, 0), extent), None);
    }
}
