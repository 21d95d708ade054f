//! Test models for VOX parsing, meshing and import
//!
//! Byte-level builders for `.vox` files plus a few ready-made documents and
//! sparse models used across the integration suites.
#![allow(dead_code)]

use vox::glam::IVec3;
use vox::VoxModel;

// ============================================================================
// Chunk builders
// ============================================================================

/// Raw chunk: tag, content length, children length, content, children
pub fn chunk(tag: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    out.extend_from_slice(&(children.len() as u32).to_le_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(children);
    out
}

/// Header plus a MAIN chunk holding `children`
pub fn vox_file(version: u32, children: &[Vec<u8>]) -> Vec<u8> {
    let mut out = b"VOX ".to_vec();
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&chunk(b"MAIN", &[], &children.concat()));
    out
}

pub fn size_chunk(x: u32, y: u32, z: u32) -> Vec<u8> {
    let content: Vec<u8> = [x, y, z].iter().flat_map(|v| v.to_le_bytes()).collect();
    chunk(b"SIZE", &content, &[])
}

/// XYZI chunk from `[x, y, z, colour]` records
pub fn xyzi_chunk(voxels: &[[u8; 4]]) -> Vec<u8> {
    let mut content = (voxels.len() as u32).to_le_bytes().to_vec();
    for v in voxels {
        content.extend_from_slice(v);
    }
    chunk(b"XYZI", &content, &[])
}

/// RGBA chunk; missing records are zero-filled up to 256
pub fn rgba_chunk(colors: &[[u8; 4]]) -> Vec<u8> {
    let mut content = vec![0u8; 256 * 4];
    for (i, c) in colors.iter().take(256).enumerate() {
        content[i * 4..i * 4 + 4].copy_from_slice(c);
    }
    chunk(b"RGBA", &content, &[])
}

/// MATL (or MATT) chunk with the dictionary layout
pub fn material_chunk(tag: &[u8; 4], id: i32, entries: &[(&str, &str)]) -> Vec<u8> {
    let mut content = id.to_le_bytes().to_vec();
    content.extend_from_slice(&(entries.len() as i32).to_le_bytes());
    for (key, value) in entries {
        for s in [key, value] {
            content.extend_from_slice(&(s.len() as i32).to_le_bytes());
            content.extend_from_slice(s.as_bytes());
        }
    }
    chunk(tag, &content, &[])
}

pub fn pack_chunk(count: u32) -> Vec<u8> {
    chunk(b"PACK", &count.to_le_bytes(), &[])
}

// ============================================================================
// Files
// ============================================================================

/// One red voxel in a 1x1x1 model, with a palette whose slot 1 is red
pub fn single_voxel_file() -> Vec<u8> {
    vox_file(
        150,
        &[
            size_chunk(1, 1, 1),
            xyzi_chunk(&[[0, 0, 0, 1]]),
            rgba_chunk(&[[255, 0, 0, 255]]),
        ],
    )
}

/// 2x2x1 slab, all cells colour 1
pub fn slab_2x2x1_file() -> Vec<u8> {
    vox_file(
        150,
        &[
            size_chunk(2, 2, 1),
            xyzi_chunk(&[[0, 0, 0, 1], [1, 0, 0, 1], [0, 1, 0, 1], [1, 1, 0, 1]]),
        ],
    )
}

/// Two models that both use colour 5; the second also uses colour 9
///
/// Model 0: 2x1x1 extent, cells (0,0,0) and (1,0,0), both colour 5
/// Model 1: 1x3x2 extent, cells (0,0,0) colour 5 and (0,2,1) colour 9
pub fn two_models_shared_color_file() -> Vec<u8> {
    vox_file(
        150,
        &[
            pack_chunk(2),
            size_chunk(2, 1, 1),
            xyzi_chunk(&[[0, 0, 0, 5], [1, 0, 0, 5]]),
            size_chunk(1, 3, 2),
            xyzi_chunk(&[[0, 0, 0, 5], [0, 2, 1, 9]]),
        ],
    )
}

/// Single voxel whose colour 1 is glass with 30% transparency
pub fn glass_material_file() -> Vec<u8> {
    vox_file(
        150,
        &[
            size_chunk(1, 1, 1),
            xyzi_chunk(&[[0, 0, 0, 1]]),
            material_chunk(b"MATL", 1, &[("_type", "_glass"), ("_trans", "0.3")]),
        ],
    )
}

/// A model whose XYZI chunk holds no voxels
pub fn empty_model_file() -> Vec<u8> {
    vox_file(150, &[size_chunk(4, 4, 4), xyzi_chunk(&[])])
}

// ============================================================================
// Sparse models
// ============================================================================

/// Solid box of one colour with its minimum corner at the origin
pub fn solid_box(w: i32, h: i32, d: i32, color: u8) -> VoxModel {
    let mut model = VoxModel::new();
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                model.insert(IVec3::new(x, y, z), color);
            }
        }
    }
    model
}

/// `n` cells on a diagonal with two-cell gaps, so no faces touch
pub fn isolated_cells(n: i32) -> VoxModel {
    (0..n)
        .map(|i| (IVec3::splat(i * 2), (i % 255 + 1) as u8))
        .collect()
}

/// Hollow 3x3x3 shell (centre cell missing), colour 2
pub fn hollow_shell() -> VoxModel {
    let mut model = solid_box(3, 3, 3, 2);
    model.insert(IVec3::ONE, 0);
    model
}
