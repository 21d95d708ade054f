//! Surface meshing of sparse voxel models
//!
//! Two strategies produce the same closed surface:
//!
//! - [`MeshMode::Naive`] emits one unit quad per exposed cell face
//! - [`MeshMode::Optimized`] sweeps each face orientation slice by slice and
//!   merges coplanar same-coloured faces into rectangles (greedy meshing)
//!
//! Faces between two occupied cells are never emitted. Every quad carries the
//! palette UV of its colour so one palette-texture material can shade it.

mod builder;
mod face;
mod greedy;
mod naive;
mod options;

pub use builder::{MeshBuffer, MeshBuilder};
pub use face::Face;
pub use options::{IndexFormat, MeshOptions, UpAxis};

use glam::{IVec3, UVec3, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::document::VoxModel;
use crate::palette::PaletteTexture;

/// Meshing strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshMode {
    /// One quad per exposed face
    Naive,
    /// Greedy merge of coplanar same-colour faces
    #[default]
    Optimized,
}

/// Meshing a model without voxels
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Model has no voxels to mesh")]
pub struct EmptyModelError;

/// Texture coordinate of a palette index in the 256 x 1 palette texture
#[inline]
pub fn palette_uv(color: u8) -> [f32; 2] {
    PaletteTexture::uv_for(color)
}

/// Mesh a model into a new buffer.
pub fn build_mesh(
    model: &VoxModel,
    extent: UVec3,
    mode: MeshMode,
    options: &MeshOptions,
) -> Result<MeshBuffer, EmptyModelError> {
    let mut buffer = MeshBuffer::new(options.index_format);
    build_mesh_into(model, extent, mode, options, &mut buffer)?;
    Ok(buffer)
}

/// Mesh a model into any [`MeshBuilder`].
///
/// Only cells inside `[0, extent)` are meshed; any others are dropped with a
/// warning.
pub fn build_mesh_into<B: MeshBuilder>(
    model: &VoxModel,
    extent: UVec3,
    mode: MeshMode,
    options: &MeshOptions,
    builder: &mut B,
) -> Result<(), EmptyModelError> {
    let clipped;
    let model = match clip_to_extent(model, extent) {
        Some(inside) => {
            warn!(
                "Dropped {} cells outside model extent {}",
                model.len() - inside.len(),
                extent
            );
            clipped = inside;
            &clipped
        }
        None => model,
    };

    if model.is_empty() {
        return Err(EmptyModelError);
    }

    let mut emitter = QuadEmitter {
        options,
        origin: options.origin_for(extent),
        builder,
    };

    match mode {
        MeshMode::Naive => naive::mesh(model, &mut emitter),
        MeshMode::Optimized => greedy::mesh(model, &mut emitter),
    }

    Ok(())
}

/// The cells of `model` inside `[0, extent)`, or `None` if that is all of them
fn clip_to_extent(model: &VoxModel, extent: UVec3) -> Option<VoxModel> {
    let max = extent.min(UVec3::splat(i32::MAX as u32)).as_ivec3();
    let inside = |pos: IVec3| pos.cmpge(IVec3::ZERO).all() && pos.cmplt(max).all();

    if model.iter().all(|(pos, _)| inside(pos)) {
        return None;
    }
    Some(model.iter().filter(|&(pos, _)| inside(pos)).collect())
}

/// A single cube centred on the origin, every face in `color`.
///
/// Used as the shared mesh of one voxel type.
pub fn unit_cell_mesh(color: u8, options: &MeshOptions) -> MeshBuffer {
    let mut buffer = MeshBuffer::new(options.index_format);
    let mut emitter = QuadEmitter {
        options,
        origin: Vec3::splat(0.5),
        builder: &mut buffer,
    };
    for face in Face::iter() {
        emitter.emit_cell(face, IVec3::ZERO, color);
    }
    buffer
}

/// Maps grid-space rectangles to placed quads
pub(crate) struct QuadEmitter<'a, B: MeshBuilder> {
    options: &'a MeshOptions,
    origin: Vec3,
    builder: &'a mut B,
}

impl<B: MeshBuilder> QuadEmitter<'_, B> {
    /// Emit the rectangle `[u0, u1) x [v0, v1)` of cells on `face` at grid
    /// layer `layer` along the face axis.
    pub(crate) fn emit(&mut self, face: Face, layer: i32, u: (i32, i32), v: (i32, i32), color: u8) {
        let plane = if face.is_positive() { layer + 1 } else { layer };
        let corners = face.corners(
            plane as f32,
            (u.0 as f32, u.1 as f32),
            (v.0 as f32, v.1 as f32),
        );

        let vertices = corners.map(|c| self.options.place(c - self.origin).to_array());
        let normal = self.options.orient(face.normal()).to_array();
        self.builder
            .add_quad(vertices, normal, palette_uv(color), color);
    }

    pub(crate) fn emit_cell(&mut self, face: Face, pos: IVec3, color: u8) {
        let (u, v) = face.plane_axes();
        self.emit(
            face,
            pos[face.axis()],
            (pos[u], pos[u] + 1),
            (pos[v], pos[v] + 1),
            color,
        );
    }
}
