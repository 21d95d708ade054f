use std::collections::HashMap;

use glam::{IVec3, UVec3, Vec3};
use thiserror::Error;

use crate::material::MaterialParams;
use crate::mesh::MeshBuffer;
use crate::palette::PaletteTexture;

/// Opaque id of a texture created by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

/// Opaque id of a material or material instance created by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub usize);

/// Shape of a parent material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialTemplate {
    /// Base colour sampled from this palette texture
    pub palette_texture: Option<TextureHandle>,
    /// Exposes colour, roughness, metallic, opacity and emission parameters
    /// for instances to override
    pub parameterized: bool,
}

/// A material slot of a static mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshMaterial {
    /// Colour this slot shades; `None` for the single palette material
    pub color: Option<u8>,
    pub material: MaterialHandle,
}

/// A finished surface mesh
#[derive(Debug, Clone, PartialEq)]
pub struct StaticMeshAsset {
    pub name: String,
    /// Source model, `None` when all models were merged
    pub model_id: Option<usize>,
    pub mesh: MeshBuffer,
    pub materials: Vec<MeshMaterial>,
}

/// Per-voxel-type asset: one cube mesh per used colour plus the cells that
/// reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelAsset {
    pub name: String,
    pub model_id: Option<usize>,
    pub extent: UVec3,
    pub xy_center: bool,
    /// Palette indices in use, ascending; position = mesh slot
    pub palette: Vec<u8>,
    /// Cube mesh for each `palette` entry
    pub meshes: Vec<MeshBuffer>,
    /// Material for each `palette` entry, when one was resolved
    pub materials: Vec<Option<MaterialHandle>>,
    /// Cell -> index into `palette`
    pub cells: HashMap<IVec3, u8>,
    /// Union of the cube mesh bounds
    pub cell_bounds: Option<(Vec3, Vec3)>,
}

/// Asset sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink rejected {asset}: {reason}")]
    Rejected { asset: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Receiver of everything an import creates.
pub trait AssetSink {
    fn create_palette_texture(
        &mut self,
        name: &str,
        texture: &PaletteTexture,
    ) -> Result<TextureHandle, SinkError>;

    fn create_material(
        &mut self,
        name: &str,
        template: &MaterialTemplate,
    ) -> Result<MaterialHandle, SinkError>;

    fn create_material_instance(
        &mut self,
        parent: MaterialHandle,
        color: u8,
        params: &MaterialParams,
    ) -> Result<MaterialHandle, SinkError>;

    /// Previously created instance for a colour
    fn find_material_instance(&self, color: u8) -> Option<MaterialHandle>;

    fn create_static_mesh(&mut self, asset: StaticMeshAsset) -> Result<(), SinkError>;

    fn create_voxel(&mut self, asset: VoxelAsset) -> Result<(), SinkError>;
}

/// A material instance recorded by [`MemorySink`]
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialInstance {
    pub handle: MaterialHandle,
    pub parent: MaterialHandle,
    pub color: u8,
    pub params: MaterialParams,
}

/// Sink that keeps every asset in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub textures: Vec<(String, PaletteTexture)>,
    pub materials: Vec<(String, MaterialTemplate)>,
    pub instances: Vec<MaterialInstance>,
    pub static_meshes: Vec<StaticMeshAsset>,
    pub voxels: Vec<VoxelAsset>,
    reject_textures: bool,
    next_material: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose texture creation always fails
    pub fn rejecting_textures() -> Self {
        Self {
            reject_textures: true,
            ..Self::default()
        }
    }

    fn next_material_handle(&mut self) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material);
        self.next_material += 1;
        handle
    }
}

impl AssetSink for MemorySink {
    fn create_palette_texture(
        &mut self,
        name: &str,
        texture: &PaletteTexture,
    ) -> Result<TextureHandle, SinkError> {
        if self.reject_textures {
            return Err(SinkError::Rejected {
                asset: name.to_string(),
                reason: "textures disabled".to_string(),
            });
        }
        self.textures.push((name.to_string(), texture.clone()));
        Ok(TextureHandle(self.textures.len() - 1))
    }

    fn create_material(
        &mut self,
        name: &str,
        template: &MaterialTemplate,
    ) -> Result<MaterialHandle, SinkError> {
        self.materials.push((name.to_string(), *template));
        Ok(self.next_material_handle())
    }

    fn create_material_instance(
        &mut self,
        parent: MaterialHandle,
        color: u8,
        params: &MaterialParams,
    ) -> Result<MaterialHandle, SinkError> {
        let handle = self.next_material_handle();
        self.instances.push(MaterialInstance {
            handle,
            parent,
            color,
            params: *params,
        });
        Ok(handle)
    }

    fn find_material_instance(&self, color: u8) -> Option<MaterialHandle> {
        self.instances
            .iter()
            .rev()
            .find(|i| i.color == color)
            .map(|i| i.handle)
    }

    fn create_static_mesh(&mut self, asset: StaticMeshAsset) -> Result<(), SinkError> {
        self.static_meshes.push(asset);
        Ok(())
    }

    fn create_voxel(&mut self, asset: VoxelAsset) -> Result<(), SinkError> {
        self.voxels.push(asset);
        Ok(())
    }
}
