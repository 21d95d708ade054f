//! Asset sink that writes an import to a directory
//!
//! Layout:
//!
//! ```text
//! <name>_palette.png        palette texture
//! <name>.obj                static mesh (one per model with separate models)
//! <name>.voxel.toml         voxel asset cell map
//! <name>_cube_<color>.obj   voxel asset cube meshes
//! materials.toml            materials and material instances
//! ```
//!
//! OBJ `usemtl` names are the names in `materials.toml` of the material each
//! colour resolved to. Colours without one fall back to `color_<index>`.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;
use vox::import::{
    AssetSink, MaterialHandle, MaterialTemplate, MeshMaterial, SinkError, StaticMeshAsset,
    TextureHandle, VoxelAsset,
};
use vox::{MaterialParams, PaletteTexture};

use crate::obj::{material_name, write_obj};

#[derive(Debug, Serialize)]
struct MaterialEntry {
    id: usize,
    name: String,
    palette_texture: Option<String>,
    parameterized: bool,
}

#[derive(Debug, Serialize)]
struct InstanceEntry {
    id: usize,
    parent: usize,
    name: String,
    color: u8,
    params: MaterialParams,
}

#[derive(Debug, Default, Serialize)]
struct MaterialsFile {
    materials: Vec<MaterialEntry>,
    instances: Vec<InstanceEntry>,
}

#[derive(Debug, Serialize)]
struct VoxelFile<'a> {
    name: &'a str,
    extent: [u32; 3],
    xy_center: bool,
    palette: &'a [u8],
    meshes: Vec<String>,
    /// `[x, y, z, palette slot]`
    cells: Vec<[i32; 4]>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    materials: Vec<SlotMaterial>,
}

#[derive(Debug, Serialize)]
struct SlotMaterial {
    slot: usize,
    material: String,
}

pub struct DirectorySink {
    dir: PathBuf,
    textures: Vec<String>,
    file: MaterialsFile,
    next_material: usize,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn create(dir: &Path) -> anyhow::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            textures: Vec::new(),
            file: MaterialsFile::default(),
            next_material: 0,
            written: Vec::new(),
        })
    }

    /// Write `materials.toml` (if any materials were created) and return every
    /// file written.
    pub fn finish(mut self) -> anyhow::Result<Vec<PathBuf>> {
        if !self.file.materials.is_empty() {
            let path = self.dir.join("materials.toml");
            fs::write(&path, toml::to_string_pretty(&self.file)?)?;
            self.written.push(path);
        }
        Ok(self.written)
    }

    fn write_mesh(
        &mut self,
        file_name: &str,
        mesh: &vox::MeshBuffer,
        material_for: impl Fn(u8) -> String,
    ) -> Result<String, SinkError> {
        let path = self.dir.join(file_name);
        let mut out = BufWriter::new(File::create(&path)?);
        write_obj(mesh, file_name.trim_end_matches(".obj"), material_for, &mut out)?;
        debug!("Wrote {}", path.display());
        self.written.push(path);
        Ok(file_name.to_string())
    }

    /// Name of a material or material instance created through this sink
    fn handle_name(&self, handle: MaterialHandle) -> Option<String> {
        let material = self.file.materials.iter().find(|m| m.id == handle.0);
        let instance = self.file.instances.iter().find(|i| i.id == handle.0);
        material
            .map(|m| m.name.clone())
            .or_else(|| instance.map(|i| i.name.clone()))
    }

    /// `usemtl` name per colour for a mesh with the given material slots
    fn mesh_material_names(&self, materials: &[MeshMaterial]) -> impl Fn(u8) -> String {
        let mut by_color = HashMap::new();
        let mut shared = None;
        for slot in materials {
            let Some(name) = self.handle_name(slot.material) else {
                continue;
            };
            match slot.color {
                Some(color) => {
                    by_color.insert(color, name);
                }
                None => shared = Some(name),
            }
        }

        move |color| {
            by_color
                .get(&color)
                .or(shared.as_ref())
                .cloned()
                .unwrap_or_else(|| material_name(color))
        }
    }

    fn next_handle(&mut self) -> MaterialHandle {
        let handle = MaterialHandle(self.next_material);
        self.next_material += 1;
        handle
    }
}

impl AssetSink for DirectorySink {
    fn create_palette_texture(
        &mut self,
        name: &str,
        texture: &PaletteTexture,
    ) -> Result<TextureHandle, SinkError> {
        let file_name = format!("{}.png", name);
        let path = self.dir.join(&file_name);
        texture
            .to_image()
            .save(&path)
            .map_err(|e| SinkError::Rejected {
                asset: file_name.clone(),
                reason: e.to_string(),
            })?;
        self.written.push(path);
        self.textures.push(file_name);
        Ok(TextureHandle(self.textures.len() - 1))
    }

    fn create_material(
        &mut self,
        name: &str,
        template: &MaterialTemplate,
    ) -> Result<MaterialHandle, SinkError> {
        let handle = self.next_handle();
        let palette_texture = template
            .palette_texture
            .and_then(|t| self.textures.get(t.0).cloned());
        self.file.materials.push(MaterialEntry {
            id: handle.0,
            name: name.to_string(),
            palette_texture,
            parameterized: template.parameterized,
        });
        Ok(handle)
    }

    fn create_material_instance(
        &mut self,
        parent: MaterialHandle,
        color: u8,
        params: &MaterialParams,
    ) -> Result<MaterialHandle, SinkError> {
        let handle = self.next_handle();
        self.file.instances.push(InstanceEntry {
            id: handle.0,
            parent: parent.0,
            name: material_name(color),
            color,
            params: *params,
        });
        Ok(handle)
    }

    fn find_material_instance(&self, color: u8) -> Option<MaterialHandle> {
        self.file
            .instances
            .iter()
            .find(|i| i.color == color)
            .map(|i| MaterialHandle(i.id))
    }

    fn create_static_mesh(&mut self, asset: StaticMeshAsset) -> Result<(), SinkError> {
        let names = self.mesh_material_names(&asset.materials);
        self.write_mesh(&format!("{}.obj", asset.name), &asset.mesh, names)?;
        Ok(())
    }

    fn create_voxel(&mut self, asset: VoxelAsset) -> Result<(), SinkError> {
        let mut meshes = Vec::with_capacity(asset.meshes.len());
        let mut materials = Vec::new();
        for (slot, (mesh, &color)) in asset.meshes.iter().zip(&asset.palette).enumerate() {
            let resolved = asset
                .materials
                .get(slot)
                .copied()
                .flatten()
                .and_then(|handle| self.handle_name(handle));
            let name = resolved.clone().unwrap_or_else(|| material_name(color));
            if let Some(material) = resolved {
                materials.push(SlotMaterial { slot, material });
            }

            let file_name = format!("{}_cube_{}.obj", asset.name, color);
            meshes.push(self.write_mesh(&file_name, mesh, move |_| name.clone())?);
        }

        let mut cells: Vec<[i32; 4]> = asset
            .cells
            .iter()
            .map(|(p, &slot)| [p.x, p.y, p.z, slot as i32])
            .collect();
        cells.sort_unstable_by_key(|c| (c[2], c[1], c[0]));

        let file = VoxelFile {
            name: &asset.name,
            extent: asset.extent.to_array(),
            xy_center: asset.xy_center,
            palette: &asset.palette,
            meshes,
            cells,
            materials,
        };
        let text = toml::to_string_pretty(&file).map_err(|e| SinkError::Rejected {
            asset: asset.name.clone(),
            reason: e.to_string(),
        })?;

        let path = self.dir.join(format!("{}.voxel.toml", asset.name));
        fs::write(&path, text)?;
        self.written.push(path);
        Ok(())
    }
}
