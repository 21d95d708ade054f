//! Import pipeline: document -> meshes, materials and voxel assets
//!
//! The importer never persists anything itself. Every created object is
//! handed to an [`AssetSink`], which owns naming on disk, databases or GPU
//! resources.

mod importer;
mod sink;
mod voxel;

pub use importer::Importer;
pub use sink::{
    AssetSink, MaterialHandle, MaterialInstance, MaterialTemplate, MemorySink, MeshMaterial,
    SinkError, StaticMeshAsset, TextureHandle, VoxelAsset,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::vox::FormatError;
use crate::mesh::{IndexFormat, MeshMode, MeshOptions, UpAxis};

/// What kind of asset an import produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    /// Surface meshes of the models
    #[default]
    StaticMesh,
    /// One cube mesh per colour plus a cell map
    Voxel,
}

/// Import settings, usually loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub import_type: ImportType,
    pub mesh_mode: MeshMode,
    pub x_forward: bool,
    pub xy_center: bool,
    pub import_material: bool,
    /// A single palette-texture material instead of one instance per colour
    pub one_material: bool,
    pub palette_to_texture: bool,
    /// One asset per model instead of all models merged
    pub separate_models: bool,
    pub scale: f32,
    pub index_format: IndexFormat,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            import_type: ImportType::StaticMesh,
            mesh_mode: MeshMode::Optimized,
            x_forward: false,
            xy_center: true,
            import_material: true,
            one_material: false,
            palette_to_texture: true,
            separate_models: false,
            scale: 1.0,
            index_format: IndexFormat::Triangles,
        }
    }
}

impl ImportOptions {
    pub fn mesh_options(&self) -> MeshOptions {
        MeshOptions {
            cell_size: self.scale,
            x_forward: self.x_forward,
            xy_center: self.xy_center,
            up_axis: UpAxis::Y,
            index_format: self.index_format,
        }
    }
}

/// Problems that do not stop an import
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportWarning {
    #[error("No material instance found for colour {color}")]
    MissingMaterialInstance { color: u8 },

    #[error("Palette texture could not be created: {reason}")]
    PaletteTexture { reason: String },

    #[error("Skipped empty model {}", model_label(.model_id))]
    EmptyModel { model_id: Option<usize> },
}

fn model_label(model_id: &Option<usize>) -> String {
    match model_id {
        Some(id) => id.to_string(),
        None => "(merged)".to_string(),
    }
}

/// Import errors
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Asset sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("Document has no voxels to import")]
    NoMeshableModels,
}

/// Summary of a finished import
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub static_meshes: usize,
    pub voxels: usize,
    pub materials: usize,
    pub material_instances: usize,
    pub warnings: Vec<ImportWarning>,
}

impl ImportReport {
    pub(crate) fn warn(&mut self, warning: ImportWarning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ImportOptions::default();
        assert_eq!(options.mesh_mode, MeshMode::Optimized);
        assert!(options.xy_center && options.import_material && options.palette_to_texture);
        assert!(!options.one_material && !options.separate_models);
        assert_eq!(options.scale, 1.0);
    }

    #[test]
    fn test_partial_toml() {
        let options: ImportOptions = toml::from_str(
            r#"
            import_type = "voxel"
            mesh_mode = "naive"
            scale = 10.0
            "#,
        )
        .unwrap();
        assert_eq!(options.import_type, ImportType::Voxel);
        assert_eq!(options.mesh_mode, MeshMode::Naive);
        assert_eq!(options.mesh_options().cell_size, 10.0);
        assert!(options.import_material);
    }

    #[test]
    fn test_warning_messages() {
        assert_eq!(
            ImportWarning::EmptyModel { model_id: Some(2) }.to_string(),
            "Skipped empty model 2"
        );
        assert_eq!(
            ImportWarning::EmptyModel { model_id: None }.to_string(),
            "Skipped empty model (merged)"
        );
    }
}
