use std::borrow::Cow;

use glam::UVec3;
use rayon::prelude::*;
use tracing::{debug, info};

use super::sink::{AssetSink, MaterialHandle, MaterialTemplate, MeshMaterial, StaticMeshAsset};
use super::voxel::build_voxel_asset;
use super::{ImportError, ImportOptions, ImportReport, ImportType, ImportWarning};
use crate::document::{VoxDocument, VoxModel};
use crate::io::vox::parse_vox;
use crate::material::MaterialParams;
use crate::mesh::{build_mesh, MeshBuffer};
use crate::palette::PaletteTexture;

/// How faces get their material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MaterialPlan {
    None,
    /// One palette-texture material for everything
    Single(MaterialHandle),
    /// One instance per colour, looked up through the sink
    PerColor,
}

/// A model (or the merged document) queued for asset creation
pub(super) struct ImportJob<'a> {
    pub model_id: Option<usize>,
    pub model: Cow<'a, VoxModel>,
    pub extent: UVec3,
}

/// Drives a full import of one document into an [`AssetSink`].
#[derive(Debug, Clone)]
pub struct Importer {
    name: String,
    options: ImportOptions,
}

impl Importer {
    /// `name` is the base name for every created asset
    pub fn new(name: impl Into<String>, options: ImportOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Parse `bytes` and import the result
    pub fn import_bytes<S: AssetSink>(
        &self,
        bytes: &[u8],
        sink: &mut S,
    ) -> Result<ImportReport, ImportError> {
        let document = parse_vox(bytes)?;
        self.import(&document, sink)
    }

    pub fn import<S: AssetSink>(
        &self,
        document: &VoxDocument,
        sink: &mut S,
    ) -> Result<ImportReport, ImportError> {
        info!(
            "Importing {} ({} models, {:?})",
            self.name,
            document.model_count(),
            self.options.import_type
        );

        let mut report = ImportReport::default();
        let plan = self.prepare_materials(document, sink, &mut report)?;
        let jobs = self.jobs(document);

        match self.options.import_type {
            ImportType::StaticMesh => {
                self.import_static_meshes(document, &jobs, plan, sink, &mut report)?
            }
            ImportType::Voxel => {
                for job in &jobs {
                    if job.model.is_empty() {
                        report.warn(ImportWarning::EmptyModel {
                            model_id: job.model_id,
                        });
                        continue;
                    }
                    let asset =
                        build_voxel_asset(&self.name, job, &self.options, plan, &*sink, &mut report);
                    sink.create_voxel(asset)?;
                    report.voxels += 1;
                }
            }
        }

        if report.static_meshes == 0 && report.voxels == 0 {
            return Err(ImportError::NoMeshableModels);
        }

        info!(
            "Imported {}: {} meshes, {} voxel assets, {} warnings",
            self.name,
            report.static_meshes,
            report.voxels,
            report.warnings.len()
        );
        Ok(report)
    }

    fn jobs<'a>(&self, document: &'a VoxDocument) -> Vec<ImportJob<'a>> {
        if self.options.separate_models {
            document
                .models()
                .enumerate()
                .map(|(id, (model, extent))| ImportJob {
                    model_id: Some(id),
                    model: Cow::Borrowed(model),
                    extent,
                })
                .collect()
        } else if document.model_count() == 0 {
            Vec::new()
        } else {
            vec![ImportJob {
                model_id: None,
                model: Cow::Owned(document.merged_model()),
                extent: document.biggest_extent(),
            }]
        }
    }

    /// Create the palette texture and materials the chosen plan needs.
    ///
    /// A failed texture is not fatal: the materials fall back to per-colour
    /// parameters.
    fn prepare_materials<S: AssetSink>(
        &self,
        document: &VoxDocument,
        sink: &mut S,
        report: &mut ImportReport,
    ) -> Result<MaterialPlan, ImportError> {
        let options = &self.options;
        if !options.import_material {
            return Ok(MaterialPlan::None);
        }

        let texture = if options.one_material || options.palette_to_texture {
            let palette = PaletteTexture::from_palette(&document.palette);
            match sink.create_palette_texture(&format!("{}_palette", self.name), &palette) {
                Ok(handle) => Some(handle),
                Err(e) => {
                    report.warn(ImportWarning::PaletteTexture {
                        reason: e.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        let material_name = format!("{}_material", self.name);
        if options.one_material && texture.is_some() {
            let template = MaterialTemplate {
                palette_texture: texture,
                parameterized: false,
            };
            let handle = sink.create_material(&material_name, &template)?;
            report.materials += 1;
            return Ok(MaterialPlan::Single(handle));
        }

        let template = MaterialTemplate {
            palette_texture: texture,
            parameterized: true,
        };
        let parent = sink.create_material(&material_name, &template)?;
        report.materials += 1;

        for color in document.unique_colors() {
            let params = MaterialParams::from_material(
                document.color(color),
                document.material(color),
                texture.is_some(),
            );
            sink.create_material_instance(parent, color, &params)?;
            report.material_instances += 1;
        }
        debug!(
            "Created {} material instances under {}",
            report.material_instances, material_name
        );

        Ok(MaterialPlan::PerColor)
    }

    fn import_static_meshes<S: AssetSink>(
        &self,
        document: &VoxDocument,
        jobs: &[ImportJob<'_>],
        plan: MaterialPlan,
        sink: &mut S,
        report: &mut ImportReport,
    ) -> Result<(), ImportError> {
        let mesh_options = self.options.mesh_options();
        let mode = self.options.mesh_mode;

        let meshes: Vec<Option<MeshBuffer>> = jobs
            .par_iter()
            .map(|job| build_mesh(&job.model, job.extent, mode, &mesh_options).ok())
            .collect();

        for (job, mesh) in jobs.iter().zip(meshes) {
            let Some(mesh) = mesh else {
                report.warn(ImportWarning::EmptyModel {
                    model_id: job.model_id,
                });
                continue;
            };

            let materials = match plan {
                MaterialPlan::None => Vec::new(),
                MaterialPlan::Single(material) => vec![MeshMaterial {
                    color: None,
                    material,
                }],
                MaterialPlan::PerColor => {
                    // A merged mesh takes a slot for every colour in the document
                    let colors = match job.model_id {
                        Some(_) => job.model.unique_colors(),
                        None => document.unique_colors(),
                    };
                    resolve_instances(&colors, &*sink, report)
                        .into_iter()
                        .filter_map(|(color, material)| {
                            material.map(|material| MeshMaterial {
                                color: Some(color),
                                material,
                            })
                        })
                        .collect()
                }
            };

            let name = match job.model_id {
                Some(id) => format!("{}_{}", self.name, id),
                None => self.name.clone(),
            };
            debug!(
                "Mesh {}: {} quads, {} material slots",
                name,
                mesh.quad_count(),
                materials.len()
            );

            sink.create_static_mesh(StaticMeshAsset {
                name,
                model_id: job.model_id,
                mesh,
                materials,
            })?;
            report.static_meshes += 1;
        }

        Ok(())
    }
}

/// Look up the instance of each colour, warning about any that are missing
pub(super) fn resolve_instances<S: AssetSink + ?Sized>(
    colors: &[u8],
    sink: &S,
    report: &mut ImportReport,
) -> Vec<(u8, Option<MaterialHandle>)> {
    colors
        .iter()
        .map(|&color| {
            let found = sink.find_material_instance(color);
            if found.is_none() {
                report.warn(ImportWarning::MissingMaterialInstance { color });
            }
            (color, found)
        })
        .collect()
}
