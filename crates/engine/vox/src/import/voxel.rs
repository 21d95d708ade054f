use std::collections::HashMap;

use super::importer::{resolve_instances, ImportJob, MaterialPlan};
use super::sink::{AssetSink, VoxelAsset};
use super::{ImportOptions, ImportReport};
use crate::mesh::{unit_cell_mesh, MeshBuffer};

/// Build the per-voxel-type asset of one job.
///
/// The palette is the job's used colours; cells are re-indexed into it, so a
/// colour shared by several merged models ends up as a single entry.
pub(super) fn build_voxel_asset<S: AssetSink + ?Sized>(
    base_name: &str,
    job: &ImportJob<'_>,
    options: &ImportOptions,
    plan: MaterialPlan,
    sink: &S,
    report: &mut ImportReport,
) -> VoxelAsset {
    let mesh_options = options.mesh_options();
    let palette = job.model.unique_colors();

    let meshes: Vec<MeshBuffer> = palette
        .iter()
        .map(|&color| unit_cell_mesh(color, &mesh_options))
        .collect();

    let materials = match plan {
        MaterialPlan::None => vec![None; palette.len()],
        MaterialPlan::Single(handle) => vec![Some(handle); palette.len()],
        MaterialPlan::PerColor => resolve_instances(&palette, sink, report)
            .into_iter()
            .map(|(_, handle)| handle)
            .collect(),
    };

    let slot_of: HashMap<u8, u8> = palette
        .iter()
        .enumerate()
        .map(|(slot, &color)| (color, slot as u8))
        .collect();
    let cells = job
        .model
        .iter()
        .filter_map(|(pos, color)| slot_of.get(&color).map(|&slot| (pos, slot)))
        .collect();

    let cell_bounds = meshes
        .iter()
        .filter_map(MeshBuffer::bounds)
        .reduce(|(a_min, a_max), (b_min, b_max)| (a_min.min(b_min), a_max.max(b_max)));

    let name = match job.model_id {
        Some(id) => format!("{}_{}", base_name, id),
        None => base_name.to_string(),
    };

    VoxelAsset {
        name,
        model_id: job.model_id,
        extent: job.extent,
        xy_center: options.xy_center,
        palette,
        meshes,
        materials,
        cells,
        cell_bounds,
    }
}
