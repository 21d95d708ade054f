//! Parsed `.vox` document: models, palette and materials.

use std::collections::{BTreeSet, HashMap};

use glam::{IVec3, UVec3};

use crate::material::VoxMaterial;
use crate::palette::{Palette, Rgba, PALETTE_SIZE};

/// Sparse voxel model: occupied cell -> palette index (never 0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxModel {
    voxels: HashMap<IVec3, u8>,
}

impl VoxModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a cell. Colour 0 means empty and clears the cell instead.
    pub fn insert(&mut self, pos: IVec3, color: u8) {
        if color == 0 {
            self.voxels.remove(&pos);
        } else {
            self.voxels.insert(pos, color);
        }
    }

    #[inline]
    pub fn get(&self, pos: IVec3) -> Option<u8> {
        self.voxels.get(&pos).copied()
    }

    #[inline]
    pub fn contains(&self, pos: IVec3) -> bool {
        self.voxels.contains_key(&pos)
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Cells in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (IVec3, u8)> + '_ {
        self.voxels.iter().map(|(&pos, &color)| (pos, color))
    }

    /// Cells ordered by (z, y, x)
    pub fn sorted_cells(&self) -> Vec<(IVec3, u8)> {
        let mut cells: Vec<_> = self.iter().collect();
        cells.sort_unstable_by_key(|(p, _)| (p.z, p.y, p.x));
        cells
    }

    /// Distinct palette indices used, ascending
    pub fn unique_colors(&self) -> Vec<u8> {
        let set: BTreeSet<u8> = self.voxels.values().copied().collect();
        set.into_iter().collect()
    }

    /// Inclusive min/max corners of the occupied cells
    pub fn bounds(&self) -> Option<(IVec3, IVec3)> {
        let mut iter = self.voxels.keys();
        let first = *iter.next()?;
        Some(iter.fold((first, first), |(min, max), &p| (min.min(p), max.max(p))))
    }
}

impl FromIterator<(IVec3, u8)> for VoxModel {
    fn from_iter<T: IntoIterator<Item = (IVec3, u8)>>(iter: T) -> Self {
        let mut model = VoxModel::new();
        for (pos, color) in iter {
            model.insert(pos, color);
        }
        model
    }
}

/// Everything read from one `.vox` file.
///
/// `sizes[i]` is the extent of `models[i]`; the two always have the same
/// length.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxDocument {
    pub version: u32,
    sizes: Vec<UVec3>,
    models: Vec<VoxModel>,
    pub palette: Palette,
    materials: Vec<VoxMaterial>,
    /// Model count from a PACK chunk, if the file had one
    pub declared_model_count: Option<u32>,
}

impl Default for VoxDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxDocument {
    /// Empty document with the default palette and default materials
    pub fn new() -> Self {
        Self {
            version: crate::io::vox::constants::VERSION,
            sizes: Vec::new(),
            models: Vec::new(),
            palette: Palette::default(),
            materials: vec![VoxMaterial::default(); PALETTE_SIZE],
            declared_model_count: None,
        }
    }

    /// Append a model with its extent
    pub fn push_model(&mut self, extent: UVec3, model: VoxModel) {
        self.sizes.push(extent);
        self.models.push(model);
    }

    pub fn model(&self, index: usize) -> Option<(&VoxModel, UVec3)> {
        Some((self.models.get(index)?, self.sizes[index]))
    }

    pub fn models(&self) -> impl Iterator<Item = (&VoxModel, UVec3)> + '_ {
        self.models.iter().zip(self.sizes.iter().copied())
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn sizes(&self) -> &[UVec3] {
        &self.sizes
    }

    /// Distinct palette indices used by any model, ascending
    pub fn unique_colors(&self) -> Vec<u8> {
        let set: BTreeSet<u8> = self
            .models
            .iter()
            .flat_map(|m| m.voxels.values().copied())
            .collect();
        set.into_iter().collect()
    }

    /// Component-wise maximum of all extents
    pub fn biggest_extent(&self) -> UVec3 {
        self.sizes.iter().fold(UVec3::ZERO, |acc, &s| acc.max(s))
    }

    /// All models overlaid in file order; later models win on shared cells.
    pub fn merged_model(&self) -> VoxModel {
        let mut merged = VoxModel::new();
        for model in &self.models {
            merged.voxels.extend(model.voxels.iter().map(|(&p, &c)| (p, c)));
        }
        merged
    }

    pub fn color(&self, index: u8) -> Rgba {
        self.palette.get(index)
    }

    pub fn material(&self, index: u8) -> &VoxMaterial {
        &self.materials[index as usize]
    }

    pub fn material_mut(&mut self, index: u8) -> &mut VoxMaterial {
        &mut self.materials[index as usize]
    }

    pub fn set_material(&mut self, index: u8, material: VoxMaterial) {
        self.materials[index as usize] = material;
    }

    pub fn materials(&self) -> &[VoxMaterial] {
        &self.materials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(cells: &[(i32, i32, i32, u8)]) -> VoxModel {
        cells
            .iter()
            .map(|&(x, y, z, c)| (IVec3::new(x, y, z), c))
            .collect()
    }

    #[test]
    fn test_color_zero_is_not_stored() {
        let m = model(&[(0, 0, 0, 0), (1, 0, 0, 3)]);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get(IVec3::new(0, 0, 0)), None);
        assert_eq!(m.get(IVec3::new(1, 0, 0)), Some(3));
    }

    #[test]
    fn test_sorted_cells_order() {
        let m = model(&[(1, 0, 1, 1), (0, 1, 0, 2), (1, 0, 0, 3), (0, 0, 1, 4)]);
        let order: Vec<u8> = m.sorted_cells().into_iter().map(|(_, c)| c).collect();
        assert_eq!(order, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_unique_colors_sorted_and_deduplicated() {
        let m = model(&[(0, 0, 0, 9), (1, 0, 0, 2), (2, 0, 0, 9)]);
        assert_eq!(m.unique_colors(), vec![2, 9]);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(VoxModel::new().bounds(), None);
        let m = model(&[(3, 0, 1, 1), (0, 2, 0, 1)]);
        assert_eq!(m.bounds(), Some((IVec3::new(0, 0, 0), IVec3::new(3, 2, 1))));
    }

    #[test]
    fn test_document_queries() {
        let mut doc = VoxDocument::new();
        doc.push_model(UVec3::new(4, 1, 2), model(&[(0, 0, 0, 5), (1, 0, 0, 7)]));
        doc.push_model(UVec3::new(2, 3, 1), model(&[(0, 0, 0, 6), (1, 0, 0, 5)]));

        assert_eq!(doc.model_count(), 2);
        assert_eq!(doc.biggest_extent(), UVec3::new(4, 3, 2));
        assert_eq!(doc.unique_colors(), vec![5, 6, 7]);

        let merged = doc.merged_model();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(IVec3::ZERO), Some(6));
        assert_eq!(merged.get(IVec3::new(1, 0, 0)), Some(5));
    }

    #[test]
    fn test_materials_index_aligned_with_palette() {
        let doc = VoxDocument::new();
        assert_eq!(doc.materials().len(), PALETTE_SIZE);
        assert!(doc.material(255).is_default());
    }
}
