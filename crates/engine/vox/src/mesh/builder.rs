use std::collections::BTreeSet;

use glam::Vec3;

use super::options::IndexFormat;

/// Builder interface for constructing meshes
pub trait MeshBuilder {
    /// Add one quad
    ///
    /// # Arguments
    /// * `vertices` - Four vertices forming a quad (counter-clockwise from outside)
    /// * `normal` - Normal vector for the quad
    /// * `uv` - Palette texture coordinate shared by all four vertices
    /// * `color` - Palette index of the quad, used for material grouping
    fn add_quad(&mut self, vertices: [[f32; 3]; 4], normal: [f32; 3], uv: [f32; 2], color: u8);
}

/// Mesh accumulated into flat vectors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffer {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// One palette index per quad, in emission order
    pub face_colors: Vec<u8>,
    pub index_format: IndexFormat,
}

impl MeshBuffer {
    pub fn new(index_format: IndexFormat) -> Self {
        Self {
            index_format,
            ..Default::default()
        }
    }

    pub fn quad_count(&self) -> usize {
        self.face_colors.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.face_colors.is_empty()
    }

    /// Distinct palette indices of the emitted quads, ascending
    pub fn material_slots(&self) -> Vec<u8> {
        let set: BTreeSet<u8> = self.face_colors.iter().copied().collect();
        set.into_iter().collect()
    }

    /// Axis-aligned bounds of all vertices
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.positions.iter().map(|&p| Vec3::from_array(p));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Vertex indices of quad `index`, always as the four quad corners
    pub fn quad_vertices(&self, index: usize) -> [u32; 4] {
        let base = index as u32 * 4;
        [base, base + 1, base + 2, base + 3]
    }
}

impl MeshBuilder for MeshBuffer {
    fn add_quad(&mut self, vertices: [[f32; 3]; 4], normal: [f32; 3], uv: [f32; 2], color: u8) {
        let base_index = self.positions.len() as u32;

        for vertex in vertices {
            self.positions.push(vertex);
            self.normals.push(normal);
            self.uvs.push(uv);
        }

        match self.index_format {
            IndexFormat::Quads => self.indices.extend_from_slice(&[
                base_index,
                base_index + 1,
                base_index + 2,
                base_index + 3,
            ]),
            // Two triangles (0,1,2) and (0,2,3)
            IndexFormat::Triangles => self.indices.extend_from_slice(&[
                base_index,
                base_index + 1,
                base_index + 2,
                base_index,
                base_index + 2,
                base_index + 3,
            ]),
        }

        self.face_colors.push(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: [[f32; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
    ];

    #[test]
    fn test_triangle_indices() {
        let mut mesh = MeshBuffer::new(IndexFormat::Triangles);
        mesh.add_quad(QUAD, [0.0, 0.0, 1.0], [0.5, 0.5], 3);
        mesh.add_quad(QUAD, [0.0, 0.0, 1.0], [0.5, 0.5], 1);

        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(mesh.material_slots(), vec![1, 3]);
    }

    #[test]
    fn test_quad_indices() {
        let mut mesh = MeshBuffer::new(IndexFormat::Quads);
        mesh.add_quad(QUAD, [0.0, 0.0, 1.0], [0.5, 0.5], 3);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3]);
        assert_eq!(mesh.quad_vertices(0), [0, 1, 2, 3]);
    }

    #[test]
    fn test_bounds() {
        let mut mesh = MeshBuffer::default();
        assert_eq!(mesh.bounds(), None);
        mesh.add_quad(QUAD, [0.0, 0.0, 1.0], [0.5, 0.5], 3);
        assert_eq!(mesh.bounds(), Some((Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0))));
    }
}
