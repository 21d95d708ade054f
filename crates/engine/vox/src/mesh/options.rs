use glam::{UVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Which output axis points up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UpAxis {
    /// Y-up output: grid `(x, y, z)` becomes `(x, z, -y)`
    #[default]
    Y,
    /// Keep MagicaVoxel's Z-up space
    Z,
}

/// Index buffer layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexFormat {
    /// Four indices per quad
    Quads,
    /// Six indices per quad, as triangles (0, 1, 2) and (0, 2, 3)
    #[default]
    Triangles,
}

/// Placement of generated geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Edge length of one voxel in output units
    pub cell_size: f32,
    /// Rotate 90 degrees about the vertical axis so grid +X faces forward
    pub x_forward: bool,
    /// Centre the horizontal plane on the model extent
    pub xy_center: bool,
    pub up_axis: UpAxis,
    pub index_format: IndexFormat,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            cell_size: 1.0,
            x_forward: false,
            xy_center: true,
            up_axis: UpAxis::Y,
            index_format: IndexFormat::Triangles,
        }
    }
}

impl MeshOptions {
    /// Grid-space point subtracted before placement
    pub fn origin_for(&self, extent: UVec3) -> Vec3 {
        if self.xy_center {
            let half = extent.as_vec3() * 0.5;
            Vec3::new(half.x, half.y, 0.0)
        } else {
            Vec3::ZERO
        }
    }

    /// Rotate a grid-space direction into output space
    #[inline]
    pub fn orient(&self, v: Vec3) -> Vec3 {
        let v = if self.x_forward {
            Vec3::new(-v.y, v.x, v.z)
        } else {
            v
        };
        match self.up_axis {
            UpAxis::Y => Vec3::new(v.x, v.z, -v.y),
            UpAxis::Z => v,
        }
    }

    /// Map a grid-space point (already relative to the origin) into output
    /// space
    #[inline]
    pub fn place(&self, p: Vec3) -> Vec3 {
        self.orient(p) * self.cell_size
    }
}
