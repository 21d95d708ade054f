use glam::{IVec3, Vec3};

/// Face direction for cube faces, in MagicaVoxel's Z-up grid space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Right,  // +X
    Left,   // -X
    Back,   // +Y
    Front,  // -Y
    Top,    // +Z
    Bottom, // -Z
}

impl Face {
    /// All six faces in meshing order
    pub const ALL: [Face; 6] = [
        Face::Right,
        Face::Left,
        Face::Back,
        Face::Front,
        Face::Top,
        Face::Bottom,
    ];

    /// Index of the axis this face is perpendicular to (0 = X, 1 = Y, 2 = Z)
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Face::Right | Face::Left => 0,
            Face::Back | Face::Front => 1,
            Face::Top | Face::Bottom => 2,
        }
    }

    /// Whether the face points along the positive axis
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(self, Face::Right | Face::Back | Face::Top)
    }

    /// The two in-plane axes `(u, v)`, ordered so that `u x v` points along
    /// the positive face axis
    #[inline]
    pub fn plane_axes(self) -> (usize, usize) {
        let d = self.axis();
        ((d + 1) % 3, (d + 2) % 3)
    }

    /// Offset to the neighbour cell this face looks at
    #[inline]
    pub fn offset(self) -> IVec3 {
        let sign = if self.is_positive() { 1 } else { -1 };
        let mut offset = IVec3::ZERO;
        offset[self.axis()] = sign;
        offset
    }

    /// Outward normal in grid space
    #[inline]
    pub fn normal(self) -> Vec3 {
        self.offset().as_vec3()
    }

    /// Corners of the rectangle `[u0, u1] x [v0, v1]` on the plane
    /// `axis = plane`, counter-clockwise when viewed from outside.
    pub fn corners(self, plane: f32, u: (f32, f32), v: (f32, f32)) -> [Vec3; 4] {
        let (ua, va) = self.plane_axes();
        let corner = |a: f32, b: f32| {
            let mut p = Vec3::ZERO;
            p[self.axis()] = plane;
            p[ua] = a;
            p[va] = b;
            p
        };

        let ((u0, u1), (v0, v1)) = (u, v);
        if self.is_positive() {
            [corner(u0, v0), corner(u1, v0), corner(u1, v1), corner(u0, v1)]
        } else {
            [corner(u0, v0), corner(u0, v1), corner(u1, v1), corner(u1, v0)]
        }
    }

    /// Iterator over all faces
    #[inline]
    pub fn iter() -> impl Iterator<Item = Face> {
        Self::ALL.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_are_unit_and_opposed() {
        for pair in Face::ALL.chunks(2) {
            assert_eq!(pair[0].offset(), -pair[1].offset());
            assert_eq!(pair[0].axis(), pair[1].axis());
        }
        assert_eq!(Face::Top.offset(), IVec3::Z);
        assert_eq!(Face::Front.offset(), -IVec3::Y);
    }

    #[test]
    fn test_corners_wind_outward() {
        for face in Face::iter() {
            let c = face.corners(1.0, (0.0, 1.0), (0.0, 1.0));
            let n = (c[1] - c[0]).cross(c[2] - c[0]).normalize();
            assert!(
                (n - face.normal()).length() < 1e-6,
                "{:?} winds towards {:?}",
                face,
                n
            );
        }
    }
}
