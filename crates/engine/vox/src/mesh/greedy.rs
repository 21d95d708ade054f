//! Greedy meshing
//!
//! For each face orientation the occupied bounding box is swept one slice at
//! a time along the face axis. A slice mask records, per cell, the colour of
//! the face that must be drawn there (or nothing). Rectangles are then grown
//! from the first unclaimed mask cell in row-major order: width first along
//! `u`, then height along `v` while the whole row still matches.

use glam::IVec3;

use super::{Face, MeshBuilder, QuadEmitter};
use crate::document::VoxModel;

pub(super) fn mesh<B: MeshBuilder>(model: &VoxModel, emitter: &mut QuadEmitter<'_, B>) {
    let Some((min, max)) = model.bounds() else {
        return;
    };

    for face in Face::iter() {
        let d = face.axis();
        let (u, v) = face.plane_axes();
        let width = (max[u] - min[u] + 1) as usize;
        let height = (max[v] - min[v] + 1) as usize;

        let mut mask: Vec<Option<u8>> = vec![None; width * height];
        let mut claimed = vec![false; width * height];

        for layer in min[d]..=max[d] {
            fill_mask(model, face, layer, min, (width, height), &mut mask);
            claimed.fill(false);

            for j in 0..height {
                for i in 0..width {
                    let start = j * width + i;
                    if claimed[start] {
                        continue;
                    }
                    let Some(color) = mask[start] else {
                        continue;
                    };
                    let open = |idx: usize| !claimed[idx] && mask[idx] == Some(color);

                    let mut w = 1;
                    while i + w < width && open(start + w) {
                        w += 1;
                    }

                    let mut h = 1;
                    while j + h < height && (0..w).all(|k| open((j + h) * width + i + k)) {
                        h += 1;
                    }

                    for row in j..j + h {
                        claimed[row * width + i..row * width + i + w].fill(true);
                    }

                    let u0 = min[u] + i as i32;
                    let v0 = min[v] + j as i32;
                    emitter.emit(
                        face,
                        layer,
                        (u0, u0 + w as i32),
                        (v0, v0 + h as i32),
                        color,
                    );
                }
            }
        }
    }
}

/// Colour of the exposed `face` of every cell on one slice.
fn fill_mask(
    model: &VoxModel,
    face: Face,
    layer: i32,
    min: IVec3,
    (width, height): (usize, usize),
    mask: &mut [Option<u8>],
) {
    let (u, v) = face.plane_axes();
    let mut pos = IVec3::ZERO;
    pos[face.axis()] = layer;

    for j in 0..height {
        pos[v] = min[v] + j as i32;
        for i in 0..width {
            pos[u] = min[u] + i as i32;
            mask[j * width + i] = model
                .get(pos)
                .filter(|_| !model.contains(pos + face.offset()));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::mesh::{build_mesh, MeshMode, MeshOptions};
    use crate::VoxModel;
    use glam::{IVec3, UVec3};

    fn slab(w: i32, h: i32, color: impl Fn(i32, i32) -> u8) -> VoxModel {
        (0..w)
            .flat_map(|x| (0..h).map(move |y| (x, y)))
            .map(|(x, y)| (IVec3::new(x, y, 0), color(x, y)))
            .collect()
    }

    fn optimized_quads(model: &VoxModel) -> usize {
        build_mesh(model, UVec3::new(8, 8, 1), MeshMode::Optimized, &MeshOptions::default())
            .unwrap()
            .quad_count()
    }

    #[test]
    fn test_solid_slab_is_a_box() {
        assert_eq!(optimized_quads(&slab(5, 3, |_, _| 1)), 6);
    }

    #[test]
    fn test_colours_split_faces() {
        // Two colour stripes along y: top and bottom each split in two,
        // the +/-X sides stay whole, the +/-Y sides split in two
        let model = slab(4, 2, |x, _| if x < 2 { 1 } else { 2 });
        assert_eq!(optimized_quads(&model), 10);
    }

    #[test]
    fn test_width_grows_before_height() {
        // L-shape on one layer: the bottom row spans 3, the column above
        // the first cell is a separate rectangle
        let model: VoxModel = [(0, 0), (1, 0), (2, 0), (0, 1)]
            .into_iter()
            .map(|(x, y)| (IVec3::new(x, y, 0), 1))
            .collect();
        let mesh = build_mesh(
            &model,
            UVec3::new(3, 2, 1),
            MeshMode::Optimized,
            &MeshOptions {
                xy_center: false,
                up_axis: crate::mesh::UpAxis::Z,
                ..Default::default()
            },
        )
        .unwrap();

        // First +Z rectangle covers the full bottom row
        let top: Vec<usize> = (0..mesh.quad_count())
            .filter(|&q| mesh.normals[q * 4] == [0.0, 0.0, 1.0])
            .collect();
        assert_eq!(top.len(), 2);
        let first = &mesh.positions[top[0] * 4..top[0] * 4 + 4];
        assert_eq!(first[0], [0.0, 0.0, 1.0]);
        assert_eq!(first[2], [3.0, 1.0, 1.0]);
    }
}
