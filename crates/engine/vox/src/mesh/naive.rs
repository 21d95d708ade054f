use super::{Face, MeshBuilder, QuadEmitter};
use crate::document::VoxModel;

/// One quad per cell face whose neighbour is empty. Cells are visited in
/// `(z, y, x)` order so the output is reproducible.
pub(super) fn mesh<B: MeshBuilder>(model: &VoxModel, emitter: &mut QuadEmitter<'_, B>) {
    for (pos, color) in model.sorted_cells() {
        for face in Face::iter() {
            if !model.contains(pos + face.offset()) {
                emitter.emit_cell(face, pos, color);
            }
        }
    }
}
