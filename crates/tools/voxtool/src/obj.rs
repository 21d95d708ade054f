//! Wavefront OBJ export
//!
//! Faces are grouped with a `usemtl` line whenever the palette index changes.
//! The caller names the material of each colour; [`material_name`] is the
//! plain per-colour name.

use std::io::{self, Write};

use vox::mesh::IndexFormat;
use vox::MeshBuffer;

/// Material name used for faces of a palette index
pub fn material_name(color: u8) -> String {
    format!("color_{}", color)
}

pub fn write_obj<W: Write>(
    mesh: &MeshBuffer,
    name: &str,
    material_for: impl Fn(u8) -> String,
    out: &mut W,
) -> io::Result<()> {
    writeln!(out, "# {} quads, {} vertices", mesh.quad_count(), mesh.vertex_count())?;
    writeln!(out, "o {}", name)?;

    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for uv in &mesh.uvs {
        writeln!(out, "vt {} {}", uv[0], uv[1])?;
    }
    for n in &mesh.normals {
        writeln!(out, "vn {} {} {}", n[0], n[1], n[2])?;
    }

    let per_quad = match mesh.index_format {
        IndexFormat::Quads => 4,
        IndexFormat::Triangles => 6,
    };
    let face_size = match mesh.index_format {
        IndexFormat::Quads => 4,
        IndexFormat::Triangles => 3,
    };

    let mut current: Option<String> = None;
    for (quad, indices) in mesh.indices.chunks_exact(per_quad).enumerate() {
        let material = material_for(mesh.face_colors[quad]);
        if current.as_ref() != Some(&material) {
            writeln!(out, "usemtl {}", material)?;
            current = Some(material);
        }
        for face in indices.chunks_exact(face_size) {
            write!(out, "f")?;
            for &i in face {
                // OBJ indices are 1-based
                let i = i + 1;
                write!(out, " {}/{}/{}", i, i, i)?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}
