//! MagicaVoxel `.vox` import and voxel meshing.
//!
//! The crate is split along the data flow:
//!
//! - [`io::vox`] reads the chunked container into a [`VoxDocument`]
//!   (and writes it back out)
//! - [`mesh`] turns one sparse voxel model into quads, either one per exposed
//!   face or greedily merged
//! - [`import`] drives both for a whole document and hands the results to an
//!   external [`import::AssetSink`]
//!
//! ```
//! use vox::io::vox::{parse_vox, serialize_vox};
//! use vox::mesh::{build_mesh, MeshMode, MeshOptions};
//! use vox::{glam::{IVec3, UVec3}, VoxDocument, VoxModel};
//!
//! let mut doc = VoxDocument::new();
//! let model: VoxModel = [(IVec3::new(0, 0, 0), 7), (IVec3::new(1, 0, 0), 7)]
//!     .into_iter()
//!     .collect();
//! doc.push_model(UVec3::new(2, 1, 1), model);
//!
//! let parsed = parse_vox(&serialize_vox(&doc).unwrap()).unwrap();
//! let (model, extent) = parsed.model(0).unwrap();
//! let mesh = build_mesh(model, extent, MeshMode::Optimized, &MeshOptions::default()).unwrap();
//! assert_eq!(mesh.quad_count(), 6);
//! ```

mod document;
pub mod import;
pub mod io;
mod material;
pub mod mesh;
mod palette;

pub use document::{VoxDocument, VoxModel};
pub use io::vox::{parse_vox, serialize_vox, FormatError};
pub use material::{BlendMode, EmissionParams, MaterialParams, MaterialType, VoxMaterial};
pub use mesh::{build_mesh, EmptyModelError, MeshBuffer, MeshBuilder, MeshMode, MeshOptions};
pub use palette::{default_palette, Palette, PaletteTexture, Rgba, PALETTE_SIZE};

// Re-export glam for convenience
pub use glam;
