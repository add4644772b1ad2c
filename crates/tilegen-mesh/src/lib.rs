//! Terrain meshing: level-of-detail selection and height field triangulation.

pub mod lod;
pub mod terrain_mesh;

pub use lod::LevelOfDetail;
pub use terrain_mesh::{MeshBuffers, MeshSettings, build_terrain_mesh, build_with_settings};
