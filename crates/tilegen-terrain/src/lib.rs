//! Procedural terrain data for a single map tile: fractal-noise height fields,
//! height remap curves, region classification, and preview textures.

mod curve;
mod height_field;
mod noise_field;
mod region;
mod seed;
mod texture;

pub use curve::{CurveKey, HeightCurve};
pub use height_field::{HeightField, MAP_CHUNK_SIZE};
pub use noise_field::{
    FractalSampler, GradientNoise, MIN_NOISE_SCALE, NoiseParams, clamp_count,
    generate_height_field,
};
pub use region::{RegionMap, RegionTable, RegionTableError, Rgba, TerrainRegion, classify};
pub use seed::{OCTAVE_OFFSET_RANGE, noise_rng, octave_offsets};
pub use texture::{Texture, texture_from_color_map, texture_from_height_map};
