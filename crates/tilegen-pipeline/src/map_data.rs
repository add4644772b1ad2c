//! Height-stage payload: the height field and its region classification.

use std::sync::Arc;

use tilegen_terrain::{
    HeightField, MAP_CHUNK_SIZE, NoiseParams, RegionMap, RegionTable, Rgba, classify,
    generate_height_field,
};

/// Result of a height request.
///
/// Cheap to clone; the grids are shared, never copied, when the tile moves on
/// to the mesh stage.
#[derive(Clone, Debug, PartialEq)]
pub struct MapData {
    /// Normalized heights for the tile.
    pub height_field: Arc<HeightField>,
    /// Region index per cell.
    pub region_map: Arc<RegionMap>,
    /// Region color per cell, [`Rgba::UNSET`] where no region matched.
    pub color_map: Arc<[Rgba]>,
}

impl MapData {
    /// Classify `height_field` against `regions` and bundle the results.
    pub fn from_height_field(height_field: HeightField, regions: &RegionTable) -> Self {
        let region_map = classify(&height_field, regions);
        let color_map: Arc<[Rgba]> = region_map.to_colors(regions).into();
        Self {
            height_field: Arc::new(height_field),
            region_map: Arc::new(region_map),
            color_map,
        }
    }
}

/// Synchronously generate one full tile.
pub fn generate_map_data(params: &NoiseParams, regions: &RegionTable) -> MapData {
    let field = generate_height_field(MAP_CHUNK_SIZE, MAP_CHUNK_SIZE, params);
    MapData::from_height_field(field, regions)
}
