//! Synchronous previews of a single tile, for editors and tools.

use serde::{Deserialize, Serialize};
use tilegen_mesh::{MeshBuffers, MeshSettings, build_with_settings};
use tilegen_terrain::{
    NoiseParams, RegionTable, Texture, texture_from_color_map, texture_from_height_map,
};

use crate::map_data::{MapData, generate_map_data};

/// What a preview shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawMode {
    /// Grayscale height map.
    #[default]
    NoiseMap,
    /// Region colors.
    ColorMap,
    /// Terrain mesh textured with region colors.
    Mesh,
}

/// A finished preview.
#[derive(Clone, Debug)]
pub enum Preview {
    Texture(Texture),
    Mesh { mesh: MeshBuffers, texture: Texture },
}

impl Preview {
    /// The texture shown by this preview.
    pub fn texture(&self) -> &Texture {
        match self {
            Preview::Texture(texture) => texture,
            Preview::Mesh { texture, .. } => texture,
        }
    }

    /// The mesh, if this is a mesh preview.
    pub fn mesh(&self) -> Option<&MeshBuffers> {
        match self {
            Preview::Texture(_) => None,
            Preview::Mesh { mesh, .. } => Some(mesh),
        }
    }
}

/// Render `map_data` in the given mode.
pub fn render_preview(map_data: &MapData, mesh_settings: &MeshSettings, mode: DrawMode) -> Preview {
    let (width, height) = map_data.height_field.dimensions();
    let color_texture =
        || texture_from_color_map(&map_data.color_map, width as u32, height as u32);

    match mode {
        DrawMode::NoiseMap => Preview::Texture(texture_from_height_map(&map_data.height_field)),
        DrawMode::ColorMap => Preview::Texture(color_texture()),
        DrawMode::Mesh => Preview::Mesh {
            mesh: build_with_settings(&map_data.height_field, mesh_settings),
            texture: color_texture(),
        },
    }
}

/// Generate a tile and render it, all on the calling thread.
pub fn draw_preview(
    params: &NoiseParams,
    regions: &RegionTable,
    mesh_settings: &MeshSettings,
    mode: DrawMode,
) -> Preview {
    let map_data = generate_map_data(params, regions);
    render_preview(&map_data, mesh_settings, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_mesh::LevelOfDetail;
    use tilegen_terrain::{HeightField, MAP_CHUNK_SIZE, Rgba};

    fn small_map() -> MapData {
        let values = (0..16).map(|i| i as f32 / 15.0).collect();
        MapData::from_height_field(
            HeightField::from_values(4, 4, values),
            &RegionTable::default_terrain(),
        )
    }

    #[test]
    fn test_noise_map_preview_is_grayscale() {
        let preview = render_preview(&small_map(), &MeshSettings::default(), DrawMode::NoiseMap);
        let texture = preview.texture();
        assert_eq!(texture.dimensions(), (4, 4));
        assert_eq!(texture.pixel(0, 0), Rgba::BLACK);
        assert_eq!(texture.pixel(3, 3), Rgba::WHITE);
        assert!(preview.mesh().is_none());
    }

    #[test]
    fn test_color_map_preview_uses_region_colors() {
        let map = small_map();
        let preview = render_preview(&map, &MeshSettings::default(), DrawMode::ColorMap);
        assert_eq!(preview.texture().pixel(0, 0), map.color_map[0]);
        assert_eq!(preview.texture().pixel(3, 3), Rgba::WHITE);
    }

    #[test]
    fn test_mesh_preview_has_mesh_and_texture() {
        let settings = MeshSettings {
            level_of_detail: LevelOfDetail::FULL,
            ..Default::default()
        };
        let preview = render_preview(&small_map(), &settings, DrawMode::Mesh);
        let mesh = preview.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.indices.len(), 54);
    }

    #[test]
    fn test_draw_preview_full_tile() {
        let preview = draw_preview(
            &NoiseParams::default(),
            &RegionTable::default_terrain(),
            &MeshSettings::default(),
            DrawMode::ColorMap,
        );
        assert_eq!(
            preview.texture().dimensions(),
            (MAP_CHUNK_SIZE as u32, MAP_CHUNK_SIZE as u32)
        );
    }
}
