//! Height field to triangle mesh conversion at a chosen level of detail.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tilegen_terrain::{HeightCurve, HeightField};

use crate::lod::LevelOfDetail;

/// Mesh-stage settings, cloned into each mesh request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// World-space height of a sample that the curve maps to 1.
    pub height_multiplier: f32,
    /// Remap applied to each normalized height before scaling.
    pub height_curve: HeightCurve,
    /// Simplification level.
    pub level_of_detail: LevelOfDetail,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            height_multiplier: 20.0,
            height_curve: HeightCurve::identity(),
            level_of_detail: LevelOfDetail::FULL,
        }
    }
}

/// Vertex, uv and index buffers of a terrain mesh.
///
/// Vertices are laid out row by row, `vertices_x` per row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions, centered on the origin in x and z.
    pub positions: Vec<Vec3>,
    /// Texture coordinates, one per vertex.
    pub uvs: Vec<Vec2>,
    /// Triangle list, 3 indices per triangle.
    pub indices: Vec<u32>,
    vertices_x: usize,
    vertices_z: usize,
}

impl MeshBuffers {
    fn with_grid(vertices_x: usize, vertices_z: usize) -> Self {
        let vertex_count = vertices_x * vertices_z;
        let quad_count = vertices_x.saturating_sub(1) * vertices_z.saturating_sub(1);
        Self {
            positions: Vec::with_capacity(vertex_count),
            uvs: Vec::with_capacity(vertex_count),
            indices: Vec::with_capacity(quad_count * 6),
            vertices_x,
            vertices_z,
        }
    }

    #[inline]
    fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Vertices per row and number of rows.
    pub fn grid_size(&self) -> (usize, usize) {
        (self.vertices_x, self.vertices_z)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Smooth per-vertex normals: the area-weighted sum of adjacent face
    /// normals, normalized. Faces use the right-handed `(b - a) x (c - a)`.
    pub fn compute_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for [a, b, c] in self.triangles() {
            let (a, b, c) = (a as usize, b as usize, c as usize);
            let pa = self.positions[a];
            let face = (self.positions[b] - pa).cross(self.positions[c] - pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        normals.into_iter().map(Vec3::normalize_or_zero).collect()
    }
}

/// Build a terrain mesh from `field`.
///
/// Samples every `lod.simplification_step()`-th height in both directions.
/// Vertex `y` is `curve(height) * height_multiplier`; `x` and `z` are centered
/// on the origin with `z` decreasing as the row index grows. Each quad is
/// split along its top-left to bottom-right diagonal.
pub fn build_terrain_mesh(
    field: &HeightField,
    height_multiplier: f32,
    curve: &HeightCurve,
    lod: LevelOfDetail,
) -> MeshBuffers {
    let (width, height) = field.dimensions();
    let step = lod.simplification_step();
    let vertices_x = lod.vertices_per_line(width);
    let vertices_z = lod.vertices_per_line(height);

    let top_left_x = (width as f32 - 1.0) / -2.0;
    let top_left_z = (height as f32 - 1.0) / 2.0;

    let mut mesh = MeshBuffers::with_grid(vertices_x, vertices_z);
    let row_stride = vertices_x as u32;

    for (row, y) in (0..height).step_by(step).enumerate() {
        for (col, x) in (0..width).step_by(step).enumerate() {
            let vertex = (row * vertices_x + col) as u32;
            let h = curve.evaluate(field.get(x, y)) * height_multiplier;

            mesh.positions
                .push(Vec3::new(top_left_x + x as f32, h, top_left_z - y as f32));
            mesh.uvs
                .push(Vec2::new(x as f32 / width as f32, y as f32 / height as f32));

            // The last column and row have no quad to their right/below.
            if col + 1 < vertices_x && row + 1 < vertices_z {
                mesh.add_triangle(vertex, vertex + row_stride + 1, vertex + row_stride);
                mesh.add_triangle(vertex + row_stride + 1, vertex, vertex + 1);
            }
        }
    }

    mesh
}

/// [`build_terrain_mesh`] with the fields of `settings`.
pub fn build_with_settings(field: &HeightField, settings: &MeshSettings) -> MeshBuffers {
    build_terrain_mesh(
        field,
        settings.height_multiplier,
        &settings.height_curve,
        settings.level_of_detail,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_terrain::{MAP_CHUNK_SIZE, NoiseParams, generate_height_field};

    fn flat(size: usize) -> HeightField {
        HeightField::filled(size, size, 0.5)
    }

    fn assert_indices_in_range(mesh: &MeshBuffers) {
        let count = mesh.vertex_count() as u32;
        for &i in &mesh.indices {
            assert!(i < count, "index {i} out of range for {count} vertices");
        }
    }

    #[test]
    fn test_counts_for_every_level() {
        let field = flat(MAP_CHUNK_SIZE);
        let curve = HeightCurve::identity();
        for lod in LevelOfDetail::all() {
            let mesh = build_terrain_mesh(&field, 10.0, &curve, lod);
            let vpl = (MAP_CHUNK_SIZE - 1) / lod.simplification_step() + 1;
            assert_eq!(mesh.vertex_count(), vpl * vpl, "{lod:?}");
            assert_eq!(mesh.uvs.len(), vpl * vpl, "{lod:?}");
            assert_eq!(mesh.indices.len(), 6 * (vpl - 1) * (vpl - 1), "{lod:?}");
            assert_eq!(mesh.grid_size(), (vpl, vpl));
            assert_indices_in_range(&mesh);
        }
    }

    #[test]
    fn test_fixed_winding_on_small_grid() {
        let mesh = build_terrain_mesh(&flat(3), 1.0, &HeightCurve::identity(), LevelOfDetail::FULL);
        let triangles: Vec<[u32; 3]> = mesh.triangles().collect();
        assert_eq!(
            triangles,
            vec![
                [0, 4, 3],
                [4, 0, 1],
                [1, 5, 4],
                [5, 1, 2],
                [3, 7, 6],
                [7, 3, 4],
                [4, 8, 7],
                [8, 4, 5],
            ]
        );
    }

    #[test]
    fn test_flat_field_normals_point_up() {
        let mesh = build_terrain_mesh(&flat(9), 5.0, &HeightCurve::identity(), LevelOfDetail::new(1));
        for normal in mesh.compute_normals() {
            assert!((normal - Vec3::Y).length() < 1e-5, "normal {normal}");
        }
    }

    #[test]
    fn test_positions_are_centered() {
        let mesh = build_terrain_mesh(&flat(5), 1.0, &HeightCurve::identity(), LevelOfDetail::FULL);
        assert_eq!(mesh.positions[0], Vec3::new(-2.0, 0.5, 2.0));
        assert_eq!(mesh.positions[24], Vec3::new(2.0, 0.5, -2.0));
        assert_eq!(mesh.uvs[0], Vec2::ZERO);
        assert_eq!(mesh.uvs[24], Vec2::new(0.8, 0.8));
    }

    #[test]
    fn test_simplified_grid_reaches_last_row_and_column() {
        let mesh = build_terrain_mesh(
            &flat(MAP_CHUNK_SIZE),
            1.0,
            &HeightCurve::identity(),
            LevelOfDetail::MAX,
        );
        let last = mesh.positions.last().unwrap();
        assert_eq!(last.x, 120.0);
        assert_eq!(last.z, -120.0);
    }

    #[test]
    fn test_curve_and_multiplier_shape_heights() {
        let field = HeightField::from_values(2, 1, vec![0.2, 1.0]);
        let curve = HeightCurve::flatten_below(0.4);
        let mesh = build_terrain_mesh(&field, 30.0, &curve, LevelOfDetail::FULL);
        assert!(mesh.positions[0].y.abs() < 1e-4);
        assert!((mesh.positions[1].y - 30.0).abs() < 1e-4);
        // A single row has no quads.
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_non_divisible_field_keeps_indices_in_range() {
        let field = HeightField::filled(10, 7, 0.3);
        let mesh = build_terrain_mesh(&field, 1.0, &HeightCurve::identity(), LevelOfDetail::new(2));
        assert_eq!(mesh.grid_size(), (3, 2));
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices.len(), 12);
        assert_indices_in_range(&mesh);
    }

    #[test]
    fn test_empty_field() {
        let mesh = build_terrain_mesh(
            &HeightField::from_values(0, 0, Vec::new()),
            1.0,
            &HeightCurve::identity(),
            LevelOfDetail::FULL,
        );
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.indices.is_empty());
    }

    #[test]
    fn test_full_tile_example() {
        let params = NoiseParams {
            seed: 1,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            ..Default::default()
        };
        let field = generate_height_field(MAP_CHUNK_SIZE, MAP_CHUNK_SIZE, &params);
        let mesh = build_with_settings(&field, &MeshSettings::default());
        assert_eq!(mesh.vertex_count(), 58_081);
        assert_eq!(mesh.indices.len(), 345_600);
        assert_indices_in_range(&mesh);
    }
}
