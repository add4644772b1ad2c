//! Writing previews to disk as PNG images.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Vec3;
use tilegen_mesh::MeshBuffers;
use tilegen_pipeline::Preview;
use tilegen_terrain::{Rgba, Texture};
use tracing::{debug, info};

/// Light used to shade mesh previews, pointing from the surface to the sun.
const SUN_DIRECTION: Vec3 = Vec3::new(-0.4, 0.8, 0.45);
/// Brightness of faces turned away from the sun.
const AMBIENT: f32 = 0.25;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode png: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Encode `texture` as an 8-bit RGBA PNG.
pub fn encode_png(texture: &Texture, writer: impl Write) -> Result<(), ExportError> {
    let mut encoder = png::Encoder::new(writer, texture.width, texture.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&texture.pixels)?;
    writer.finish()?;
    Ok(())
}

/// Write `texture` to `path`, replacing any existing file.
pub fn write_png(texture: &Texture, path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    encode_png(texture, BufWriter::new(file))?;
    debug!(path = %path.display(), "wrote png");
    Ok(())
}

/// Top-down view of `mesh`: one pixel per vertex, colored from `texture` at
/// the vertex uv and lit by a fixed sun.
pub fn shade_mesh(mesh: &MeshBuffers, texture: &Texture) -> Texture {
    let (columns, rows) = mesh.grid_size();
    let mut shaded = Texture::filled(columns as u32, rows as u32, Rgba::UNSET);
    if texture.width == 0 || texture.height == 0 {
        return shaded;
    }

    let sun = SUN_DIRECTION.normalize();
    let normals = mesh.compute_normals();
    let (width, height) = (texture.width as f32, texture.height as f32);

    for (index, (normal, uv)) in normals.iter().zip(&mesh.uvs).enumerate() {
        let base = texture.pixel(
            ((uv.x * width).round() as u32).min(texture.width - 1),
            ((uv.y * height).round() as u32).min(texture.height - 1),
        );
        let light = AMBIENT + (1.0 - AMBIENT) * normal.dot(sun).max(0.0);
        let (x, y) = ((index % columns) as u32, (index / columns) as u32);
        shaded.put_pixel(x, y, Rgba::BLACK.lerp(base, light));
    }
    shaded
}

/// Write the images for `preview` into `dir` and return their paths.
///
/// Texture previews produce `<stem>.png`. Mesh previews produce the color
/// texture and a shaded `<stem>_shaded.png`.
pub fn write_preview(preview: &Preview, dir: &Path, stem: &str) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let texture_path = dir.join(format!("{stem}.png"));
    write_png(preview.texture(), &texture_path)?;
    let mut written = vec![texture_path];

    if let Some(mesh) = preview.mesh() {
        let mesh_path = dir.join(format!("{stem}_shaded.png"));
        write_png(&shade_mesh(mesh, preview.texture()), &mesh_path)?;
        info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "mesh preview written"
        );
        written.push(mesh_path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_mesh::{LevelOfDetail, build_terrain_mesh};
    use tilegen_terrain::{HeightCurve, HeightField};

    fn decode(bytes: &[u8]) -> (u32, u32, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info.width, info.height, buf)
    }

    fn checker() -> Texture {
        let mut texture = Texture::filled(3, 2, Rgba::UNSET);
        texture.put_pixel(0, 0, Rgba::WHITE);
        texture.put_pixel(2, 1, Rgba::opaque(200, 10, 30));
        texture
    }

    #[test]
    fn test_encoded_png_decodes_to_same_pixels() {
        let texture = checker();
        let mut bytes = Vec::new();
        encode_png(&texture, &mut bytes).unwrap();

        let (width, height, pixels) = decode(&bytes);
        assert_eq!((width, height), (3, 2));
        assert_eq!(pixels, texture.pixels);
    }

    #[test]
    fn test_write_png_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checker.png");
        write_png(&checker(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_write_png_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("checker.png");
        let err = write_png(&checker(), &path).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_flat_mesh_is_evenly_lit() {
        let field = HeightField::filled(5, 5, 0.5);
        let mesh = build_terrain_mesh(&field, 10.0, &HeightCurve::identity(), LevelOfDetail::FULL);
        let texture = Texture::filled(5, 5, Rgba::WHITE);

        let shaded = shade_mesh(&mesh, &texture);
        assert_eq!(shaded.dimensions(), (5, 5));
        let first = shaded.pixel(0, 0);
        assert!(first.r > 0 && first.r < 255, "flat ground should be partly lit");
        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(shaded.pixel(x, y), first);
            }
        }
    }

    #[test]
    fn test_texture_preview_writes_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_preview(&Preview::Texture(checker()), dir.path(), "tile").unwrap();
        assert_eq!(written, vec![dir.path().join("tile.png")]);
    }

    #[test]
    fn test_mesh_preview_writes_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let field = HeightField::from_values(3, 2, vec![0.0, 0.5, 1.0, 1.0, 0.5, 0.0]);
        let mesh = build_terrain_mesh(&field, 4.0, &HeightCurve::identity(), LevelOfDetail::FULL);
        let preview = Preview::Mesh {
            mesh,
            texture: checker(),
        };

        let written = write_preview(&preview, &dir.path().join("out"), "tile").unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|path| path.exists()));
    }
}
