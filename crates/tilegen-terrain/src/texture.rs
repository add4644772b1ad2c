//! CPU-side RGBA textures built from height and region data.
//!
//! These are plain pixel buffers handed to whatever displays or saves them.

use crate::height_field::HeightField;
use crate::region::Rgba;

/// A 2D texture stored as row-major RGBA8 pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl Texture {
    /// A `width x height` texture with every pixel set to `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: color.to_array().repeat((width * height) as usize),
        }
    }

    /// One pixel per color, row-major.
    ///
    /// # Panics
    ///
    /// Panics if `colors.len() != width * height`.
    pub fn from_colors(colors: &[Rgba], width: u32, height: u32) -> Self {
        assert_eq!(colors.len(), (width * height) as usize);
        Self {
            width,
            height,
            pixels: colors.iter().flat_map(|c| c.to_array()).collect(),
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) outside texture");
        ((y * self.width + x) * 4) as usize
    }

    /// Color at `(x, y)`. Panics outside the texture.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let at = self.offset(x, y);
        let rgba = &self.pixels[at..at + 4];
        Rgba::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Overwrite `(x, y)`. Panics outside the texture.
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let at = self.offset(x, y);
        self.pixels[at..at + 4].copy_from_slice(&color.to_array());
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Grayscale texture: height 0 is black, height 1 is white.
pub fn texture_from_height_map(field: &HeightField) -> Texture {
    let colors: Vec<Rgba> = field
        .values()
        .iter()
        .map(|&h| Rgba::BLACK.lerp(Rgba::WHITE, h))
        .collect();
    Texture::from_colors(&colors, field.width() as u32, field.height() as u32)
}

/// Texture from a precomputed color map.
pub fn texture_from_color_map(colors: &[Rgba], width: u32, height: u32) -> Texture {
    Texture::from_colors(colors, width, height)
}
