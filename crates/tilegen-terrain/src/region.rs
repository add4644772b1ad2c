//! Height-threshold region table and per-cell classification.

use serde::{Deserialize, Serialize};

use crate::height_field::HeightField;

/// An 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Color of cells no region claims (transparent black).
    pub const UNSET: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// A fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Component-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// One entry of a [`RegionTable`]: every height at or below `height` that no
/// earlier entry claimed gets `color`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainRegion {
    pub name: String,
    pub height: f32,
    pub color: Rgba,
}

impl TerrainRegion {
    pub fn new(name: impl Into<String>, height: f32, color: Rgba) -> Self {
        Self {
            name: name.into(),
            height,
            color,
        }
    }
}

/// Errors reported by [`RegionTable::validated`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegionTableError {
    /// A threshold is lower than the one before it.
    #[error("region `{name}` threshold {height} is below the previous threshold {previous}")]
    Descending {
        name: String,
        height: f32,
        previous: f32,
    },

    /// A threshold is NaN or infinite.
    #[error("region `{name}` has non-finite threshold {height}")]
    NonFinite { name: String, height: f32 },
}

/// Ordered list of regions, searched front to back.
///
/// Thresholds are expected to be non-decreasing. [`RegionTable::new`] does
/// not check this; an out-of-order table still classifies, with the first
/// qualifying entry winning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionTable {
    regions: Vec<TerrainRegion>,
}

impl RegionTable {
    /// Wrap `regions` as given.
    pub fn new(regions: Vec<TerrainRegion>) -> Self {
        Self { regions }
    }

    /// Wrap `regions`, rejecting non-finite or descending thresholds.
    pub fn validated(regions: Vec<TerrainRegion>) -> Result<Self, RegionTableError> {
        let table = Self::new(regions);
        table.validate()?;
        Ok(table)
    }

    /// Check that thresholds are finite and non-decreasing.
    pub fn validate(&self) -> Result<(), RegionTableError> {
        let mut previous: Option<f32> = None;
        for region in &self.regions {
            if !region.height.is_finite() {
                return Err(RegionTableError::NonFinite {
                    name: region.name.clone(),
                    height: region.height,
                });
            }
            if let Some(prev) = previous
                && region.height < prev
            {
                return Err(RegionTableError::Descending {
                    name: region.name.clone(),
                    height: region.height,
                    previous: prev,
                });
            }
            previous = Some(region.height);
        }
        Ok(())
    }

    /// Index of the first region whose threshold is at or above `height`.
    #[inline]
    pub fn lookup(&self, height: f32) -> Option<usize> {
        self.regions.iter().position(|r| height <= r.height)
    }

    pub fn get(&self, index: usize) -> Option<&TerrainRegion> {
        self.regions.get(index)
    }

    pub fn regions(&self) -> &[TerrainRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Water, sand, grass, rock and snow bands.
    pub fn default_terrain() -> Self {
        Self::new(vec![
            TerrainRegion::new("deep_water", 0.3, Rgba::opaque(25, 55, 160)),
            TerrainRegion::new("shallow_water", 0.4, Rgba::opaque(55, 100, 200)),
            TerrainRegion::new("sand", 0.45, Rgba::opaque(210, 205, 125)),
            TerrainRegion::new("grass", 0.55, Rgba::opaque(85, 150, 25)),
            TerrainRegion::new("forest", 0.6, Rgba::opaque(60, 105, 20)),
            TerrainRegion::new("rock", 0.7, Rgba::opaque(90, 70, 60)),
            TerrainRegion::new("high_rock", 0.9, Rgba::opaque(75, 60, 55)),
            TerrainRegion::new("snow", 1.0, Rgba::WHITE),
        ])
    }
}

/// Per-cell region indices for one height field, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionMap {
    width: usize,
    height: usize,
    cells: Vec<Option<usize>>,
}

impl RegionMap {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Region index at `(x, y)`, or `None` if no region claimed the cell.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn region_at(&self, x: usize, y: usize) -> Option<usize> {
        assert!(x < self.width && y < self.height);
        self.cells[y * self.width + x]
    }

    pub fn cells(&self) -> &[Option<usize>] {
        &self.cells
    }

    /// Resolve indices to colors; unclaimed cells become [`Rgba::UNSET`].
    pub fn to_colors(&self, table: &RegionTable) -> Vec<Rgba> {
        self.cells
            .iter()
            .map(|cell| {
                cell.and_then(|i| table.get(i))
                    .map_or(Rgba::UNSET, |region| region.color)
            })
            .collect()
    }
}

/// Classify every cell of `field` against `table`.
pub fn classify(field: &HeightField, table: &RegionTable) -> RegionMap {
    RegionMap {
        width: field.width(),
        height: field.height(),
        cells: field.values().iter().map(|&h| table.lookup(h)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::opaque(255, 0, 0);
    const GREEN: Rgba = Rgba::opaque(0, 255, 0);
    const BLUE: Rgba = Rgba::opaque(0, 0, 255);

    fn rgb_table() -> RegionTable {
        RegionTable::new(vec![
            TerrainRegion::new("red", 0.2, RED),
            TerrainRegion::new("green", 0.5, GREEN),
            TerrainRegion::new("blue", 1.0, BLUE),
        ])
    }

    #[test]
    fn test_first_match_by_threshold() {
        let field = HeightField::from_values(4, 1, vec![0.1, 0.2, 0.35, 1.0]);
        let table = rgb_table();
        let colors = classify(&field, &table).to_colors(&table);
        assert_eq!(colors, vec![RED, RED, GREEN, BLUE]);
    }

    #[test]
    fn test_unclaimed_cell_is_unset() {
        let table = RegionTable::new(vec![TerrainRegion::new("low", 0.5, RED)]);
        let field = HeightField::from_values(2, 1, vec![0.25, 0.75]);
        let map = classify(&field, &table);
        assert_eq!(map.region_at(0, 0), Some(0));
        assert_eq!(map.region_at(1, 0), None);
        assert_eq!(map.to_colors(&table), vec![RED, Rgba::UNSET]);
    }

    #[test]
    fn test_empty_table_leaves_everything_unset() {
        let field = HeightField::filled(3, 3, 0.5);
        let map = classify(&field, &RegionTable::default());
        assert!(map.cells().iter().all(Option::is_none));
    }

    #[test]
    fn test_out_of_order_table_first_entry_wins() {
        let table = RegionTable::new(vec![
            TerrainRegion::new("blue", 1.0, BLUE),
            TerrainRegion::new("red", 0.2, RED),
        ]);
        assert_eq!(table.lookup(0.1), Some(0));
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validated_rejects_descending() {
        let err = RegionTable::validated(vec![
            TerrainRegion::new("a", 0.5, RED),
            TerrainRegion::new("b", 0.3, GREEN),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RegionTableError::Descending {
                name: "b".to_string(),
                height: 0.3,
                previous: 0.5,
            }
        );
    }

    #[test]
    fn test_validated_rejects_nan() {
        let err = RegionTable::validated(vec![TerrainRegion::new("a", f32::NAN, RED)]);
        assert!(matches!(err, Err(RegionTableError::NonFinite { .. })));
    }

    #[test]
    fn test_validated_accepts_equal_thresholds() {
        let table = RegionTable::validated(vec![
            TerrainRegion::new("a", 0.5, RED),
            TerrainRegion::new("b", 0.5, GREEN),
        ])
        .unwrap();
        assert_eq!(table.lookup(0.5), Some(0));
    }

    #[test]
    fn test_default_terrain_is_valid_and_covers_unit_range() {
        let table = RegionTable::default_terrain();
        table.validate().unwrap();
        assert_eq!(table.lookup(0.0), Some(0));
        assert_eq!(table.lookup(1.0), Some(table.len() - 1));
    }

    #[test]
    fn test_rgba_lerp() {
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 0.0), Rgba::BLACK);
        assert_eq!(Rgba::BLACK.lerp(Rgba::WHITE, 1.0), Rgba::WHITE);
        assert_eq!(
            Rgba::BLACK.lerp(Rgba::WHITE, 0.5),
            Rgba::opaque(128, 128, 128)
        );
    }
}
