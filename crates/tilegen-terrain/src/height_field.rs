//! Immutable normalized height grid shared between generation stages.

/// Side length of one generated map tile, in samples.
///
/// `MAP_CHUNK_SIZE - 1 = 240` is divisible by every mesh simplification step
/// (1, 2, 4, 6, 8, 10, 12), so simplified grid lines land exactly on the last
/// row and column.
pub const MAP_CHUNK_SIZE: usize = 241;

/// A `width x height` grid of heights in `[0, 1]`, stored row-major.
///
/// Produced once by [`generate_height_field`](crate::generate_height_field)
/// and read-only afterwards. Value-equal fields are interchangeable.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightField {
    /// Wrap an already-normalized row-major buffer. Every value must lie in
    /// `[0, 1]`; debug builds check this.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "height field buffer does not match {width}x{height}"
        );
        debug_assert!(
            values.iter().all(|v| (0.0..=1.0).contains(v)),
            "height field values must be normalized into [0, 1]"
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// A field where every sample is `value`.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self::from_values(width, height, vec![value; width * height])
    }

    /// Number of samples along x.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of samples along y.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Height at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(
            x < self.width && y < self.height,
            "({x}, {y}) outside {}x{} height field",
            self.width,
            self.height
        );
        self.values[y * self.width + x]
    }

    /// The raw row-major samples.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Smallest and largest sample, or `None` for an empty field.
    pub fn range(&self) -> Option<(f32, f32)> {
        self.values.iter().fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}
