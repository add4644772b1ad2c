//! Mesh level of detail and its simplification step.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Mesh level of detail in `0..=6`.
///
/// Level 0 keeps every height sample; level `n > 0` keeps every `2n`-th one.
/// All resulting steps divide `MAP_CHUNK_SIZE - 1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct LevelOfDetail(u8);

impl LevelOfDetail {
    /// Full resolution.
    pub const FULL: Self = Self(0);
    /// Coarsest supported level.
    pub const MAX: Self = Self(6);

    /// Create a level, clamping anything above [`Self::MAX`].
    pub fn new(level: u8) -> Self {
        if level > Self::MAX.0 {
            debug!(level, "clamping level of detail");
        }
        Self(level.min(Self::MAX.0))
    }

    /// Clamp a signed level from user input into `0..=6`.
    pub fn clamped(level: i64) -> Self {
        Self::new(level.clamp(0, i64::from(u8::MAX)) as u8)
    }

    /// The raw level.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Stride in height samples between mesh vertices: 1, 2, 4, 6, 8, 10 or 12.
    pub fn simplification_step(self) -> usize {
        if self.0 == 0 { 1 } else { self.0 as usize * 2 }
    }

    /// Vertices along a line of `samples` height samples at this level.
    pub fn vertices_per_line(self, samples: usize) -> usize {
        if samples == 0 {
            0
        } else {
            (samples - 1) / self.simplification_step() + 1
        }
    }

    /// Every supported level, finest first.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MAX.0).map(Self)
    }
}

impl From<u8> for LevelOfDetail {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

impl From<i64> for LevelOfDetail {
    fn from(level: i64) -> Self {
        if level < 0 {
            debug!(level, "clamping negative level of detail");
        }
        Self::clamped(level)
    }
}

impl From<LevelOfDetail> for u8 {
    fn from(lod: LevelOfDetail) -> Self {
        lod.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilegen_terrain::MAP_CHUNK_SIZE;

    #[test]
    fn test_steps_per_level() {
        let steps: Vec<usize> = LevelOfDetail::all()
            .map(LevelOfDetail::simplification_step)
            .collect();
        assert_eq!(steps, vec![1, 2, 4, 6, 8, 10, 12]);
    }

    #[test]
    fn test_steps_divide_chunk_size() {
        for lod in LevelOfDetail::all() {
            assert_eq!(
                (MAP_CHUNK_SIZE - 1) % lod.simplification_step(),
                0,
                "{lod:?}"
            );
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(LevelOfDetail::new(7), LevelOfDetail::MAX);
        assert_eq!(LevelOfDetail::from(255_u8), LevelOfDetail::MAX);
        assert_eq!(LevelOfDetail::clamped(-1), LevelOfDetail::FULL);
        assert_eq!(LevelOfDetail::clamped(300), LevelOfDetail::MAX);
    }

    #[test]
    fn test_deserialize_clamps_signed_levels() {
        let low: LevelOfDetail = ron::from_str("-1").unwrap();
        let high: LevelOfDetail = ron::from_str("300").unwrap();
        assert_eq!(low, LevelOfDetail::FULL);
        assert_eq!(high, LevelOfDetail::MAX);
        assert_eq!(ron::to_string(&LevelOfDetail::new(4)).unwrap(), "4");
        assert_eq!(LevelOfDetail::new(3).level(), 3);
    }

    #[test]
    fn test_vertices_per_line() {
        assert_eq!(LevelOfDetail::FULL.vertices_per_line(MAP_CHUNK_SIZE), 241);
        assert_eq!(LevelOfDetail::new(1).vertices_per_line(MAP_CHUNK_SIZE), 121);
        assert_eq!(LevelOfDetail::MAX.vertices_per_line(MAP_CHUNK_SIZE), 21);
        assert_eq!(LevelOfDetail::MAX.vertices_per_line(0), 0);
    }
}
