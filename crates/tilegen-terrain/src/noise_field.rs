//! Multi-octave fractal noise synthesis into a normalized [`HeightField`].
//!
//! Layers several octaves of 2D Perlin noise, each at a higher frequency and
//! lower amplitude than the last, then remaps the accumulated heights of the
//! whole tile into `[0, 1]`.

use glam::{DVec2, Vec2};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::height_field::HeightField;
use crate::seed::octave_offsets;

/// Smallest usable noise scale. Non-positive scales are clamped to this.
pub const MIN_NOISE_SCALE: f32 = 1e-4;

/// Permutation seed for the underlying gradient noise. Variation between maps
/// comes from the seeded octave offsets, not from the permutation table.
const GRADIENT_SEED: u32 = 0;

/// Configuration for fractal noise used in height field generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Seed for the per-octave sample offsets.
    pub seed: u64,
    /// Distance in samples covered by one unit of noise space. Larger values
    /// zoom in. Must be positive.
    pub scale: f32,
    /// Number of noise layers to composite. Negative values in config files
    /// read as 0.
    #[serde(deserialize_with = "deserialize_count")]
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves, typically in `(0, 1]`.
    pub persistence: f32,
    /// Frequency multiplier between successive octaves. At least 1.
    pub lacunarity: f32,
    /// Global offset added to every octave's sample position.
    pub offset: Vec2,
    /// Debug: only let the octave with this index contribute. Negative
    /// indices in config files read as 0.
    #[serde(deserialize_with = "deserialize_optional_count")]
    pub single_octave: Option<u32>,
    /// Debug: when unset, all octaves share one seeded sample offset.
    pub independent_octave_offsets: bool,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: 50.0,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: Vec2::ZERO,
            single_octave: None,
            independent_octave_offsets: true,
        }
    }
}

impl NoiseParams {
    /// Returns a copy with every out-of-range value clamped to the nearest
    /// valid one: `scale > 0`, `lacunarity >= 1`, and `single_octave` within
    /// `0..octaves`.
    pub fn sanitized(&self) -> Self {
        let mut params = self.clone();
        if params.scale.is_nan() || params.scale <= 0.0 {
            debug!(scale = params.scale, "clamping noise scale");
            params.scale = MIN_NOISE_SCALE;
        }
        if params.lacunarity.is_nan() || params.lacunarity < 1.0 {
            debug!(lacunarity = params.lacunarity, "clamping lacunarity");
            params.lacunarity = 1.0;
        }
        params.single_octave = match (params.single_octave, params.octaves) {
            (_, 0) => None,
            (Some(index), octaves) => Some(index.min(octaves - 1)),
            (None, _) => None,
        };
        params
    }
}

/// Clamp a signed count from user input into `u32`.
pub fn clamp_count(raw: i64) -> u32 {
    if raw < 0 {
        debug!(raw, "clamping negative count to 0");
    }
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

fn deserialize_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    i64::deserialize(deserializer).map(clamp_count)
}

fn deserialize_optional_count<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    Option::<i64>::deserialize(deserializer).map(|raw| raw.map(clamp_count))
}

/// 2D gradient noise remapped into `[0, 1]`.
#[derive(Clone, Debug)]
pub struct GradientNoise {
    perlin: Perlin,
}

impl GradientNoise {
    /// Create the noise source used by every tile.
    pub fn new() -> Self {
        Self {
            perlin: Perlin::new(GRADIENT_SEED),
        }
    }

    /// Sample at `(x, y)`, returning a value in `[0, 1]`.
    #[inline]
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        (self.perlin.get([x, y]) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

impl Default for GradientNoise {
    fn default() -> Self {
        Self::new()
    }
}

/// One contributing noise layer.
#[derive(Clone, Copy, Debug)]
struct Octave {
    offset: DVec2,
    amplitude: f64,
    frequency: f64,
}

/// Samples signed, un-normalized fractal heights for one tile.
pub struct FractalSampler {
    noise: GradientNoise,
    octaves: Vec<Octave>,
    scale: f64,
    half_extent: DVec2,
}

impl FractalSampler {
    /// Prepare a sampler for a `width x height` tile. `params` is sanitized
    /// before use.
    pub fn new(width: usize, height: usize, params: &NoiseParams) -> Self {
        let params = params.sanitized();
        let offsets = octave_offsets(
            params.seed,
            params.octaves,
            params.offset,
            params.independent_octave_offsets,
        );

        let persistence = f64::from(params.persistence);
        let lacunarity = f64::from(params.lacunarity);
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut octaves = Vec::with_capacity(offsets.len());
        for offset in offsets {
            octaves.push(Octave {
                offset,
                amplitude,
                frequency,
            });
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if let Some(index) = params.single_octave {
            octaves = vec![octaves[index as usize]];
        }

        Self {
            noise: GradientNoise::new(),
            octaves,
            scale: f64::from(params.scale),
            half_extent: DVec2::new(width as f64 / 2.0, height as f64 / 2.0),
        }
    }

    /// Signed height at grid cell `(x, y)`.
    ///
    /// Coordinates are taken relative to the tile center so that changing the
    /// scale zooms around the middle of the tile instead of a corner.
    pub fn signed_height(&self, x: usize, y: usize) -> f64 {
        let centered = DVec2::new(x as f64, y as f64) - self.half_extent;
        let mut total = 0.0;

        for octave in &self.octaves {
            let sample = centered / self.scale * octave.frequency + octave.offset;
            let value = self.noise.sample(sample.x, sample.y) * 2.0 - 1.0;
            total += value * octave.amplitude;
        }

        total
    }

    /// Number of octaves that contribute to each sample.
    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }
}

/// Generate a normalized `width x height` height field.
///
/// Deterministic for fixed inputs. The lowest accumulated height maps to 0 and
/// the highest to 1; a perfectly flat tile (including `octaves == 0`) becomes
/// all zeros.
pub fn generate_height_field(width: usize, height: usize, params: &NoiseParams) -> HeightField {
    let sampler = FractalSampler::new(width, height, params);

    let mut raw = Vec::with_capacity(width * height);
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for y in 0..height {
        for x in 0..width {
            let h = sampler.signed_height(x, y);
            min = min.min(h);
            max = max.max(h);
            raw.push(h);
        }
    }

    let range = max - min;
    let values = if range > 0.0 {
        raw.iter()
            .map(|&h| ((h - min) / range).clamp(0.0, 1.0) as f32)
            .collect()
    } else {
        debug!(width, height, "flat noise field, normalizing to zero");
        vec![0.0; raw.len()]
    };

    HeightField::from_values(width, height, values)
}
