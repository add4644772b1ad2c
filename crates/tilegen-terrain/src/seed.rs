//! Deterministic seeded offsets for noise octaves.
//!
//! Every octave samples the gradient noise at its own pseudo-random offset so
//! that layers do not line up. The offsets come from a `ChaCha8Rng`, which
//! produces the same sequence for the same seed on every platform and thread.

use glam::{DVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Bound on the per-octave random offset. Larger coordinates push Perlin
/// samples into a range where `f64` precision visibly degrades the output.
pub const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// RNG used for every seed-derived value in a tile.
pub fn noise_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Derive one sample offset per octave from `seed`, shifted by `offset`.
///
/// With `independent` unset every octave reuses the first octave's offset, so
/// all layers sample around the same point of the noise plane.
pub fn octave_offsets(seed: u64, octaves: u32, offset: Vec2, independent: bool) -> Vec<DVec2> {
    let mut rng = noise_rng(seed);
    let shift = offset.as_dvec2();

    let draw = |rng: &mut ChaCha8Rng| {
        let x = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
        let y = rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE);
        DVec2::new(f64::from(x), f64::from(y)) + shift
    };

    if independent {
        (0..octaves).map(|_| draw(&mut rng)).collect()
    } else {
        let shared = draw(&mut rng);
        vec![shared; octaves as usize]
    }
}
