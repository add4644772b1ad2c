//! Keyframed height remap curve.
//!
//! Applied to normalized heights before they are scaled into mesh space, e.g.
//! to flatten everything below the water line. Workers always receive their
//! own clone, so editing a curve never races a mesh build in progress.

use serde::{Deserialize, Serialize};

/// A single curve keyframe with cubic Hermite tangents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Input position, normally in `[0, 1]`.
    pub time: f32,
    /// Output value at `time`.
    pub value: f32,
    /// Slope approaching this key from the left.
    #[serde(default)]
    pub in_tangent: f32,
    /// Slope leaving this key to the right.
    #[serde(default)]
    pub out_tangent: f32,
}

impl CurveKey {
    /// A key with flat tangents.
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    /// A key with explicit tangents.
    pub fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Piecewise cubic Hermite curve, clamped to its first and last key outside
/// the key range.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl HeightCurve {
    /// Build a curve from keys in any order.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Build a polyline through `points`, with tangents set so each segment
    /// is a straight line.
    pub fn linear(points: &[(f32, f32)]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let slope = |a: (f32, f32), b: (f32, f32)| {
            let dt = b.0 - a.0;
            if dt > 0.0 { (b.1 - a.1) / dt } else { 0.0 }
        };

        let keys = (0..sorted.len())
            .map(|i| {
                let (time, value) = sorted[i];
                let in_tangent = if i > 0 {
                    slope(sorted[i - 1], sorted[i])
                } else {
                    0.0
                };
                let out_tangent = if i + 1 < sorted.len() {
                    slope(sorted[i], sorted[i + 1])
                } else {
                    0.0
                };
                CurveKey::with_tangents(time, value, in_tangent, out_tangent)
            })
            .collect();

        Self { keys }
    }

    /// `f(t) = t` on `[0, 1]`.
    pub fn identity() -> Self {
        Self::linear(&[(0.0, 0.0), (1.0, 1.0)])
    }

    /// Maps everything at or below `level` to 0 and ramps linearly up to 1.
    pub fn flatten_below(level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        Self::linear(&[(0.0, 0.0), (level, 0.0), (1.0, 1.0)])
    }

    /// The keys sorted by time.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`. An empty curve evaluates to 0.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; the segment starts one before it.
        let upper = self.keys.partition_point(|k| k.time <= t);
        let k0 = &self.keys[upper - 1];
        let k1 = &self.keys[upper];
        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return k1.value;
        }

        let s = (t - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

impl Default for HeightCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Vec<CurveKey>> for HeightCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::new(keys)
    }
}

impl From<HeightCurve> for Vec<CurveKey> {
    fn from(curve: HeightCurve) -> Self {
        curve.keys
    }
}
